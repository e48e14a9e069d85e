//! WIPF sprite archives (Will).
//!
//! A table of image records followed by LZSS-compressed pixel data. 8-bit images carry a BGRA
//! palette (alpha stored inverted) in front of each payload; 24-bit images are stored as B, G and
//! R planes. Transparency lives in a sibling `.msk` archive with the same layout, whose images
//! pair with ours by position.

use crate::{
    containers::compression::{lzss_decompress, LzssSettings},
    error::{DecodeError, Result},
    filesystem::{InputFile, VirtualPath},
    formats::{
        archive::{ArchiveDecoder, ArchiveEntry, ArchiveMeta},
        options::Configurable,
        DecodeContext, NamingStrategy,
    },
    graphics::{Image, Palette, PixelFormat, PlaneLayout},
};

const MAGIC: &[u8] = b"WIPF";
const MASK_EXTENSION: &str = "msk";
const RECORD_SIZE: usize = 24;
const PALETTE_COLORS: usize = 256;
const PALETTE_SIZE: usize = PALETTE_COLORS * 4;
const MAX_DIMENSION: u32 = 0x4000;

#[derive(Debug)]
pub struct WipfEntry {
    path: VirtualPath,
    offset: usize,
    width: u32,
    height: u32,
    size_comp: usize,
    size_orig: usize,
    depth: u16,
    mask: Option<Image>,
}

impl WipfEntry {
    pub fn mask(&self) -> Option<&Image> {
        self.mask.as_ref()
    }
}

impl ArchiveEntry for WipfEntry {
    fn path(&self) -> &VirtualPath {
        &self.path
    }

    fn path_mut(&mut self) -> &mut VirtualPath {
        &mut self.path
    }
}

#[derive(Debug)]
pub struct WipfImageArchiveDecoder {
    lzss: LzssSettings,
}

impl Default for WipfImageArchiveDecoder {
    fn default() -> Self {
        // 12-bit position in the descriptor's high bits, cursor starting at 1, matches of 2+
        WipfImageArchiveDecoder {
            lzss: LzssSettings::default(),
        }
    }
}

impl Configurable for WipfImageArchiveDecoder {}

fn read_table(file: &mut InputFile) -> Result<ArchiveMeta<WipfEntry>> {
    file.stream.seek(MAGIC.len())?;
    let file_count = file.stream.read_u16_le()? as usize;
    let depth = file.stream.read_u16_le()?;

    let mut offset = file.stream.tell() + file_count * RECORD_SIZE;
    let mut meta = ArchiveMeta::new();
    for _ in 0..file_count {
        let width = file.stream.read_u32_le()?;
        let height = file.stream.read_u32_le()?;
        file.stream.skip(12)?;
        let size_comp = file.stream.read_u32_le()? as usize;

        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(DecodeError::InvalidData(format!(
                "implausible image size {}x{}",
                width, height
            )));
        }

        meta.entries.push(WipfEntry {
            path: VirtualPath::default(),
            offset,
            width,
            height,
            size_comp,
            size_orig: width as usize * height as usize * (depth >> 3) as usize,
            depth,
            mask: None,
        });

        offset += size_comp + if depth == 8 { PALETTE_SIZE } else { 0 };
    }

    Ok(meta)
}

impl WipfImageArchiveDecoder {
    fn read_image(&self, file: &mut InputFile, entry: &WipfEntry) -> Result<Image> {
        if !matches!(entry.depth, 8 | 24) {
            return Err(DecodeError::UnsupportedFormat(format!(
                "WIPF bit depth {}",
                entry.depth
            )));
        }

        file.stream.seek(entry.offset)?;
        let palette = if entry.depth == 8 {
            let mut palette =
                Palette::read(&mut file.stream, PALETTE_COLORS, PixelFormat::Bgra8888)?;
            palette.invert_alpha();
            Some(palette)
        } else {
            None
        };

        let compressed = file.stream.read(entry.size_comp)?;
        let data = lzss_decompress(&compressed, entry.size_orig, &self.lzss);

        match palette {
            Some(palette) => Image::from_indexed(entry.width, entry.height, &data, &palette),
            None => Image::from_planes(entry.width, entry.height, &data, PlaneLayout::Bgr),
        }
    }

    /// Finds the `.msk` sibling, unless we are the mask.
    fn find_mask_file(&self, file: &InputFile, ctx: &DecodeContext) -> Option<InputFile> {
        if file.path.has_extension(MASK_EXTENSION) {
            return None;
        }

        let mask_name = file.path.with_extension(MASK_EXTENSION);
        let mask_file = ctx.resolver.get_by_name(mask_name.as_str())?;
        let is_wipf = matches!(mask_file.stream.peek(MAGIC.len()), Ok(magic) if magic == MAGIC);
        if !is_wipf {
            log::warn!("{} is not a WIPF archive, ignoring it", mask_file.path);
            return None;
        }
        Some(mask_file)
    }
}

impl ArchiveDecoder for WipfImageArchiveDecoder {
    type Entry = WipfEntry;

    fn is_recognized_impl(&self, file: &mut InputFile) -> Result<bool> {
        Ok(file.stream.read(MAGIC.len())? == MAGIC)
    }

    fn read_meta(
        &self,
        file: &mut InputFile,
        ctx: &DecodeContext,
    ) -> Result<ArchiveMeta<WipfEntry>> {
        let mut meta = read_table(file)?;

        let Some(mut mask_file) = self.find_mask_file(file, ctx) else {
            return Ok(meta);
        };

        let mask_meta = read_table(&mut mask_file)?;
        if mask_meta.len() != meta.len() {
            return Err(DecodeError::InvalidData(format!(
                "{} has {} images but its mask {} has {}",
                file.path,
                meta.len(),
                mask_file.path,
                mask_meta.len()
            )));
        }

        log::debug!("Pairing {} with masks from {}", file.path, mask_file.path);
        for (entry, mask_entry) in meta.entries.iter_mut().zip(mask_meta.iter()) {
            entry.mask = Some(self.read_image(&mut mask_file, mask_entry)?);
        }

        Ok(meta)
    }

    fn read_file(
        &self,
        file: &mut InputFile,
        _meta: &ArchiveMeta<WipfEntry>,
        entry: &WipfEntry,
    ) -> Result<InputFile> {
        let mut image = self.read_image(file, entry)?;
        if let Some(mask) = &entry.mask {
            image.composite_mask(mask)?;
        }
        // Generated names look like `<stem>_000`; a dotted stem must not lose its suffix
        let path = VirtualPath::new(format!("{}.png", entry.path));
        Ok(InputFile::new(path, image.to_png()?))
    }

    fn naming_strategy(&self) -> NamingStrategy {
        NamingStrategy::Sibling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        filesystem::{MemoryFileSet, NoSiblings},
        formats::DynArchiveDecoder,
    };

    /// LZSS stream made only of literals.
    fn stored(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        for chunk in data.chunks(8) {
            out.push(0xFF);
            out.extend_from_slice(chunk);
        }
        out
    }

    fn build_24bit(images: &[(u32, u32, Vec<u8>)]) -> Vec<u8> {
        let mut out = MAGIC.to_vec();
        out.extend_from_slice(&(images.len() as u16).to_le_bytes());
        out.extend_from_slice(&24u16.to_le_bytes());
        let payloads: Vec<Vec<u8>> = images.iter().map(|(_, _, planes)| stored(planes)).collect();
        for ((width, height, _), payload) in images.iter().zip(&payloads) {
            out.extend_from_slice(&width.to_le_bytes());
            out.extend_from_slice(&height.to_le_bytes());
            out.extend_from_slice(&[0u8; 12]);
            out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        }
        for payload in payloads {
            out.extend(payload);
        }
        out
    }

    #[test]
    fn table_offsets_are_prefix_sums() {
        let data = build_24bit(&[(1, 1, vec![1, 2, 3]), (2, 1, vec![0; 6])]);
        let mut file = InputFile::new("a.wip", data);
        let meta = read_table(&mut file).unwrap();

        assert_eq!(meta.len(), 2);
        assert_eq!(meta.entries[0].offset, 8 + 2 * RECORD_SIZE);
        assert_eq!(meta.entries[1].offset, 8 + 2 * RECORD_SIZE + 4);
        assert_eq!(meta.entries[1].size_orig, 6);
    }

    #[test]
    fn eight_bit_offsets_include_palette() {
        let mut data = MAGIC.to_vec();
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&8u16.to_le_bytes());
        for _ in 0..2 {
            data.extend_from_slice(&1u32.to_le_bytes());
            data.extend_from_slice(&1u32.to_le_bytes());
            data.extend_from_slice(&[0u8; 12]);
            data.extend_from_slice(&2u32.to_le_bytes());
        }
        let mut file = InputFile::new("p.wip", data);
        let meta = read_table(&mut file).unwrap();
        assert_eq!(meta.entries[1].offset - meta.entries[0].offset, PALETTE_SIZE + 2);
    }

    #[test]
    fn unsupported_depth_names_the_depth() {
        let mut data = MAGIC.to_vec();
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&16u16.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 12]);
        data.extend_from_slice(&0u32.to_le_bytes());

        let decoder = WipfImageArchiveDecoder::default();
        let mut file = InputFile::new("deep.wip", data);
        let ctx = DecodeContext::new(&NoSiblings);
        let meta = decoder.read_meta(&mut file, &ctx).unwrap();
        match decoder.read_file(&mut file, &meta, &meta.entries[0]) {
            Err(DecodeError::UnsupportedFormat(message)) => assert!(message.contains("16")),
            other => panic!("expected UnsupportedFormat, got {:?}", other.map(|f| f.path)),
        }
    }

    #[test]
    fn mask_file_is_not_paired_with_itself() {
        let data = build_24bit(&[(1, 1, vec![1, 2, 3])]);
        let mut siblings = MemoryFileSet::new();
        siblings.insert("sprite.msk", build_24bit(&[(1, 1, vec![9, 9, 9])]));

        let decoder = WipfImageArchiveDecoder::default();
        let ctx = DecodeContext::new(&siblings);

        let mut mask = InputFile::new("sprite.msk", data.clone());
        let meta = decoder.read_meta(&mut mask, &ctx).unwrap();
        assert!(meta.entries[0].mask().is_none());

        let mut sprite = InputFile::new("sprite.wip", data);
        let meta = decoder.read_meta(&mut sprite, &ctx).unwrap();
        assert!(meta.entries[0].mask().is_some());
    }

    #[test]
    fn dotted_input_names_stay_distinct() {
        let data = build_24bit(&[(1, 1, vec![1, 2, 3]), (1, 1, vec![4, 5, 6])]);
        let decoder = WipfImageArchiveDecoder::default();
        let mut file = InputFile::new("chara.v2.wip", data);

        let files = decoder
            .unpack(&mut file, &DecodeContext::new(&NoSiblings))
            .unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(names, vec!["chara.v2_000.png", "chara.v2_001.png"]);
    }

    #[test]
    fn non_wipf_sibling_is_ignored() {
        let data = build_24bit(&[(1, 1, vec![1, 2, 3])]);
        let mut siblings = MemoryFileSet::new();
        siblings.insert("sprite.msk", b"garbage".to_vec());

        let decoder = WipfImageArchiveDecoder::default();
        let mut sprite = InputFile::new("sprite.wip", data);
        let meta = decoder
            .read_meta(&mut sprite, &DecodeContext::new(&siblings))
            .unwrap();
        assert!(meta.entries[0].mask().is_none());
    }
}
