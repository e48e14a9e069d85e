//! LINK5 archives: a chain of self-sizing records closed by a zero-length record.

use crate::{
    error::{DecodeError, Result},
    filesystem::{InputFile, VirtualPath},
    formats::{
        archive::{ArchiveDecoder, ArchiveEntry, ArchiveMeta},
        options::Configurable,
        DecodeContext, NamingStrategy,
    },
};

const MAGIC: &[u8] = b"LINK5";
/// Archive name and two unknown bytes follow the magic.
const HEADER_SIZE: usize = 10;
/// size (4), flag (1), unknown (8), name length (1), unknown (2)
const RECORD_HEADER_SIZE: usize = 16;

#[derive(Debug)]
pub struct Link5Entry {
    path: VirtualPath,
    offset: usize,
    size: usize,
}

impl ArchiveEntry for Link5Entry {
    fn path(&self) -> &VirtualPath {
        &self.path
    }

    fn path_mut(&mut self) -> &mut VirtualPath {
        &mut self.path
    }
}

#[derive(Debug, Default)]
pub struct Link5ArchiveDecoder;

impl Configurable for Link5ArchiveDecoder {}

impl ArchiveDecoder for Link5ArchiveDecoder {
    type Entry = Link5Entry;

    fn is_recognized_impl(&self, file: &mut InputFile) -> Result<bool> {
        Ok(file.stream.read(MAGIC.len())? == MAGIC)
    }

    fn read_meta(
        &self,
        file: &mut InputFile,
        _ctx: &DecodeContext,
    ) -> Result<ArchiveMeta<Link5Entry>> {
        file.stream.seek(HEADER_SIZE)?;

        let mut meta = ArchiveMeta::new();
        loop {
            let record_size = file.stream.read_u32_le()? as usize;
            if record_size == 0 {
                break;
            }

            file.stream.skip(9)?;
            let name_size = file.stream.read_u8()? as usize;
            file.stream.skip(2)?;
            let raw_name = file.stream.read(name_size)?;

            let size = record_size
                .checked_sub(RECORD_HEADER_SIZE + name_size)
                .ok_or_else(|| {
                    DecodeError::InvalidData(format!(
                        "record size {} is smaller than its own header",
                        record_size
                    ))
                })?;

            let name = match String::from_utf8(raw_name) {
                Ok(name) => name,
                Err(e) => {
                    log::debug!("Entry name is not UTF-8, decoding lossily");
                    String::from_utf8_lossy(e.as_bytes()).into_owned()
                }
            };

            let offset = file.stream.tell();
            file.stream.skip(size)?;
            meta.entries.push(Link5Entry {
                path: VirtualPath::new(name),
                offset,
                size,
            });
        }

        Ok(meta)
    }

    fn read_file(
        &self,
        file: &mut InputFile,
        _meta: &ArchiveMeta<Link5Entry>,
        entry: &Link5Entry,
    ) -> Result<InputFile> {
        file.stream.seek(entry.offset)?;
        let data = file.stream.read(entry.size)?;
        Ok(InputFile::new(entry.path.clone(), data))
    }

    fn naming_strategy(&self) -> NamingStrategy {
        NamingStrategy::Child
    }
}
