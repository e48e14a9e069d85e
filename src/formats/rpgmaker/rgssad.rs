//! RGSSAD archives (RPG Maker XP / VX, version 1).
//!
//! Everything after the header is XORed with a running 32-bit key. The table walk advances the
//! key once per name length, once per name byte and once per file size; each payload then
//! restarts from the key reached at its table record and advances once per 4-byte word.

use crate::{
    error::{DecodeError, Result},
    filesystem::{InputFile, VirtualPath},
    formats::{
        archive::{ArchiveDecoder, ArchiveEntry, ArchiveMeta},
        options::{parse_u32, Configurable, DecoderOption},
        DecodeContext, NamingStrategy,
    },
};

const MAGIC: &[u8] = b"RGSSAD\0";
const VERSION: u8 = 1;
pub const DEFAULT_KEY: u32 = 0xDEAD_CAFE;

const OPTIONS: &[DecoderOption] = &[DecoderOption {
    name: "key",
    description: "initial XOR key, decimal or 0x-prefixed hex",
}];

pub fn advance_key(key: u32) -> u32 {
    key.wrapping_mul(7).wrapping_add(3)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RgssadConfig {
    pub key: u32,
}

impl Default for RgssadConfig {
    fn default() -> Self {
        RgssadConfig { key: DEFAULT_KEY }
    }
}

#[derive(Debug)]
pub struct RgssadEntry {
    path: VirtualPath,
    offset: usize,
    size: usize,
    key: u32,
}

impl ArchiveEntry for RgssadEntry {
    fn path(&self) -> &VirtualPath {
        &self.path
    }

    fn path_mut(&mut self) -> &mut VirtualPath {
        &mut self.path
    }
}

#[derive(Debug, Default)]
pub struct RgssadArchiveDecoder {
    config: RgssadConfig,
}

impl RgssadArchiveDecoder {
    pub fn new(config: RgssadConfig) -> Self {
        RgssadArchiveDecoder { config }
    }
}

impl Configurable for RgssadArchiveDecoder {
    fn options(&self) -> &'static [DecoderOption] {
        OPTIONS
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "key" => {
                self.config.key = parse_u32(name, value)?;
                Ok(())
            }
            _ => Err(DecodeError::UnknownOption(name.to_string())),
        }
    }
}

/// XORs `data` word by word, starting from `key`.
fn decrypt(data: &mut [u8], mut key: u32) {
    for chunk in data.chunks_mut(4) {
        for (byte, key_byte) in chunk.iter_mut().zip(key.to_le_bytes()) {
            *byte ^= key_byte;
        }
        key = advance_key(key);
    }
}

impl ArchiveDecoder for RgssadArchiveDecoder {
    type Entry = RgssadEntry;

    fn is_recognized_impl(&self, file: &mut InputFile) -> Result<bool> {
        Ok(file.stream.read(MAGIC.len())? == MAGIC && file.stream.read_u8()? == VERSION)
    }

    fn read_meta(
        &self,
        file: &mut InputFile,
        _ctx: &DecodeContext,
    ) -> Result<ArchiveMeta<RgssadEntry>> {
        file.stream.seek(MAGIC.len() + 1)?;

        let mut key = self.config.key;
        let mut meta = ArchiveMeta::new();
        while !file.stream.eof() {
            let name_size = (file.stream.read_u32_le()? ^ key) as usize;
            key = advance_key(key);

            let mut name = file.stream.read(name_size)?;
            for byte in name.iter_mut() {
                *byte ^= key as u8;
                key = advance_key(key);
            }

            let size = (file.stream.read_u32_le()? ^ key) as usize;
            key = advance_key(key);

            let offset = file.stream.tell();
            file.stream.skip(size)?;
            meta.entries.push(RgssadEntry {
                path: VirtualPath::new(String::from_utf8_lossy(&name).into_owned()),
                offset,
                size,
                key,
            });
        }

        Ok(meta)
    }

    fn read_file(
        &self,
        file: &mut InputFile,
        _meta: &ArchiveMeta<RgssadEntry>,
        entry: &RgssadEntry,
    ) -> Result<InputFile> {
        file.stream.seek(entry.offset)?;
        let mut data = file.stream.read(entry.size)?;
        decrypt(&mut data, entry.key);
        Ok(InputFile::new(entry.path.clone(), data))
    }

    fn naming_strategy(&self) -> NamingStrategy {
        NamingStrategy::Child
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        filesystem::NoSiblings,
        formats::{DecodeContext, DynArchiveDecoder},
    };

    fn build(files: &[(&str, &[u8])], mut key: u32) -> Vec<u8> {
        let mut out = MAGIC.to_vec();
        out.push(VERSION);
        for (name, data) in files {
            out.extend_from_slice(&((name.len() as u32) ^ key).to_le_bytes());
            key = advance_key(key);
            for byte in name.bytes() {
                out.push(byte ^ key as u8);
                key = advance_key(key);
            }
            out.extend_from_slice(&((data.len() as u32) ^ key).to_le_bytes());
            key = advance_key(key);

            let mut payload = data.to_vec();
            decrypt(&mut payload, key);
            out.extend(payload);
        }
        out
    }

    #[test]
    fn decrypts_names_and_payloads() {
        let archive = build(
            &[
                ("Data\\Scripts.rxdata", b"scripts go here"),
                ("Graphics\\Titles\\title.png", b"\x89PNG fake"),
            ],
            DEFAULT_KEY,
        );
        let mut file = InputFile::new("Game.rgssad", archive);
        let decoder = RgssadArchiveDecoder::default();
        let ctx = DecodeContext::new(&NoSiblings);

        let files = decoder.unpack(&mut file, &ctx).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path.as_str(), "Data/Scripts.rxdata");
        assert_eq!(files[0].data(), b"scripts go here");
        assert_eq!(files[1].path.as_str(), "Graphics/Titles/title.png");
        assert_eq!(files[1].data(), b"\x89PNG fake");
    }

    #[test]
    fn key_option_changes_decryption() {
        let archive = build(&[("a.txt", b"hello")], 0x1234_5678);
        let ctx = DecodeContext::new(&NoSiblings);

        let mut decoder = RgssadArchiveDecoder::default();
        decoder.set_option("key", "0x12345678").unwrap();
        let mut file = InputFile::new("custom.rgssad", archive.clone());
        let files = decoder.unpack(&mut file, &ctx).unwrap();
        assert_eq!(files[0].path.as_str(), "a.txt");
        assert_eq!(files[0].data(), b"hello");

        let configured = RgssadArchiveDecoder::new(RgssadConfig { key: 0x1234_5678 });
        let mut file = InputFile::new("custom.rgssad", archive);
        let files = configured.unpack(&mut file, &ctx).unwrap();
        assert_eq!(files[0].data(), b"hello");
    }

    #[test]
    fn rejects_unknown_options() {
        let mut decoder = RgssadArchiveDecoder::default();
        assert!(matches!(
            decoder.set_option("salt", "1"),
            Err(DecodeError::UnknownOption(_))
        ));
        assert!(matches!(
            decoder.set_option("key", "zzz"),
            Err(DecodeError::InvalidOption { .. })
        ));
    }

    #[test]
    fn recognition_needs_version_one() {
        let decoder = RgssadArchiveDecoder::default();
        let mut v1 = InputFile::new("a", b"RGSSAD\0\x01".to_vec());
        let mut v3 = InputFile::new("b", b"RGSSAD\0\x03".to_vec());
        assert!(decoder.is_recognized_impl(&mut v1).unwrap());
        assert!(!decoder.is_recognized_impl(&mut v3).unwrap());
    }
}
