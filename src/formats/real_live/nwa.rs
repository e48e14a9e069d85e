//! NWA audio (RealLive). Only uncompressed streams (compression level -1) are decoded.

use crate::{
    audio::Audio,
    binary_utils::InputStream,
    error::{DecodeError, Result},
    filesystem::InputFile,
    formats::{options::Configurable, AudioDecoder},
};

const HEADER_SIZE: usize = 0x2C;
const UNCOMPRESSED: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
struct NwaHeader {
    channel_count: u16,
    bits_per_sample: u16,
    sample_rate: u32,
    compression_level: i32,
    block_count: u32,
    uncompressed_size: u32,
    compressed_size: u32,
    sample_count: u32,
}

impl NwaHeader {
    fn read(stream: &mut InputStream) -> Result<Self> {
        let channel_count = stream.read_u16_le()?;
        let bits_per_sample = stream.read_u16_le()?;
        let sample_rate = stream.read_u32_le()?;
        let compression_level = stream.read_i32_le()?;
        stream.skip(4)?;
        let block_count = stream.read_u32_le()?;
        let uncompressed_size = stream.read_u32_le()?;
        let compressed_size = stream.read_u32_le()?;
        let sample_count = stream.read_u32_le()?;
        // block size, rest size, unknown
        stream.skip(12)?;

        Ok(NwaHeader {
            channel_count,
            bits_per_sample,
            sample_rate,
            compression_level,
            block_count,
            uncompressed_size,
            compressed_size,
            sample_count,
        })
    }

    /// There is no magic number, so the header has to add up.
    fn is_plausible(&self, file_size: usize) -> bool {
        if !matches!(self.channel_count, 1 | 2) || !matches!(self.bits_per_sample, 8 | 16) {
            return false;
        }
        if self.sample_rate == 0 {
            return false;
        }
        let expected = self.sample_count as u64 * (self.bits_per_sample / 8) as u64;
        if self.uncompressed_size as u64 != expected {
            return false;
        }

        if self.compression_level == UNCOMPRESSED {
            HEADER_SIZE as u64 + self.uncompressed_size as u64 == file_size as u64
        } else {
            self.block_count > 0 && self.compressed_size as usize == file_size
        }
    }
}

#[derive(Debug, Default)]
pub struct NwaAudioDecoder;

impl Configurable for NwaAudioDecoder {}

impl AudioDecoder for NwaAudioDecoder {
    fn is_recognized_impl(&self, file: &mut InputFile) -> Result<bool> {
        let file_size = file.stream.len();
        Ok(NwaHeader::read(&mut file.stream)?.is_plausible(file_size))
    }

    fn decode_impl(&self, file: &mut InputFile) -> Result<Audio> {
        let header = NwaHeader::read(&mut file.stream)?;
        if header.compression_level != UNCOMPRESSED {
            return Err(DecodeError::UnsupportedFormat(format!(
                "NWA compression level {}",
                header.compression_level
            )));
        }

        file.stream.seek(HEADER_SIZE)?;
        let samples = file.stream.read(header.uncompressed_size as usize)?;
        Ok(Audio {
            channel_count: header.channel_count,
            bits_per_sample: header.bits_per_sample,
            sample_rate: header.sample_rate,
            samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(level: i32, samples: &[u8], compressed_size: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(&44100u32.to_le_bytes());
        out.extend_from_slice(&level.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(if level == -1 { 0u32 } else { 1 }).to_le_bytes());
        out.extend_from_slice(&(samples.len() as u32).to_le_bytes());
        out.extend_from_slice(&compressed_size.to_le_bytes());
        out.extend_from_slice(&(samples.len() as u32 / 2).to_le_bytes());
        out.extend_from_slice(&[0u8; 12]);
        out
    }

    #[test]
    fn decodes_raw_pcm() {
        let samples = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let mut data = header(-1, &samples, 0);
        data.extend_from_slice(&samples);

        let mut file = InputFile::new("voice.nwa", data);
        assert!(NwaAudioDecoder.is_recognized_impl(&mut file).unwrap());
        file.stream.seek(0).unwrap();

        let audio = NwaAudioDecoder.decode_impl(&mut file).unwrap();
        assert_eq!(audio.channel_count, 2);
        assert_eq!(audio.sample_rate, 44100);
        assert_eq!(audio.samples, samples);
    }

    #[test]
    fn compressed_levels_are_unsupported() {
        let samples = [0u8; 8];
        let mut data = header(2, &samples, 0);
        let total = data.len() as u32 + 4;
        data = header(2, &samples, total);
        data.extend_from_slice(&[0u8; 4]);

        let mut file = InputFile::new("bgm.nwa", data);
        assert!(NwaAudioDecoder.is_recognized_impl(&mut file).unwrap());
        file.stream.seek(0).unwrap();
        assert!(matches!(
            NwaAudioDecoder.decode_impl(&mut file),
            Err(DecodeError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn inconsistent_sizes_are_not_recognized() {
        let samples = [0u8; 8];
        let mut data = header(-1, &samples, 0);
        data.extend_from_slice(&samples[..6]);

        let mut file = InputFile::new("cut.nwa", data);
        assert!(!NwaAudioDecoder.is_recognized_impl(&mut file).unwrap());
    }
}
