//! Decoded PCM audio and its RIFF/WAVE serialisation.

use crate::error::{DecodeError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Audio {
    pub channel_count: u16,
    pub bits_per_sample: u16,
    pub sample_rate: u32,
    /// Interleaved little-endian PCM.
    pub samples: Vec<u8>,
}

impl Audio {
    pub fn block_align(&self) -> u16 {
        self.channel_count * (self.bits_per_sample / 8)
    }

    pub fn to_wav(&self) -> Result<Vec<u8>> {
        let data_size = u32::try_from(self.samples.len())
            .ok()
            .filter(|size| *size <= u32::MAX - 36)
            .ok_or_else(|| {
                DecodeError::InvalidData(format!(
                    "{} bytes of samples do not fit in a WAV file",
                    self.samples.len()
                ))
            })?;
        let byte_rate = self
            .sample_rate
            .checked_mul(self.block_align() as u32)
            .ok_or_else(|| {
                DecodeError::InvalidData(format!(
                    "sample rate {} is too high for a WAV header",
                    self.sample_rate
                ))
            })?;

        let mut output = Vec::with_capacity(44 + self.samples.len());
        output.extend_from_slice(b"RIFF");
        output.extend_from_slice(&(36 + data_size).to_le_bytes());
        output.extend_from_slice(b"WAVE");
        output.extend_from_slice(b"fmt ");
        output.extend_from_slice(&16u32.to_le_bytes());
        output.extend_from_slice(&1u16.to_le_bytes()); // PCM
        output.extend_from_slice(&self.channel_count.to_le_bytes());
        output.extend_from_slice(&self.sample_rate.to_le_bytes());
        output.extend_from_slice(&byte_rate.to_le_bytes());
        output.extend_from_slice(&self.block_align().to_le_bytes());
        output.extend_from_slice(&self.bits_per_sample.to_le_bytes());
        output.extend_from_slice(b"data");
        output.extend_from_slice(&data_size.to_le_bytes());
        output.extend_from_slice(&self.samples);
        Ok(output)
    }
}
