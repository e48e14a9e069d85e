use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::error::{DecodeError, Result};

/// Inflates a complete zlib stream.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut output = Vec::with_capacity(data.len() * 2);
    decoder
        .read_to_end(&mut output)
        .map_err(|e| DecodeError::InvalidData(format!("corrupt zlib stream: {}", e)))?;
    Ok(output)
}
