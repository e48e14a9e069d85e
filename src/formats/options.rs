use crate::error::{DecodeError, Result};

/// A named setting a decoder accepts, e.g. a decryption key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderOption {
    pub name: &'static str,
    pub description: &'static str,
}

/// Option surface of a decoder. Decoders without options use the defaults.
pub trait Configurable {
    fn options(&self) -> &'static [DecoderOption] {
        &[]
    }

    fn set_option(&mut self, name: &str, _value: &str) -> Result<()> {
        Err(DecodeError::UnknownOption(name.to_string()))
    }
}

/// Parses a decimal or `0x`-prefixed hexadecimal `u32`.
pub fn parse_u32(name: &str, value: &str) -> Result<u32> {
    let trimmed = value.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => trimmed.parse::<u32>(),
    };

    parsed.map_err(|_| DecodeError::InvalidOption {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Splits a `name=value` assignment.
pub fn parse_assignment(assignment: &str) -> Result<(String, String)> {
    match assignment.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(DecodeError::InvalidOption {
            name: assignment.to_string(),
            value: String::new(),
        }),
    }
}
