//! Error type shared by the binary cursor, the decompressors and every format decoder.

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    /// The content does not belong to the decoder it was handed to.
    #[error("file content was not recognized by the requested decoder")]
    Recognition,

    #[error("unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("position {position} is out of range (length: {length})")]
    OutOfRange { position: usize, length: usize },

    /// Recognized, but uses a variant nobody implemented (bit depth, compression level...).
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("invalid value '{value}' for option '{name}'")]
    InvalidOption { name: String, value: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
