//! Asset extraction for visual novel engine archives.
//!
//! Formats are recognized from content, decoded through a shared contract
//! ([`formats::Decoder`]) and turned into named in-memory files by [`unpack::Unpacker`].

pub mod audio;
pub mod binary_utils;
pub mod containers;
pub mod error;
pub mod filesystem;
pub mod formats;
pub mod graphics;
pub mod report;
pub mod saver;
pub mod unpack;

pub use error::{DecodeError, Result};
