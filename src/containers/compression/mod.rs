//! Decompression primitives shared by the format decoders.

pub mod lzss;
pub mod zlib;

pub use lzss::{decompress as lzss_decompress, DescriptorLayout, LzssSettings};
pub use zlib::inflate;
