//! Will

pub mod wipf;

pub use wipf::WipfImageArchiveDecoder;
