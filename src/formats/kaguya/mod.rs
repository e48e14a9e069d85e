//! Atelier Kaguya

pub mod link5;

pub use link5::Link5ArchiveDecoder;
