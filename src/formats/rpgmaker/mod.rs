//! RPG Maker

pub mod rgssad;
pub mod xyz;

pub use rgssad::RgssadArchiveDecoder;
pub use xyz::XyzImageDecoder;
