//! RealLive

pub mod nwa;

pub use nwa::NwaAudioDecoder;
