//! Format decoders and the contract they share.
//!
//! Every decoder is one of three kinds (archive, image, audio) and goes through the same two
//! steps: a cheap [`Decoder::is_recognized`] check that never fails, then [`Decoder::decode`],
//! which refuses to run on content the decoder does not recognize.

pub mod archive;
pub mod naming;
pub mod options;
pub mod registry;

pub mod kaguya;
pub mod real_live;
pub mod rpgmaker;
pub mod will;

use crate::{
    audio::Audio,
    error::{DecodeError, Result},
    filesystem::{FileResolver, InputFile},
    graphics::Image,
};

pub use archive::{ArchiveDecoder, ArchiveEntry, ArchiveMeta, DynArchiveDecoder};
pub use naming::NamingStrategy;
pub use options::{Configurable, DecoderOption};
pub use registry::{default_registry, Registry};

/// Collaborators a decoder may consult while parsing.
#[derive(Clone, Copy)]
pub struct DecodeContext<'a> {
    pub resolver: &'a dyn FileResolver,
}

impl<'a> DecodeContext<'a> {
    pub fn new(resolver: &'a dyn FileResolver) -> Self {
        DecodeContext { resolver }
    }
}

pub trait ImageDecoder: Configurable + Send + Sync {
    /// Format-specific check, run with the stream at offset 0.
    fn is_recognized_impl(&self, file: &mut InputFile) -> Result<bool>;

    fn decode_impl(&self, file: &mut InputFile) -> Result<Image>;

    fn naming_strategy(&self) -> NamingStrategy {
        NamingStrategy::Sibling
    }
}

pub trait AudioDecoder: Configurable + Send + Sync {
    fn is_recognized_impl(&self, file: &mut InputFile) -> Result<bool>;

    fn decode_impl(&self, file: &mut InputFile) -> Result<Audio>;

    fn naming_strategy(&self) -> NamingStrategy {
        NamingStrategy::Sibling
    }
}

/// Result of a successful [`Decoder::decode`].
#[derive(Debug)]
pub enum Decoded {
    Image(Image),
    Audio(Audio),
    Archive(Vec<InputFile>),
}

pub enum Decoder {
    Archive(Box<dyn DynArchiveDecoder>),
    Image(Box<dyn ImageDecoder>),
    Audio(Box<dyn AudioDecoder>),
}

impl Decoder {
    pub fn kind(&self) -> &'static str {
        match self {
            Decoder::Archive(_) => "archive",
            Decoder::Image(_) => "image",
            Decoder::Audio(_) => "audio",
        }
    }

    /// Returns whether this decoder can handle `file`.
    ///
    /// Errors raised by the format check count as "not recognized". The stream is rewound to the
    /// start afterwards either way.
    pub fn is_recognized(&self, file: &mut InputFile) -> bool {
        let result = file.stream.seek(0).map(|_| ()).and_then(|_| match self {
            Decoder::Archive(decoder) => decoder.probe(file),
            Decoder::Image(decoder) => decoder.is_recognized_impl(file),
            Decoder::Audio(decoder) => decoder.is_recognized_impl(file),
        });
        let _ = file.stream.seek(0);

        match result {
            Ok(recognized) => recognized,
            Err(e) => {
                log::trace!("Recognition check on {} failed: {}", file.path, e);
                false
            }
        }
    }

    pub fn decode(&self, file: &mut InputFile, ctx: &DecodeContext) -> Result<Decoded> {
        if !self.is_recognized(file) {
            return Err(DecodeError::Recognition);
        }
        file.stream.seek(0)?;

        match self {
            Decoder::Archive(decoder) => Ok(Decoded::Archive(decoder.unpack(file, ctx)?)),
            Decoder::Image(decoder) => Ok(Decoded::Image(decoder.decode_impl(file)?)),
            Decoder::Audio(decoder) => Ok(Decoded::Audio(decoder.decode_impl(file)?)),
        }
    }

    pub fn naming_strategy(&self) -> NamingStrategy {
        match self {
            Decoder::Archive(decoder) => decoder.naming(),
            Decoder::Image(decoder) => decoder.naming_strategy(),
            Decoder::Audio(decoder) => decoder.naming_strategy(),
        }
    }

    pub fn options(&self) -> &'static [DecoderOption] {
        match self {
            Decoder::Archive(decoder) => decoder.options(),
            Decoder::Image(decoder) => decoder.options(),
            Decoder::Audio(decoder) => decoder.options(),
        }
    }

    pub fn set_option(&mut self, name: &str, value: &str) -> Result<()> {
        match self {
            Decoder::Archive(decoder) => decoder.set_option(name, value),
            Decoder::Image(decoder) => decoder.set_option(name, value),
            Decoder::Audio(decoder) => decoder.set_option(name, value),
        }
    }
}
