//! Table of known formats, built once at startup by [`default_registry`].
//!
//! Probing walks the table in registration order and stops at the first decoder that recognizes
//! the input, so formats with weak signatures are registered last.

use crate::{
    filesystem::InputFile,
    formats::{
        kaguya::Link5ArchiveDecoder,
        real_live::NwaAudioDecoder,
        rpgmaker::{RgssadArchiveDecoder, XyzImageDecoder},
        will::WipfImageArchiveDecoder,
        Decoder,
    },
};

pub type DecoderFactory = Box<dyn Fn() -> Decoder + Send + Sync>;

struct Registration {
    name: &'static str,
    factory: DecoderFactory,
}

#[derive(Default)]
pub struct Registry {
    registrations: Vec<Registration>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Adds a format. Registering a name twice replaces the factory but keeps the original
    /// position.
    pub fn register<F>(&mut self, name: &'static str, factory: F) -> &mut Self
    where
        F: Fn() -> Decoder + Send + Sync + 'static,
    {
        match self.registrations.iter_mut().find(|r| r.name == name) {
            Some(existing) => {
                log::warn!("Format {} registered twice, replacing the earlier factory", name);
                existing.factory = Box::new(factory);
            }
            None => self.registrations.push(Registration {
                name,
                factory: Box::new(factory),
            }),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.registrations.iter().map(|r| r.name)
    }

    pub fn create(&self, name: &str) -> Option<Decoder> {
        self.registrations
            .iter()
            .find(|r| r.name == name)
            .map(|r| (r.factory)())
    }

    /// Fresh instance of every decoder, in registration order.
    pub fn all_decoders(&self) -> Vec<(&'static str, Decoder)> {
        self.registrations
            .iter()
            .map(|r| (r.name, (r.factory)()))
            .collect()
    }

    /// First decoder, in registration order, that recognizes `file`.
    pub fn probe(&self, file: &mut InputFile) -> Option<(&'static str, Decoder)> {
        self.probe_with(file, |_, _| {})
    }

    /// Like [`Registry::probe`], letting the caller adjust each decoder (e.g. apply options)
    /// before it looks at the file.
    pub fn probe_with<F>(
        &self,
        file: &mut InputFile,
        mut prepare: F,
    ) -> Option<(&'static str, Decoder)>
    where
        F: FnMut(&'static str, &mut Decoder),
    {
        for registration in &self.registrations {
            let mut decoder = (registration.factory)();
            prepare(registration.name, &mut decoder);
            if decoder.is_recognized(file) {
                log::debug!("{} recognized as {}", file.path, registration.name);
                return Some((registration.name, decoder));
            }
        }
        None
    }
}

/// Builds the table of every supported format.
pub fn default_registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register("kaguya/link5", || {
            Decoder::Archive(Box::new(Link5ArchiveDecoder::default()))
        })
        .register("rpgmaker/rgssad", || {
            Decoder::Archive(Box::new(RgssadArchiveDecoder::default()))
        })
        .register("rpgmaker/xyz", || {
            Decoder::Image(Box::new(XyzImageDecoder::default()))
        })
        .register("will/wipf", || {
            Decoder::Archive(Box::new(WipfImageArchiveDecoder::default()))
        })
        // No magic number, keep it last
        .register("real_live/nwa", || {
            Decoder::Audio(Box::new(NwaAudioDecoder::default()))
        });
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::Result,
        formats::{options::Configurable, ImageDecoder},
        graphics::Image,
    };

    /// Recognizes anything starting with `prefix`.
    struct PrefixDecoder {
        prefix: &'static [u8],
    }

    impl Configurable for PrefixDecoder {}

    impl ImageDecoder for PrefixDecoder {
        fn is_recognized_impl(&self, file: &mut InputFile) -> Result<bool> {
            Ok(file.stream.read(self.prefix.len())? == self.prefix)
        }

        fn decode_impl(&self, _file: &mut InputFile) -> Result<Image> {
            Ok(Image::new(1, 1))
        }
    }

    fn prefix(prefix: &'static [u8]) -> Decoder {
        Decoder::Image(Box::new(PrefixDecoder { prefix }))
    }

    #[test]
    fn earlier_registration_wins_on_overlap() {
        let mut registry = Registry::new();
        registry
            .register("short", || prefix(b"AB"))
            .register("long", || prefix(b"ABC"));

        let mut file = InputFile::new("x.bin", b"ABCD".to_vec());
        let (name, _) = registry.probe(&mut file).unwrap();
        assert_eq!(name, "short");

        let mut reversed = Registry::new();
        reversed
            .register("long", || prefix(b"ABC"))
            .register("short", || prefix(b"AB"));
        let (name, _) = reversed.probe(&mut file).unwrap();
        assert_eq!(name, "long");
    }

    #[test]
    fn probe_skips_non_matching_and_rewinds() {
        let mut registry = Registry::new();
        registry
            .register("xyz", || prefix(b"XYZ"))
            .register("ab", || prefix(b"AB"));

        let mut file = InputFile::new("x.bin", b"ABCD".to_vec());
        let (name, _) = registry.probe(&mut file).unwrap();
        assert_eq!(name, "ab");
        assert_eq!(file.stream.tell(), 0);

        let mut unknown = InputFile::new("y.bin", b"??".to_vec());
        assert!(registry.probe(&mut unknown).is_none());
    }

    #[test]
    fn re_registration_keeps_position() {
        let mut registry = Registry::new();
        registry
            .register("a", || prefix(b"A"))
            .register("b", || prefix(b"B"))
            .register("a", || prefix(b"Z"));

        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b"]);
        let mut file = InputFile::new("z", b"Z".to_vec());
        assert_eq!(registry.probe(&mut file).unwrap().0, "a");
    }

    #[test]
    fn default_registry_order() {
        let registry = default_registry();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec![
                "kaguya/link5",
                "rpgmaker/rgssad",
                "rpgmaker/xyz",
                "will/wipf",
                "real_live/nwa"
            ]
        );
        assert!(registry.create("will/wipf").is_some());
        assert!(registry.create("nope").is_none());
        assert_eq!(registry.all_decoders().len(), registry.len());
    }
}
