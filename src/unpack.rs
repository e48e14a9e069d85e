//! Drives a single input through "which format is this?", decode and output naming.
//!
//! The orchestrator knows nothing about concrete formats: it asks the [`Registry`] for a
//! decoder, lets it decode, and turns the result into named in-memory files ready for a saver.

use crate::{
    error::{DecodeError, Result},
    filesystem::{InputFile, VirtualPath},
    formats::{DecodeContext, Decoded, Decoder, Registry},
};

/// Output of one input file.
#[derive(Debug)]
pub struct Unpacked {
    /// Registry name of the decoder that handled the input.
    pub decoder: &'static str,
    pub files: Vec<InputFile>,
}

pub struct Unpacker {
    registry: Registry,
    options: Vec<(String, String)>,
}

impl Unpacker {
    pub fn new(registry: Registry) -> Self {
        Unpacker {
            registry,
            options: Vec::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Records a decoder option, applied to every decoder that declares it.
    ///
    /// Fails with `UnknownOption` when no registered decoder declares `name`, and with
    /// `InvalidOption` when a decoder that does rejects `value`.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<()> {
        let mut declared = false;
        for (_, mut decoder) in self.registry.all_decoders() {
            if decoder.options().iter().any(|option| option.name == name) {
                decoder.set_option(name, value)?;
                declared = true;
            }
        }
        if !declared {
            return Err(DecodeError::UnknownOption(name.to_string()));
        }

        self.options.retain(|(existing, _)| existing != name);
        self.options.push((name.to_string(), value.to_string()));
        Ok(())
    }

    fn configure(&self, name: &str, decoder: &mut Decoder) {
        for (option, value) in &self.options {
            if !decoder.options().iter().any(|declared| declared.name == option) {
                continue;
            }
            if let Err(e) = decoder.set_option(option, value) {
                log::warn!("{}: could not apply option {}: {}", name, option, e);
            }
        }
    }

    /// First registered decoder that recognizes `file`, configured with the recorded options.
    pub fn find_decoder(&self, file: &mut InputFile) -> Option<(&'static str, Decoder)> {
        self.registry
            .probe_with(file, |name, decoder| self.configure(name, decoder))
    }

    /// Probes the registry and decodes `file` with the first decoder that recognizes it.
    pub fn unpack(&self, file: &mut InputFile, ctx: &DecodeContext) -> Result<Unpacked> {
        let (name, decoder) = self
            .find_decoder(file)
            .ok_or(DecodeError::Recognition)?;
        self.run(name, &decoder, file, ctx)
    }

    /// Decodes `file` with the named decoder, skipping the probe.
    pub fn unpack_with(
        &self,
        format: &str,
        file: &mut InputFile,
        ctx: &DecodeContext,
    ) -> Result<Unpacked> {
        let (name, decoder) = self.create(format)?;
        self.run(name, &decoder, file, ctx)
    }

    /// Output paths `file` would produce, without decoding any payload.
    pub fn list(&self, file: &mut InputFile, ctx: &DecodeContext) -> Result<Vec<VirtualPath>> {
        let (name, decoder) = self
            .find_decoder(file)
            .ok_or(DecodeError::Recognition)?;
        log::debug!("Listing {} as {}", file.path, name);

        let strategy = decoder.naming_strategy();
        let names = match &decoder {
            Decoder::Archive(archive) => {
                file.stream.seek(0)?;
                archive.list(file, ctx)?
            }
            Decoder::Image(_) => vec![output_name(&file.path, "png")],
            Decoder::Audio(_) => vec![output_name(&file.path, "wav")],
        };
        Ok(names
            .iter()
            .map(|path| strategy.decorate(&file.path, path))
            .collect())
    }

    fn create(&self, format: &str) -> Result<(&'static str, Decoder)> {
        let name = self
            .registry
            .names()
            .find(|name| *name == format)
            .ok_or_else(|| DecodeError::UnsupportedFormat(format!("unknown format {}", format)))?;
        let mut decoder = self
            .registry
            .create(name)
            .ok_or_else(|| DecodeError::UnsupportedFormat(format!("unknown format {}", format)))?;
        self.configure(name, &mut decoder);
        Ok((name, decoder))
    }

    fn run(
        &self,
        name: &'static str,
        decoder: &Decoder,
        file: &mut InputFile,
        ctx: &DecodeContext,
    ) -> Result<Unpacked> {
        log::info!("Unpacking {} as {}", file.path, name);

        let outputs = match decoder.decode(file, ctx)? {
            Decoded::Archive(files) => files,
            Decoded::Image(image) => vec![InputFile::new(
                output_name(&file.path, "png"),
                image.to_png()?,
            )],
            Decoded::Audio(audio) => vec![InputFile::new(
                output_name(&file.path, "wav"),
                audio.to_wav()?,
            )],
        };

        let strategy = decoder.naming_strategy();
        let files = outputs
            .into_iter()
            .map(|mut output| {
                output.path = strategy.decorate(&file.path, &output.path);
                output
            })
            .collect();

        Ok(Unpacked {
            decoder: name,
            files,
        })
    }
}

/// Input's file name with a new extension.
fn output_name(input: &VirtualPath, extension: &str) -> VirtualPath {
    VirtualPath::new(input.name()).with_extension(extension)
}
