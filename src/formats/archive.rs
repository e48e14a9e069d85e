//! Archive metadata model.
//!
//! An archive decoder parses its entry table once ([`ArchiveDecoder::read_meta`]) and extracts
//! entries one at a time ([`ArchiveDecoder::read_file`]). Entries keep on-disk order, which
//! unnamed-entry numbering and sibling-file pairing depend on.

use crate::{
    error::Result,
    filesystem::{InputFile, VirtualPath},
    formats::{options::Configurable, DecodeContext, NamingStrategy},
};

/// One logical file inside a container. Formats add their own fields (offsets, sizes, keys...).
pub trait ArchiveEntry {
    fn path(&self) -> &VirtualPath;
    fn path_mut(&mut self) -> &mut VirtualPath;
}

#[derive(Debug)]
pub struct ArchiveMeta<E> {
    pub entries: Vec<E>,
}

impl<E> ArchiveMeta<E> {
    pub fn new() -> Self {
        ArchiveMeta {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.entries.iter()
    }
}

impl<E> Default for ArchiveMeta<E> {
    fn default() -> Self {
        ArchiveMeta::new()
    }
}

pub trait ArchiveDecoder: Configurable + Send + Sync {
    type Entry: ArchiveEntry;

    /// Format-specific check, run with the stream at offset 0.
    fn is_recognized_impl(&self, file: &mut InputFile) -> Result<bool>;

    fn read_meta(
        &self,
        file: &mut InputFile,
        ctx: &DecodeContext,
    ) -> Result<ArchiveMeta<Self::Entry>>;

    fn read_file(
        &self,
        file: &mut InputFile,
        meta: &ArchiveMeta<Self::Entry>,
        entry: &Self::Entry,
    ) -> Result<InputFile>;

    fn naming_strategy(&self) -> NamingStrategy {
        NamingStrategy::Sibling
    }
}

/// Reads the entry table and gives unnamed entries `<input stem>_<index>` names.
pub fn read_named_meta<D: ArchiveDecoder + ?Sized>(
    decoder: &D,
    file: &mut InputFile,
    ctx: &DecodeContext,
) -> Result<ArchiveMeta<D::Entry>> {
    let mut meta = decoder.read_meta(file, ctx)?;
    let stem = file.path.stem().to_string();
    for (index, entry) in meta.entries.iter_mut().enumerate() {
        if entry.path().is_empty() {
            *entry.path_mut() = VirtualPath::new(format!("{}_{:03}", stem, index));
        }
    }
    log::debug!("{}: {} entries", file.path, meta.len());
    Ok(meta)
}

/// Object-safe face of [`ArchiveDecoder`], implemented for every archive decoder.
pub trait DynArchiveDecoder: Configurable + Send + Sync {
    fn probe(&self, file: &mut InputFile) -> Result<bool>;

    fn unpack(&self, file: &mut InputFile, ctx: &DecodeContext) -> Result<Vec<InputFile>>;

    fn list(&self, file: &mut InputFile, ctx: &DecodeContext) -> Result<Vec<VirtualPath>>;

    fn naming(&self) -> NamingStrategy;
}

impl<D: ArchiveDecoder> DynArchiveDecoder for D {
    fn probe(&self, file: &mut InputFile) -> Result<bool> {
        self.is_recognized_impl(file)
    }

    fn unpack(&self, file: &mut InputFile, ctx: &DecodeContext) -> Result<Vec<InputFile>> {
        let meta = read_named_meta(self, file, ctx)?;
        let mut output = Vec::with_capacity(meta.len());
        for entry in meta.iter() {
            log::debug!("Extracting {}", entry.path());
            output.push(self.read_file(file, &meta, entry)?);
        }
        Ok(output)
    }

    fn list(&self, file: &mut InputFile, ctx: &DecodeContext) -> Result<Vec<VirtualPath>> {
        let meta = read_named_meta(self, file, ctx)?;
        Ok(meta.iter().map(|entry| entry.path().clone()).collect())
    }

    fn naming(&self) -> NamingStrategy {
        self.naming_strategy()
    }
}
