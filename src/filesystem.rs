//! Logical files and the path algebra used to name them.
//!
//! Nothing in here touches the disk except [`DirectoryResolver`], which is the one place the
//! decoders are allowed to look for sibling files.

use std::{
    collections::HashMap,
    fmt, fs,
    path::{Path, PathBuf},
};

use crate::binary_utils::InputStream;

/// A `/`-separated path with no filesystem semantics.
///
/// Backslashes coming from archive tables are normalised to `/` on construction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualPath {
    inner: String,
}

impl VirtualPath {
    pub fn new(path: impl Into<String>) -> Self {
        VirtualPath {
            inner: path.into().replace('\\', "/"),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Everything before the last separator, or an empty path.
    pub fn parent(&self) -> VirtualPath {
        match self.inner.rfind('/') {
            Some(pos) => VirtualPath::new(&self.inner[..pos]),
            None => VirtualPath::default(),
        }
    }

    /// Final component, including the extension.
    pub fn name(&self) -> &str {
        match self.inner.rfind('/') {
            Some(pos) => &self.inner[pos + 1..],
            None => &self.inner,
        }
    }

    pub fn stem(&self) -> &str {
        let name = self.name();
        match name.rfind('.') {
            Some(0) | None => name,
            Some(pos) => &name[..pos],
        }
    }

    /// Extension without the dot; empty when there is none.
    pub fn extension(&self) -> &str {
        let name = self.name();
        match name.rfind('.') {
            Some(0) | None => "",
            Some(pos) => &name[pos + 1..],
        }
    }

    pub fn has_extension(&self, extension: &str) -> bool {
        self.extension()
            .eq_ignore_ascii_case(extension.trim_start_matches('.'))
    }

    pub fn change_extension(&mut self, extension: &str) {
        let extension = extension.trim_start_matches('.');
        let parent = self.parent();
        let mut name = self.stem().to_string();
        if !extension.is_empty() {
            name.push('.');
            name.push_str(extension);
        }
        *self = parent.join(name);
    }

    pub fn with_extension(&self, extension: &str) -> VirtualPath {
        let mut path = self.clone();
        path.change_extension(extension);
        path
    }

    pub fn join(&self, other: impl AsRef<str>) -> VirtualPath {
        let other = other.as_ref().replace('\\', "/");
        let other = other.trim_start_matches('/');
        if self.inner.is_empty() {
            return VirtualPath::new(other);
        }
        if other.is_empty() {
            return self.clone();
        }
        VirtualPath::new(format!("{}/{}", self.inner.trim_end_matches('/'), other))
    }

    /// Native path with `..` and root components dropped, so archive names cannot escape the
    /// output directory.
    pub fn to_relative_path_buf(&self) -> PathBuf {
        self.inner
            .split('/')
            .filter(|part| !part.is_empty() && *part != "." && *part != "..")
            .collect()
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

impl From<&str> for VirtualPath {
    fn from(path: &str) -> Self {
        VirtualPath::new(path)
    }
}

impl From<String> for VirtualPath {
    fn from(path: String) -> Self {
        VirtualPath::new(path)
    }
}

/// A named logical file: either a top-level input or an entry materialised from an archive.
#[derive(Clone, Debug, Default)]
pub struct InputFile {
    pub path: VirtualPath,
    pub stream: InputStream,
}

impl InputFile {
    pub fn new(path: impl Into<VirtualPath>, data: Vec<u8>) -> Self {
        InputFile {
            path: path.into(),
            stream: InputStream::new(data),
        }
    }

    /// Reads a file from disk, named after its final path component.
    pub fn from_disk(path: &Path) -> std::io::Result<Self> {
        let data = fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(InputFile::new(name, data))
    }

    pub fn data(&self) -> &[u8] {
        self.stream.as_slice()
    }
}

/// Looks up auxiliary files by name, e.g. the `.msk` sibling of a sprite archive.
pub trait FileResolver {
    fn get_by_name(&self, name: &str) -> Option<InputFile>;
}

/// Resolver that never finds anything.
pub struct NoSiblings;

impl FileResolver for NoSiblings {
    fn get_by_name(&self, _name: &str) -> Option<InputFile> {
        None
    }
}

/// In-memory file set keyed by file name.
#[derive(Default)]
pub struct MemoryFileSet {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryFileSet {
    pub fn new() -> Self {
        MemoryFileSet::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.files.insert(name.into(), data);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileResolver for MemoryFileSet {
    fn get_by_name(&self, name: &str) -> Option<InputFile> {
        let key = VirtualPath::new(name);
        self.files
            .get(key.name())
            .map(|data| InputFile::new(key.name(), data.clone()))
    }
}

/// Resolves names against a directory on disk (the directory of the input being unpacked).
pub struct DirectoryResolver {
    root: PathBuf,
}

impl DirectoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryResolver { root: root.into() }
    }
}

impl FileResolver for DirectoryResolver {
    fn get_by_name(&self, name: &str) -> Option<InputFile> {
        let candidate = self.root.join(VirtualPath::new(name).name());
        if !candidate.is_file() {
            return None;
        }

        match InputFile::from_disk(&candidate) {
            Ok(file) => Some(file),
            Err(e) => {
                log::warn!("Could not read {}: {}", candidate.display(), e);
                None
            }
        }
    }
}
