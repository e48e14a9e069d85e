use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::filesystem::InputFile;

/// Writes unpacked files below an output directory.
pub struct FileSaver {
    root: PathBuf,
    optimize_png: bool,
}

impl FileSaver {
    pub fn new(root: impl Into<PathBuf>, optimize_png: bool) -> Self {
        FileSaver {
            root: root.into(),
            optimize_png,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Saves `file` and returns where it landed. Archive paths are made relative first, so a
    /// hostile entry name cannot write outside the output directory.
    pub fn save(&self, file: &InputFile) -> io::Result<PathBuf> {
        let path = self.root.join(file.path.to_relative_path_buf());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if self.optimize_png && file.path.has_extension("png") {
            fs::write(&path, optimize_png(file.data(), &path))?;
        } else {
            fs::write(&path, file.data())?;
        }

        log::debug!("Saved {}", path.display());
        Ok(path)
    }
}

fn optimize_png(data: &[u8], path: &Path) -> Vec<u8> {
    // No difference between compression setting 6 and 2 size wise just so much faster
    let mut options = oxipng::Options::from_preset(2);
    options.bit_depth_reduction = true;
    options.interlace = None;

    match oxipng::optimize_from_memory(data, &options) {
        Ok(optimized) => optimized,
        Err(e) => {
            log::warn!(
                "oxipng optimisation failed for {}: {}. File saved unoptimised.",
                path.display(),
                e
            );
            data.to_vec()
        }
    }
}
