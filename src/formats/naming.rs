use crate::filesystem::VirtualPath;

/// Where an output file lands relative to the input it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamingStrategy {
    /// Next to the input: `dir/input.arc` + `a.png` -> `dir/a.png`.
    Sibling,
    /// Inside a directory named after the input: `dir/input.arc/a.png`.
    Child,
    /// The output's own path, ignoring the input.
    Root,
    /// Only the output's file name.
    Flat,
}

impl NamingStrategy {
    pub fn decorate(self, input: &VirtualPath, output: &VirtualPath) -> VirtualPath {
        match self {
            NamingStrategy::Sibling => input.parent().join(output.as_str()),
            NamingStrategy::Child => input.join(output.as_str()),
            NamingStrategy::Root => output.clone(),
            NamingStrategy::Flat => VirtualPath::new(output.name()),
        }
    }
}
