use serde::{Deserialize, Serialize};
use std::fmt;

/// Independent modes of a validation tool, each selected by a single flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// No flag: full check.
    Full,
    /// `-m`: metadata only.
    Metadata,
    /// `-t`: type listing.
    Types,
    /// `-s`: structure.
    Structure,
    /// `-c`: checksum verification.
    Checksum,
}

impl ValidationMode {
    /// Every mode, in the order a sample is checked.
    pub const ALL: [Self; 5] = [
        Self::Full,
        Self::Metadata,
        Self::Types,
        Self::Structure,
        Self::Checksum,
    ];

    #[must_use]
    pub const fn flag(self) -> Option<&'static str> {
        match self {
            Self::Full => None,
            Self::Metadata => Some("-m"),
            Self::Types => Some("-t"),
            Self::Structure => Some("-s"),
            Self::Checksum => Some("-c"),
        }
    }

    /// Arguments for checking `sample` in this mode.
    #[must_use]
    pub fn args(self, sample: &str) -> Vec<String> {
        self.flag()
            .into_iter()
            .map(str::to_string)
            .chain(std::iter::once(sample.to_string()))
            .collect()
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Full => "full",
            Self::Metadata => "metadata",
            Self::Types => "types",
            Self::Structure => "structure",
            Self::Checksum => "checksum",
        };
        f.write_str(name)
    }
}
