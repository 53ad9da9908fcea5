//! Size classes and the fixed artifact table.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which on-device model to provision and load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    #[default]
    Small,
    Large,
}

/// Download source and on-disk filename for one size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactSource {
    pub filename: &'static str,
    pub url: &'static str,
}

impl SizeClass {
    #[must_use]
    pub fn source(self) -> ArtifactSource {
        match self {
            Self::Small => ArtifactSource {
                filename: "qwen2.5-0.5b-instruct-q4_k_m.gguf",
                url: "https://huggingface.co/Qwen/Qwen2.5-0.5B-Instruct-GGUF/resolve/main/qwen2.5-0.5b-instruct-q4_k_m.gguf",
            },
            Self::Large => ArtifactSource {
                filename: "qwen2.5-1.5b-instruct-q4_k_m.gguf",
                url: "https://huggingface.co/Qwen/Qwen2.5-1.5B-Instruct-GGUF/resolve/main/qwen2.5-1.5b-instruct-q4_k_m.gguf",
            },
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Large => "large",
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "large" => Ok(Self::Large),
            other => Err(format!("unknown model size '{other}' (expected 'small' or 'large')")),
        }
    }
}

/// Cache status of one size class's artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtifact {
    pub size_class: SizeClass,
    pub local_path: PathBuf,
    pub exists: bool,
}

/// A provisioned artifact, guaranteed present when handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalModel {
    pub size_class: SizeClass,
    pub path: PathBuf,
    /// Normalized `file://` URI of `path`.
    pub uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_class_parses_case_insensitively() {
        assert_eq!("Small".parse::<SizeClass>().unwrap(), SizeClass::Small);
        assert_eq!(" large ".parse::<SizeClass>().unwrap(), SizeClass::Large);
    }

    #[test]
    fn size_class_rejects_unknown() {
        let err = "medium".parse::<SizeClass>().unwrap_err();
        assert!(err.contains("unknown model size"));
    }

    #[test]
    fn each_size_class_has_distinct_artifact() {
        let small = SizeClass::Small.source();
        let large = SizeClass::Large.source();
        assert_ne!(small.filename, large.filename);
        assert_ne!(small.url, large.url);
        for size in [SizeClass::Small, SizeClass::Large] {
            let source = size.source();
            assert!(source.url.starts_with("https://"));
            assert!(source.url.ends_with(source.filename));
        }
    }

    #[test]
    fn size_class_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SizeClass::Large).unwrap(), "\"large\"");
        assert_eq!(SizeClass::Small.to_string(), "small");
    }
}
