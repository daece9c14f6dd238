/*!
 * Core types and data structures for lmpack
 */

use std::fmt;
use std::path::{Component, Path};

use strum::{Display, EnumString};

/// A path relative to the scan root, always `/`-separated and without a
/// leading slash.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelativePath(String);

impl RelativePath {
    /// Build from a host path that is already relative to the scan root
    pub fn from_path(path: &Path) -> Self {
        let parts: Vec<String> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().to_string()),
                _ => None,
            })
            .collect();

        Self(parts.join("/"))
    }

    /// Build from `path` relative to `root`; `None` if `path` is outside it
    pub fn strip_root(path: &Path, root: &Path) -> Option<Self> {
        path.strip_prefix(root).ok().map(Self::from_path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final segment of the path
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }
}

impl From<&str> for RelativePath {
    fn from(value: &str) -> Self {
        Self::from_path(Path::new(value))
    }
}

impl AsRef<str> for RelativePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which rule removed a file from the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ExclusionReason {
    /// Built-in ignores, user excludes or ignore files
    Default,
    /// Not matched by a non-empty include filter
    IncludeFilter,
}

/// Outcome of classifying a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Not listed in the content section at all
    Excluded(ExclusionReason),
    /// Listed, but content suppressed by policy
    IncludedNoContent,
    /// Listed with a size placeholder
    IncludedBinary { size: u64 },
    /// Listed with its full text
    IncludedText { content: String },
    /// Content could not be read or decoded
    ReadError { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::str::FromStr;

    #[test]
    fn test_relative_path_uses_forward_slashes() {
        let path: PathBuf = ["src", "nested", "main.rs"].iter().collect();
        let rel = RelativePath::from_path(&path);

        assert_eq!(rel.as_str(), "src/nested/main.rs");
        assert_eq!(rel.file_name(), "main.rs");
    }

    #[test]
    fn test_relative_path_strip_root() {
        let root = PathBuf::from("/work/project");
        let file = root.join("a").join("b.txt");

        assert_eq!(
            RelativePath::strip_root(&file, &root).unwrap().as_str(),
            "a/b.txt"
        );
        assert!(RelativePath::strip_root(Path::new("/elsewhere/c.txt"), &root).is_none());
    }

    #[test]
    fn test_exclusion_reason_labels() {
        assert_eq!(ExclusionReason::Default.to_string(), "default");
        assert_eq!(
            ExclusionReason::from_str("include_filter").unwrap(),
            ExclusionReason::IncludeFilter
        );
    }
}
