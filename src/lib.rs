/*!
 * lmpack - Pack a directory tree into a single document for LLM context
 *
 * The output starts with an ASCII tree of the packed folder followed by one
 * block per file. Which files appear, and whether their content does, is
 * decided by gitignore-style pattern matchers.
 */

pub mod classifier;
pub mod config;
pub mod error;
pub mod git;
pub mod language;
pub mod matcher;
pub mod packer;
pub mod render;
pub mod report;
pub mod tree;
pub mod types;
pub mod utils;


// Re-export main components for easier access
pub use classifier::{Classifier, CounterSnapshot, Counters};
pub use config::Config;
pub use error::{ContentError, PackError, Result};
pub use matcher::{Pattern, PatternMatcher};
pub use packer::Packer;
pub use report::{PackReport, ReportFormat, Reporter};
pub use types::{Classification, ExclusionReason, RelativePath};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
