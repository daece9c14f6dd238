/*!
 * Per-file classification
 *
 * Decides for each file whether it is dropped, listed without content,
 * listed as binary or listed with its text. The first decisive rule wins:
 *
 * 1. path exclusion matcher
 * 2. include filter (only when it has patterns)
 * 3. content exclusion matcher
 * 4. binary sniff (MIME guess, then a NUL byte in the first 1024 bytes)
 * 5. UTF-8 read, BOM stripped
 */

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use crate::config::Config;
use crate::error::ContentError;
use crate::language::is_known_language;
use crate::matcher::PatternMatcher;
use crate::types::{Classification, ExclusionReason, RelativePath};
use crate::utils::{
    DEFAULT_CONTENT_IGNORES, DEFAULT_CONTENT_IGNORE_FILES, DEFAULT_IGNORES, DEFAULT_IGNORE_FILES,
};

/// Number of leading bytes inspected for NUL bytes
pub const SNIFF_LEN: usize = 1024;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Per-run file counters, safe to bump from several workers
#[derive(Debug, Default)]
pub struct Counters {
    processed: AtomicUsize,
    excluded_default: AtomicUsize,
    excluded_include_filter: AtomicUsize,
    included: AtomicUsize,
    included_no_content: AtomicUsize,
    included_binary: AtomicUsize,
    read_errors: AtomicUsize,
}

/// Point-in-time copy of [`Counters`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub processed: usize,
    pub excluded_default: usize,
    pub excluded_include_filter: usize,
    pub included: usize,
    pub included_no_content: usize,
    pub included_binary: usize,
    pub read_errors: usize,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every counter
    pub fn reset(&self) {
        for counter in self.all() {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Count one processed file and its outcome
    pub fn record(&self, classification: &Classification) {
        self.processed.fetch_add(1, Ordering::Relaxed);

        match classification {
            Classification::Excluded(ExclusionReason::Default) => {
                self.excluded_default.fetch_add(1, Ordering::Relaxed);
            }
            Classification::Excluded(ExclusionReason::IncludeFilter) => {
                self.excluded_include_filter.fetch_add(1, Ordering::Relaxed);
            }
            Classification::IncludedNoContent => {
                self.included_no_content.fetch_add(1, Ordering::Relaxed);
                self.included.fetch_add(1, Ordering::Relaxed);
            }
            Classification::IncludedBinary { .. } => {
                self.included_binary.fetch_add(1, Ordering::Relaxed);
                self.included.fetch_add(1, Ordering::Relaxed);
            }
            Classification::IncludedText { .. } => {
                self.included.fetch_add(1, Ordering::Relaxed);
            }
            Classification::ReadError { .. } => {
                self.read_errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            excluded_default: self.excluded_default.load(Ordering::Relaxed),
            excluded_include_filter: self.excluded_include_filter.load(Ordering::Relaxed),
            included: self.included.load(Ordering::Relaxed),
            included_no_content: self.included_no_content.load(Ordering::Relaxed),
            included_binary: self.included_binary.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
        }
    }

    fn all(&self) -> [&AtomicUsize; 7] {
        [
            &self.processed,
            &self.excluded_default,
            &self.excluded_include_filter,
            &self.included,
            &self.included_no_content,
            &self.included_binary,
            &self.read_errors,
        ]
    }
}

/// The three matchers that drive classification
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    /// Paths dropped entirely
    pub file_ignores: PatternMatcher,
    /// Paths listed without content
    pub content_ignores: PatternMatcher,
    /// Allow-list, inactive while empty
    pub include_matcher: PatternMatcher,
}

impl Classifier {
    pub fn new(
        file_ignores: PatternMatcher,
        content_ignores: PatternMatcher,
        include_matcher: PatternMatcher,
    ) -> Self {
        Self {
            file_ignores,
            content_ignores,
            include_matcher,
        }
    }

    /// Seed the matchers from built-in defaults, user options and the ignore
    /// files found in the packed folder and its git root
    pub fn from_config(config: &Config, git_root: Option<&Path>) -> Self {
        let mut file_ignores = PatternMatcher::from_patterns(DEFAULT_IGNORES.iter());

        if !config.exclude_patterns.is_empty() {
            log::debug!("Adding provided ignore patterns: {:?}", config.exclude_patterns);
            file_ignores.add_patterns(&config.exclude_patterns);
        }
        for path in &config.ignore_files {
            file_ignores.add_pattern_file(path);
        }

        let mut content_ignores = PatternMatcher::from_patterns(DEFAULT_CONTENT_IGNORES.iter());

        let mut roots = vec![config.index_path.as_path()];
        if let Some(git_root) = git_root.filter(|root| *root != config.index_path.as_path()) {
            roots.push(git_root);
        }
        for root in roots {
            file_ignores.scan_add_pattern_files(root, DEFAULT_IGNORE_FILES.as_slice());
            content_ignores.scan_add_pattern_files(root, DEFAULT_CONTENT_IGNORE_FILES.as_slice());
        }

        let include_matcher = PatternMatcher::from_patterns(&config.include_patterns);

        log::debug!(
            "Matchers ready: {} ignore, {} content ignore, {} include patterns",
            file_ignores.len(),
            content_ignores.len(),
            include_matcher.len()
        );

        Self::new(file_ignores, content_ignores, include_matcher)
    }

    /// Classify one file and count the outcome in `counters`.
    ///
    /// Read and decode failures become [`Classification::ReadError`].
    pub fn classify(
        &self,
        relative_path: &RelativePath,
        absolute_path: &Path,
        counters: &Counters,
    ) -> Classification {
        let classification = self.decide(relative_path, absolute_path);
        log::trace!("{}: {}", relative_path, kind(&classification));
        counters.record(&classification);
        classification
    }

    fn decide(&self, relative_path: &RelativePath, absolute_path: &Path) -> Classification {
        let rel = relative_path.as_str();

        if self.file_ignores.is_match(rel, false) {
            return Classification::Excluded(ExclusionReason::Default);
        }

        if !self.include_matcher.is_empty() && !self.include_matcher.is_match(rel, false) {
            return Classification::Excluded(ExclusionReason::IncludeFilter);
        }

        if self.content_ignores.is_match(rel, false) {
            return Classification::IncludedNoContent;
        }

        let content = is_binary(absolute_path).and_then(|binary| {
            if binary {
                let size = fs::metadata(absolute_path)
                    .map_err(|source| ContentError::Read {
                        path: absolute_path.to_path_buf(),
                        source,
                    })?
                    .len();
                Ok(Classification::IncludedBinary { size })
            } else {
                read_text(absolute_path).map(|content| Classification::IncludedText { content })
            }
        });

        content.unwrap_or_else(|e| {
            log::warn!("Error reading file {}: {}", e.path().display(), e);
            Classification::ReadError {
                message: e.to_string(),
            }
        })
    }
}

fn kind(classification: &Classification) -> String {
    match classification {
        Classification::Excluded(reason) => format!("excluded ({reason})"),
        Classification::IncludedNoContent => "no content".to_string(),
        Classification::IncludedBinary { .. } => "binary".to_string(),
        Classification::IncludedText { .. } => "text".to_string(),
        Classification::ReadError { .. } => "read error".to_string(),
    }
}

/// Whether a MIME type guessed from the extension is conclusively binary
fn mime_is_binary(mime: &mime_guess::Mime) -> bool {
    match mime.type_().as_str() {
        "image" | "audio" | "video" | "font" => true,
        "application" => {
            let subtype = mime.subtype().as_str();
            let textual = matches!(
                subtype,
                "json"
                    | "xml"
                    | "javascript"
                    | "ecmascript"
                    | "toml"
                    | "yaml"
                    | "x-yaml"
                    | "x-sh"
                    | "x-csh"
                    | "sql"
                    | "x-httpd-php"
                    | "x-python"
                    | "x-perl"
                    | "x-ruby"
                    | "x-tex"
                    | "x-latex"
                    | "rtf"
                    | "typescript"
                    | "graphql"
                    | "xhtml"
            ) || mime.suffix().map_or(false, |s| {
                matches!(s.as_str(), "json" | "xml")
            });
            !textual
        }
        _ => false,
    }
}

/// Decide whether a file is binary.
///
/// A binary MIME guess is conclusive unless the file has a known source
/// language; otherwise the first [`SNIFF_LEN`] bytes are checked for a NUL
/// byte.
pub fn is_binary(path: &Path) -> Result<bool, ContentError> {
    // Source extensions often collide with media types (`.ts` is video/mp2t)
    if !is_known_language(path) {
        if let Some(mime) = mime_guess::from_path(path).first() {
            if mime_is_binary(&mime) {
                return Ok(true);
            }
        }
    }

    let read_err = |source: io::Error| ContentError::Read {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_err)?;
    let mut chunk = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64)
        .read_to_end(&mut chunk)
        .map_err(read_err)?;

    Ok(chunk.contains(&0))
}

/// Read a whole file as UTF-8 text, dropping a leading byte-order mark
pub fn read_text(path: &Path) -> Result<String, ContentError> {
    let mut bytes = fs::read(path).map_err(|source| ContentError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if bytes.starts_with(UTF8_BOM) {
        bytes.drain(..UTF8_BOM.len());
    }

    String::from_utf8(bytes).map_err(|source| ContentError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn classify_one(classifier: &Classifier, root: &Path, rel: &str) -> Classification {
        let counters = Counters::new();
        classifier.classify(&RelativePath::from(rel), &root.join(rel), &counters)
    }

    #[test]
    fn test_text_file() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "hello").unwrap();

        assert_eq!(
            classify_one(&Classifier::default(), temp_dir.path(), "a.txt"),
            Classification::IncludedText {
                content: "hello".to_string()
            }
        );
    }

    #[test]
    fn test_bom_is_stripped() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("bom.txt"), b"\xEF\xBB\xBFhi").unwrap();

        assert_eq!(read_text(&temp_dir.path().join("bom.txt")).unwrap(), "hi");
    }

    #[test]
    fn test_path_exclusion_wins() {
        let temp_dir = tempdir().unwrap();
        fs::create_dir(temp_dir.path().join(".git")).unwrap();
        fs::write(temp_dir.path().join(".git").join("config"), "x").unwrap();

        let classifier = Classifier::new(
            PatternMatcher::from_patterns([".git/*"]),
            PatternMatcher::from_patterns(["config"]),
            PatternMatcher::new(),
        );

        assert_eq!(
            classify_one(&classifier, temp_dir.path(), ".git/config"),
            Classification::Excluded(ExclusionReason::Default)
        );
    }

    #[test]
    fn test_include_filter_is_allow_list_only_when_non_empty() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("readme.md"), "# readme").unwrap();
        fs::write(temp_dir.path().join("main.py"), "print()").unwrap();

        let filtered = Classifier::new(
            PatternMatcher::new(),
            PatternMatcher::new(),
            PatternMatcher::from_patterns(["*.py"]),
        );
        assert_eq!(
            classify_one(&filtered, temp_dir.path(), "readme.md"),
            Classification::Excluded(ExclusionReason::IncludeFilter)
        );
        assert!(matches!(
            classify_one(&filtered, temp_dir.path(), "main.py"),
            Classification::IncludedText { .. }
        ));

        assert!(matches!(
            classify_one(&Classifier::default(), temp_dir.path(), "readme.md"),
            Classification::IncludedText { .. }
        ));
    }

    #[test]
    fn test_content_suppression() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("poetry.lock"), "lots of text").unwrap();

        let classifier = Classifier::new(
            PatternMatcher::new(),
            PatternMatcher::from_patterns(["poetry.lock"]),
            PatternMatcher::new(),
        );
        assert_eq!(
            classify_one(&classifier, temp_dir.path(), "poetry.lock"),
            Classification::IncludedNoContent
        );
    }

    #[test]
    fn test_nul_byte_means_binary_regardless_of_extension() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("data.txt"), b"abc\0def").unwrap();

        assert_eq!(
            classify_one(&Classifier::default(), temp_dir.path(), "data.txt"),
            Classification::IncludedBinary { size: 7 }
        );
    }

    #[test]
    fn test_nul_byte_past_sniff_window_is_not_binary() {
        let temp_dir = tempdir().unwrap();
        let mut bytes = vec![b'a'; SNIFF_LEN];
        bytes.push(0);
        fs::write(temp_dir.path().join("late.txt"), &bytes).unwrap();

        assert!(!is_binary(&temp_dir.path().join("late.txt")).unwrap());
    }

    #[test]
    fn test_png_is_binary_by_mime() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("img.png"), b"not really an image").unwrap();

        assert_eq!(
            classify_one(&Classifier::default(), temp_dir.path(), "img.png"),
            Classification::IncludedBinary { size: 19 }
        );
    }

    #[test]
    fn test_source_extension_overrides_media_type() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("index.ts"), "export {};").unwrap();

        assert!(!is_binary(&temp_dir.path().join("index.ts")).unwrap());
    }

    #[test]
    fn test_textual_application_types_are_sniffed() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("data.json"), "{}").unwrap();

        assert!(!is_binary(&temp_dir.path().join("data.json")).unwrap());
    }

    #[test]
    fn test_invalid_utf8_is_read_error() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("latin1.txt"), b"caf\xE9").unwrap();

        let counters = Counters::new();
        let classification = Classifier::default().classify(
            &RelativePath::from("latin1.txt"),
            &temp_dir.path().join("latin1.txt"),
            &counters,
        );

        assert!(matches!(classification, Classification::ReadError { .. }));
        assert_eq!(counters.snapshot().read_errors, 1);
        assert_eq!(counters.snapshot().included, 0);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let temp_dir = tempdir().unwrap();

        assert!(matches!(
            classify_one(&Classifier::default(), temp_dir.path(), "gone.txt"),
            Classification::ReadError { .. }
        ));
    }

    #[test]
    fn test_counters_record_and_reset() {
        let counters = Counters::new();
        counters.record(&Classification::Excluded(ExclusionReason::Default));
        counters.record(&Classification::Excluded(ExclusionReason::IncludeFilter));
        counters.record(&Classification::IncludedNoContent);
        counters.record(&Classification::IncludedBinary { size: 1 });
        counters.record(&Classification::IncludedText {
            content: String::new(),
        });

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.processed, 5);
        assert_eq!(snapshot.excluded_default, 1);
        assert_eq!(snapshot.excluded_include_filter, 1);
        assert_eq!(snapshot.included, 3);
        assert_eq!(snapshot.included_no_content, 1);
        assert_eq!(snapshot.included_binary, 1);

        counters.reset();
        assert_eq!(counters.snapshot(), CounterSnapshot::default());
    }
}
