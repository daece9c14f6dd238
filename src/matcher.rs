/*!
 * Gitignore-style pattern matching
 *
 * A [`PatternMatcher`] holds an ordered list of compiled [`Pattern`]s. For
 * any relative path the last pattern that applies decides whether the path
 * is matched; a negated pattern (`!foo`) un-matches it again. A path below a
 * matched directory is always matched, negations cannot reach into it.
 *
 * Matching never touches the filesystem. Only loading pattern files does.
 */

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;

/// One `/`-separated component of a pattern
#[derive(Debug, Clone)]
enum Segment {
    /// Plain text, compared exactly
    Literal(String),
    /// `**`: zero or more whole path segments
    AnyDepth,
    /// A segment containing `*` or `?`
    Glob(Regex),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if raw == "**" {
            return Segment::AnyDepth;
        }

        let mut literal = String::new();
        let mut expr = String::from("^");
        let mut has_wildcard = false;
        let mut chars = raw.chars();

        while let Some(c) = chars.next() {
            match c {
                '*' => {
                    has_wildcard = true;
                    expr.push_str("[^/]*");
                }
                '?' => {
                    has_wildcard = true;
                    expr.push_str("[^/]");
                }
                '\\' => {
                    // A trailing backslash stays literal
                    let escaped = chars.next().unwrap_or('\\');
                    literal.push(escaped);
                    expr.push_str(&regex::escape(escaped.encode_utf8(&mut [0; 4])));
                }
                _ => {
                    literal.push(c);
                    expr.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
                }
            }
        }
        expr.push('$');

        if !has_wildcard {
            return Segment::Literal(literal);
        }

        match Regex::new(&expr) {
            Ok(re) => Segment::Glob(re),
            Err(e) => {
                log::warn!("Treating pattern segment {:?} literally: {}", raw, e);
                Segment::Literal(raw.to_string())
            }
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            Segment::Literal(text) => text == name,
            Segment::AnyDepth => true,
            Segment::Glob(re) => re.is_match(name),
        }
    }
}

/// A single compiled gitignore-style rule
#[derive(Debug, Clone)]
pub struct Pattern {
    /// The line the pattern was compiled from
    raw: String,
    /// `!` prefix: a match un-matches the path
    negated: bool,
    /// Leading `/`: only matches from the scan root
    anchored: bool,
    /// Trailing `/`: only matches directories
    directory_only: bool,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Compile one pattern line.
    ///
    /// Returns `None` for blank lines and comments. Anything else compiles;
    /// characters without special meaning are matched literally.
    pub fn parse(line: &str) -> Option<Self> {
        if line.trim().is_empty() || line.starts_with('#') {
            return None;
        }

        // Leading whitespace is significant; trailing whitespace is dropped
        // unless the last kept character escapes it
        let mut end = line.trim_end().len();
        if line[..end].ends_with('\\') {
            end += line[end..].chars().next().map_or(0, char::len_utf8);
        }
        let trimmed = &line[..end];

        let mut body = trimmed;
        let mut negated = false;
        if let Some(rest) = body.strip_prefix('!') {
            negated = true;
            body = rest;
        } else if body.starts_with("\\!") || body.starts_with("\\#") {
            body = &body[1..];
        }

        let anchored = body.starts_with('/');
        let directory_only = body.len() > 1 && body.ends_with('/');
        let body = body.trim_matches('/');

        let segments: Vec<Segment> = body
            .split('/')
            .filter(|s| !s.is_empty())
            .map(Segment::parse)
            .collect();

        // "/", "!" and similar lines have nothing left to match
        if segments.is_empty() {
            log::debug!("Ignoring empty pattern {:?}", line);
            return None;
        }

        Some(Self {
            raw: trimmed.to_string(),
            negated,
            anchored,
            directory_only,
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    pub fn is_directory_only(&self) -> bool {
        self.directory_only
    }

    /// Whether this pattern, ignoring negation, applies to the given path
    fn applies_to(&self, parts: &[&str], is_dir: bool) -> bool {
        if self.directory_only && !is_dir {
            return false;
        }

        if self.anchored {
            return match_segments(&self.segments, parts);
        }

        (0..parts.len()).any(|start| match_segments(&self.segments, &parts[start..]))
    }
}

/// Match a whole segment list against a whole path
fn match_segments(segments: &[Segment], parts: &[&str]) -> bool {
    match segments.split_first() {
        None => parts.is_empty(),
        Some((Segment::AnyDepth, rest)) => {
            (0..=parts.len()).any(|skip| match_segments(rest, &parts[skip..]))
        }
        Some((segment, rest)) => match parts.split_first() {
            Some((part, remaining)) => segment.matches(part) && match_segments(rest, remaining),
            None => false,
        },
    }
}

/// Ordered set of patterns where the last applicable pattern wins
#[derive(Debug, Clone, Default)]
pub struct PatternMatcher {
    patterns: Vec<Pattern>,
}

impl PatternMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a matcher from pattern lines
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut matcher = Self::new();
        matcher.add_patterns(patterns);
        matcher
    }

    /// Compile and append patterns in the given order, returning how many
    /// were added. Blank lines and `#` comments are skipped.
    pub fn add_patterns<I, S>(&mut self, patterns: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.patterns.len();
        self.patterns
            .extend(patterns.into_iter().filter_map(|p| Pattern::parse(p.as_ref())));
        self.patterns.len() - before
    }

    /// Load patterns from an ignore file.
    ///
    /// A missing file adds nothing. Other read failures are logged and also
    /// add nothing; pattern loading never fails a run.
    pub fn add_pattern_file(&mut self, path: &Path) -> usize {
        match fs::read_to_string(path) {
            Ok(text) => {
                let added = self.add_patterns(text.lines());
                log::debug!("Loaded {} patterns from {}", added, path.display());
                added
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("Pattern file not found: {}", path.display());
                0
            }
            Err(e) => {
                log::warn!("Could not read pattern file {}: {}", path.display(), e);
                0
            }
        }
    }

    /// Load every file from `names` that exists directly inside `root`
    pub fn scan_add_pattern_files<S: AsRef<str>>(&mut self, root: &Path, names: &[S]) -> usize {
        discover_pattern_files(root, names)
            .iter()
            .map(|path| self.add_pattern_file(path))
            .sum()
    }

    /// Whether `relative_path` is matched.
    ///
    /// `relative_path` is `/`-separated and relative to the scan root. Every
    /// ancestor directory is checked first; a matched ancestor matches the
    /// whole subtree regardless of later negations.
    pub fn is_match(&self, relative_path: &str, is_dir: bool) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        let parts: Vec<&str> = relative_path.split('/').filter(|s| !s.is_empty()).collect();
        if parts.is_empty() {
            return false;
        }

        for depth in 1..parts.len() {
            if self.decide(&parts[..depth], true) {
                return true;
            }
        }

        self.decide(&parts, is_dir)
    }

    /// Last-match-wins decision for one path, without looking at ancestors
    fn decide(&self, parts: &[&str], is_dir: bool) -> bool {
        self.patterns
            .iter()
            .rev()
            .find(|p| p.applies_to(parts, is_dir))
            .map_or(false, |p| !p.negated)
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Return the files from `names` that exist directly inside `root`
pub fn discover_pattern_files<S: AsRef<str>>(root: &Path, names: &[S]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| root.join(name.as_ref()))
        .filter(|path| path.is_file())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn matcher(patterns: &[&str]) -> PatternMatcher {
        PatternMatcher::from_patterns(patterns)
    }

    #[test]
    fn test_pattern_attributes() {
        let p = Pattern::parse("!/build/").unwrap();
        assert!(p.is_negated());
        assert!(p.is_anchored());
        assert!(p.is_directory_only());
        assert_eq!(p.as_str(), "!/build/");

        let p = Pattern::parse("src/*.rs").unwrap();
        assert!(!p.is_negated());
        assert!(!p.is_anchored());
        assert!(!p.is_directory_only());
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        let m = matcher(&["", "   ", "# comment", "*.log", "/"]);
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_whitespace_handling() {
        let m = matcher(&[" spaced.txt", "*.log   ", "name\\ "]);

        assert!(m.is_match(" spaced.txt", false));
        assert!(!m.is_match("spaced.txt", false));
        assert!(m.is_match("debug.log", false));
        assert!(m.is_match("name ", false));
        assert!(!m.is_match("name", false));
    }

    #[test]
    fn test_empty_matcher_never_matches() {
        let m = PatternMatcher::new();
        assert!(m.is_empty());
        assert!(!m.is_match("anything", false));
        assert!(!m.is_match("a/b/c", true));
    }

    #[test]
    fn test_last_match_wins() {
        let m = matcher(&["*.log", "!keep.log"]);
        assert!(!m.is_match("keep.log", false));
        assert!(m.is_match("other.log", false));

        // Reversing the order lets the broad pattern win again
        let m = matcher(&["!keep.log", "*.log"]);
        assert!(m.is_match("keep.log", false));
    }

    #[test]
    fn test_is_match_is_pure() {
        let m = matcher(&["*.log", "!keep.log"]);
        for _ in 0..3 {
            assert!(m.is_match("logs/other.log", false));
            assert!(!m.is_match("logs/keep.log", false));
        }
    }

    #[test]
    fn test_directory_pattern_covers_descendants() {
        let m = matcher(&["build/"]);
        assert!(m.is_match("build", true));
        assert!(m.is_match("build/output.txt", false));
        assert!(m.is_match("src/build/deep/file.o", false));
        // A plain file called build is not a directory
        assert!(!m.is_match("build", false));
    }

    #[test]
    fn test_unanchored_matches_at_any_depth() {
        let m = matcher(&["*.tmp"]);
        assert!(m.is_match("a.tmp", false));
        assert!(m.is_match("nested/dir/a.tmp", false));
        assert!(!m.is_match("a.tmp.txt", false));

        let m = matcher(&["build"]);
        assert!(m.is_match("build", true));
        assert!(m.is_match("src/build", true));
        assert!(m.is_match("src/build/main.o", false));
    }

    #[test]
    fn test_anchored_matches_from_root_only() {
        let m = matcher(&["/target"]);
        assert!(m.is_match("target", true));
        assert!(m.is_match("target/debug/app", false));
        assert!(!m.is_match("crates/target", true));
        assert!(!m.is_match("crates/target/debug/app", false));
    }

    #[test]
    fn test_multi_segment_patterns() {
        let m = matcher(&[".git/*"]);
        assert!(m.is_match(".git/config", false));
        assert!(m.is_match(".git/hooks/pre-commit", false));
        assert!(!m.is_match(".gitignore", false));

        let m = matcher(&["*/obj/*"]);
        assert!(m.is_match("proj/obj/out.dll", false));
        assert!(!m.is_match("obj/out.dll", false));
    }

    #[test]
    fn test_double_star() {
        let m = matcher(&["docs/**/*.md"]);
        assert!(m.is_match("docs/readme.md", false));
        assert!(m.is_match("docs/a/b/c.md", false));
        assert!(!m.is_match("docs/a/b/c.txt", false));

        let m = matcher(&["/**/generated"]);
        assert!(m.is_match("generated", true));
        assert!(m.is_match("a/b/generated/x.rs", false));
    }

    #[test]
    fn test_question_mark_matches_one_character() {
        let m = matcher(&["file?.txt"]);
        assert!(m.is_match("file1.txt", false));
        assert!(!m.is_match("file10.txt", false));
        assert!(!m.is_match("file.txt", false));
    }

    #[test]
    fn test_star_does_not_cross_segments() {
        let m = matcher(&["/src*"]);
        assert!(m.is_match("src_old", false));
        assert!(m.is_match("src/main.rs", false));
        assert!(!m.is_match("lib/src_old", false));

        let m = matcher(&["/a*b"]);
        assert!(!m.is_match("a/b", false));
    }

    #[test]
    fn test_negation_cannot_reach_into_excluded_directory() {
        let m = matcher(&["build/", "!build/keep.txt"]);
        assert!(m.is_match("build/keep.txt", false));

        // Excluding the contents instead of the directory allows re-inclusion
        let m = matcher(&["build/*", "!build/keep.txt"]);
        assert!(!m.is_match("build/keep.txt", false));
        assert!(m.is_match("build/other.txt", false));
    }

    #[test]
    fn test_special_characters_are_literal() {
        let m = matcher(&["[abc].txt", "a+b(c).rs", "{x,y}"]);
        assert!(m.is_match("[abc].txt", false));
        assert!(!m.is_match("a.txt", false));
        assert!(m.is_match("a+b(c).rs", false));
        assert!(m.is_match("{x,y}", false));
    }

    #[test]
    fn test_escaped_hash_and_bang() {
        let m = matcher(&["\\#notes.md", "\\!important"]);
        assert_eq!(m.len(), 2);
        assert!(m.is_match("#notes.md", false));
        assert!(m.is_match("!important", false));
        assert!(!m.patterns()[1].is_negated());
    }

    #[test]
    fn test_add_patterns_preserves_order_across_calls() {
        let mut m = PatternMatcher::new();
        m.add_patterns(["*.log"]);
        m.add_patterns(["!keep.log"]);
        assert!(!m.is_match("keep.log", false));
        m.add_patterns(["keep.log"]);
        assert!(m.is_match("keep.log", false));
    }

    #[test]
    fn test_add_pattern_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join(".gitignore");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "# build output\ntarget/\n\n*.log\n!keep.log").unwrap();

        let mut m = PatternMatcher::new();
        assert_eq!(m.add_pattern_file(&path), 3);
        assert!(m.is_match("target/debug/app", false));
        assert!(!m.is_match("keep.log", false));
    }

    #[test]
    fn test_missing_pattern_file_adds_nothing() {
        let temp_dir = tempdir().unwrap();
        let mut m = PatternMatcher::new();

        assert_eq!(m.add_pattern_file(&temp_dir.path().join("missing")), 0);
        assert!(m.is_empty());
    }

    #[test]
    fn test_scan_add_pattern_files() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join(".gitignore"), "*.log\n").unwrap();
        fs::write(temp_dir.path().join(".aiignore"), "secrets/\n").unwrap();

        let found = discover_pattern_files(temp_dir.path(), &[".gitignore", ".dockerignore"]);
        assert_eq!(found, vec![temp_dir.path().join(".gitignore")]);

        let mut m = PatternMatcher::new();
        let added = m.scan_add_pattern_files(
            temp_dir.path(),
            &[".gitignore", ".dockerignore", ".aiignore"],
        );
        assert_eq!(added, 2);
        assert!(m.is_match("secrets/key.pem", false));
    }
}
