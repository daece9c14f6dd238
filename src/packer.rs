/*!
 * Packing driver
 *
 * Walks the index folder once, classifies files in parallel batches and
 * writes the rendered blocks in walk order after the tree header.
 */

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::classifier::{Classifier, CounterSnapshot, Counters};
use crate::config::Config;
use crate::error::Result;
use crate::render::{render, render_header};
use crate::tree::build_tree;
use crate::types::RelativePath;
use crate::utils::entry_order;

/// Files classified concurrently before their blocks are written
const BATCH_SIZE: usize = 64;

/// Packs one folder into a single document
pub struct Packer {
    /// Folder being packed
    index_path: PathBuf,
    /// Matchers deciding what goes into the document
    classifier: Classifier,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
    /// Counters of the current run
    counters: Counters,
}

impl Packer {
    /// Create a new packer
    pub fn new(
        index_path: impl Into<PathBuf>,
        classifier: Classifier,
        progress: Arc<ProgressBar>,
    ) -> Self {
        Self {
            index_path: index_path.into(),
            classifier,
            progress,
            counters: Counters::new(),
        }
    }

    /// Create a packer with matchers seeded from `config`.
    ///
    /// The output file is excluded when it lives inside the index folder.
    pub fn from_config(
        config: &Config,
        git_root: Option<&Path>,
        progress: Arc<ProgressBar>,
    ) -> Result<Self> {
        let mut classifier = Classifier::from_config(config, git_root);

        let output_file = config.output_file(git_root)?;
        if let Some(rel) = RelativePath::strip_root(&output_file, &config.index_path) {
            log::debug!("Excluding output file from pack: {}", rel);
            classifier
                .file_ignores
                .add_patterns([format!("/{}", escape_pattern(rel.as_str()))]);
        }

        Ok(Self::new(config.index_path.clone(), classifier, progress))
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// ASCII tree of the index folder
    pub fn tree(&self) -> String {
        build_tree(&self.index_path, &self.classifier.file_ignores)
    }

    /// Write the whole document to `out` and return the run's counters.
    ///
    /// Unreadable files become error blocks; only write failures abort.
    pub fn pack<W: Write>(&self, out: &mut W) -> Result<CounterSnapshot> {
        self.counters.reset();

        out.write_all(render_header(&self.tree()).as_bytes())?;

        let files = self.collect_files();
        log::debug!("Walk complete, {} files to classify", files.len());

        for batch in files.chunks(BATCH_SIZE) {
            let blocks: Vec<Option<String>> = batch
                .par_iter()
                .map(|(abs_path, rel_path)| self.process_file(abs_path, rel_path))
                .collect();

            for block in blocks.into_iter().flatten() {
                out.write_all(block.as_bytes())?;
            }
        }

        out.flush()?;
        Ok(self.counters.snapshot())
    }

    /// Every non-directory entry below the index folder, in tree order.
    ///
    /// Nothing is pruned here so excluded files still count as processed.
    /// Links to directories are skipped without being followed.
    fn collect_files(&self) -> Vec<(PathBuf, RelativePath)> {
        WalkDir::new(&self.index_path)
            .min_depth(1)
            .sort_by(entry_order)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Error walking directory: {}", e);
                    None
                }
            })
            .filter(|entry| !entry.file_type().is_dir() && !entry.path().is_dir())
            .filter_map(|entry| {
                let rel = RelativePath::strip_root(entry.path(), &self.index_path)?;
                Some((entry.into_path(), rel))
            })
            .collect()
    }

    /// Classify and render a single file
    fn process_file(&self, abs_path: &Path, rel_path: &RelativePath) -> Option<String> {
        self.progress.inc(1);

        // Truncate long names to avoid display issues
        let chars: Vec<char> = rel_path.file_name().chars().collect();
        let display_name: String = if chars.len() > 40 {
            format!("...{}", chars[chars.len() - 37..].iter().collect::<String>())
        } else {
            chars.into_iter().collect()
        };
        self.progress.set_message(format!("Current file: {}", display_name));

        let classification = self.classifier.classify(rel_path, abs_path, &self.counters);
        render(&classification, rel_path)
    }
}

/// Escape glob metacharacters so `path` only matches itself
fn escape_pattern(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if matches!(c, '*' | '?' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
