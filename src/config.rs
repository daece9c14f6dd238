/*!
 * Configuration handling for lmpack
 */

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use clap_complete::Shell;

use crate::ensure;
use crate::error::{PackError, Result};
use crate::git;
use crate::report::ReportFormat;
use crate::types::RelativePath;

/// Output name used when the template is empty
pub const DEFAULT_OUTPUT_NAME_FIXED: &str = "context.lmpack.md";

/// Default output name template
pub const DEFAULT_OUTPUT_NAME_TEMPLATE: &str = "{repo_name}_context.lmpack.md";

/// Placeholders understood by the output name template
const OUTPUT_NAME_PLACEHOLDERS: [&str; 3] = ["repo_name", "index_path", "rel_index_path"];

// Comma lists are usually written as "a, b"
fn trim_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Names written as `{name}` in a template
fn template_placeholders(template: &str) -> impl Iterator<Item = &str> {
    template
        .split('{')
        .skip(1)
        .filter_map(|rest| rest.split_once('}').map(|(name, _)| name))
}

/// Command-line arguments for lmpack
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "lmpack",
    version = env!("CARGO_PKG_VERSION"),
    about = "Pack a folder into a single Markdown file for LLM context",
    long_about = "Generates a single text file containing the content of files within a folder, \
                  respecting .gitignore rules and formatting each file with path and type information."
)]
pub struct Args {
    /// Path to folder to index for packing
    #[clap(default_value = ".")]
    pub index_path: String,

    /// Path to directory to write the output file to
    #[clap(long = "output", default_value = ".")]
    pub output: String,

    /// Template for the output file name. Use {repo_name}, {index_path}, {rel_index_path} placeholders
    #[clap(long = "output-name", default_value = DEFAULT_OUTPUT_NAME_TEMPLATE)]
    pub output_name: String,

    /// Path to the git root that contains the index path, detected if not provided
    #[clap(long)]
    pub repo_root: Option<String>,

    /// Include only files matching the given comma separated pattern(s)
    #[clap(short = 'i', long = "include", value_delimiter = ',')]
    pub include_patterns: Vec<String>,

    /// Exclude files matching the given comma separated pattern(s)
    #[clap(short = 'e', long = "exclude", value_delimiter = ',')]
    pub exclude_patterns: Vec<String>,

    /// .gitignore/.aiexclude/.aiignore type files to use, comma separated
    #[clap(short = 'g', long = "gitignore", value_delimiter = ',')]
    pub ignore_files: Vec<String>,

    /// Number of threads to use for processing
    #[clap(long, default_value = "4")]
    pub threads: usize,

    /// Format of the summary printed after packing
    #[clap(long, value_enum, default_value_t = ReportFormat::default())]
    pub report: ReportFormat,

    /// Enable verbose output
    #[clap(short, long)]
    pub verbose: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Folder to pack
    pub index_path: PathBuf,

    /// Directory the output file is written to
    pub output_dir: PathBuf,

    /// Output file name template
    pub output_name_template: String,

    /// Git root override
    pub repo_root: Option<PathBuf>,

    /// Patterns to include (if empty, include all)
    pub include_patterns: Vec<String>,

    /// Patterns to exclude
    pub exclude_patterns: Vec<String>,

    /// Extra ignore files
    pub ignore_files: Vec<PathBuf>,

    /// Number of threads to use for processing
    pub num_threads: usize,

    /// Summary format
    pub report_format: ReportFormat,

    /// Debug logging
    pub verbose: bool,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        Self {
            index_path: PathBuf::from(args.index_path),
            output_dir: PathBuf::from(args.output),
            output_name_template: args.output_name,
            repo_root: args.repo_root.map(PathBuf::from),
            include_patterns: trim_list(args.include_patterns),
            exclude_patterns: trim_list(args.exclude_patterns),
            ignore_files: args.ignore_files.into_iter().map(PathBuf::from).collect(),
            num_threads: args.threads,
            report_format: args.report,
            verbose: args.verbose,
        }
    }

    /// Configuration for packing `index_path` with defaults everywhere else
    pub fn for_path(index_path: impl Into<PathBuf>) -> Self {
        let index_path = index_path.into();
        Self {
            output_dir: index_path.clone(),
            index_path,
            output_name_template: DEFAULT_OUTPUT_NAME_TEMPLATE.to_string(),
            repo_root: None,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            ignore_files: Vec::new(),
            num_threads: 1,
            report_format: ReportFormat::default(),
            verbose: false,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.index_path.is_dir(),
            PathNotFound,
            "Index directory not found: {}",
            self.index_path.display()
        );

        ensure!(
            self.output_dir.is_dir(),
            PathNotFound,
            "Output directory not found: {}",
            self.output_dir.display()
        );

        if let Some(root) = &self.repo_root {
            ensure!(
                root.is_dir(),
                PathNotFound,
                "Repository root not found: {}",
                root.display()
            );
        }

        for path in &self.ignore_files {
            ensure!(
                path.is_file(),
                PathNotFound,
                "Ignore file not found: {}",
                path.display()
            );
        }

        ensure!(
            self.num_threads > 0,
            InvalidArgument,
            "Thread count must be at least 1"
        );

        Ok(())
    }

    /// Make every configured path absolute
    pub fn resolve_paths(&mut self) -> Result<()> {
        self.index_path = fs::canonicalize(&self.index_path)?;
        self.output_dir = fs::canonicalize(&self.output_dir)?;
        if let Some(root) = &self.repo_root {
            self.repo_root = Some(fs::canonicalize(root)?);
        }
        Ok(())
    }

    /// Git root to read ignore files from: the override, else the repository
    /// enclosing the index path
    pub fn git_root(&self) -> Option<PathBuf> {
        if let Some(root) = &self.repo_root {
            return Some(root.clone());
        }

        match git::find_git_root(&self.index_path) {
            Ok(root) => root,
            Err(e) => {
                log::warn!("Could not detect git root: {}", e);
                None
            }
        }
    }

    /// Full path of the output file
    pub fn output_file(&self, git_root: Option<&Path>) -> Result<PathBuf> {
        let template = self.output_name_template.trim();
        if template.is_empty() {
            return Ok(self.output_dir.join(DEFAULT_OUTPUT_NAME_FIXED));
        }

        // Checked before substitution so braces in directory names are kept
        if let Some(unknown) =
            template_placeholders(template).find(|name| !OUTPUT_NAME_PLACEHOLDERS.contains(name))
        {
            return Err(PackError::Config(format!(
                "Unknown placeholder {{{}}} in output name template: {}",
                unknown, self.output_name_template
            )));
        }

        let index_name = self
            .index_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let rel_index_path = match git_root.and_then(|root| RelativePath::strip_root(&self.index_path, root)) {
            Some(rel) if !rel.as_str().is_empty() => rel.as_str().replace('/', "_"),
            Some(_) => ".".to_string(),
            None => index_name.clone(),
        };

        let name = template
            .replace("{repo_name}", &git::repo_name(git_root, &self.index_path))
            .replace("{index_path}", &index_name)
            .replace("{rel_index_path}", &rel_index_path);

        Ok(self.output_dir.join(name))
    }
}
