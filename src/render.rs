/*!
 * Rendering of per-file blocks
 *
 * Every block shares the same envelope:
 *
 * ```text
 *
 * --- FILE START ---
 * Path: <relative/path>
 * <body>
 * --- FILE END ---
 * ```
 */

use std::path::Path;

use crate::language::codeblock_language;
use crate::types::{Classification, RelativePath};

const FILE_START: &str = "--- FILE START ---";
const FILE_END: &str = "--- FILE END ---";

fn envelope(path: &RelativePath, body: &str) -> String {
    format!("\n{FILE_START}\nPath: {path}\n{body}\n{FILE_END}\n")
}

/// Full text block with a highlighted code fence
pub fn render_text(path: &RelativePath, language: &str, content: &str) -> String {
    envelope(path, &format!("```{language}\n{content}\n```"))
}

/// Placeholder for binary files
pub fn render_binary(path: &RelativePath, size: u64) -> String {
    envelope(path, &format!("Size: {size} bytes\n(Binary content)"))
}

/// Placeholder for files whose content is suppressed by policy
pub fn render_no_content(path: &RelativePath) -> String {
    envelope(path, "(Content Skipped)")
}

/// Placeholder for files that could not be read
pub fn render_error(path: &RelativePath, message: &str) -> String {
    envelope(path, &format!("Error reading file: {message}"))
}

/// Render the block for a classified file; excluded files have none
pub fn render(classification: &Classification, path: &RelativePath) -> Option<String> {
    match classification {
        Classification::Excluded(_) => None,
        Classification::IncludedNoContent => Some(render_no_content(path)),
        Classification::IncludedBinary { size } => Some(render_binary(path, *size)),
        Classification::IncludedText { content } => {
            let language = codeblock_language(Path::new(path.as_str()));
            Some(render_text(path, language, content))
        }
        Classification::ReadError { message } => Some(render_error(path, message)),
    }
}

/// Document header: the source tree followed by the contents heading
pub fn render_header(tree: &str) -> String {
    format!("# Source Tree\n\n```\n{tree}\n```\n\n# File Contents\n\n")
}
