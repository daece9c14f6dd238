/*!
 * ASCII rendering of the scanned directory tree
 */

use std::path::Path;

use crate::matcher::PatternMatcher;
use crate::types::RelativePath;
use crate::utils::list_dir;

/// Render the tree below `root`, pruning whatever `ignores` matches.
///
/// Directories are listed before files at every level, each sorted by name,
/// so the result is stable for an unchanged tree. Symlinked directories show
/// up as directories without their contents.
pub fn build_tree(root: &Path, ignores: &PatternMatcher) -> String {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.display().to_string());

    let mut lines = vec![format!("{}/", name)];
    walk(root, root, ignores, "", &mut lines);
    lines.join("\n")
}

fn walk(root: &Path, dir: &Path, ignores: &PatternMatcher, prefix: &str, lines: &mut Vec<String>) {
    let (dirs, files) = match list_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Could not list directory {}: {}", dir.display(), e);
            return;
        }
    };

    let kept = |path: &Path, is_dir: bool| match RelativePath::strip_root(path, root) {
        Some(rel) => !ignores.is_match(rel.as_str(), is_dir),
        None => false,
    };

    let entries: Vec<(&Path, bool)> = dirs
        .iter()
        .filter(|d| kept(d.as_path(), true))
        .map(|d| (d.as_path(), true))
        .chain(
            files
                .iter()
                .filter(|f| kept(f.as_path(), false))
                .map(|f| (f.as_path(), false)),
        )
        .collect();

    let count = entries.len();
    for (index, (path, is_dir)) in entries.into_iter().enumerate() {
        let last = index + 1 == count;
        let connector = if last { "`-- " } else { "|-- " };
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        if is_dir {
            lines.push(format!("{prefix}{connector}{name}/"));
            // Linked directories are listed but not followed
            if path.is_symlink() {
                continue;
            }
            let child_prefix = format!("{prefix}{}", if last { "    " } else { "|   " });
            walk(root, path, ignores, &child_prefix, lines);
        } else {
            lines.push(format!("{prefix}{connector}{name}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_tree_layout() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path().join("project");
        fs::create_dir_all(root.join("src").join("bin")).unwrap();
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("README.md"), "readme").unwrap();
        fs::write(root.join("src").join("lib.rs"), "").unwrap();
        fs::write(root.join("src").join("bin").join("main.rs"), "").unwrap();
        fs::write(root.join("docs").join("guide.md"), "").unwrap();

        let tree = build_tree(&root, &PatternMatcher::new());
        let expected = [
            "project/",
            "|-- docs/",
            "|   `-- guide.md",
            "|-- src/",
            "|   |-- bin/",
            "|   |   `-- main.rs",
            "|   `-- lib.rs",
            "`-- README.md",
        ]
        .join("\n");

        assert_eq!(tree, expected);
    }

    #[test]
    fn test_tree_prunes_excluded_entries() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path().join("repo");
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("build")).unwrap();
        fs::write(root.join(".git").join("config"), "").unwrap();
        fs::write(root.join("build").join("out.o"), "").unwrap();
        fs::write(root.join("a.txt"), "hello").unwrap();
        fs::write(root.join("debug.log"), "").unwrap();

        let ignores = PatternMatcher::from_patterns([".git/*", "build/", "*.log"]);
        let tree = build_tree(&root, &ignores);

        // `.git/*` hides the contents, the directory itself stays listed
        assert_eq!(tree, "repo/\n|-- .git/\n`-- a.txt");
    }

    #[test]
    fn test_tree_is_stable() {
        let temp_dir = tempdir().unwrap();
        for name in ["c.txt", "a.txt", "b.txt"] {
            fs::write(temp_dir.path().join(name), name).unwrap();
        }

        let ignores = PatternMatcher::new();
        assert_eq!(
            build_tree(temp_dir.path(), &ignores),
            build_tree(temp_dir.path(), &ignores)
        );
    }
}
