use ignore::WalkBuilder;
use std::io;
use std::path::PathBuf;

/// Which entries the walk yields.
#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    /// Yield hidden files (other than `.git` contents).
    pub hidden: bool,
    pub respect_gitignore: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            hidden: false,
            respect_gitignore: true,
        }
    }
}

/// Walk paths and yield file paths
pub fn walk_paths(
    paths: &[String],
    options: WalkOptions,
) -> impl Iterator<Item = io::Result<PathBuf>> {
    let mut all_files = vec![];

    for path in paths {
        let walker = WalkBuilder::new(path)
            .hidden(!options.hidden)
            .git_ignore(options.respect_gitignore)
            .git_global(options.respect_gitignore)
            .git_exclude(options.respect_gitignore)
            .filter_entry(|entry| entry.file_name() != ".git")
            .build();

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                        all_files.push(Ok(entry.into_path()));
                    }
                }
                Err(e) => {
                    all_files.push(Err(io::Error::other(e.to_string())));
                }
            }
        }
    }

    all_files.into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn walk(dir: &TempDir, options: WalkOptions) -> Vec<PathBuf> {
        let paths = vec![dir.path().to_string_lossy().to_string()];
        walk_paths(&paths, options).filter_map(|r| r.ok()).collect()
    }

    #[test]
    fn test_walk_single_file() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("main.rs");
        fs::write(&file_path, "fn main() {}").unwrap();

        let paths = vec![file_path.to_string_lossy().to_string()];
        let files: Vec<_> = walk_paths(&paths, WalkOptions::default()).collect();

        assert_eq!(files.len(), 1);
        assert!(files[0].is_ok());
    }

    #[test]
    fn test_recursive_directory_traversal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("lib.rs"), "").unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.go"), "").unwrap();

        assert_eq!(walk(&dir, WalkOptions::default()).len(), 2);
    }

    #[test]
    fn test_skip_hidden_files_by_default() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("visible.txt"), "visible").unwrap();
        fs::write(dir.path().join(".editorconfig"), "root = true").unwrap();

        let files = walk(&dir, WalkOptions::default());
        assert_eq!(files.len(), 1);
        assert!(files[0].to_string_lossy().contains("visible.txt"));
    }

    #[test]
    fn test_include_hidden_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("visible.txt"), "visible").unwrap();
        fs::write(dir.path().join(".editorconfig"), "root = true").unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/config"), "git config").unwrap();

        let options = WalkOptions {
            hidden: true,
            ..Default::default()
        };
        let files = walk(&dir, options);

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| !f.to_string_lossy().contains(".git/")));
    }

    #[test]
    fn test_respect_gitignore() {
        let dir = TempDir::new().unwrap();

        // Create a .git directory so ignore crate respects .gitignore
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".gitignore"), "ignored.txt\n").unwrap();
        fs::write(dir.path().join("kept.txt"), "kept").unwrap();
        fs::write(dir.path().join("ignored.txt"), "ignored").unwrap();

        let files = walk(&dir, WalkOptions::default());
        assert!(files
            .iter()
            .all(|f| !f.to_string_lossy().contains("ignored.txt")));
        assert!(files.iter().any(|f| f.to_string_lossy().contains("kept.txt")));

        let all = walk(
            &dir,
            WalkOptions {
                respect_gitignore: false,
                ..Default::default()
            },
        );
        assert!(all.iter().any(|f| f.to_string_lossy().contains("ignored.txt")));
    }
}
