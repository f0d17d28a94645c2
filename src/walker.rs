//! Source-file discovery with gitignore support and default exclusions.
//!
//! Wraps the `ignore` crate's `WalkBuilder` to enumerate the files worth
//! indexing:
//! - Respects `.gitignore` rules
//! - Skips version-control, cache, virtual-environment and dependency
//!   directories regardless of gitignore
//! - Skips hidden files/directories except `.github`
//! - Keeps only files whose extension is in the source set (plus any
//!   extensions added via config)

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;

/// Directories that are always excluded from walks, regardless of
/// `.gitignore`.
const DEFAULT_EXCLUSIONS: &[&str] = &[
    "node_modules",
    "vendor",
    "target",
    "build",
    "dist",
    "__pycache__",
    ".venv",
    "venv",
];

/// Hidden directory names that are NOT excluded (i.e., they are allowed
/// even though hidden directories are otherwise skipped).
const HIDDEN_ALLOWLIST: &[&str] = &[".github"];

/// Built-in source-file extensions.
const SOURCE_EXTENSIONS: &[&str] = &[
    "py", "rs", "js", "jsx", "ts", "tsx", "go", "java", "c", "h", "cpp", "cc", "cxx", "hpp",
    "rb", "php", "cs", "swift", "kt", "scala", "sh",
];

/// Glob patterns covering the built-in source extensions, for tools that
/// take glob filters instead of paths (the content-search collaborator).
pub fn source_extension_globs() -> Vec<String> {
    SOURCE_EXTENSIONS
        .iter()
        .map(|ext| format!("*.{ext}"))
        .collect()
}

/// Whether a path looks like a source file, given any extra extensions
/// from configuration.
pub fn is_source_file(path: &Path, additional: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    SOURCE_EXTENSIONS.contains(&ext) || additional.iter().any(|a| a == ext)
}

/// A file-system walker that yields indexable source files.
pub struct Walker {
    root: PathBuf,
    additional_extensions: Vec<String>,
}

impl Walker {
    /// Create a new walker rooted at the given path.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            additional_extensions: Vec::new(),
        }
    }

    /// Add extra file extensions (from config) to the source set.
    pub fn additional_extensions(mut self, exts: &[String]) -> Self {
        self.additional_extensions = exts.to_vec();
        self
    }

    fn make_builder(&self) -> WalkBuilder {
        let mut builder = WalkBuilder::new(&self.root);

        // Let the ignore crate handle .gitignore, .ignore, etc.
        builder.standard_filters(true);

        // We disable the built-in hidden filter because we need a more
        // nuanced policy (skip hidden except for allowlisted names).
        builder.hidden(false);

        // Build overrides that exclude the default directories.  In the
        // overrides system a `!`-prefixed glob means "exclude".
        let mut overrides = OverrideBuilder::new(&self.root);
        for dir in DEFAULT_EXCLUSIONS {
            let pattern = format!("!{dir}/");
            overrides
                .add(&pattern)
                .expect("default exclusion pattern should be valid");
        }
        builder.overrides(overrides.build().expect("override builder should succeed"));

        // Custom filter: skip hidden entries (name starts with `.`) unless
        // they appear in the allowlist.
        builder.filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            if name.starts_with('.') {
                // The root entry itself (depth 0) always passes through.
                if entry.depth() == 0 {
                    return true;
                }
                return HIDDEN_ALLOWLIST.iter().any(|a| *a == &*name);
            }
            true
        });

        builder
    }

    /// Walk the tree and collect all source-file paths.
    pub fn source_files(&self) -> Vec<PathBuf> {
        let builder = self.make_builder();
        let mut paths = Vec::new();
        for result in builder.build() {
            let entry = match result {
                Ok(e) => e,
                Err(_) => continue,
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let path = entry.into_path();
            if is_source_file(&path, &self.additional_extensions) {
                paths.push(path);
            }
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Helper: create a temporary directory tree for testing.
    struct TestDir {
        dir: tempfile::TempDir,
    }

    impl TestDir {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn path(&self) -> &Path {
            self.dir.path()
        }

        /// Create a file (and any necessary parent directories).
        fn create_file(&self, relative: &str) {
            let p = self.dir.path().join(relative);
            if let Some(parent) = p.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&p, "content").unwrap();
        }
    }

    /// Collect paths relative to the test root, sorted for determinism.
    fn sorted_relative(root: &Path, paths: &[PathBuf]) -> Vec<String> {
        let mut rel: Vec<String> = paths
            .iter()
            .filter_map(|p| {
                p.strip_prefix(root)
                    .ok()
                    .map(|r| r.to_string_lossy().into_owned())
            })
            .collect();
        rel.sort();
        rel
    }

    #[test]
    fn is_source_file_builtin_extensions() {
        assert!(is_source_file(Path::new("src/main.py"), &[]));
        assert!(is_source_file(Path::new("src/lib.rs"), &[]));
        assert!(is_source_file(Path::new("a/b.go"), &[]));
        assert!(!is_source_file(Path::new("README.md"), &[]));
        assert!(!is_source_file(Path::new("Makefile"), &[]));
        assert!(!is_source_file(Path::new("notes.txt"), &[]));
    }

    #[test]
    fn is_source_file_additional_extensions() {
        let extra = vec!["zig".to_string()];
        assert!(is_source_file(Path::new("main.zig"), &extra));
        assert!(!is_source_file(Path::new("main.zig"), &[]));
    }

    #[test]
    fn collects_only_source_files() {
        let td = TestDir::new();
        td.create_file("src/main.py");
        td.create_file("src/util.rs");
        td.create_file("README.md");
        td.create_file("data.json");

        let paths = Walker::new(td.path()).source_files();
        let rel = sorted_relative(td.path(), &paths);

        assert_eq!(rel, vec!["src/main.py", "src/util.rs"]);
    }

    #[test]
    fn respects_gitignore() {
        let td = TestDir::new();
        // The ignore crate only respects .gitignore inside a git repository.
        fs::create_dir(td.path().join(".git")).unwrap();
        td.create_file("keep.rs");
        td.create_file("generated.rs");
        fs::write(td.path().join(".gitignore"), "generated.rs\n").unwrap();

        let paths = Walker::new(td.path()).source_files();
        let rel = sorted_relative(td.path(), &paths);

        assert!(rel.contains(&"keep.rs".to_string()));
        assert!(!rel.contains(&"generated.rs".to_string()));
    }

    #[test]
    fn skips_default_exclusions() {
        let td = TestDir::new();
        td.create_file("src/main.rs");
        td.create_file("node_modules/pkg/index.js");
        td.create_file("vendor/lib.go");
        td.create_file("target/debug/gen.rs");
        td.create_file("__pycache__/mod.py");
        td.create_file(".venv/lib/site.py");
        td.create_file("venv/lib/site.py");

        let paths = Walker::new(td.path()).source_files();
        let rel = sorted_relative(td.path(), &paths);

        assert_eq!(rel, vec!["src/main.rs"], "only src/main.rs expected, got: {rel:?}");
    }

    #[test]
    fn skips_hidden_except_github() {
        let td = TestDir::new();
        td.create_file("visible.rs");
        td.create_file(".hidden/secret.py");
        td.create_file(".github/scripts/check.py");

        let paths = Walker::new(td.path()).source_files();
        let rel = sorted_relative(td.path(), &paths);

        assert!(rel.contains(&"visible.rs".to_string()));
        assert!(
            rel.iter().any(|p| p.starts_with(".github")),
            ".github should be allowed, got: {rel:?}"
        );
        assert!(!rel.iter().any(|p| p.starts_with(".hidden")));
    }

    #[test]
    fn additional_extensions_flow_through_walk() {
        let td = TestDir::new();
        td.create_file("main.zig");
        td.create_file("main.rs");

        let paths = Walker::new(td.path())
            .additional_extensions(&["zig".to_string()])
            .source_files();
        let rel = sorted_relative(td.path(), &paths);

        assert_eq!(rel, vec!["main.rs", "main.zig"]);
    }
}
