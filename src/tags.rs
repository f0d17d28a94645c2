//! Tag extraction and tag-line parsing.
//!
//! Symbol extraction is delegated to an external ctags-compatible tool.
//! [`TagExtractor`] probes for a modern (Universal/Exuberant) ctags and
//! runs it recursively with line numbers enabled; when the probe or the
//! modern run fails it falls back to a legacy invocation over an explicit
//! capped file list.  Both strategies run under a bounded timeout and
//! every failure degrades to `false` rather than an error.
//!
//! [`parse_tag_line`] turns one line of the resulting tags artifact into
//! a [`SymbolRecord`], recovering a line number from the address field
//! heuristically and classifying a coarse symbol kind.

use std::fmt;
use std::process::Command;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use crate::config::IndexConfig;
use crate::exec::run_with_timeout;
use crate::paths::IndexPaths;
use crate::walker::Walker;

/// Timeout for the `--version` probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Symbol records
// ---------------------------------------------------------------------------

/// Coarse classification of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Import,
    Test,
    Other,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Class => "class",
            SymbolKind::Import => "import",
            SymbolKind::Test => "test",
            SymbolKind::Other => "other",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One symbol extracted from the tags artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRecord {
    /// The symbol name (e.g. function name, class name).
    pub name: String,
    /// Repo-relative path of the defining file.
    pub file: String,
    /// 1-based line number; 0 means the address carried no recoverable
    /// line number (pattern-only address).
    pub line: u64,
    /// Coarse kind classification.
    pub kind: SymbolKind,
}

// ---------------------------------------------------------------------------
// Tag-line parsing
// ---------------------------------------------------------------------------

fn line_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"line:(\d+)").expect("static regex is valid"))
}

fn digit_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("static regex is valid"))
}

/// Parse one line of an Exuberant/Universal tags file.
///
/// Returns `None` for blank lines, `!`-prefixed pseudo-tags, and lines
/// with fewer than three tab-separated fields.  Malformed lines are the
/// caller's signal to skip, never an error.
pub fn parse_tag_line(line: &str) -> Option<SymbolRecord> {
    if line.trim().is_empty() || line.starts_with('!') {
        return None;
    }

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 3 {
        return None;
    }

    let name = fields[0];
    let file = fields[1];
    if name.is_empty() || file.is_empty() {
        return None;
    }

    let address = fields[2];
    let extensions = &fields[3..];

    let line_no = recover_line_number(address, extensions);
    let kind = classify_kind(name, file, extensions);

    Some(SymbolRecord {
        name: name.to_string(),
        file: file.to_string(),
        line: line_no,
        kind,
    })
}

/// Recover a line number from the address field, trying in order:
/// a direct numeric address, a `line:<N>` extension marker, then any
/// digit run in the extension fields.  Pattern-only addresses with no
/// numeric component anywhere yield the documented `0` sentinel.
fn recover_line_number(address: &str, extensions: &[&str]) -> u64 {
    // Direct numeric address, with or without the `;"` terminator.
    let bare = address.strip_suffix(";\"").unwrap_or(address);
    if let Ok(n) = bare.trim().parse::<u64>() {
        return n;
    }

    for ext in extensions {
        if let Some(caps) = line_marker_re().captures(ext) {
            if let Ok(n) = caps[1].parse::<u64>() {
                return n;
            }
        }
    }

    for ext in extensions {
        if let Some(m) = digit_run_re().find(ext) {
            if let Ok(n) = m.as_str().parse::<u64>() {
                return n;
            }
        }
    }

    0
}

/// Classify a symbol kind from the tags extension fields.
///
/// Accepts both one-letter kinds (`f`, `m`, `c`, `i`) and named kinds;
/// ctags emits `m` for "member", which maps to method here.  A
/// case-insensitive `test` substring in the name or file overrides any
/// other classification.
fn classify_kind(name: &str, file: &str, extensions: &[&str]) -> SymbolKind {
    if name.to_lowercase().contains("test") || file.to_lowercase().contains("test") {
        return SymbolKind::Test;
    }

    for ext in extensions {
        let token = ext.strip_prefix("kind:").unwrap_or(ext).trim();
        match token {
            "f" | "function" => return SymbolKind::Function,
            "m" | "method" | "member" => return SymbolKind::Method,
            "c" | "class" => return SymbolKind::Class,
            "i" | "import" => return SymbolKind::Import,
            _ => {}
        }
    }

    SymbolKind::Other
}

// ---------------------------------------------------------------------------
// Extraction strategies
// ---------------------------------------------------------------------------

/// The ordered extraction strategies, tried in turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractStrategy {
    /// One recursive, kind-rich run of a recognized modern ctags.
    Universal,
    /// Plain invocation over an explicit capped file list.
    Legacy,
}

const STRATEGIES: &[ExtractStrategy] = &[ExtractStrategy::Universal, ExtractStrategy::Legacy];

/// Invoker for the external tag-extraction tool.
pub struct TagExtractor {
    ctags_bin: String,
    max_files: usize,
    timeout: Duration,
    additional_extensions: Vec<String>,
}

impl TagExtractor {
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            ctags_bin: "ctags".to_string(),
            max_files: config.max_files,
            timeout: Duration::from_secs(config.extract_timeout_secs),
            additional_extensions: config.additional_extensions.clone(),
        }
    }

    /// Override the ctags binary name (tests point this at a tool that
    /// does not exist to exercise the degradation path).
    pub fn with_binary(mut self, bin: &str) -> Self {
        self.ctags_bin = bin.to_string();
        self
    }

    /// Produce the tags artifact for the repository.
    ///
    /// `files` restricts extraction to an explicit list; when `None`,
    /// source files are discovered by walking the tree.  Returns `true`
    /// when some strategy succeeded and the artifact was written; tool
    /// absence, timeout and non-zero exits all yield `false`.
    pub fn extract(&self, paths: &IndexPaths, files: Option<&[String]>) -> bool {
        for strategy in STRATEGIES {
            let ok = match strategy {
                ExtractStrategy::Universal => self.try_universal(paths, files),
                ExtractStrategy::Legacy => self.try_legacy(paths, files),
            };
            if ok {
                return true;
            }
        }
        false
    }

    /// Probe `ctags --version` and check for a recognized variant string.
    fn probe_modern(&self) -> bool {
        let out = match run_with_timeout(
            Command::new(&self.ctags_bin).arg("--version"),
            PROBE_TIMEOUT,
        ) {
            Ok(out) => out,
            Err(_) => return false,
        };
        out.stdout.contains("Universal Ctags") || out.stdout.contains("Exuberant Ctags")
    }

    fn try_universal(&self, paths: &IndexPaths, files: Option<&[String]>) -> bool {
        if !self.probe_modern() {
            return false;
        }

        let mut cmd = Command::new(&self.ctags_bin);
        cmd.arg("--fields=+n")
            .arg("-f")
            .arg(paths.tags_path())
            .current_dir(paths.repo_root());

        match files {
            Some(list) => {
                for f in list.iter().take(self.max_files) {
                    cmd.arg(f);
                }
            }
            None => {
                cmd.arg("-R").arg(".");
            }
        }

        run_with_timeout(&mut cmd, self.timeout).is_ok() && paths.tags_path().exists()
    }

    fn try_legacy(&self, paths: &IndexPaths, files: Option<&[String]>) -> bool {
        let list = match files {
            Some(list) => list.iter().take(self.max_files).cloned().collect(),
            None => self.discover_files(paths),
        };
        if list.is_empty() {
            return false;
        }

        let mut cmd = Command::new(&self.ctags_bin);
        cmd.arg("-f")
            .arg(paths.tags_path())
            .current_dir(paths.repo_root());
        for f in &list {
            cmd.arg(f);
        }

        run_with_timeout(&mut cmd, self.timeout).is_ok() && paths.tags_path().exists()
    }

    /// Discover source files under the repo root, repo-relative, capped.
    fn discover_files(&self, paths: &IndexPaths) -> Vec<String> {
        Walker::new(paths.repo_root())
            .additional_extensions(&self.additional_extensions)
            .source_files()
            .into_iter()
            .filter_map(|p| {
                p.strip_prefix(paths.repo_root())
                    .map(|r| r.to_string_lossy().into_owned())
                    .ok()
            })
            .take(self.max_files)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexConfig;
    use tempfile::TempDir;

    // -- parse_tag_line: rejection branches ---------------------------------

    #[test]
    fn rejects_blank_lines() {
        assert!(parse_tag_line("").is_none());
        assert!(parse_tag_line("   ").is_none());
        assert!(parse_tag_line("\t\t").is_none());
    }

    #[test]
    fn rejects_pseudo_tags() {
        assert!(parse_tag_line("!_TAG_FILE_FORMAT\t2\t/extended format/").is_none());
        assert!(parse_tag_line("!_TAG_PROGRAM_NAME\tUniversal Ctags\t//").is_none());
    }

    #[test]
    fn rejects_fewer_than_three_fields() {
        assert!(parse_tag_line("name_only").is_none());
        assert!(parse_tag_line("name\tfile.py").is_none());
    }

    #[test]
    fn rejects_empty_name_or_file() {
        assert!(parse_tag_line("\tfile.py\t10").is_none());
        assert!(parse_tag_line("name\t\t10").is_none());
    }

    // -- parse_tag_line: line-number recovery --------------------------------

    #[test]
    fn direct_numeric_address() {
        let rec = parse_tag_line("render\tsrc/view.py\t42").unwrap();
        assert_eq!(rec.line, 42);
    }

    #[test]
    fn numeric_address_with_terminator() {
        let rec = parse_tag_line("foo\tsrc/a.py\t10;\"\tf").unwrap();
        assert_eq!(rec.line, 10);
        assert_eq!(rec.kind, SymbolKind::Function);
    }

    #[test]
    fn line_marker_in_extension_fields() {
        let rec =
            parse_tag_line("handler\tsrc/app.py\t/^def handler():$/;\"\tf\tline:77").unwrap();
        assert_eq!(rec.line, 77);
    }

    #[test]
    fn digit_run_fallback_in_extension_fields() {
        let rec = parse_tag_line("cb\tsrc/x.py\t/^cb = lambda:$/;\"\tv\tfoo:31").unwrap();
        assert_eq!(rec.line, 31);
    }

    #[test]
    fn pattern_only_address_yields_zero_sentinel() {
        let rec = parse_tag_line("Bar\tsrc/b.py\t/^class Bar(object):$/;\"\tc").unwrap();
        assert_eq!(rec.line, 0, "no numeric component anywhere -> line 0");
        assert_eq!(rec.kind, SymbolKind::Class);
    }

    #[test]
    fn line_marker_preferred_over_digit_run_order() {
        // `line:` marker in a later field wins over earlier digit runs
        // only via the marker pass running first.
        let rec =
            parse_tag_line("f\tsrc/y.py\t/^def f():$/;\"\tf\tarity:3\tline:90").unwrap();
        assert_eq!(rec.line, 90);
    }

    // -- parse_tag_line: kind classification ---------------------------------

    #[test]
    fn one_letter_kinds() {
        let cases = [
            ("f", SymbolKind::Function),
            ("m", SymbolKind::Method),
            ("c", SymbolKind::Class),
            ("i", SymbolKind::Import),
            ("v", SymbolKind::Other),
        ];
        for (letter, expected) in cases {
            let line = format!("sym\tsrc/m.py\t5;\"\t{letter}");
            let rec = parse_tag_line(&line).unwrap();
            assert_eq!(rec.kind, expected, "kind letter {letter}");
        }
    }

    #[test]
    fn named_kinds() {
        let cases = [
            ("function", SymbolKind::Function),
            ("method", SymbolKind::Method),
            ("member", SymbolKind::Method),
            ("class", SymbolKind::Class),
            ("import", SymbolKind::Import),
            ("variable", SymbolKind::Other),
        ];
        for (name, expected) in cases {
            let line = format!("sym\tsrc/m.py\t5;\"\tkind:{name}");
            let rec = parse_tag_line(&line).unwrap();
            assert_eq!(rec.kind, expected, "kind name {name}");
        }
    }

    #[test]
    fn no_kind_field_is_other() {
        let rec = parse_tag_line("sym\tsrc/m.py\t5").unwrap();
        assert_eq!(rec.kind, SymbolKind::Other);
    }

    #[test]
    fn test_substring_in_name_overrides_kind() {
        let rec = parse_tag_line("test_render\tsrc/view.py\t5;\"\tf").unwrap();
        assert_eq!(rec.kind, SymbolKind::Test);
    }

    #[test]
    fn test_substring_in_file_overrides_kind() {
        let rec = parse_tag_line("render\ttests/view.py\t5;\"\tc").unwrap();
        assert_eq!(rec.kind, SymbolKind::Test);
    }

    #[test]
    fn test_override_is_case_insensitive() {
        let rec = parse_tag_line("TestCase\tsrc/view.py\t5;\"\tc").unwrap();
        assert_eq!(rec.kind, SymbolKind::Test);
    }

    #[test]
    fn spec_fixture_lines() {
        let a = parse_tag_line("foo\tsrc/a.py\t10;\"\tf").unwrap();
        assert_eq!(
            a,
            SymbolRecord {
                name: "foo".into(),
                file: "src/a.py".into(),
                line: 10,
                kind: SymbolKind::Function,
            }
        );
        let b = parse_tag_line("Bar\tsrc/b.py\t/^class Bar:$/;\"\tc").unwrap();
        assert_eq!(b.name, "Bar");
        assert_eq!(b.file, "src/b.py");
        assert_eq!(b.kind, SymbolKind::Class);
    }

    #[test]
    fn kind_display() {
        assert_eq!(SymbolKind::Function.to_string(), "function");
        assert_eq!(SymbolKind::Test.to_string(), "test");
        assert_eq!(SymbolKind::Other.to_string(), "other");
    }

    // -- extractor degradation ------------------------------------------------

    #[test]
    fn missing_tool_returns_false() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.py"), "def foo():\n    pass\n").unwrap();
        let paths = IndexPaths::new(dir.path());
        paths.ensure_index_dir().unwrap();

        let extractor =
            TagExtractor::new(&IndexConfig::default()).with_binary("definitely-not-ctags-4242");
        assert!(!extractor.extract(&paths, None));
        assert!(!paths.tags_path().exists());
    }

    #[test]
    fn missing_tool_with_explicit_files_returns_false() {
        let dir = TempDir::new().unwrap();
        let paths = IndexPaths::new(dir.path());
        paths.ensure_index_dir().unwrap();

        let extractor =
            TagExtractor::new(&IndexConfig::default()).with_binary("definitely-not-ctags-4242");
        assert!(!extractor.extract(&paths, Some(&["a.py".to_string()])));
    }

    #[test]
    fn legacy_skips_when_nothing_to_index() {
        let dir = TempDir::new().unwrap();
        let paths = IndexPaths::new(dir.path());
        paths.ensure_index_dir().unwrap();

        // Empty tree: even with a working ctags there is nothing to hand
        // to the legacy strategy, and the probe path writes nothing.
        let extractor =
            TagExtractor::new(&IndexConfig::default()).with_binary("definitely-not-ctags-4242");
        assert!(!extractor.extract(&paths, None));
    }

    #[test]
    fn file_cap_respected_in_discovery() {
        let dir = TempDir::new().unwrap();
        for i in 0..5 {
            std::fs::write(dir.path().join(format!("f{i}.py")), "x = 1\n").unwrap();
        }
        let paths = IndexPaths::new(dir.path());
        let config = IndexConfig {
            max_files: 2,
            ..IndexConfig::default()
        };
        let extractor = TagExtractor::new(&config);
        assert_eq!(extractor.discover_files(&paths).len(), 2);
    }
}
