//! Candidate file discovery under the source root.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::ignore::IgnoreMatcher;
use crate::util::diagnostic::{Diagnostic, ScanLogger};

/// Files found under the source root.
#[derive(Debug, Default)]
pub struct Discovered {
    /// Candidate files, in file-name order per directory.
    pub files: Vec<PathBuf>,
    /// Candidates excluded by an ignore pattern.
    pub ignored: usize,
}

/// Whether `path` is a TypeScript source that may define components.
pub fn is_candidate(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.ends_with(".d.ts") {
        return false;
    }
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("ts") | Some("tsx")
    )
}

fn is_dependency_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name() == "node_modules"
}

/// Walk `src_dir` and collect candidate files not excluded by `matcher`.
///
/// Exclusions by user patterns are reported to `logger`, one entry per file;
/// default-pattern exclusions are silent.
pub fn discover_files(src_dir: &Path, matcher: &IgnoreMatcher, logger: &dyn ScanLogger) -> Discovered {
    let mut discovered = Discovered::default();

    let walker = WalkDir::new(src_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_dependency_dir(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                let mut diagnostic = Diagnostic::warning("Failed to read directory entry")
                    .with_context("error", &error);
                if let Some(path) = error.path() {
                    diagnostic = diagnostic.with_location(path);
                }
                logger.log(&diagnostic);
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_candidate(entry.path()) {
            continue;
        }

        match matcher.matches(entry.path()) {
            Some(found) => {
                discovered.ignored += 1;
                if !found.is_default {
                    logger.log(
                        &Diagnostic::info("Ignoring file matched by ignore pattern")
                            .with_context("pattern", found.pattern)
                            .with_location(entry.path()),
                    );
                }
            }
            None => discovered.files.push(entry.into_path()),
        }
    }

    discovered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingLogger;
    use crate::util::diagnostic::Severity;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_candidate() {
        assert!(is_candidate(Path::new("src/Button.tsx")));
        assert!(is_candidate(Path::new("src/util.ts")));
        assert!(!is_candidate(Path::new("src/types.d.ts")));
        assert!(!is_candidate(Path::new("src/App.jsx")));
        assert!(!is_candidate(Path::new("src/README.md")));
    }

    #[test]
    fn test_discover_files() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("legacy")).unwrap();
        fs::create_dir_all(src.join("node_modules/pkg")).unwrap();
        fs::write(src.join("b.tsx"), "").unwrap();
        fs::write(src.join("a.tsx"), "").unwrap();
        fs::write(src.join("a.stories.tsx"), "").unwrap();
        fs::write(src.join("legacy/Old.tsx"), "").unwrap();
        fs::write(src.join("node_modules/pkg/index.tsx"), "").unwrap();
        fs::write(src.join("notes.md"), "").unwrap();

        let matcher = IgnoreMatcher::new(tmp.path(), &["src/legacy/**".to_string()]).unwrap();
        let logger = RecordingLogger::new();
        let discovered = discover_files(&src, &matcher, &logger);

        assert_eq!(discovered.files, vec![src.join("a.tsx"), src.join("b.tsx")]);
        assert_eq!(discovered.ignored, 2);

        let entries = logger.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, Severity::Info);
        assert_eq!(entries[0].context_value("pattern"), Some("src/legacy/**"));
        assert_eq!(entries[0].location(), Some(src.join("legacy/Old.tsx").as_path()));
    }
}
