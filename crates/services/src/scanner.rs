//! Depth-bounded, cancellable directory scanner.
//!
//! Walks each root depth-first with files listed before subdirectories. Per-file
//! I/O failures never abort a scan; the entry is skipped and the walk continues.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use shared::scan::{FileAttributes, FileCandidate, ScanOptions, ScanProgress};

use crate::cancel::{ensure_active, Canceled};
use crate::glob_matcher::GlobMatcher;
use crate::path_safety::resolved_key;

/// Emit a progress report every this many visited files.
const PROGRESS_EVERY_FILES: usize = 250;

#[derive(Debug, Default)]
struct Counters {
    directories_visited: usize,
    files_visited: usize,
    files_matched: usize,
}

impl Counters {
    fn report(&self, progress: Option<&UnboundedSender<ScanProgress>>, root: &Path) {
        if let Some(tx) = progress {
            let _ = tx.send(ScanProgress {
                current_root: root.to_path_buf(),
                directories_visited: self.directories_visited,
                files_visited: self.files_visited,
                files_matched: self.files_matched,
            });
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileScanner;

impl FileScanner {
    pub fn new() -> Self {
        Self
    }

    /// Runs [`FileScanner::scan`] on the blocking pool.
    pub async fn scan_async(
        &self,
        options: ScanOptions,
        progress: Option<UnboundedSender<ScanProgress>>,
        cancel: CancellationToken,
    ) -> Result<Vec<FileCandidate>, Canceled> {
        let scanner = *self;
        let handle = tokio::task::spawn_blocking(move || {
            scanner.scan(&options, progress.as_ref(), &cancel)
        });
        match handle.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(Canceled),
        }
    }

    pub fn scan(
        &self,
        options: &ScanOptions,
        progress: Option<&UnboundedSender<ScanProgress>>,
        cancel: &CancellationToken,
    ) -> Result<Vec<FileCandidate>, Canceled> {
        let mut results = Vec::new();
        if options.roots.is_empty() {
            return Ok(results);
        }

        let matcher = GlobMatcher::new(&options.include_glob, &options.exclude_glob);
        let mut counters = Counters::default();
        let mut seen = HashSet::new();

        for root in &options.roots {
            ensure_active(cancel)?;
            if !seen.insert(resolved_key(root)) {
                continue;
            }

            let meta = match fs::metadata(root) {
                Ok(m) => m,
                Err(e) => {
                    debug!("Skipping unreadable root {}: {}", root.display(), e);
                    continue;
                }
            };

            if meta.is_file() {
                // Globs still apply to a file root, against its bare name.
                let root_dir = root.parent().map(Path::to_path_buf).unwrap_or_default();
                let relative = PathBuf::from(root.file_name().unwrap_or_default());
                counters.files_visited += 1;
                if let Some(candidate) = evaluate_file(root, &root_dir, &relative, options, &matcher) {
                    results.push(candidate);
                    counters.files_matched += 1;
                }
                counters.report(progress, root);
                continue;
            }

            walk_directory(root, options, &matcher, &mut counters, &mut results, progress, cancel)?;
            counters.report(progress, root);
        }

        info!(
            "Scan finished: {} directories, {} files visited, {} matched",
            counters.directories_visited, counters.files_visited, counters.files_matched
        );
        Ok(results)
    }
}

fn walk_directory(
    root: &Path,
    options: &ScanOptions,
    matcher: &GlobMatcher,
    counters: &mut Counters,
    results: &mut Vec<FileCandidate>,
    progress: Option<&UnboundedSender<ScanProgress>>,
    cancel: &CancellationToken,
) -> Result<(), Canceled> {
    let include_hidden = options.include_hidden;
    // Files sit one level below the deepest directory that is listed.
    let walker = WalkDir::new(root)
        .follow_links(false)
        .max_depth(options.max_depth.saturating_add(1))
        .sort_by(|a, b| {
            a.file_type()
                .is_dir()
                .cmp(&b.file_type().is_dir())
                .then_with(|| a.file_name().cmp(b.file_name()))
        })
        .into_iter()
        .filter_entry(move |e| {
            e.depth() == 0 || include_hidden || !e.file_type().is_dir() || !is_hidden_or_system(e)
        });

    for entry in walker {
        ensure_active(cancel)?;
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            if entry.depth() <= options.max_depth {
                counters.report(progress, root);
                counters.directories_visited += 1;
            }
            continue;
        }
        // Symlinks are never followed.
        if !file_type.is_file() {
            continue;
        }

        counters.files_visited += 1;
        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf());
        if let Some(candidate) = evaluate_file(path, root, &relative, options, matcher) {
            results.push(candidate);
            counters.files_matched += 1;
        }

        if counters.files_visited % PROGRESS_EVERY_FILES == 0 {
            counters.report(progress, root);
        }
    }

    Ok(())
}

fn evaluate_file(
    path: &Path,
    root: &Path,
    relative: &Path,
    options: &ScanOptions,
    matcher: &GlobMatcher,
) -> Option<FileCandidate> {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) => {
            debug!("Skipping {}: {}", path.display(), e);
            return None;
        }
    };

    let attributes = read_attributes(path, &metadata);
    if !options.include_hidden && attributes.is_hidden_or_system() {
        return None;
    }

    let size = metadata.len();
    if options.min_size_bytes.is_some_and(|min| size < min) {
        return None;
    }
    if options.max_size_bytes.is_some_and(|max| size > max) {
        return None;
    }

    if !matcher.is_match(&relative.to_string_lossy()) {
        return None;
    }

    let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    Some(FileCandidate {
        root_path: root.to_path_buf(),
        full_path: path.to_path_buf(),
        relative_path: relative.to_path_buf(),
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        extension: path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default(),
        size_bytes: size,
        last_write_time: DateTime::<Utc>::from(modified),
        attributes,
    })
}

fn is_hidden_or_system(entry: &DirEntry) -> bool {
    entry
        .metadata()
        .map(|m| read_attributes(entry.path(), &m).is_hidden_or_system())
        .unwrap_or(false)
}

#[cfg(windows)]
fn read_attributes(_path: &Path, metadata: &fs::Metadata) -> FileAttributes {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    const FILE_ATTRIBUTE_SYSTEM: u32 = 0x4;

    let bits = metadata.file_attributes();
    FileAttributes {
        hidden: bits & FILE_ATTRIBUTE_HIDDEN != 0,
        system: bits & FILE_ATTRIBUTE_SYSTEM != 0,
        read_only: metadata.permissions().readonly(),
    }
}

#[cfg(not(windows))]
fn read_attributes(path: &Path, metadata: &fs::Metadata) -> FileAttributes {
    let hidden = path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false);
    FileAttributes {
        hidden,
        system: false,
        read_only: metadata.permissions().readonly(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::sync::mpsc::unbounded_channel;

    fn touch(path: &Path, content: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn names(candidates: &[FileCandidate]) -> Vec<String> {
        let mut v: Vec<String> = candidates
            .iter()
            .map(|c| c.relative_path.to_string_lossy().replace('\\', "/"))
            .collect();
        v.sort();
        v
    }

    fn scan(options: &ScanOptions) -> Vec<FileCandidate> {
        FileScanner::new()
            .scan(options, None, &CancellationToken::new())
            .unwrap()
    }

    #[test]
    fn max_depth_zero_returns_only_top_level_files() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("top.txt"), b"a");
        touch(&tmp.path().join("sub/nested.txt"), b"b");

        let mut options = ScanOptions::new(vec![tmp.path().to_path_buf()]);
        options.max_depth = 0;
        assert_eq!(names(&scan(&options)), vec!["top.txt"]);

        options.max_depth = 1;
        assert_eq!(names(&scan(&options)), vec!["sub/nested.txt", "top.txt"]);
    }

    #[test]
    fn exclude_glob_beats_include_glob() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("keep.txt"), b"a");
        touch(&tmp.path().join("bin/Debug/out.txt"), b"b");
        touch(&tmp.path().join("photo.png"), b"c");

        let mut options = ScanOptions::new(vec![tmp.path().to_path_buf()]);
        options.include_glob = "**/*.txt".into();
        assert_eq!(names(&scan(&options)), vec!["keep.txt"]);
    }

    #[test]
    fn size_bounds_are_inclusive() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("small.txt"), b"1");
        touch(&tmp.path().join("exact.txt"), b"12345");
        touch(&tmp.path().join("large.txt"), b"1234567890");

        let mut options = ScanOptions::new(vec![tmp.path().to_path_buf()]);
        options.min_size_bytes = Some(5);
        options.max_size_bytes = Some(5);
        assert_eq!(names(&scan(&options)), vec!["exact.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn hidden_entries_excluded_unless_requested() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("visible.txt"), b"a");
        touch(&tmp.path().join(".hidden.txt"), b"b");
        touch(&tmp.path().join(".cache/inside.txt"), b"c");

        let mut options = ScanOptions::new(vec![tmp.path().to_path_buf()]);
        assert_eq!(names(&scan(&options)), vec!["visible.txt"]);

        options.include_hidden = true;
        assert_eq!(
            names(&scan(&options)),
            vec![".cache/inside.txt", ".hidden.txt", "visible.txt"]
        );
    }

    #[test]
    fn file_root_is_a_single_candidate() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("Report.PDF");
        touch(&file, b"%PDF");
        touch(&tmp.path().join("sibling.txt"), b"x");

        let options = ScanOptions::new(vec![file.clone()]);
        let found = scan(&options);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].full_path, file);
        assert_eq!(found[0].root_path, tmp.path());
        assert_eq!(found[0].relative_path, PathBuf::from("Report.PDF"));
        assert_eq!(found[0].extension, "pdf");
        assert_eq!(found[0].size_bytes, 4);
    }

    #[test]
    fn duplicate_and_missing_roots_are_tolerated() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("a.txt"), b"a");

        let options = ScanOptions::new(vec![
            tmp.path().to_path_buf(),
            tmp.path().to_path_buf(),
            tmp.path().join("does-not-exist"),
        ]);
        assert_eq!(names(&scan(&options)), vec!["a.txt"]);
    }

    #[test]
    fn equivalent_root_spellings_scan_once() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("docs/a.txt"), b"a");
        let docs = tmp.path().join("docs");

        let options = ScanOptions::new(vec![docs.clone(), docs.join(".")]);
        assert_eq!(names(&scan(&options)), vec!["a.txt"]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn roots_differing_only_in_case_are_distinct() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("A/upper.txt"), b"a");
        touch(&tmp.path().join("a/lower.txt"), b"b");

        let options = ScanOptions::new(vec![tmp.path().join("A"), tmp.path().join("a")]);
        assert_eq!(names(&scan(&options)), vec!["lower.txt", "upper.txt"]);
    }

    #[test]
    fn files_are_listed_before_subdirectories() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("a/inner.txt"), b"a");
        touch(&tmp.path().join("z.txt"), b"z");
        touch(&tmp.path().join("m.txt"), b"m");

        let found = scan(&ScanOptions::new(vec![tmp.path().to_path_buf()]));
        let order: Vec<String> = found
            .iter()
            .map(|c| c.relative_path.to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(order, vec!["m.txt", "z.txt", "a/inner.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_not_followed() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("real/a.txt"), b"a");
        std::os::unix::fs::symlink(tmp.path().join("real"), tmp.path().join("link")).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("real/a.txt"), tmp.path().join("b.txt")).unwrap();

        let found = scan(&ScanOptions::new(vec![tmp.path().to_path_buf()]));
        assert_eq!(names(&found), vec!["real/a.txt"]);
    }

    #[test]
    fn canceled_token_stops_scan() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("a.txt"), b"a");

        let cancel = CancellationToken::new();
        cancel.cancel();
        let options = ScanOptions::new(vec![tmp.path().to_path_buf()]);
        let result = FileScanner::new().scan(&options, None, &cancel);
        assert_eq!(result, Err(Canceled));
    }

    #[test]
    fn progress_counters_are_monotonic_and_final() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("a.txt"), b"a");
        touch(&tmp.path().join("x/b.txt"), b"b");
        touch(&tmp.path().join("x/y/c.md"), b"c");

        let (tx, mut rx) = unbounded_channel();
        let mut options = ScanOptions::new(vec![tmp.path().to_path_buf()]);
        options.include_glob = "**/*.txt".into();
        FileScanner::new()
            .scan(&options, Some(&tx), &CancellationToken::new())
            .unwrap();
        drop(tx);

        let mut reports = Vec::new();
        while let Ok(p) = rx.try_recv() {
            reports.push(p);
        }
        assert!(!reports.is_empty());
        for pair in reports.windows(2) {
            assert!(pair[1].files_visited >= pair[0].files_visited);
            assert!(pair[1].directories_visited >= pair[0].directories_visited);
        }
        let last = reports.last().unwrap();
        assert_eq!(last.directories_visited, 3);
        assert_eq!(last.files_visited, 3);
        assert_eq!(last.files_matched, 2);
    }

    #[tokio::test]
    async fn scan_async_matches_blocking_scan() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("a.txt"), b"a");
        let options = ScanOptions::new(vec![tmp.path().to_path_buf()]);
        let found = FileScanner::new()
            .scan_async(options, None, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(names(&found), vec!["a.txt"]);
    }
}
