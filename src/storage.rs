//! Helpers for the download directory on disk.

use std::fs::DirEntry;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Extension of a completed download.
pub const PDF_EXTENSION: &str = ".pdf";

/// Suffixes a browser appends while a download is still being written.
pub const IN_PROGRESS_MARKERS: &[&str] = &[".crdownload", ".partial"];

/// Lifecycle state of a file in the download directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    InProgress,
    Complete,
}

/// A PDF (or partial PDF) found in the download directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub name: String,
    pub modified: SystemTime,
    pub state: FileState,
}

/// Create the download directory if needed and return its absolute path.
pub fn ensure_download_dir(dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    dir.canonicalize()
}

/// Classify a file name as a finished or partial PDF download.
pub fn classify(name: &str) -> Option<FileState> {
    if name.ends_with(PDF_EXTENSION) {
        return Some(FileState::Complete);
    }
    IN_PROGRESS_MARKERS
        .iter()
        .any(|marker| {
            name.strip_suffix(marker)
                .is_some_and(|stem| stem.ends_with(PDF_EXTENSION))
        })
        .then_some(FileState::InProgress)
}

/// List PDF and partial-PDF files in a directory.
pub fn list_candidates(dir: &Path) -> std::io::Result<Vec<DownloadedFile>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        if let Some(file) = candidate_from_entry(&entry?)? {
            files.push(file);
        }
    }

    Ok(files)
}

/// Describe one directory entry, or `None` if it is not a candidate.
///
/// The browser renames partial downloads while the directory is being
/// listed, so an entry that vanished before it could be stat'ed is skipped.
fn candidate_from_entry(entry: &DirEntry) -> std::io::Result<Option<DownloadedFile>> {
    let Ok(name) = entry.file_name().into_string() else {
        return Ok(None);
    };
    let Some(state) = classify(&name) else {
        return Ok(None);
    };

    let stat = entry
        .metadata()
        .and_then(|metadata| Ok((metadata.is_file(), metadata.modified()?)));
    let (is_file, modified) = match stat {
        Ok(stat) => stat,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    if !is_file {
        return Ok(None);
    }

    Ok(Some(DownloadedFile {
        path: entry.path(),
        name,
        modified,
        state,
    }))
}

/// Most recently modified PDF or partial PDF in the directory.
pub fn newest_candidate(dir: &Path) -> std::io::Result<Option<DownloadedFile>> {
    Ok(list_candidates(dir)?
        .into_iter()
        .max_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.name.cmp(&b.name))))
}

/// Output name for a completed download: `NNN-<original>`.
pub fn sequenced_name(sequence: u32, name: &str) -> String {
    format!("{:03}-{}", sequence, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str, modified: SystemTime) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        file.set_modified(modified).unwrap();
        path
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("report.pdf"), Some(FileState::Complete));
        assert_eq!(classify("report.pdf.crdownload"), Some(FileState::InProgress));
        assert_eq!(classify("report.pdf.partial"), Some(FileState::InProgress));
        assert_eq!(classify("report.html"), None);
        assert_eq!(classify("Unconfirmed 1234.crdownload"), None);
        assert_eq!(classify("report.PDF"), None);
    }

    #[test]
    fn test_sequenced_name_is_zero_padded() {
        assert_eq!(sequenced_name(7, "report.pdf"), "007-report.pdf");
        assert_eq!(sequenced_name(42, "x.pdf"), "042-x.pdf");
        assert_eq!(sequenced_name(1234, "x.pdf"), "1234-x.pdf");
    }

    #[test]
    fn test_ensure_download_dir_is_idempotent() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("nested").join("downloads");

        let first = ensure_download_dir(&target).unwrap();
        let second = ensure_download_dir(&target).unwrap();
        assert_eq!(first, second);
        assert!(first.is_absolute());
        assert!(target.is_dir());
    }

    #[test]
    fn test_newest_candidate_picks_latest_mtime() {
        let dir = tempdir().unwrap();
        let base = SystemTime::now() - Duration::from_secs(100);
        touch(dir.path(), "old.pdf", base);
        touch(dir.path(), "new.pdf.crdownload", base + Duration::from_secs(10));
        touch(dir.path(), "newest.txt", base + Duration::from_secs(20));

        let newest = newest_candidate(dir.path()).unwrap().unwrap();
        assert_eq!(newest.name, "new.pdf.crdownload");
        assert_eq!(newest.state, FileState::InProgress);
    }

    #[test]
    fn test_newest_candidate_empty_dir() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "notes.txt", SystemTime::now());
        assert!(newest_candidate(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_list_candidates_skips_directories() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("folder.pdf")).unwrap();
        touch(dir.path(), "a.pdf", SystemTime::now());

        let files = list_candidates(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "a.pdf");
    }

    #[test]
    fn test_entry_removed_before_stat_is_skipped() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.pdf.crdownload", SystemTime::now());
        let entries: Vec<DirEntry> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap())
            .collect();

        std::fs::rename(
            dir.path().join("a.pdf.crdownload"),
            dir.path().join("a.pdf"),
        )
        .unwrap();

        assert_eq!(candidate_from_entry(&entries[0]).unwrap(), None);

        let files = list_candidates(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "a.pdf");
        assert_eq!(files[0].state, FileState::Complete);
    }
}
