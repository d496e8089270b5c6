use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

pub const DEFAULT_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

/// One eligible image file in the photo directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub filename: String,
    pub path: PathBuf,
    pub modified_at: SystemTime,
}

/// Lists image files sitting directly inside a directory.
#[derive(Debug, Clone)]
pub struct ImageInventory {
    extensions: Vec<String>,
}

impl ImageInventory {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    /// Immediate image files of `dir`, sorted by filename.
    ///
    /// A directory that is missing or cannot be read yields an empty list.
    /// Files whose names are not valid UTF-8 are skipped with a warning.
    pub fn list(&self, dir: &Path) -> Vec<InventoryEntry> {
        if !dir.is_dir() {
            log::debug!("Photo directory {} is missing; nothing to list", dir.display());
            return Vec::new();
        }

        let mut entries: Vec<InventoryEntry> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::debug!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && self.is_supported(entry.path()))
            .filter_map(|entry| {
                // Filenames are handed to callers as strings; a lossy
                // conversion could make two files share one name.
                let Some(filename) = entry.file_name().to_str().map(str::to_owned) else {
                    log::warn!(
                        "Skipping {}: filename is not valid UTF-8",
                        entry.path().display()
                    );
                    return None;
                };
                Some(InventoryEntry {
                    filename,
                    modified_at: modified_time(entry.path()),
                    path: entry.into_path(),
                })
            })
            .collect();

        entries.sort_by(|a, b| a.filename.cmp(&b.filename));
        log::debug!("Listed {} image(s) in {}", entries.len(), dir.display());
        entries
    }
}

impl Default for ImageInventory {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

/// Create `dir` (and parents) if it does not exist yet.
pub fn ensure_directory(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

/// Modification time of a file, falling back to UNIX_EPOCH on error.
fn modified_time(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"x").unwrap();
        path
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let inventory = ImageInventory::default();
        assert!(inventory.list(&temp_dir.path().join("nope")).is_empty());
    }

    #[test]
    fn test_filters_extensions_case_insensitively() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "b.JPG");
        touch(temp_dir.path(), "a.png");
        touch(temp_dir.path(), "c.WebP");
        touch(temp_dir.path(), "d.gif");
        touch(temp_dir.path(), "e.jpeg");
        touch(temp_dir.path(), "notes.txt");
        touch(temp_dir.path(), "quote.pdf");
        touch(temp_dir.path(), "noext");

        let names: Vec<_> = ImageInventory::default()
            .list(temp_dir.path())
            .into_iter()
            .map(|e| e.filename)
            .collect();
        assert_eq!(names, vec!["a.png", "b.JPG", "c.WebP", "d.gif", "e.jpeg"]);
    }

    #[test]
    fn test_does_not_recurse_or_list_directories() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "top.jpg");
        let nested = temp_dir.path().join("nested.jpg");
        fs::create_dir(&nested).unwrap();
        touch(&nested, "inner.jpg");

        let entries = ImageInventory::default().list(temp_dir.path());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].filename, "top.jpg");
    }

    #[test]
    fn test_entries_carry_modification_time() {
        let temp_dir = TempDir::new().unwrap();
        let path = touch(temp_dir.path(), "shot.png");
        filetime::set_file_mtime(&path, FileTime::from_unix_time(1_600_000_000, 0)).unwrap();

        let entries = ImageInventory::default().list(temp_dir.path());
        let expected = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_600_000_000);
        assert_eq!(entries[0].modified_at, expected);
        assert_eq!(entries[0].path, path);
    }

    #[test]
    fn test_custom_extensions_accept_leading_dot() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "scan.TIFF");
        touch(temp_dir.path(), "shot.png");

        let inventory = ImageInventory::new([".tiff"]);
        let entries = inventory.list(temp_dir.path());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].filename, "scan.TIFF");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_skips_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(OsStr::from_bytes(b"job\xff.png")), b"x").unwrap();
        fs::write(temp_dir.path().join(OsStr::from_bytes(b"job\xfe.png")), b"x").unwrap();
        touch(temp_dir.path(), "job_ok.png");

        let entries = ImageInventory::default().list(temp_dir.path());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].filename, "job_ok.png");
    }

    #[test]
    fn test_ensure_directory_creates_tree() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("img").join("portfolio");
        ensure_directory(&dir).unwrap();
        assert!(dir.is_dir());
        assert!(ImageInventory::default().list(&dir).is_empty());
    }
}
