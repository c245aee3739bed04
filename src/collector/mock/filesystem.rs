//! In-memory mock filesystem for liveness checks without real `/proc`.

use crate::collector::traits::FileSystem;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Only tracks which paths exist.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    paths: HashSet<PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory. Parent directories are automatically created.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        for ancestor in path.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                self.paths.insert(ancestor.to_path_buf());
            }
        }
    }

    /// Removes a path, simulating a process exiting.
    pub fn remove(&mut self, path: impl AsRef<Path>) {
        self.paths.remove(path.as_ref());
    }
}

impl FileSystem for MockFs {
    fn exists(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fs_add_dir_creates_parents() {
        let mut fs = MockFs::new();
        fs.add_dir("/proc/123");

        assert!(fs.exists(Path::new("/proc/123")));
        assert!(fs.exists(Path::new("/proc")));
        assert!(!fs.exists(Path::new("/proc/124")));
    }

    #[test]
    fn test_mock_fs_remove() {
        let mut fs = MockFs::new();
        fs.add_dir("/proc/123");
        fs.remove("/proc/123");

        assert!(!fs.exists(Path::new("/proc/123")));
        assert!(fs.exists(Path::new("/proc")));
    }
}
