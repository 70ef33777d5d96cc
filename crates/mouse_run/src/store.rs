use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use micromouse::storage::BlobStore;
use tracing::warn;

/// Blob store backed by one file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl BlobStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) {
        let path = self.path(key);
        if let Err(e) = fs::write(&path, value) {
            warn!("Failed to write {:?}: {}", path, e);
        }
    }

    fn remove(&mut self, key: &str) {
        let path = self.path(key);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove {:?}: {}", path, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("mouse-run-{tag}-{}-{nanos}", std::process::id()))
    }

    #[test]
    fn round_trips_values_through_files() {
        let dir = scratch_dir("store");
        let mut store = FileStore::new(&dir).unwrap();
        assert!(store.get("mouse-maze-demo").is_none());

        store.set("mouse-maze-demo", "{\"a\":1}");
        assert_eq!(store.get("mouse-maze-demo").as_deref(), Some("{\"a\":1}"));
        assert!(dir.join("mouse-maze-demo.json").exists());

        store.remove("mouse-maze-demo");
        store.remove("mouse-maze-demo");
        assert!(store.get("mouse-maze-demo").is_none());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn keys_cannot_escape_the_directory() {
        let dir = scratch_dir("escape");
        let store = FileStore::new(&dir).unwrap();
        let path = store.path("../../etc/passwd");
        assert_eq!(path.parent(), Some(store.dir()));
        let _ = fs::remove_dir_all(&dir);
    }
}
