//! Cross-platform application paths

use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Result<Self, String> {
        let data_dir = Self::get_data_dir()?;

        fs::create_dir_all(&data_dir)
            .map_err(|e| format!("Failed to create data directory: {}", e))?;

        Ok(Self { data_dir })
    }

    fn get_data_dir() -> Result<PathBuf, String> {
        let base = dirs::data_dir().ok_or("Could not determine data directory")?;
        Ok(base.join("micromouse"))
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    /// Where `FileStore` keeps finished maze maps, one `<key>.json` per maze
    /// name. A map found here lets the next run skip exploring that maze.
    pub fn memory_dir(&self) -> PathBuf {
        self.data_dir.join("memory")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn everything_lives_under_the_data_dir() {
        let paths = AppPaths {
            data_dir: PathBuf::from("/data/micromouse"),
        };
        assert_eq!(paths.config_file(), PathBuf::from("/data/micromouse/config.json"));
        assert_eq!(paths.memory_dir(), PathBuf::from("/data/micromouse/memory"));
        assert!(paths.memory_dir().starts_with(paths.data_dir()));
    }
}
