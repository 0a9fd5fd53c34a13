use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

/// Files on the local disk, relative to `base_path` unless absolute.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    /// Resolves paths against the working directory.
    pub fn working_dir() -> Self {
        Self::new(String::new())
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&full_path, data)?;
        Ok(full_path.to_string_lossy().into_owned())
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);
        fs::remove_file(full_path)?;
        Ok(())
    }
}
