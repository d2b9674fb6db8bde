//! Filesystem operations
//!
//! Handles reading and writing capability files.

use std::path::Path;

use crate::error::ConfigError;

/// Write content to a file, creating parent directories
pub fn write_file(path: &Path, content: &str) -> Result<(), ConfigError> {
    let io_error = |e: std::io::Error| ConfigError::WriteFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, content).map_err(io_error)
}

/// Read content from a file
pub fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested/atboot.toml");
        write_file(&path, "[capabilities]\n").unwrap();
        assert_eq!(read_file(&path).unwrap(), "[capabilities]\n");
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = read_file(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
