use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file, creating parent directories
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir(parent)?;
            }
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Deserialize a JSON file
    pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
        let content = Self::read_to_string(&path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON file: {:?}", path.as_ref()))
    }

    /// Serialize a value as pretty-printed JSON
    pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value)
            .context("Failed to serialize value to JSON")?;
        Self::write_to_file(path, &content)
    }

    // @generates: Deck path, adding the .apkg extension when missing
    pub fn deck_output_path<P: AsRef<Path>>(output_dir: P, filename: &str) -> PathBuf {
        let path = output_dir.as_ref().join(filename);
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("apkg")) {
            path
        } else {
            path.with_extension("apkg")
        }
    }
}
