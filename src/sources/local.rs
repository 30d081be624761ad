use async_trait::async_trait;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::SourceError;
use super::ContentSource;

/// File extensions a local page may have
const PAGE_EXTENSIONS: [&str; 2] = ["md", "txt"];

/// Reads pages from `<root>/**/<topic>.md` or `<topic>.txt`
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// All files under the root whose stem equals `topic`, sorted by path
    pub fn find_pages(&self, topic: &str) -> Vec<PathBuf> {
        let mut pages: Vec<PathBuf> = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.into_path())
            .filter(|path| path.is_file() && is_page_for(path, topic))
            .collect();
        pages.sort();
        pages
    }
}

fn is_page_for(path: &Path, topic: &str) -> bool {
    let stem_matches = path.file_stem().is_some_and(|stem| stem.to_string_lossy() == topic);
    let extension_matches = path.extension().is_some_and(|ext| {
        PAGE_EXTENSIONS
            .iter()
            .any(|allowed| ext.to_string_lossy().eq_ignore_ascii_case(allowed))
    });
    stem_matches && extension_matches
}

/// Strip a leading Markdown bullet so list items read as plain sentences
fn strip_bullet(line: &str) -> &str {
    let trimmed = line.trim_start();
    trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("+ "))
        // `* ` is a bullet, `**` is emphasis
        .or_else(|| trimmed.strip_prefix("* "))
        .unwrap_or(line)
}

#[async_trait]
impl ContentSource for LocalSource {
    fn name(&self) -> &str {
        "local"
    }

    async fn fetch_lines(&self, topic: &str) -> Result<Vec<String>, SourceError> {
        let pages = self.find_pages(topic);
        let page = match pages.as_slice() {
            [] => return Err(SourceError::PageNotFound(topic.to_string())),
            [page] => page,
            _ => {
                return Err(SourceError::AmbiguousTarget {
                    title: topic.to_string(),
                    count: pages.len(),
                })
            }
        };

        let content = tokio::fs::read_to_string(page).await?;
        Ok(content.lines().map(|line| strip_bullet(line).to_string()).collect())
    }
}
