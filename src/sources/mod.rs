/*!
 * Document sources supplying the learner's marked sentences.
 *
 * - Notion: a page looked up by its exact title
 * - Local: a `.md` or `.txt` file looked up by its stem under a directory
 */

use async_trait::async_trait;
use log::info;

use crate::errors::SourceError;
use crate::selector::{ContentSelector, MarkedLine};

/// Common trait for all document sources
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Short name used in log messages
    fn name(&self) -> &str;

    /// Return the raw lines of the document identified by `topic`, in order
    ///
    /// # Errors
    /// * `SourceError::PageNotFound` - nothing matches `topic`
    /// * `SourceError::AmbiguousTarget` - more than one document matches
    async fn fetch_lines(&self, topic: &str) -> Result<Vec<String>, SourceError>;
}

/// Fetch a topic from `source` and apply the selection rule
pub async fn fetch_marked_lines(
    source: &dyn ContentSource,
    topic: &str,
    max_count: usize,
) -> Result<Vec<MarkedLine>, SourceError> {
    if max_count == 0 {
        return Err(SourceError::InvalidCount);
    }

    let lines = source.fetch_lines(topic).await?;
    let selected = ContentSelector::select(topic, &lines, max_count)?;
    info!(
        "Loaded {} sentence(s) from {} page '{}'",
        selected.len(),
        source.name(),
        topic
    );
    Ok(selected)
}

pub mod local;
pub mod notion;
