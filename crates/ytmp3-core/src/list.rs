//! URL list parsing

use crate::error::ListError;
use crate::outcome::WorkItem;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Read a newline-delimited URL list. Blank lines and `#` comments are ignored.
pub async fn read_list(path: &Path) -> Result<Vec<WorkItem>, ListError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| match source.kind() {
            ErrorKind::NotFound => ListError::NotFound(path.to_path_buf()),
            _ => ListError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

    let items = parse_list(&content);
    debug!("Read {} URLs from {}", items.len(), path.display());
    Ok(items)
}

pub fn parse_list(content: &str) -> Vec<WorkItem> {
    content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .enumerate()
        .map(|(idx, url)| WorkItem::new(idx + 1, url))
        .collect()
}
