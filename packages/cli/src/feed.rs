//! Loading the event feed from disk.

use std::path::Path;

use quake_map_quake_models::{Event, FeedResponse};

/// Errors raised while reading a feed file.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The file could not be read.
    #[error("Failed to read feed {path}: {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is neither a record array nor a `{ "data": [...] }` envelope.
    #[error("Failed to parse feed {path}: {source}")]
    Json {
        /// Path that was being parsed.
        path: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Reads every event from `path`.
///
/// # Errors
///
/// Returns [`FeedError`] if the file cannot be read or parsed.
pub fn load(path: &Path) -> Result<Vec<Event>, FeedError> {
    let contents = std::fs::read_to_string(path).map_err(|source| FeedError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let events = parse(&contents).map_err(|source| FeedError::Json {
        path: path.display().to_string(),
        source,
    })?;
    log::info!("Loaded {} events from {}", events.len(), path.display());
    Ok(events)
}

fn parse(contents: &str) -> Result<Vec<Event>, serde_json::Error> {
    serde_json::from_str::<FeedResponse>(contents).map(FeedResponse::into_events)
}
