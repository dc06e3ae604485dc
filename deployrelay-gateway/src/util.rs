use deployrelay_domain::{InternalError, RelayError, BUNYAN_INFO_LEVEL};
use serde_json::Value;
use std::{io::ErrorKind, path::Path};
use tracing::error;

pub const TAIL_LINES: usize = 20;
pub const RECENT_EVENTS: usize = 10;

/// Returns the line as a JSON value if it was logged at info level.
///
/// Bunyan records are matched on their numeric level; anything else written
/// to the file is matched on an `INFO` marker.
fn info_record(line: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(line) {
        Ok(record) if record.is_object() => {
            (record.get("level").and_then(Value::as_u64) == Some(BUNYAN_INFO_LEVEL))
                .then_some(record)
        }
        _ => line
            .contains("INFO")
            .then(|| Value::String(line.to_owned())),
    }
}

/// Info-level records among the last [`TAIL_LINES`] lines of `contents`,
/// newest last, at most [`RECENT_EVENTS`] of them.
pub fn recent_events_from(contents: &str) -> Vec<Value> {
    let lines: Vec<&str> = contents.lines().collect();
    let tail = &lines[lines.len().saturating_sub(TAIL_LINES)..];

    let events: Vec<Value> = tail
        .iter()
        .map(|line| line.trim())
        .filter_map(info_record)
        .collect();

    let skip = events.len().saturating_sub(RECENT_EVENTS);
    events.into_iter().skip(skip).collect()
}

pub async fn recent_events(path: &Path) -> Result<Vec<Value>, RelayError> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(recent_events_from(&contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(vec![]),
        Err(e) => {
            error!("Could not read log file {}: {e}", path.display());
            Err(InternalError::io_err(&e.to_string(), Some("log_file")))
        }
    }
}
