use crate::sync_error::{Result, SyncError};
use chrono::Utc;
use crossterm::{cursor, QueueableCommand};
use std::io::{Stdout, Write};

/// Rewrite the current terminal line in place, for progress counters.
pub fn rewrite_message(mut stdout: Stdout, msg: String) -> Result<()> {
    stdout.queue(cursor::SavePosition).map_err(SyncError::network)?;
    stdout.write_all(msg.as_bytes())?;
    stdout.queue(cursor::RestorePosition).map_err(SyncError::network)?;
    stdout.flush()?;
    Ok(())
}

/// Client-generated creation timestamp: UTC milliseconds, string-encoded the
/// way the backend schema expects.
pub fn timestamp_now() -> String {
    Utc::now().timestamp_millis().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_plain_millisecond_integers() {
        let ts = timestamp_now();
        assert!(ts.parse::<i64>().is_ok());
    }
}
