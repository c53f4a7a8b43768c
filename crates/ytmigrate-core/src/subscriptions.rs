//! Subscription input from an exported CSV file.
//!
//! The subscription migration does not read the source account's API;
//! it consumes the CSV export produced by the account takeout tooling,
//! which carries `Channel Id` and `Channel Title` columns.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::InputError;

/// One row of the exported subscriptions CSV.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionEntry {
    /// Remote channel identifier.
    #[serde(rename = "Channel Id")]
    pub channel_id: String,
    /// Channel title, used only for reporting.
    #[serde(rename = "Channel Title")]
    pub channel_title: String,
}

/// Read all subscription entries from the CSV at `path`, in file order.
///
/// # Errors
///
/// Returns [`InputError::FileNotFound`] if the file does not exist,
/// [`InputError::ReadFailed`] if it cannot be opened, and
/// [`InputError::MalformedRow`] for rows missing the expected columns.
pub fn read_subscriptions(path: &Path) -> Result<Vec<SubscriptionEntry>, InputError> {
    if !path.exists() {
        return Err(InputError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::Reader::from_path(path).map_err(|e| InputError::ReadFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut entries = Vec::new();
    for (index, record) in reader.deserialize::<SubscriptionEntry>().enumerate() {
        let entry = record.map_err(|e| InputError::MalformedRow {
            path: path.to_path_buf(),
            // Header is line 1; the first data row is line 2.
            row: index as u64 + 2,
            reason: e.to_string(),
        })?;
        entries.push(entry);
    }

    info!(path = %path.display(), count = entries.len(), "read subscription export");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_subscriptions_in_file_order() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("subscriptions.csv");
        fs::write(
            &path,
            "Channel Id,Channel Url,Channel Title\n\
             chA,https://example.com/chA,Channel A\n\
             chB,https://example.com/chB,Channel B\n",
        )
        .expect("write csv");

        let entries = read_subscriptions(&path).expect("read should succeed");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].channel_id, "chA");
        assert_eq!(entries[0].channel_title, "Channel A");
        assert_eq!(entries[1].channel_id, "chB");
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = TempDir::new().expect("temp dir");
        let err = read_subscriptions(&dir.path().join("nope.csv"))
            .expect_err("missing file must fail");
        assert!(matches!(err, InputError::FileNotFound { .. }));
    }

    #[test]
    fn test_missing_column_is_malformed() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("subscriptions.csv");
        fs::write(&path, "Channel Url,Channel Title\nhttps://x,Channel A\n").expect("write csv");

        let err = read_subscriptions(&path).expect_err("missing column must fail");
        match err {
            InputError::MalformedRow { row, .. } => assert_eq!(row, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_export_is_empty_vec() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("subscriptions.csv");
        fs::write(&path, "Channel Id,Channel Url,Channel Title\n").expect("write csv");

        let entries = read_subscriptions(&path).expect("read should succeed");
        assert!(entries.is_empty());
    }
}
