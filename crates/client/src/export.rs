//! CSV export download.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::http::ApiResponse;

/// A downloaded inventory CSV, ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl CsvExport {
    /// Build from the `/items/export_csv/` response.
    ///
    /// The file name comes from `Content-Disposition` when the server sends a
    /// usable one, else `inventory_<timestamp>.csv` stamped with `now`.
    pub fn from_response(response: &ApiResponse, now: DateTime<Utc>) -> Self {
        let filename = response
            .header("content-disposition")
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| fallback_filename(now));

        Self {
            filename,
            content_type: response.header("content-type").map(str::to_string),
            bytes: response.body.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the payload as `dir/<filename>` and return the path written.
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// `inventory_2024-05-03T08-30-00Z.csv`: RFC 3339 with `:` swapped for `-`.
pub fn fallback_filename(now: DateTime<Utc>) -> String {
    format!("inventory_{}.csv", now.format("%Y-%m-%dT%H-%M-%SZ"))
}

/// Extract a bare file name from a `Content-Disposition` value.
///
/// Directory components are dropped so a hostile header cannot escape the
/// target directory.
fn filename_from_disposition(value: &str) -> Option<String> {
    let raw = value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))?
        .trim()
        .trim_matches('"');

    let name = raw.rsplit(['/', '\\']).next()?.trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}
