use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde_json::{Map, Value};

use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Characters of a bad payload echoed back in the warning
const PREVIEW_CHARS: usize = 50;

const DEVICES_QUERY: &str = "SELECT device FROM devices";

/// Device rows pulled from one survey
#[derive(Debug, Default)]
pub struct SurveyRows {
    pub records: Vec<Map<String, Value>>,
    /// Rows that could not be decoded and were skipped
    pub skipped: usize,
}

/// Open a Kismet survey database read-only. Never creates the file.
pub fn open_survey(path: &Path) -> Result<Connection> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| Error::database(path, e))?;

    // Kismet may still hold the log open while capturing
    conn.busy_timeout(Duration::from_secs(5))
        .map_err(|e| Error::database(path, e))?;

    log::info!("Successfully connected to {}", path.display());
    Ok(conn)
}

/// Read and decode every row of the `devices` table.
///
/// Undecodable rows are logged and counted, never fatal. Zero decoded rows is
/// reported as [`Error::EmptyInput`].
pub fn read_devices(conn: &Connection, path: &Path) -> Result<SurveyRows> {
    let mut stmt = conn
        .prepare(DEVICES_QUERY)
        .map_err(|e| Error::database(path, e))?;
    let mut rows = stmt.query([]).map_err(|e| Error::database(path, e))?;

    let mut survey = SurveyRows::default();
    let mut index = 0usize;

    while let Some(row) = rows.next().map_err(|e| Error::database(path, e))? {
        let decoded = match row.get_ref(0) {
            Ok(ValueRef::Text(bytes)) | Ok(ValueRef::Blob(bytes)) => decode_device(index, bytes),
            Ok(_) => {
                log::warn!("Row {}: device column is neither text nor blob, skipping", index);
                None
            }
            Err(e) => {
                log::warn!("Row {}: cannot read device column: {}", index, e);
                None
            }
        };

        match decoded {
            Some(record) => survey.records.push(record),
            None => survey.skipped += 1,
        }
        index += 1;
    }

    log::info!(
        "Extracted JSON data for {} devices ({} skipped) from {}",
        survey.records.len(),
        survey.skipped,
        path.display()
    );

    if survey.records.is_empty() {
        return Err(Error::EmptyInput {
            path: path.to_path_buf(),
        });
    }

    Ok(survey)
}

/// Open, read, and close a survey in one step.
pub fn load_survey(path: &Path) -> Result<SurveyRows> {
    let conn = open_survey(path)?;
    read_devices(&conn, path)
}

fn decode_device(index: usize, bytes: &[u8]) -> Option<Map<String, Value>> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Some(map),
        Ok(other) => {
            log::warn!(
                "Row {}: device JSON is a {} rather than an object, skipping",
                index,
                json_kind(&other)
            );
            None
        }
        Err(source) => {
            let err = Error::RecordParse {
                row: index,
                preview: preview(bytes),
                source,
            };
            log::warn!("{}", err);
            None
        }
    }
}

fn preview(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .take(PREVIEW_CHARS)
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
