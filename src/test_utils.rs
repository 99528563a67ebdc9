use rusqlite::Connection;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

/// Row content for a synthetic `devices` table
enum Row {
    Text(String),
    Blob(Vec<u8>),
    Null,
}

/// Builder for throwaway Kismet survey databases
pub struct SurveyBuilder {
    rows: Vec<Row>,
}

/// A survey database living in its own temp directory
pub struct TestSurvey {
    _dir: tempfile::TempDir,
    path: PathBuf,
}

impl TestSurvey {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SurveyBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Add a device stored as TEXT
    pub fn device(mut self, device: Value) -> Self {
        self.rows.push(Row::Text(device.to_string()));
        self
    }

    /// Add a device stored as BLOB, the way Kismet writes it
    pub fn blob_device(mut self, device: Value) -> Self {
        self.rows.push(Row::Blob(device.to_string().into_bytes()));
        self
    }

    /// Add an arbitrary (possibly malformed) payload
    pub fn raw(mut self, payload: &str) -> Self {
        self.rows.push(Row::Text(payload.to_string()));
        self
    }

    pub fn null_row(mut self) -> Self {
        self.rows.push(Row::Null);
        self
    }

    pub fn build(self) -> TestSurvey {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("survey.kismet");
        let conn = Connection::open(&path).expect("Failed to create survey database");

        conn.execute(
            "CREATE TABLE devices (
                first_time INT,
                last_time INT,
                devkey TEXT,
                phyname TEXT,
                devmac TEXT,
                strongest_signal INT,
                min_lat REAL,
                min_lon REAL,
                max_lat REAL,
                max_lon REAL,
                avg_lat REAL,
                avg_lon REAL,
                bytes_data INT,
                type TEXT,
                device BLOB
            )",
            [],
        )
        .expect("Failed to create devices table");

        for row in self.rows {
            let inserted = match row {
                Row::Text(text) => conn.execute("INSERT INTO devices (device) VALUES (?1)", [text]),
                Row::Blob(bytes) => {
                    conn.execute("INSERT INTO devices (device) VALUES (?1)", [bytes])
                }
                Row::Null => conn.execute("INSERT INTO devices (device) VALUES (NULL)", []),
            };
            inserted.expect("Failed to insert device row");
        }

        TestSurvey { _dir: dir, path }
    }
}

pub fn bt_device(mac: &str) -> Value {
    json!({
        "kismet.device.base.type": "BR/EDR",
        "kismet.device.base.macaddr": mac,
        "kismet.device.base.manuf": "Unknown",
        "kismet.device.base.commonname": mac,
    })
}

pub fn ap_device(mac: &str, ssids: &[&str]) -> Value {
    let map: Vec<Value> = ssids
        .iter()
        .map(|s| json!({ "dot11.advertisedssid.ssid": s }))
        .collect();
    json!({
        "kismet.device.base.type": "Wi-Fi AP",
        "kismet.device.base.macaddr": mac,
        "kismet.device.base.manuf": "Ubiquiti",
        "dot11.device": { "dot11.device.advertised_ssid_map": map },
    })
}

pub fn client_device(mac: &str, manuf: &str, probes: &[&str]) -> Value {
    let map: Vec<Value> = probes
        .iter()
        .map(|s| json!({ "dot11.probedssid.ssid": s }))
        .collect();
    json!({
        "kismet.device.base.type": "Wi-Fi Client",
        "kismet.device.base.macaddr": mac,
        "kismet.device.base.manuf": manuf,
        "dot11.device": { "dot11.device.probed_ssid_map": map },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_survey_builder_creates_devices_table() {
        let survey = SurveyBuilder::new()
            .device(bt_device("00:11:22:33:44:55"))
            .null_row()
            .build();
        let conn = Connection::open(survey.path()).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM devices", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }
}
