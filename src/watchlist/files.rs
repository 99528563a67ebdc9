//! Per-category target files: one fingerprint per line, one file per category or
//! SSID set, all under an explicit base directory.

use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::survey::{Category, Snapshot, SnapshotBuilder};

use super::{remove_if_present, write_atomic};

/// Which part of a snapshot a target file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSet {
    Devices(Category),
    AdvertisedNames,
    ProbedNames,
}

pub const TARGET_FILES: &[(&str, TargetSet)] = &[
    ("BT.txt", TargetSet::Devices(Category::BluetoothClassic)),
    ("BTLE.txt", TargetSet::Devices(Category::BluetoothLowEnergy)),
    ("CLIENT.txt", TargetSet::Devices(Category::WifiClient)),
    ("AP.txt", TargetSet::Devices(Category::WifiAccessPoint)),
    ("SENSORS.txt", TargetSet::Devices(Category::Sensor)),
    ("SSID.txt", TargetSet::AdvertisedNames),
    ("PROBED_SSID.txt", TargetSet::ProbedNames),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChange {
    Removed,
    AlreadyAbsent,
}

#[derive(Debug, Clone)]
pub struct TargetFiles {
    base_dir: PathBuf,
}

impl TargetFiles {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.base_dir.join(file_name)
    }

    /// Overwrite every target file with the matching set from `snapshot`.
    pub fn write(&self, snapshot: &Snapshot) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.base_dir).map_err(|e| Error::io(&self.base_dir, e))?;

        let mut written = Vec::with_capacity(TARGET_FILES.len());
        for (file_name, set) in TARGET_FILES {
            let lines: Vec<&str> = match set {
                TargetSet::Devices(category) => snapshot.devices(*category).collect(),
                TargetSet::AdvertisedNames => {
                    snapshot.advertised_names().iter().map(String::as_str).collect()
                }
                TargetSet::ProbedNames => {
                    snapshot.probed_names().iter().map(String::as_str).collect()
                }
            };
            let path = self.path_for(file_name);
            write_atomic(&path, lines.join("\n").as_bytes())?;
            log::debug!("Wrote {} entries to {}", lines.len(), path.display());
            written.push(path);
        }

        log::info!("Target files written to {}", self.base_dir.display());
        Ok(written)
    }

    /// Rebuild a snapshot from the target files. Unreadable files are skipped with a
    /// warning; if none can be read the result is [`Error::EmptyInput`].
    pub fn read(&self) -> Result<Snapshot> {
        let mut builder = SnapshotBuilder::default();
        let mut files_read = 0;

        for (file_name, set) in TARGET_FILES {
            let path = self.path_for(file_name);
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    log::warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            files_read += 1;

            for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
                let entry = line.to_string();
                match set {
                    TargetSet::Devices(category) => builder.insert_device(*category, entry),
                    TargetSet::AdvertisedNames => builder.insert_advertised_name(entry),
                    TargetSet::ProbedNames => builder.insert_probed_name(entry),
                }
            }
        }

        if files_read == 0 {
            return Err(Error::EmptyInput {
                path: self.base_dir.clone(),
            });
        }

        let snapshot = builder.finish();
        log::info!(
            "Loaded {} of {} target files from {} ({})",
            files_read,
            TARGET_FILES.len(),
            self.base_dir.display(),
            snapshot
        );
        Ok(snapshot)
    }

    /// Delete every target file. Failures are logged and reported as still present.
    pub fn clean(&self) -> Vec<(PathBuf, FileChange)> {
        let mut results = Vec::new();
        for (file_name, _) in TARGET_FILES {
            let path = self.path_for(file_name);
            match remove_if_present(&path) {
                Ok(true) => results.push((path, FileChange::Removed)),
                Ok(false) => results.push((path, FileChange::AlreadyAbsent)),
                Err(e) => log::warn!("Could not remove target file: {}", e),
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        let mut builder = SnapshotBuilder::default();
        builder.insert_device(Category::BluetoothClassic, "00:11:22:33:44:55".to_string());
        builder.insert_device(Category::WifiAccessPoint, "AA:BB:CC:DD:EE:FF".to_string());
        builder.insert_device(Category::WifiAccessPoint, "AA:BB:CC:DD:EE:00".to_string());
        builder.insert_advertised_name("home".to_string());
        builder.insert_probed_name("cafe wifi".to_string());
        builder.finish()
    }

    #[test]
    fn test_write_layout() {
        let dir = tempfile::tempdir().unwrap();
        let files = TargetFiles::new(dir.path());
        let written = files.write(&sample()).unwrap();
        assert_eq!(written.len(), TARGET_FILES.len());

        assert_eq!(
            fs::read_to_string(files.path_for("AP.txt")).unwrap(),
            "AA:BB:CC:DD:EE:00\nAA:BB:CC:DD:EE:FF"
        );
        assert_eq!(fs::read_to_string(files.path_for("SENSORS.txt")).unwrap(), "");
        assert_eq!(fs::read_to_string(files.path_for("PROBED_SSID.txt")).unwrap(), "cafe wifi");
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let files = TargetFiles::new(dir.path());
        let snapshot = sample();
        files.write(&snapshot).unwrap();
        assert_eq!(files.read().unwrap(), snapshot);
    }

    #[test]
    fn test_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let files = TargetFiles::new(dir.path());
        files.write(&sample()).unwrap();
        files.write(&Snapshot::default()).unwrap();
        assert_eq!(fs::read_to_string(files.path_for("AP.txt")).unwrap(), "");
    }

    #[test]
    fn test_read_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let files = TargetFiles::new(dir.path());
        fs::write(files.path_for("AP.txt"), "01\n\n 02 \n").unwrap();

        let snapshot = files.read().unwrap();
        let aps: Vec<&str> = snapshot.devices(Category::WifiAccessPoint).collect();
        assert_eq!(aps, vec!["01", "02"]);
        assert_eq!(snapshot.device_count(), 2);
    }

    #[test]
    fn test_read_nothing_is_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = TargetFiles::new(dir.path()).read().unwrap_err();
        assert!(matches!(err, Error::EmptyInput { .. }));
    }

    #[test]
    fn test_clean() {
        let dir = tempfile::tempdir().unwrap();
        let files = TargetFiles::new(dir.path());
        fs::write(files.path_for("BT.txt"), "01").unwrap();

        let results = files.clean();
        assert_eq!(results.len(), TARGET_FILES.len());
        assert!(results.contains(&(files.path_for("BT.txt"), FileChange::Removed)));
        assert!(results.contains(&(files.path_for("AP.txt"), FileChange::AlreadyAbsent)));
        assert!(!files.path_for("BT.txt").exists());

        assert!(files.clean().iter().all(|(_, c)| *c == FileChange::AlreadyAbsent));
    }
}
