mod classification;
mod record;
mod snapshot;

use std::path::Path;

use crate::db;
use crate::error::{Error, Result};

pub use classification::{Category, Classification, UNKNOWN_MANUFACTURER, classify};
pub use record::DeviceRecord;
pub use snapshot::{Snapshot, SnapshotBuilder, SnapshotSummary};

/// Read a survey database and reduce it to a snapshot.
///
/// Fails with [`Error::EmptyInput`] when the survey has no decodable rows or when
/// none of its devices fall into a watchlist category.
pub fn load(path: &Path) -> Result<Snapshot> {
    let rows = db::load_survey(path)?;

    let mut builder = SnapshotBuilder::default();
    for device in &rows.records {
        builder.add(&DeviceRecord::from_json(device));
    }
    let classified = builder.classified();
    let snapshot = builder.finish();

    log::info!(
        "{}: {} of {} devices classified ({})",
        path.display(),
        classified,
        rows.records.len(),
        snapshot
    );

    if classified == 0 || snapshot.is_empty() {
        return Err(Error::EmptyInput {
            path: path.to_path_buf(),
        });
    }
    Ok(snapshot)
}

/// Load a baseline survey. An empty baseline is `None` so the caller can skip
/// subtraction instead of confusing it with "nothing new".
pub fn load_baseline(path: &Path) -> Result<Option<Snapshot>> {
    match load(path) {
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(Error::EmptyInput { path }) => {
            log::warn!(
                "Baseline {} has no usable devices, skipping baseline subtraction",
                path.display()
            );
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Subtract `baseline` when there is one, otherwise pass `current` through.
pub fn apply_baseline(current: Snapshot, baseline: Option<&Snapshot>) -> Snapshot {
    match baseline {
        Some(baseline) => {
            let diffed = current.subtract(baseline);
            log::info!(
                "Baseline removed {} of {} devices; new: {}",
                current.device_count() - diffed.device_count(),
                current.device_count(),
                diffed
            );
            diffed
        }
        None => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{SurveyBuilder, ap_device, bt_device, client_device};
    use serde_json::json;

    #[test]
    fn test_load_survey_snapshot() {
        let survey = SurveyBuilder::new()
            .device(ap_device("AA:BB:CC:DD:EE:FF", &["home"]))
            .device(bt_device("00:11:22:33:44:55"))
            .device(client_device("DE:AD:BE:EF:00:01", "Unknown", &["cafe"]))
            .raw("{broken")
            .build();

        let snap = load(survey.path()).unwrap();
        assert!(snap.contains_device(Category::WifiAccessPoint, "AA:BB:CC:DD:EE:FF"));
        assert!(snap.contains_device(Category::BluetoothClassic, "00:11:22:33:44:55"));
        assert_eq!(snap.devices(Category::WifiClient).count(), 0);
        assert!(snap.advertised_names().contains("home"));
        assert!(snap.probed_names().contains("cafe"));
    }

    #[test]
    fn test_load_unclassifiable_survey_is_empty_input() {
        let survey = SurveyBuilder::new()
            .device(json!({ "kismet.device.base.type": "UAV" }))
            .build();
        assert!(matches!(load(survey.path()), Err(Error::EmptyInput { .. })));
    }

    #[test]
    fn test_empty_baseline_is_none() {
        let survey = SurveyBuilder::new().build();
        assert!(load_baseline(survey.path()).unwrap().is_none());
    }

    #[test]
    fn test_missing_baseline_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_baseline(&dir.path().join("nope.kismet")).is_err());
    }

    #[test]
    fn test_apply_baseline() {
        let current = SurveyBuilder::new()
            .device(ap_device("X", &[]))
            .device(ap_device("Y", &[]))
            .build();
        let baseline = SurveyBuilder::new().device(ap_device("X", &[])).build();

        let current = load(current.path()).unwrap();
        let baseline = load_baseline(baseline.path()).unwrap();
        let diffed = apply_baseline(current.clone(), baseline.as_ref());
        let aps: Vec<&str> = diffed.devices(Category::WifiAccessPoint).collect();
        assert_eq!(aps, vec!["Y"]);

        assert_eq!(apply_baseline(current.clone(), None), current);
    }
}
