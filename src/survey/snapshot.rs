//! Snapshot of one survey: unique fingerprints per category plus SSID sets.
//! Built once, never mutated; baseline subtraction produces a new snapshot.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::classification::{Category, classify};
use super::record::DeviceRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    devices: BTreeMap<Category, BTreeSet<String>>,
    advertised_names: BTreeSet<String>,
    probed_names: BTreeSet<String>,
}

/// Per-category counts, for logging and `--json` output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotSummary {
    pub devices: BTreeMap<Category, usize>,
    pub advertised_names: usize,
    pub probed_names: usize,
}

impl Snapshot {
    /// Classify each record and fold its fingerprints into the snapshot.
    pub fn build<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a DeviceRecord>,
    {
        let mut builder = SnapshotBuilder::default();
        for record in records {
            builder.add(record);
        }
        builder.finish()
    }

    /// Addresses recorded for `category`. Empty for `Unclassified`.
    pub fn devices(&self, category: Category) -> impl Iterator<Item = &str> {
        self.devices
            .get(&category)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn contains_device(&self, category: Category, address: &str) -> bool {
        self.devices
            .get(&category)
            .is_some_and(|set| set.contains(address))
    }

    pub fn advertised_names(&self) -> &BTreeSet<String> {
        &self.advertised_names
    }

    pub fn probed_names(&self) -> &BTreeSet<String> {
        &self.probed_names
    }

    /// All addresses across the five device categories
    pub fn all_devices(&self) -> impl Iterator<Item = &str> {
        self.devices.values().flatten().map(String::as_str)
    }

    /// Union of advertised and probed names, each once
    pub fn all_names(&self) -> BTreeSet<&str> {
        self.advertised_names
            .iter()
            .chain(self.probed_names.iter())
            .map(String::as_str)
            .collect()
    }

    pub fn device_count(&self) -> usize {
        self.devices.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.device_count() == 0 && self.advertised_names.is_empty() && self.probed_names.is_empty()
    }

    /// Fingerprints in `self` that `baseline` has not seen, per category and name set.
    pub fn subtract(&self, baseline: &Snapshot) -> Snapshot {
        let devices = self
            .devices
            .iter()
            .filter_map(|(category, current)| {
                let remaining: BTreeSet<String> = match baseline.devices.get(category) {
                    Some(seen) => current.difference(seen).cloned().collect(),
                    None => current.clone(),
                };
                (!remaining.is_empty()).then_some((*category, remaining))
            })
            .collect();

        Snapshot {
            devices,
            advertised_names: self
                .advertised_names
                .difference(&baseline.advertised_names)
                .cloned()
                .collect(),
            probed_names: self
                .probed_names
                .difference(&baseline.probed_names)
                .cloned()
                .collect(),
        }
    }

    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            devices: Category::DEVICE_CATEGORIES
                .iter()
                .map(|c| (*c, self.devices.get(c).map_or(0, BTreeSet::len)))
                .collect(),
            advertised_names: self.advertised_names.len(),
            probed_names: self.probed_names.len(),
        }
    }
}

impl std::fmt::Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let summary = self.summary();
        for (category, count) in &summary.devices {
            write!(f, "{}={} ", category, count)?;
        }
        write!(
            f,
            "ssid={} probed_ssid={}",
            summary.advertised_names, summary.probed_names
        )
    }
}

/// Accumulates fingerprints one record (or raw fingerprint) at a time.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    snapshot: Snapshot,
    classified: usize,
}

impl SnapshotBuilder {
    /// Classify `record` and keep whatever it contributes.
    pub fn add(&mut self, record: &DeviceRecord) {
        let classification = classify(record);
        let category = classification.category;
        if category == Category::Unclassified {
            return;
        }
        self.classified += 1;

        if let Some(address) = classification.address {
            self.insert_device(category, address);
        }
        self.snapshot
            .advertised_names
            .extend(classification.advertised_names);
        self.snapshot.probed_names.extend(classification.probed_names);
    }

    pub fn insert_device(&mut self, category: Category, address: String) {
        if category == Category::Unclassified {
            return;
        }
        self.snapshot
            .devices
            .entry(category)
            .or_default()
            .insert(address);
    }

    pub fn insert_advertised_name(&mut self, name: String) {
        self.snapshot.advertised_names.insert(name);
    }

    pub fn insert_probed_name(&mut self, name: String) {
        self.snapshot.probed_names.insert(name);
    }

    /// Records that matched a category so far
    pub fn classified(&self) -> usize {
        self.classified
    }

    pub fn finish(self) -> Snapshot {
        self.snapshot
    }
}
