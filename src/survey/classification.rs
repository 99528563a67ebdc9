//! Device classification. Maps a normalized Kismet record onto one watchlist category
//! and picks out the fingerprints (MAC, SSIDs) worth alerting on.

use serde::Serialize;

use super::record::DeviceRecord;

/// Manufacturer string Kismet reports when the OUI lookup fails
pub const UNKNOWN_MANUFACTURER: &str = "Unknown";

pub const TYPE_BR_EDR: &str = "BR/EDR";
pub const TYPE_BTLE: &str = "BTLE";
pub const WIFI_CLIENT_TYPES: &[&str] = &["Wi-Fi Client", "Wi-Fi Ad-Hoc", "Wi-Fi Device", "Wi-Fi Bridged"];
pub const WIFI_AP_TYPES: &[&str] = &["Wi-Fi AP", "Wi-Fi WDS AP", "WiFi WDS"];
pub const TYPE_SENSOR: &str = "Sensor";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    BluetoothClassic,
    BluetoothLowEnergy,
    WifiClient,
    WifiAccessPoint,
    Sensor,
    /// Matched no rule; contributes nothing
    #[default]
    Unclassified,
}

impl Category {
    /// The five categories that carry device fingerprints
    pub const DEVICE_CATEGORIES: [Category; 5] = [
        Category::BluetoothClassic,
        Category::BluetoothLowEnergy,
        Category::WifiClient,
        Category::WifiAccessPoint,
        Category::Sensor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::BluetoothClassic => "bt",
            Category::BluetoothLowEnergy => "btle",
            Category::WifiClient => "client",
            Category::WifiAccessPoint => "ap",
            Category::Sensor => "sensor",
            Category::Unclassified => "unclassified",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of classifying one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    /// Hardware address credited to `category`, if any. Always `None` when unclassified.
    pub address: Option<String>,
    pub probed_names: Vec<String>,
    pub advertised_names: Vec<String>,
}

impl Classification {
    fn unclassified() -> Self {
        Self::default()
    }
}

/// Classic Bluetooth: any BR/EDR device with an address
pub(crate) fn is_bluetooth_classic(record: &DeviceRecord) -> bool {
    record.type_tag == TYPE_BR_EDR && record.mac().is_some()
}

/// BTLE devices whose address is not just echoed as their name by an unknown vendor.
/// Those are almost always rotating random addresses.
pub(crate) fn is_trackable_btle(record: &DeviceRecord) -> bool {
    if record.type_tag != TYPE_BTLE {
        return false;
    }
    let Some(mac) = record.mac() else {
        return false;
    };
    record.common_name.as_deref() != Some(mac)
        || record.manufacturer.as_deref() != Some(UNKNOWN_MANUFACTURER)
}

pub(crate) fn has_known_manufacturer(record: &DeviceRecord) -> bool {
    record.manufacturer.as_deref() != Some(UNKNOWN_MANUFACTURER)
}

/// Classify a record into at most one category.
pub fn classify(record: &DeviceRecord) -> Classification {
    let tag = record.type_tag.as_str();

    // The two Bluetooth predicates are independent; at most one can hold for a tag.
    if is_bluetooth_classic(record) {
        return device_only(Category::BluetoothClassic, record);
    }
    if is_trackable_btle(record) {
        return device_only(Category::BluetoothLowEnergy, record);
    }
    if tag == TYPE_BTLE || tag == TYPE_BR_EDR {
        return Classification::unclassified();
    }

    if WIFI_CLIENT_TYPES.contains(&tag) {
        // Probed SSIDs are kept even when the address itself is suppressed
        let probed_names = record
            .probed_network_names
            .iter()
            .filter(|name| !name.is_empty())
            .cloned()
            .collect();
        let address = record
            .mac()
            .filter(|_| has_known_manufacturer(record))
            .map(str::to_string);
        return Classification {
            category: Category::WifiClient,
            address,
            probed_names,
            advertised_names: Vec::new(),
        };
    }

    if WIFI_AP_TYPES.contains(&tag) {
        let Some(mac) = record.mac() else {
            return Classification::unclassified();
        };
        let advertised_names = record
            .advertised_network_names
            .iter()
            .filter(|name| !name.is_empty())
            .cloned()
            .collect();
        return Classification {
            category: Category::WifiAccessPoint,
            address: Some(mac.to_string()),
            probed_names: Vec::new(),
            advertised_names,
        };
    }

    if tag == TYPE_SENSOR && record.mac().is_some() {
        return device_only(Category::Sensor, record);
    }

    Classification::unclassified()
}

fn device_only(category: Category, record: &DeviceRecord) -> Classification {
    Classification {
        category,
        address: record.mac().map(str::to_string),
        ..Classification::default()
    }
}
