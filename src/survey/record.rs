//! Record normalization. Pulls the handful of typed fields the classifier needs out of
//! one Kismet device JSON object, defaulting anything absent or oddly typed.

use serde_json::{Map, Value};

pub(crate) const KEY_TYPE: &str = "kismet.device.base.type";
pub(crate) const KEY_MACADDR: &str = "kismet.device.base.macaddr";
pub(crate) const KEY_MANUF: &str = "kismet.device.base.manuf";
pub(crate) const KEY_COMMONNAME: &str = "kismet.device.base.commonname";
pub(crate) const KEY_DOT11: &str = "dot11.device";
pub(crate) const KEY_PROBED_MAP: &str = "dot11.device.probed_ssid_map";
pub(crate) const KEY_PROBED_SSID: &str = "dot11.probedssid.ssid";
pub(crate) const KEY_ADVERTISED_MAP: &str = "dot11.device.advertised_ssid_map";
pub(crate) const KEY_ADVERTISED_SSID: &str = "dot11.advertisedssid.ssid";

/// Immutable view of one surveyed device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceRecord {
    pub type_tag: String,
    pub hardware_address: Option<String>,
    pub manufacturer: Option<String>,
    pub common_name: Option<String>,
    /// Probed SSIDs as found, empty strings included
    pub probed_network_names: Vec<String>,
    /// Advertised SSIDs as found, empty strings included
    pub advertised_network_names: Vec<String>,
}

impl DeviceRecord {
    /// Build a record from a raw device object. Never fails.
    pub fn from_json(device: &Map<String, Value>) -> Self {
        let dot11 = device.get(KEY_DOT11);

        DeviceRecord {
            type_tag: string_field(device, KEY_TYPE).unwrap_or_default(),
            hardware_address: string_field(device, KEY_MACADDR),
            manufacturer: string_field(device, KEY_MANUF),
            common_name: string_field(device, KEY_COMMONNAME),
            probed_network_names: nested_names(dot11, KEY_PROBED_MAP, KEY_PROBED_SSID),
            advertised_network_names: nested_names(dot11, KEY_ADVERTISED_MAP, KEY_ADVERTISED_SSID),
        }
    }

    /// Hardware address, if present and non-empty
    pub fn mac(&self) -> Option<&str> {
        self.hardware_address.as_deref().filter(|m| !m.is_empty())
    }
}

fn string_field(device: &Map<String, Value>, key: &str) -> Option<String> {
    device.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Collect the SSID strings under `dot11.device.<map_key>`.
///
/// Kismet has shipped these maps both as arrays of objects and as objects keyed by
/// SSID hash, so both shapes are walked. Entries without a string SSID are dropped.
fn nested_names(dot11: Option<&Value>, map_key: &str, ssid_key: &str) -> Vec<String> {
    let Some(ssid_map) = dot11.and_then(|d| d.get(map_key)) else {
        return Vec::new();
    };

    let entries: Vec<&Value> = match ssid_map {
        Value::Array(items) => items.iter().collect(),
        Value::Object(items) => items.values().collect(),
        _ => return Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(|entry| entry.get(ssid_key).and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> DeviceRecord {
        DeviceRecord::from_json(value.as_object().unwrap())
    }

    #[test]
    fn test_empty_object_defaults() {
        let rec = record(json!({}));
        assert_eq!(rec, DeviceRecord::default());
        assert_eq!(rec.mac(), None);
    }

    #[test]
    fn test_base_fields() {
        let rec = record(json!({
            "kismet.device.base.type": "BTLE",
            "kismet.device.base.macaddr": "11:22:33:44:55:66",
            "kismet.device.base.manuf": "Apple",
            "kismet.device.base.commonname": "AirPods",
        }));
        assert_eq!(rec.type_tag, "BTLE");
        assert_eq!(rec.mac(), Some("11:22:33:44:55:66"));
        assert_eq!(rec.manufacturer.as_deref(), Some("Apple"));
        assert_eq!(rec.common_name.as_deref(), Some("AirPods"));
    }

    #[test]
    fn test_wrongly_typed_fields_degrade() {
        let rec = record(json!({
            "kismet.device.base.type": 7,
            "kismet.device.base.macaddr": null,
            "dot11.device": "not an object",
        }));
        assert_eq!(rec.type_tag, "");
        assert_eq!(rec.hardware_address, None);
        assert!(rec.probed_network_names.is_empty());
        assert!(rec.advertised_network_names.is_empty());

        let rec = record(json!({
            "dot11.device": { "dot11.device.probed_ssid_map": 0 }
        }));
        assert!(rec.probed_network_names.is_empty());
    }

    #[test]
    fn test_nested_names_array_shape() {
        let rec = record(json!({
            "dot11.device": {
                "dot11.device.probed_ssid_map": [
                    { "dot11.probedssid.ssid": "home" },
                    { "dot11.probedssid.ssid": "" },
                    { "dot11.probedssid.ssid": 42 },
                    "garbage",
                ],
                "dot11.device.advertised_ssid_map": [
                    { "dot11.advertisedssid.ssid": "office" },
                ],
            }
        }));
        assert_eq!(rec.probed_network_names, vec!["home", ""]);
        assert_eq!(rec.advertised_network_names, vec!["office"]);
    }

    #[test]
    fn test_nested_names_object_shape() {
        let rec = record(json!({
            "dot11.device": {
                "dot11.device.advertised_ssid_map": {
                    "1234": { "dot11.advertisedssid.ssid": "cafe" },
                }
            }
        }));
        assert_eq!(rec.advertised_network_names, vec!["cafe"]);
    }

    #[test]
    fn test_empty_mac_is_absent() {
        let rec = record(json!({ "kismet.device.base.macaddr": "" }));
        assert_eq!(rec.hardware_address.as_deref(), Some(""));
        assert_eq!(rec.mac(), None);
    }
}
