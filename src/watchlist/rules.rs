//! Kismet target-alert rule rendering.

use std::collections::BTreeSet;

use crate::survey::Snapshot;

/// One line of a Kismet alert config
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum WatchlistRule {
    /// `ssidcanary="<name>":ssid="<name>"`
    SsidCanary(String),
    /// `devicefound=<mac without separators>`
    DeviceFound(String),
}

impl std::fmt::Display for WatchlistRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatchlistRule::SsidCanary(name) => write!(f, "ssidcanary=\"{}\":ssid=\"{}\"", name, name),
            WatchlistRule::DeviceFound(mac) => write!(f, "devicefound={}", mac),
        }
    }
}

/// Strip surrounding whitespace and `:`/`-` separators from an address
pub fn clean_mac(mac: &str) -> String {
    mac.trim().chars().filter(|c| !matches!(c, ':' | '-')).collect()
}

/// Names that cannot sit inside the quoted `ssid="..."` form
fn is_quotable(name: &str) -> bool {
    !name.contains('"') && !name.chars().any(char::is_control)
}

/// Render a snapshot into rules: SSID canaries first, then device alerts.
/// Output is sorted and free of duplicates.
pub fn render_rules(snapshot: &Snapshot) -> Vec<WatchlistRule> {
    let mut rules = Vec::new();

    for name in snapshot.all_names() {
        if name.is_empty() {
            continue;
        }
        if !is_quotable(name) {
            log::warn!("Skipping SSID {:?}: cannot be quoted in an alert rule", name);
            continue;
        }
        rules.push(WatchlistRule::SsidCanary(name.to_string()));
    }

    let macs: BTreeSet<String> = snapshot
        .all_devices()
        .map(clean_mac)
        .filter(|mac| !mac.is_empty())
        .collect();
    rules.extend(macs.into_iter().map(WatchlistRule::DeviceFound));

    rules
}

/// Rule file body, one newline-terminated rule per line
pub fn render_rule_file(rules: &[WatchlistRule]) -> String {
    let mut out = String::new();
    for rule in rules {
        out.push_str(&rule.to_string());
        out.push('\n');
    }
    out
}
