//! Build Kismet target-alert watchlists from wireless survey databases.
//!
//! A survey's devices are classified into Bluetooth, Wi-Fi and sensor buckets, reduced
//! to unique fingerprints (MACs and SSIDs), optionally diffed against a baseline survey,
//! and rendered into `devicefound=` / `ssidcanary=` rules that Kismet loads through an
//! `opt_include=` line in its alert config.

pub mod actions;
pub mod config;
pub mod db;
pub mod error;
pub mod survey;
pub mod watchlist;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{Error, Result};
