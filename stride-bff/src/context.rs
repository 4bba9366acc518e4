//! Per-request client telemetry extraction
//!
//! Mobile clients report their battery and network conditions through a
//! set of optional `x-*` headers. This module parses those headers into a
//! typed [`ClientContext`]. Extraction never fails: missing or malformed
//! headers fall back to documented defaults, and out-of-range battery
//! values are clamped to 0-100.

use http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Header carrying the client battery level (0-100)
pub const BATTERY_LEVEL_HEADER: &str = "x-battery-level";
/// Header carrying the raw connection medium
pub const NETWORK_TYPE_HEADER: &str = "x-network-type";
/// Header carrying the observed network quality class
pub const NETWORK_EFFECTIVE_TYPE_HEADER: &str = "x-network-effective-type";
/// Header carrying the estimated downlink bandwidth in Mbps
pub const NETWORK_DOWNLINK_HEADER: &str = "x-network-downlink";
/// Header carrying the estimated round-trip time in milliseconds
pub const NETWORK_RTT_HEADER: &str = "x-network-rtt";

/// Raw connection medium reported by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Wifi,
    Cellular,
    Unknown,
}

impl Default for NetworkType {
    fn default() -> Self {
        NetworkType::Wifi
    }
}

impl FromStr for NetworkType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wifi" => Ok(NetworkType::Wifi),
            "cellular" => Ok(NetworkType::Cellular),
            "unknown" => Ok(NetworkType::Unknown),
            _ => Err(()),
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkType::Wifi => write!(f, "wifi"),
            NetworkType::Cellular => write!(f, "cellular"),
            NetworkType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Coarse classification of observed network quality, ordered from
/// slowest to fastest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EffectiveType {
    #[serde(rename = "slow-2g")]
    Slow2g,
    #[serde(rename = "2g")]
    TwoG,
    #[serde(rename = "3g")]
    ThreeG,
    #[serde(rename = "4g")]
    FourG,
}

impl Default for EffectiveType {
    fn default() -> Self {
        EffectiveType::FourG
    }
}

impl FromStr for EffectiveType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slow-2g" => Ok(EffectiveType::Slow2g),
            "2g" => Ok(EffectiveType::TwoG),
            "3g" => Ok(EffectiveType::ThreeG),
            "4g" => Ok(EffectiveType::FourG),
            _ => Err(()),
        }
    }
}

impl fmt::Display for EffectiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectiveType::Slow2g => write!(f, "slow-2g"),
            EffectiveType::TwoG => write!(f, "2g"),
            EffectiveType::ThreeG => write!(f, "3g"),
            EffectiveType::FourG => write!(f, "4g"),
        }
    }
}

/// Typed client telemetry for a single request
///
/// Derived once per request from headers, immutable afterwards, and
/// discarded when the request completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientContext {
    /// Battery level as a percentage, clamped to 0-100
    pub battery_level: u8,

    /// Raw connection medium
    pub network_type: NetworkType,

    /// Observed network quality class
    pub effective_type: EffectiveType,

    /// Estimated downlink bandwidth in Mbps
    pub downlink_mbps: f64,

    /// Estimated round-trip time in milliseconds
    pub rtt_ms: f64,
}

impl Default for ClientContext {
    fn default() -> Self {
        Self {
            battery_level: 100,
            network_type: NetworkType::default(),
            effective_type: EffectiveType::default(),
            downlink_mbps: 10.0,
            rtt_ms: 50.0,
        }
    }
}

impl ClientContext {
    /// Extract the client context from request headers
    ///
    /// Never fails; every field falls back to its default when the
    /// corresponding header is absent or unparseable.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let defaults = Self::default();

        Self {
            battery_level: header_value(headers, BATTERY_LEVEL_HEADER)
                .and_then(|v| v.parse::<i64>().ok())
                .map(|v| v.clamp(0, 100) as u8)
                .unwrap_or(defaults.battery_level),
            network_type: header_value(headers, NETWORK_TYPE_HEADER)
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.network_type),
            effective_type: header_value(headers, NETWORK_EFFECTIVE_TYPE_HEADER)
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.effective_type),
            downlink_mbps: header_value(headers, NETWORK_DOWNLINK_HEADER)
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(defaults.downlink_mbps),
            rtt_ms: header_value(headers, NETWORK_RTT_HEADER)
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(defaults.rtt_ms),
        }
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
