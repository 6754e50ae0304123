//! System configuration parameters
//!
//! All tunable parameters for the QuakeGuard controller.  Values can be
//! overridden by pointing `QUAKEGUARD_CONFIG` at a JSON file; anything the
//! file omits keeps its default.  Runtime state is never persisted — a
//! restart always re-runs the Boot → Normal sequence.

use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Shake detection ---
    /// Deviation from 1.0 G that counts as a seismic shake.
    pub shake_threshold_g: f32,
    /// Accelerometer poll interval (milliseconds).
    pub shake_poll_interval_ms: u32,
    /// Re-arm delay after a shake report (milliseconds).
    pub shake_rearm_ms: u32,

    // --- Broadcast receiver ---
    /// Receiver poll interval (milliseconds).
    pub report_poll_interval_ms: u32,

    // --- Siren ---
    /// High tone of the two-tone siren (Hz).
    pub siren_high_hz: u32,
    /// Low tone of the two-tone siren (Hz).
    pub siren_low_hz: u32,
    /// Duration of each tone segment (milliseconds).
    pub siren_segment_ms: u32,

    // --- Buttons ---
    /// Debounce window for the front-panel buttons (milliseconds).
    pub button_debounce_ms: u32,
    /// Button scan interval in the main loop (milliseconds).
    pub button_scan_interval_ms: u32,

    // --- Command server ---
    /// TCP listen address for the remote command channel.
    pub listen_addr: String,
    /// TCP listen port.
    pub listen_port: u16,
    /// Sustained inbound commands per second before frames are shed.
    pub command_rate_limit_per_sec: u32,

    // --- Telemetry ---
    /// Unsolicited status snapshot interval (seconds).
    pub telemetry_interval_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Shake detection
            shake_threshold_g: 2.0,
            shake_poll_interval_ms: 100, // 10 Hz
            shake_rearm_ms: 1000,

            // Broadcast receiver
            report_poll_interval_ms: 200,

            // Siren
            siren_high_hz: 880,
            siren_low_hz: 440,
            siren_segment_ms: 500,

            // Buttons
            button_debounce_ms: 100,
            button_scan_interval_ms: 10,

            // Command server
            listen_addr: "127.0.0.1".to_string(),
            listen_port: 65432,
            command_rate_limit_per_sec: 20,

            // Telemetry
            telemetry_interval_secs: 60,
        }
    }
}

impl SystemConfig {
    /// Load configuration from a JSON file, falling back to defaults on any
    /// failure.  A missing file is normal (first deployment); a present but
    /// unreadable file is worth a warning.
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(cfg) => cfg,
                Err(e) => {
                    warn!("Config parse failed ({e}), using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Config read failed ({e}), using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = SystemConfig::default();
        assert!(c.shake_threshold_g > 0.0);
        assert!(c.siren_high_hz > c.siren_low_hz);
        assert!(c.siren_segment_ms > 0);
        assert!(c.button_debounce_ms > c.button_scan_interval_ms);
        assert!(c.listen_port > 1024);
        assert!(c.command_rate_limit_per_sec > 0);
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SystemConfig = serde_json::from_str(&json).unwrap();
        assert!((c.shake_threshold_g - c2.shake_threshold_g).abs() < 0.001);
        assert_eq!(c.listen_port, c2.listen_port);
        assert_eq!(c.siren_segment_ms, c2.siren_segment_ms);
    }

    #[test]
    fn partial_config_file_keeps_defaults() {
        let c: SystemConfig = serde_json::from_str(r#"{"shake_threshold_g": 1.5}"#).unwrap();
        assert!((c.shake_threshold_g - 1.5).abs() < 0.001);
        assert_eq!(c.listen_port, SystemConfig::default().listen_port);
    }

    #[test]
    fn rearm_slower_than_poll() {
        let c = SystemConfig::default();
        assert!(
            c.shake_rearm_ms > c.shake_poll_interval_ms,
            "re-arm window must outlast one poll cycle or every sample re-triggers"
        );
    }
}
