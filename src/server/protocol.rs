//! JSON command protocol.
//!
//! One JSON object per line.  Inbound:
//!
//! ```text
//! {"cmd": "set", "relay": 1, "state": true}
//! {"cmd": "toggle", "relay": 2}
//! {"cmd": "get"}
//! {"cmd": "simulate_button", "btn_id": 5}
//! {"cmd": "simulate_qzss", "report": "..."}   (report optional)
//! {"cmd": "simulate_imu", "force": 3.5}       (force optional)
//! ```
//!
//! Commands deserialize into a fixed [`CommandFrame`] — unknown fields
//! are rejected rather than silently carried — and map onto
//! [`HazardEvent`]s.  The `simulate_*` family produces the same events
//! the real sources do, so simulated ingress takes the identical path
//! through the router.  Outbound: one status snapshot or ack per line.

use serde::Deserialize;

use crate::app::events::{ControlAction, EventOutcome, HazardEvent, StatusSnapshot};
use crate::error::{Error, Result};

/// Report text used when `simulate_qzss` omits one.
const DEFAULT_SIM_REPORT: &str = "Simulation Report";

/// Shake magnitude used when `simulate_imu` omits one.
const DEFAULT_SIM_FORCE: f32 = 1.5;

/// The fixed inbound command shape.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CommandFrame {
    cmd: String,
    relay: Option<u8>,
    state: Option<bool>,
    btn_id: Option<u8>,
    report: Option<String>,
    force: Option<f32>,
}

/// Parse one command line into a [`HazardEvent`].
pub fn parse_command(line: &str) -> Result<HazardEvent> {
    let frame: CommandFrame =
        serde_json::from_str(line).map_err(|_| Error::InvalidEvent("malformed command JSON"))?;

    match frame.cmd.as_str() {
        "set" => {
            let outlet = frame.relay.ok_or(Error::InvalidEvent("set requires relay"))?;
            let on = frame.state.ok_or(Error::InvalidEvent("set requires state"))?;
            Ok(HazardEvent::Control(ControlAction::Set { outlet, on }))
        }
        "toggle" => {
            let outlet = frame
                .relay
                .ok_or(Error::InvalidEvent("toggle requires relay"))?;
            Ok(HazardEvent::Control(ControlAction::Toggle { outlet }))
        }
        "get" => Ok(HazardEvent::Control(ControlAction::Get)),

        "simulate_button" => {
            let id = frame
                .btn_id
                .ok_or(Error::InvalidEvent("simulate_button requires btn_id"))?;
            Ok(HazardEvent::ButtonPress { id })
        }
        "simulate_qzss" => Ok(HazardEvent::BroadcastReport {
            text: frame
                .report
                .unwrap_or_else(|| DEFAULT_SIM_REPORT.to_string()),
        }),
        "simulate_imu" => Ok(HazardEvent::Shake {
            magnitude: frame.force.unwrap_or(DEFAULT_SIM_FORCE),
        }),

        _ => Err(Error::InvalidEvent("unknown cmd")),
    }
}

/// Encode a status snapshot as one outbound line.
pub fn encode_status(snapshot: &StatusSnapshot) -> String {
    // StatusSnapshot serialization cannot fail: no maps with non-string
    // keys, no non-finite floats.
    let mut line = serde_json::to_string(snapshot).unwrap_or_default();
    line.push('\n');
    line
}

/// Encode the per-command acknowledgement line.
pub fn encode_ack(result: &Result<EventOutcome>) -> String {
    let value = match result {
        Ok(EventOutcome::Applied) => serde_json::json!({"ok": true, "outcome": "applied"}),
        Ok(EventOutcome::Ignored) => serde_json::json!({"ok": true, "outcome": "ignored"}),
        Err(e) => serde_json::json!({"ok": false, "error": e.to_string()}),
    };
    let mut line = value.to_string();
    line.push('\n');
    line
}
