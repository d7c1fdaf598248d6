//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured kiln events through the
//! `log` facade.  The binary routes these into `tracing-subscriber`.

use log::{error, info, warn};

use crate::app::events::KilnEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`KilnEvent`] as a one-line record.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &KilnEvent) {
        match event {
            KilnEvent::Telemetry(t) => {
                let temp = t
                    .current_temperature
                    .map_or_else(|| "--".to_string(), |v| format!("{v:.1}"));
                let avg = t
                    .smoothed_temperature
                    .map_or_else(|| "--".to_string(), |v| format!("{v:.1}"));
                info!(
                    "TELEM | state={:?} | T={}/{}\u{00b0}C sp={:.1}\u{00b0}C | \
                     out={:.2} heater={} | elapsed={:.0}/{}s",
                    t.state,
                    temp,
                    avg,
                    t.set_point,
                    t.control_output.unwrap_or(0.0),
                    if t.heater_on { "ON" } else { "OFF" },
                    t.elapsed_time,
                    t.hold_time_total,
                );
            }
            KilnEvent::Started {
                setpoint,
                hold_secs,
            } => {
                info!("START | set_point={setpoint:.1}\u{00b0}C hold={hold_secs}s");
            }
            KilnEvent::Stopped { elapsed_secs } => {
                info!("STOP | elapsed={elapsed_secs:.1}s");
            }
            KilnEvent::SensorFault(e) => {
                error!("FAULT | sensor: {e}");
            }
            KilnEvent::HeaterFault(e) => {
                error!("FAULT | heater: {e}");
            }
            KilnEvent::HeaterSwitched(cmd) => {
                info!("HEATER | {}", if cmd.is_on() { "ON" } else { "OFF" });
            }
            KilnEvent::HoldExpired { hold_secs } => {
                warn!("HOLD | {hold_secs}s hold time reached");
            }
        }
    }
}
