//! Fuzz target: `StartCommand::from_json`
//!
//! Arbitrary bytes are parsed as JSON and handed to the start-command
//! validator.  Whatever is accepted must carry a finite set point.
//!
//! cargo fuzz run fuzz_start_payload

#![no_main]

use kilnctl::app::commands::StartCommand;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(payload) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    if let Ok(cmd) = StartCommand::from_json(&payload) {
        assert!(cmd.setpoint.is_finite());
    }
});
