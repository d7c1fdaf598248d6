//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements               | Connects to                  |
//! |---------------|--------------------------|------------------------------|
//! | `config_file` | ConfigPort               | JSON file on disk            |
//! | `log_sink`    | EventSink                | `log` facade                 |
//! | `rpi`         | SensorPort, HeaterPort   | Raspberry Pi GPIO (`rppal`)  |
//! | `sim`         | SensorTransport, HeaterPort | First-order thermal model |

pub mod config_file;
pub mod log_sink;
#[cfg(feature = "rpi")]
pub mod rpi;
pub mod sim;
