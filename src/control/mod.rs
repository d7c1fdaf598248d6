//! Closed-loop control primitives: PID, sample smoothing, and relay
//! hysteresis.  Pure logic; hardware is reached only through
//! [`HeaterPort`](crate::app::ports::HeaterPort).

pub mod filter;
pub mod hysteresis;
pub mod pid;
