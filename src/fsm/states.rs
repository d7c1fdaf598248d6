//! Concrete state handler functions and table builder.
//!
//! ```text
//!  IDLE ──[start]──▶ RUNNING ──[stop / hold expiry*]──▶ IDLE
//!                       │
//!                 [sensor error]
//!                       ▼
//!                    FAULTED ──[same tick]──▶ IDLE
//!
//!  * only with `stop_on_hold_expiry`
//! ```

use super::context::SessionContext;
use super::{StateDescriptor, StateId};
use log::{error, info};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once per session.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        StateDescriptor {
            id: StateId::Running,
            name: "Running",
            on_enter: Some(running_enter),
            on_exit: Some(running_exit),
            on_update: running_update,
        },
        StateDescriptor {
            id: StateId::Faulted,
            name: "Faulted",
            on_enter: Some(faulted_enter),
            on_exit: None,
            on_update: faulted_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut SessionContext) {
    info!("IDLE: elapsed {:.1}s", ctx.elapsed(ctx.now).as_secs_f64());
}

fn idle_update(_ctx: &mut SessionContext) -> Option<StateId> {
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  RUNNING
// ═══════════════════════════════════════════════════════════════════════════

fn running_enter(ctx: &mut SessionContext) {
    ctx.last_fault = None;
    info!(
        "RUNNING: set point {:.1}\u{00b0}C, hold {}s",
        ctx.setpoint, ctx.hold_secs
    );
}

fn running_update(ctx: &mut SessionContext) -> Option<StateId> {
    if ctx.stop_on_hold_expiry && ctx.hold_expired(ctx.now) {
        info!("RUNNING: hold of {}s complete", ctx.hold_secs);
        return Some(StateId::Idle);
    }
    None
}

fn running_exit(ctx: &mut SessionContext) {
    ctx.stopped_at = Some(ctx.now);
}

// ═══════════════════════════════════════════════════════════════════════════
//  FAULTED: entered on sensor loss, left on the very next tick
// ═══════════════════════════════════════════════════════════════════════════

fn faulted_enter(ctx: &mut SessionContext) {
    match ctx.last_fault {
        Some(e) => error!("FAULTED: {e}, stopping kiln"),
        None => error!("FAULTED: stopping kiln"),
    }
}

fn faulted_update(_ctx: &mut SessionContext) -> Option<StateId> {
    Some(StateId::Idle)
}
