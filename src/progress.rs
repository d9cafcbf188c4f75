//! Upload progress estimation.
//!
//! The estimate is user feedback only: it advances one step per tick while
//! an upload or analysis is in flight, never reaches 100 on its own, and
//! jumps to 100 when the session completes. The spawned task is registered
//! on the session handle so completion, failure and reset all stop it.

use crate::config::Progress;
use crate::session::SessionHandle;
use std::time::Duration;
use tracing::trace;

pub fn spawn_ticker(session: SessionHandle, generation: u64, cfg: Progress) {
    let step = cfg.step_percent.max(1);
    let cap = cfg.effective_cap();
    let period = Duration::from_millis(cfg.tick_ms.max(1));

    let ticking = session.clone();
    let handle = tokio::spawn(async move {
        let mut tick = tokio::time::interval(period);
        // The immediate first tick would advance the estimate before any
        // work has happened.
        tick.tick().await;
        loop {
            tick.tick().await;
            match ticking.advance_progress(generation, step, cap) {
                Ok(pct) => trace!("progress estimate {pct}%"),
                // Session left the in-flight states or was reset.
                Err(_) => break,
            }
        }
    });

    session.attach_ticker(handle);
}
