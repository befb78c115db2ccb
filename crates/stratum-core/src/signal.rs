use std::sync::atomic::{AtomicBool, Ordering};
use stratum_store::Context;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Cancel `ctx` on the first Ctrl-C; exit the process on the second.
///
/// Only one handler can be installed per process; later calls are ignored.
pub fn cancel_on_interrupt(ctx: Context) {
    let _ = ctrlc::set_handler(move || {
        if INTERRUPTED.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        ctx.cancel();
        eprintln!("\ninterrupt received, cancelling...");
    });
}
