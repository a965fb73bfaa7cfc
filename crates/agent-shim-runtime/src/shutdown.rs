//! Forced termination of a backend that exceeded its deadline.

use tokio::process::Child;
use tracing::debug;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Kill the child and everything in its process group, then reap it.
///
/// `pgid` is the child's pid captured at spawn time. It stays usable after
/// the child itself was reaped, as long as other members of the group live.
///
/// # Platform behavior
/// - Unix: SIGKILL to the whole process group (the child leads its own group)
/// - Other: `Child::kill`, which only reaches the direct child
pub async fn kill_process_tree(child: &mut Child, pgid: Option<u32>) {
    #[cfg(unix)]
    {
        if let Some(pgid) = pgid.and_then(|id| i32::try_from(id).ok()) {
            // ESRCH only means the group is already gone.
            if let Err(e) = signal::killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
                debug!(pgid, "killpg failed: {e}");
            }
        }
    }
    #[cfg(not(unix))]
    let _ = pgid;

    if let Err(e) = child.kill().await {
        debug!("kill after deadline failed: {e}");
    }
}
