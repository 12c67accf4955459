//! Process-group ownership for the dialog child.
//!
//! The dialog is spawned as the leader of its own process group, so killing
//! the group also takes down anything the toolkit forked.

use crate::logging;

/// Grace period after SIGTERM before escalating to SIGKILL (milliseconds)
pub const TERM_GRACE_MS: u64 = 250;
/// How often to check if process has exited during grace period
pub const POLL_INTERVAL_MS: u64 = 50;

// Unix-specific process control using libc
#[cfg(unix)]
pub(crate) mod unix_process {
    use libc::{c_int, pid_t, ESRCH};

    /// Send a signal to a process group (negative PID targets the group)
    ///
    /// Returns Ok(()) if signal was sent successfully.
    /// Returns Err with errno description on failure.
    pub fn kill_process_group(pgid: u32, signal: c_int) -> Result<(), &'static str> {
        // Safety: kill() is a plain syscall with no memory safety concerns
        let rc = unsafe { libc::kill(-(pgid as pid_t), signal) };
        if rc == 0 {
            Ok(())
        } else {
            let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
            match errno {
                libc::ESRCH => Err("No such process group"),
                libc::EPERM => Err("Permission denied"),
                libc::EINVAL => Err("Invalid signal"),
                _ => Err("Unknown error"),
            }
        }
    }

    /// Check if a process group is still alive
    ///
    /// Signal 0 checks existence without delivering anything.
    /// EPERM means the group exists but we can't signal it, which still counts as alive.
    pub fn process_group_alive(pgid: u32) -> bool {
        // Safety: kill() with signal 0 only checks existence
        let rc = unsafe { libc::kill(-(pgid as pid_t), 0) };
        if rc == 0 {
            true
        } else {
            let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
            errno != ESRCH
        }
    }

    pub const SIGTERM: c_int = libc::SIGTERM;
    pub const SIGKILL: c_int = libc::SIGKILL;
}

/// Owns a spawned dialog's process group.
///
/// The Drop impl kills the group, so a dialog window never outlives the
/// request that opened it. Keep the handle alive until the child is reaped.
#[derive(Debug)]
pub struct ProcessHandle {
    /// Process ID (used as PGID since we spawn with process_group(0))
    pid: u32,
    /// Whether the group has been explicitly killed
    killed: bool,
}

impl ProcessHandle {
    pub fn new(pid: u32) -> Self {
        logging::log_debug("EXEC", &format!("ProcessHandle created for PID {}", pid));
        Self { pid, killed: false }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn is_killed(&self) -> bool {
        self.killed
    }

    /// Kill the process group with graceful escalation (Unix) or mark it killed (other platforms)
    ///
    /// ## Escalation Protocol
    /// 1. Send SIGTERM to the process group
    /// 2. Wait up to TERM_GRACE_MS for the group to exit
    /// 3. If still alive, send SIGKILL
    pub fn kill(&mut self) {
        if self.killed {
            return;
        }
        self.killed = true;

        #[cfg(unix)]
        {
            use unix_process::{kill_process_group, process_group_alive, SIGKILL, SIGTERM};

            // Since we spawned with process_group(0), the PGID equals the PID
            let pgid = self.pid;

            match kill_process_group(pgid, SIGTERM) {
                Ok(()) => {
                    logging::log("EXEC", &format!("SIGTERM sent to PGID {}", pgid));
                }
                Err("No such process group") => {
                    logging::log_debug("EXEC", &format!("Process group {} already exited", pgid));
                    return;
                }
                Err(e) => {
                    logging::log(
                        "EXEC",
                        &format!("Failed to send SIGTERM to PGID {}: {}", pgid, e),
                    );
                }
            }

            let start = std::time::Instant::now();
            let grace_duration = std::time::Duration::from_millis(TERM_GRACE_MS);
            let poll_interval = std::time::Duration::from_millis(POLL_INTERVAL_MS);

            while start.elapsed() < grace_duration {
                // Check the whole group, not only the leader
                if !process_group_alive(pgid) {
                    logging::log(
                        "EXEC",
                        &format!("Process group {} terminated after SIGTERM", pgid),
                    );
                    return;
                }
                std::thread::sleep(poll_interval);
            }

            logging::log(
                "EXEC",
                &format!(
                    "Process group {} did not exit after {}ms, escalating to SIGKILL",
                    pgid, TERM_GRACE_MS
                ),
            );

            match kill_process_group(pgid, SIGKILL) {
                Ok(()) => {
                    logging::log("EXEC", &format!("Killed process group {} with SIGKILL", pgid));
                }
                Err("No such process group") => {
                    logging::log_debug(
                        "EXEC",
                        &format!("Process group {} exited just before SIGKILL", pgid),
                    );
                }
                Err(e) => {
                    logging::log_error("EXEC", e, Some(&format!("SIGKILL for PGID {}", pgid)));
                }
            }
        }

        #[cfg(not(unix))]
        {
            // The launcher calls Child::kill() itself on these platforms
            logging::log(
                "EXEC",
                &format!("Non-Unix platform: process {} marked as killed", self.pid),
            );
        }
    }

    /// Check if process group is still running
    #[cfg(unix)]
    pub fn is_alive(&self) -> bool {
        unix_process::process_group_alive(self.pid)
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        self.kill();
    }
}
