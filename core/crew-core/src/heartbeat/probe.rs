//! OS-level process liveness probe.

/// Returns true if `pid` currently names a running process.
///
/// Conservative on purpose: a record must never be reclaimed solely because
/// the probe lacked privilege to confirm its owner. On unix, `kill(pid, 0)`
/// failing with EPERM means the process exists but belongs to another user,
/// so that counts as alive; only a clean "no such process" result counts as
/// dead.
#[cfg(unix)]
pub fn process_is_alive(pid: u32) -> bool {
    let rc = unsafe { libc::kill(pid as i32, 0) };
    if rc == 0 {
        return true;
    }
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

/// Non-unix fallback: look the pid up in the process table.
#[cfg(not(unix))]
pub fn process_is_alive(pid: u32) -> bool {
    use sysinfo::{Pid, ProcessRefreshKind, System};

    let mut sys = System::new();
    let sys_pid = Pid::from(pid as usize);
    sys.refresh_process_specifics(sys_pid, ProcessRefreshKind::new());
    sys.process(sys_pid).is_some()
}
