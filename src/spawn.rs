//! Command spawning, autostart discovery, and SIGCHLD reaping (§5, §6).
//! Grounded on the teacher's use of `libc` directly for process control; the
//! teacher itself never spawned anything, so this is new.

use std::fs;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const SYSTEM_AUTOSTART: &str = "/etc/dwm/autostart.sh";

/// Run a shell command line detached from the window manager, in its own
/// session so it survives the WM and never becomes a zombie the WM has to
/// track individually (SIGCHLD reaping in [`install_sigchld_handler`]
/// collects it whenever it does exit).
pub fn spawn(cmd: &str) {
    let mut command = Command::new("/bin/sh");
    command.arg("-c").arg(cmd);
    command.stdin(Stdio::null());
    unsafe {
        command.pre_exec(|| {
            libc::setsid();
            Ok(())
        });
    }
    match command.spawn() {
        Ok(_) => trace!("spawned: {}", cmd),
        Err(e) => error!("failed to spawn '{}': {}", cmd, e),
    }
}

/// Install a `SIGCHLD` handler that reaps all outstanding zombies
/// non-blockingly and reinstalls itself, as §5 specifies for the
/// asynchronously-running children `spawn` launches.
pub fn install_sigchld_handler() {
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = handle_sigchld as usize;
        action.sa_flags = libc::SA_RESTART | libc::SA_NOCLDSTOP;
        libc::sigemptyset(&mut action.sa_mask);
        libc::sigaction(libc::SIGCHLD, &action, std::ptr::null_mut());
    }
}

extern "C" fn handle_sigchld(_sig: libc::c_int) {
    unsafe {
        loop {
            let pid = libc::waitpid(-1, std::ptr::null_mut(), libc::WNOHANG);
            if pid <= 0 {
                break;
            }
        }
    }
}

/// Execute `/etc/dwm/autostart.sh` (if present) then every regular file
/// under `$HOME/.config/dwm` (§6). Neither is required; missing files are
/// silently skipped.
pub fn run_autostart() {
    run_script(Path::new(SYSTEM_AUTOSTART));

    if let Some(home) = std::env::var_os("HOME") {
        let dir = PathBuf::from(home).join(".config").join("dwm");
        run_autostart_dir(&dir);
    } else {
        debug!("HOME not set, skipping user autostart directory");
    }
}

fn run_autostart_dir(dir: &Path) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("no autostart directory at {:?}: {}", dir, e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        match entry.file_type() {
            Ok(ft) if ft.is_file() => run_script(&path),
            _ => continue,
        }
    }
}

fn run_script(path: &Path) {
    if !path.is_file() {
        return;
    }
    let mut command = Command::new(path);
    match command.spawn() {
        Ok(_) => info!("ran autostart script {:?}", path),
        Err(e) => error!("failed to run autostart script {:?}: {}", path, e),
    }
}
