use std::io;
use std::process::ExitStatus;
use tokio::process::Child;
use tracing::debug;

/// Converts a child's exit status into the integer a shell would report.
///
/// A child terminated by a signal reports `128 + signal`; a status carrying
/// neither a code nor a signal reports 1.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    let signal = {
        use std::os::unix::process::ExitStatusExt as _;
        status.signal()
    };
    #[cfg(not(unix))]
    let signal: Option<i32> = None;

    match status.code() {
        Some(code) => code,
        None => signal.map(|s| 128 + s).unwrap_or(1),
    }
}

/// Keeps terminal interrupts from killing the launcher while the application runs.
///
/// Ctrl+C reaches the whole foreground process group, so the application receives
/// it directly; the launcher only waits and then relays whatever status it ends with.
/// Install before spawning so no interrupt can arrive unhandled.
pub struct InterruptGuard {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    quit: tokio::signal::unix::Signal,
}

impl InterruptGuard {
    #[cfg(unix)]
    pub fn install() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            quit: signal(SignalKind::quit())?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> io::Result<Self> {
        Ok(Self {})
    }

    /// Waits for `child` to exit, absorbing interrupts delivered in the meantime.
    #[cfg(unix)]
    pub async fn wait(&mut self, child: &mut Child) -> io::Result<ExitStatus> {
        loop {
            tokio::select! {
                status = child.wait() => return status,
                _ = self.interrupt.recv() => debug!("SIGINT received, waiting for application"),
                _ = self.quit.recv() => debug!("SIGQUIT received, waiting for application"),
            }
        }
    }

    #[cfg(not(unix))]
    pub async fn wait(&mut self, child: &mut Child) -> io::Result<ExitStatus> {
        loop {
            tokio::select! {
                status = child.wait() => return status,
                res = tokio::signal::ctrl_c() => {
                    res?;
                    debug!("Ctrl+C received, waiting for application");
                }
            }
        }
    }
}
