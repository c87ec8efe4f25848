//! Signal handling for sunrelay.
//!
//! A background thread turns process signals into [`SignalMessage`]s sent over
//! a channel. The scheduler's waits block on that channel, so a signal ends a
//! sleep immediately instead of at the next poll.
//!
//! - SIGINT, SIGTERM, SIGHUP: shut down
//! - SIGUSR2: re-evaluate the schedule now (e.g. after the clock was set by NTP)

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR2},
    iterator::Signals,
};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    thread,
    time::Duration,
};

use crate::logger::Log;

/// Unified signal message type for all signal-based communication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    /// Stop the scheduler (SIGTERM, SIGINT, SIGHUP)
    Shutdown,
    /// Recompute the schedule immediately (SIGUSR2)
    Resync,
}

/// Receiving side of the cancellation token, owned by the scheduler.
pub struct Shutdown {
    running: Arc<AtomicBool>,
    receiver: Receiver<SignalMessage>,
}

/// Sending side of the cancellation token. Cheap to clone and `Send`.
#[derive(Clone)]
pub struct ShutdownHandle {
    running: Arc<AtomicBool>,
    sender: Sender<SignalMessage>,
}

/// Create a connected token pair.
pub fn channel() -> (ShutdownHandle, Shutdown) {
    let running = Arc::new(AtomicBool::new(true));
    let (sender, receiver) = mpsc::channel();
    (
        ShutdownHandle {
            running: running.clone(),
            sender,
        },
        Shutdown { running, receiver },
    )
}

impl Shutdown {
    /// Whether the application should keep running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Block for at most `timeout` waiting for a signal message.
    ///
    /// A disconnected channel is reported as [`SignalMessage::Shutdown`]: with
    /// every handle gone nothing could ever wake the scheduler again.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<SignalMessage> {
        match self.receiver.recv_timeout(timeout) {
            Ok(SignalMessage::Shutdown) => {
                self.running.store(false, Ordering::SeqCst);
                Some(SignalMessage::Shutdown)
            }
            Ok(message) => Some(message),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.running.store(false, Ordering::SeqCst);
                Some(SignalMessage::Shutdown)
            }
        }
    }
}

impl ShutdownHandle {
    /// Request shutdown. Waiters return promptly.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        let _ = self.sender.send(SignalMessage::Shutdown);
    }

    /// Ask the scheduler to recompute its next transition.
    pub fn resync(&self) {
        let _ = self.sender.send(SignalMessage::Resync);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Set up signal handling for the application.
///
/// Spawns a background thread that monitors for signals and forwards them
/// through the returned token pair.
pub fn setup_signal_handler() -> Result<(ShutdownHandle, Shutdown)> {
    let (handle, shutdown) = channel();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR2])
        .context("failed to register signal handlers")?;

    let thread_handle = handle.clone();
    thread::spawn(move || {
        for sig in signals.forever() {
            match sig {
                SIGUSR2 => {
                    Log::log_block_start("Received resync signal");
                    thread_handle.resync();
                }
                _ => {
                    let name = match sig {
                        SIGINT => "SIGINT",
                        SIGTERM => "SIGTERM",
                        _ => "SIGHUP",
                    };
                    Log::log_block_start(&format!("Received {}, shutting down...", name));
                    thread_handle.shutdown();
                    break;
                }
            }
        }
    });

    Ok((handle, shutdown))
}
