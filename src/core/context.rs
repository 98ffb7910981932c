//! Cancellation scope for a single probe.
//!
//! An [`ExecutionContext`] wraps a [`CancellationToken`] that is fired by the
//! first SIGINT/SIGTERM the process receives (Ctrl+C on non-Unix targets).
//! Every awaited step of the probe is raced against it, so an in-flight
//! request is dropped, and its connection closed, as soon as a signal lands.

use crate::utils::error::{ProbeError, Result};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Interrupt,
    Terminate,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Interrupt => f.write_str("SIGINT"),
            CancelReason::Terminate => f.write_str("SIGTERM"),
        }
    }
}

pub struct ExecutionContext {
    token: CancellationToken,
    reason: Arc<OnceLock<CancelReason>>,
    listener: Option<JoinHandle<()>>,
}

impl ExecutionContext {
    /// A context that is only ever cancelled through [`ExecutionContext::cancel`].
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            reason: Arc::new(OnceLock::new()),
            listener: None,
        }
    }

    /// A context cancelled by the first termination signal.
    ///
    /// The signal handlers are registered before this returns, so a signal
    /// arriving at any later point is observed. Must be called from within a
    /// Tokio runtime.
    pub fn with_termination_signals() -> Result<Self> {
        let mut ctx = Self::new();
        let listener = spawn_signal_listener(ctx.token.clone(), Arc::clone(&ctx.reason))
            .map_err(ProbeError::SignalHandler)?;
        ctx.listener = Some(listener);
        Ok(ctx)
    }

    pub fn cancel(&self, reason: CancelReason) {
        fire(&self.token, &self.reason, reason);
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn reason(&self) -> Option<CancelReason> {
        self.reason.get().copied()
    }

    pub async fn cancelled(&self) -> CancelReason {
        self.token.cancelled().await;
        self.reason().unwrap_or(CancelReason::Interrupt)
    }

    /// Drives `fut` to completion unless the context is cancelled first, in
    /// which case `fut` is dropped and the cancel reason returned.
    pub async fn run<F: Future>(&self, fut: F) -> std::result::Result<F::Output, CancelReason> {
        tokio::select! {
            biased;
            reason = self.cancelled() => Err(reason),
            output = fut => Ok(output),
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ExecutionContext {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

fn fire(token: &CancellationToken, slot: &OnceLock<CancelReason>, reason: CancelReason) {
    // Reason must be visible before waiters wake up.
    let _ = slot.set(reason);
    token.cancel();
}

#[cfg(unix)]
fn spawn_signal_listener(
    token: CancellationToken,
    reason: Arc<OnceLock<CancelReason>>,
) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        let received = tokio::select! {
            _ = interrupt.recv() => CancelReason::Interrupt,
            _ = terminate.recv() => CancelReason::Terminate,
        };
        tracing::debug!(signal = %received, "termination signal received, cancelling probe");
        fire(&token, &reason, received);
    }))
}

#[cfg(not(unix))]
fn spawn_signal_listener(
    token: CancellationToken,
    reason: Arc<OnceLock<CancelReason>>,
) -> std::io::Result<JoinHandle<()>> {
    let mut ctrl_c = tokio::signal::windows::ctrl_c()?;

    Ok(tokio::spawn(async move {
        ctrl_c.recv().await;
        tracing::debug!("Ctrl+C received, cancelling probe");
        fire(&token, &reason, CancelReason::Interrupt);
    }))
}
