use crate::core::context::ExecutionContext;
use crate::core::{HealthCheck, ProbeResponse};
use crate::utils::error::{ProbeError, Result};
use std::time::Instant;

pub struct ProbeRunner<H: HealthCheck> {
    check: H,
}

impl<H: HealthCheck> ProbeRunner<H> {
    pub fn new(check: H) -> Self {
        Self { check }
    }

    /// Runs the check once. Anything but status 200 is an error carrying the
    /// status and the raw body.
    pub async fn run(&self, ctx: &ExecutionContext) -> Result<ProbeResponse> {
        let started = Instant::now();

        let response = match self.check.fetch(ctx).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    timeout = e.is_timeout(),
                    cancelled = e.is_cancelled(),
                    elapsed = ?started.elapsed(),
                    "health check failed"
                );
                return Err(e);
            }
        };

        tracing::debug!(
            status = response.status,
            body_len = response.body.len(),
            elapsed = ?started.elapsed(),
            "health check completed"
        );

        if !response.is_healthy() {
            return Err(ProbeError::UnexpectedStatus {
                status: response.status,
                body: response.body,
            });
        }

        Ok(response)
    }
}
