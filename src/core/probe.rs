use crate::core::context::ExecutionContext;
use crate::core::{ConfigProvider, HealthCheck, ProbeResponse};
use crate::utils::error::{ProbeError, Result, TransportError};
use reqwest::Client;

/// reqwest-backed [`HealthCheck`] issuing a single GET per call.
pub struct HttpProbe<C: ConfigProvider> {
    config: C,
    client: Client,
}

impl<C: ConfigProvider> HttpProbe<C> {
    pub fn new(config: C) -> Result<Self> {
        // The timeout covers connect, headers and body. No idle connections
        // are kept, so the socket closes as soon as the body is read.
        let client = Client::builder()
            .timeout(config.timeout())
            .pool_max_idle_per_host(0)
            .build()
            .map_err(ProbeError::BuildRequest)?;

        Ok(Self { config, client })
    }
}

#[async_trait::async_trait]
impl<C: ConfigProvider> HealthCheck for HttpProbe<C> {
    async fn fetch(&self, ctx: &ExecutionContext) -> Result<ProbeResponse> {
        let request = self
            .client
            .get(self.config.endpoint())
            .build()
            .map_err(ProbeError::BuildRequest)?;

        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            timeout = ?self.config.timeout(),
            "sending health check request"
        );

        let response = ctx
            .run(self.client.execute(request))
            .await
            .map_err(|reason| ProbeError::Transport(TransportError::Cancelled(reason)))?
            .map_err(|e| ProbeError::Transport(TransportError::Http(e)))?;

        let status = response.status().as_u16();
        tracing::debug!(status, "health check responded");

        // Always drain the body, whatever the status, before classifying.
        let body = ctx
            .run(response.bytes())
            .await
            .map_err(|reason| ProbeError::ReadBody(TransportError::Cancelled(reason)))?
            .map_err(|e| ProbeError::ReadBody(TransportError::Http(e)))?;

        Ok(ProbeResponse {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}
