use crate::core::context::ExecutionContext;
use crate::domain::model::ProbeResponse;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait ConfigProvider: Send + Sync {
    fn endpoint(&self) -> &str;
    fn timeout(&self) -> Duration;
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Build the request, send it and read the whole body, honouring `ctx`.
    async fn fetch(&self, ctx: &ExecutionContext) -> Result<ProbeResponse>;
}
