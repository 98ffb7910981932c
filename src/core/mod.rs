pub mod context;
pub mod probe;
pub mod report;
pub mod runner;

pub use crate::domain::model::ProbeResponse;
pub use crate::domain::ports::{ConfigProvider, HealthCheck};
pub use crate::utils::error::Result;

use context::ExecutionContext;
use probe::HttpProbe;
use runner::ProbeRunner;

/// One probe against `config`'s endpoint, cancelled by `ctx`.
pub async fn check_health<C: ConfigProvider>(
    config: C,
    ctx: &ExecutionContext,
) -> Result<ProbeResponse> {
    let probe = HttpProbe::new(config)?;
    ProbeRunner::new(probe).run(ctx).await
}
