use adot_healthcheck::utils::{logger, validation::Validate};
use adot_healthcheck::{check_health, ExecutionContext, ProbeConfig, Report};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    #[cfg(feature = "cli")]
    {
        use clap::Parser;
        let _ = adot_healthcheck::Cli::parse();
    }

    logger::init_cli_logger();

    let config = ProbeConfig::default();
    tracing::debug!("Probe config: {:?}", config);

    let result = async {
        config.validate()?;
        let ctx = ExecutionContext::with_termination_signals()?;
        check_health(config, &ctx).await
    }
    .await;

    if let Err(e) = &result {
        tracing::error!(kind = ?e.kind(), "❌ Health check failed: {}", e);
    }

    let report = Report::from_result(&result);
    println!("{}", report.line());
    report.exit_code()
}
