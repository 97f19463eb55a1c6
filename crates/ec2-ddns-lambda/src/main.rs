// # bootstrap - EC2 DNS reconciler Lambda
//
// This binary is a THIN integration layer only. All event handling, naming
// and record logic lives in ec2-ddns-core.
//
// The binary is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing tracing
// 3. Building the AWS clients once per cold start
// 4. Serving invocations through the Lambda runtime
//
// ## Configuration
//
// - `HOSTED_ZONE_ID`: Route 53 hosted zone to manage (required)
// - `DEFAULT_DNS_PREFIX`: Prefix for instances with an empty tracking tag
//   (default: `ec2-instance`)
// - `DDNS_MODE`: `dry-run` to log record changes without submitting them
// - `LOG_LEVEL`: trace, debug, info, warn or error (default: `info`)
//
// AWS credentials and region come from the standard Lambda environment.

use anyhow::Result;
use ec2_ddns_core::{DnsManagerConfig, InvocationReport, Reconciler, handle_event};
use ec2_ddns_instance_ec2::Ec2InstanceSource;
use ec2_ddns_provider_route53::Route53Provider;
use lambda_runtime::{LambdaEvent, service_fn};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum LambdaExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<LambdaExitCode> for ExitCode {
    fn from(code: LambdaExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    // Load and validate configuration from environment
    let config = match DnsManagerConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return LambdaExitCode::ConfigError.into();
        }
    };

    // Initialize tracing
    let log_level = match config.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // The host adds timestamps and does not render colors
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(false)
        .without_time()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return LambdaExitCode::ConfigError.into();
    }

    info!("Starting EC2 DNS reconciler");
    info!(
        "Managing hosted zone {} (default prefix: {})",
        config.hosted_zone_id, config.default_dns_prefix
    );
    if config.dry_run {
        warn!("Running in DRY-RUN mode - no record changes will be submitted");
    }

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return LambdaExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let reconciler = match build_reconciler(config).await {
            Ok(reconciler) => reconciler,
            Err(e) => {
                error!("Startup error: {}", e);
                return LambdaExitCode::ConfigError;
            }
        };

        if let Err(e) = serve(reconciler).await {
            error!("Runtime error: {}", e);
            LambdaExitCode::RuntimeError
        } else {
            LambdaExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Build the AWS clients and the reconciler over them
async fn build_reconciler(config: DnsManagerConfig) -> Result<Reconciler> {
    let aws_config = aws_config::load_from_env().await;

    let instance_source = Ec2InstanceSource::new(aws_sdk_ec2::Client::new(&aws_config));
    let provider = Route53Provider::new(
        aws_sdk_route53::Client::new(&aws_config),
        config.dry_run,
    );

    Ok(Reconciler::new(
        Box::new(instance_source),
        Box::new(provider),
        config,
    )?)
}

/// Serve invocations until the runtime shuts down
async fn serve(reconciler: Reconciler) -> Result<()> {
    let reconciler = Arc::new(reconciler);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<serde_json::Value>| {
        let reconciler = Arc::clone(&reconciler);
        async move {
            let report: InvocationReport = handle_event(&reconciler, &event.payload).await;
            Ok::<_, lambda_runtime::Error>(report)
        }
    }))
    .await
    .map_err(|e| anyhow::anyhow!("Lambda runtime failed: {}", e))
}
