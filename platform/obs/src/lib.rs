//! Tracing bootstrap for the automation workspace.

use anyhow::Result;
use once_cell::sync::OnceCell;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{self as sdk, Resource};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: OnceCell<()> = OnceCell::new();

/// Configuration for tracing initialization. `env_filter` falls back to
/// `BRIZZI_LOG`, then `RUST_LOG`, then `info`; `otlp_endpoint` falls back to
/// `OTLP_ENDPOINT`.
#[derive(Clone, Debug)]
pub struct ObsConfig {
    pub service_name: &'static str,
    pub env_filter: Option<String>,
    pub otlp_endpoint: Option<String>,
}

impl Default for ObsConfig {
    fn default() -> Self {
        Self {
            service_name: "brizzi-automation",
            env_filter: None,
            otlp_endpoint: None,
        }
    }
}

/// Install the fmt subscriber, with an OTLP span exporter when an endpoint
/// is configured. Safe to call more than once; later calls are no-ops.
pub fn init_tracing(config: ObsConfig) -> Result<()> {
    if INIT.get().is_some() {
        return Ok(());
    }

    let filter = config
        .env_filter
        .or_else(|| std::env::var("BRIZZI_LOG").ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());
    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_new(filter)?)
        .with(tracing_subscriber::fmt::layer().with_target(false));

    let endpoint = config
        .otlp_endpoint
        .or_else(|| std::env::var("OTLP_ENDPOINT").ok());
    match endpoint {
        Some(endpoint) => {
            let provider = otlp_tracer_provider(config.service_name, &endpoint)?;
            let tracer = provider.tracer(config.service_name);
            registry
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .try_init()?;
        }
        None => registry.try_init()?,
    }

    let _ = INIT.set(());
    Ok(())
}

/// Best-effort init for test binaries; swallows the already-initialized
/// error so parallel test crates can race it.
pub fn init_for_tests() {
    let _ = init_tracing(ObsConfig::default());
}

fn otlp_tracer_provider(
    service_name: &'static str,
    endpoint: &str,
) -> Result<sdk::trace::SdkTracerProvider> {
    let exporter = SpanExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpBinary)
        .with_endpoint(endpoint)
        .build()?;
    let resource = Resource::builder().with_service_name(service_name).build();
    Ok(sdk::trace::SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build())
}
