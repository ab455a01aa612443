use std::error::Error;

use common::env::{env_opt, env_or};
use opentelemetry::global;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{SpanExporter, WithExportConfig as _};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::{Resource, propagation::TraceContextPropagator};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

const DEFAULT_FILTER: &str = "info,h2=warn,hyper=warn,tower=warn";

/// Handle to the installed exporters. Call [`Telemetry::shutdown`] before exit
/// so buffered spans are flushed.
pub struct Telemetry {
    tracer_provider: Option<SdkTracerProvider>,
}

impl Telemetry {
    pub fn shutdown(self) -> Result<(), Box<dyn Error>> {
        if let Some(provider) = self.tracer_provider {
            provider.shutdown()?;
        }
        Ok(())
    }
}

/// Installs the global tracing subscriber.
///
/// Log lines go to stdout, as JSON when `LOG_FORMAT=json`, filtered by
/// `RUST_LOG`. Spans are exported over OTLP when
/// `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
pub fn init_tracer(service_name: &'static str) -> Result<Telemetry, Box<dyn Error>> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    let tracer_provider = match env_opt("OTEL_EXPORTER_OTLP_ENDPOINT") {
        Some(endpoint) => {
            let span_exporter = SpanExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint)
                .build()?;
            let provider = SdkTracerProvider::builder()
                .with_resource(Resource::builder().with_service_name(service_name).build())
                .with_batch_exporter(span_exporter)
                .build();
            global::set_tracer_provider(provider.clone());
            Some(provider)
        }
        None => None,
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let otel_layer = tracer_provider
        .as_ref()
        .map(|provider| tracing_opentelemetry::layer().with_tracer(provider.tracer(service_name)));
    let (json_layer, text_layer) = if env_or("LOG_FORMAT", "text") == "json" {
        (Some(fmt::layer().json()), None)
    } else {
        (None, Some(fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(otel_layer)
        .with(json_layer)
        .with(text_layer)
        .try_init()?;

    Ok(Telemetry { tracer_provider })
}
