use crate::app_env;
use anyhow::Context;
use opentelemetry::trace::TracerProvider;
use opentelemetry::{KeyValue, global};
use opentelemetry_otlp::{MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::Tracer;
use opentelemetry_sdk::{Resource, runtime};
use tracing::level_filters::LevelFilter;
use tracing_opentelemetry::{MetricsLayer, OpenTelemetryLayer};
use tracing_subscriber::{EnvFilter, prelude::*, registry};

/// The name of the client as it should appear in OpenTelemetry collectors
const SERVICE_NAME: &str = "taskboard-client";

/// OpenTelemetry primitives which export spans and metrics to a collector
pub struct OtelExporters {
    pub tracer: Tracer,
    pub meter: SdkMeterProvider,
}

/// Instantiates OpenTelemetry exporters which run in the background and send spans and metrics
/// to an opentelemetry-compatible gRPC endpoint (typically http://localhost:4317 with a
/// standard sidecar setup). Outgoing API requests carry the trace context, so client spans join
/// the server's traces.
pub fn init_exporters(
    otlp_traces_endpoint: &str,
    otlp_metrics_endpoint: &str,
) -> anyhow::Result<OtelExporters> {
    let span_export = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(otlp_traces_endpoint)
        .build()
        .context("failed to build span exporter")?;
    let meter_export = MetricExporter::builder()
        .with_tonic()
        .with_endpoint(otlp_metrics_endpoint)
        .build()
        .context("failed to build meter exporter")?;

    let metrics_reader = PeriodicReader::builder(meter_export, runtime::Tokio).build();
    let resource = Resource::new([KeyValue::new("service.name", SERVICE_NAME)]);

    let tracer = opentelemetry_sdk::trace::TracerProvider::builder()
        .with_batch_exporter(span_export, runtime::Tokio)
        .with_resource(resource.clone())
        .build()
        .tracer(SERVICE_NAME);
    let meter = SdkMeterProvider::builder()
        .with_reader(metrics_reader)
        .with_resource(resource)
        .build();

    Ok(OtelExporters { tracer, meter })
}

/// Exporters for whichever endpoints are configured. Both must be set for export to start.
pub fn exporters_from_env() -> anyhow::Result<Option<OtelExporters>> {
    let traces = std::env::var(app_env::OTEL_SPAN_EXPORT_URL).ok();
    let metrics = std::env::var(app_env::OTEL_METRIC_EXPORT_URL).ok();

    match (traces, metrics) {
        (Some(traces), Some(metrics)) => init_exporters(&traces, &metrics).map(Some),
        _ => Ok(None),
    }
}

/// Builds a filter from [app_env::LOG_LEVEL] for per-module logging. Filters to the "info"
/// level by default.
pub fn init_env_filter() -> anyhow::Result<EnvFilter> {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var(app_env::LOG_LEVEL)
        .from_env()
        .context("building the logging filter failed")
}

/// Sets up the global logging and tracing sinks. Everything at "debug" and above reaches the
/// OpenTelemetry sinks when [otel_exporters] is provided. [env_filter] applies only to the JSON
/// logger printing to stdout.
pub fn setup_logging_and_tracing(
    env_filter: EnvFilter,
    otel_exporters: Option<OtelExporters>,
) -> anyhow::Result<()> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    match otel_exporters {
        Some(exporters) => registry()
            .with(LevelFilter::DEBUG)
            .with(OpenTelemetryLayer::new(exporters.tracer))
            .with(MetricsLayer::new(exporters.meter))
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_filter(env_filter),
            )
            .try_init(),
        None => registry()
            .with(LevelFilter::DEBUG)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_filter(env_filter),
            )
            .try_init(),
    }
    .context("a global tracing subscriber was already installed")
}
