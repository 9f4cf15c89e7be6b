use anyhow::Result;
use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    trace::{RandomIdGenerator, Sampler, TracerProvider},
    Resource,
};
use opentelemetry_semantic_conventions::{
    resource::{SERVICE_NAME, SERVICE_VERSION},
    SCHEMA_URL,
};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Directives added on top of `RUST_LOG`.
const LOG_DIRECTIVES: &[&str] = &["sqlx=warn", "tower_http=info"];

const EXPORT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TelemetryConfig {
    pub service_name: String,
    pub otlp_endpoint: Option<String>,
    pub deployment_id: String,
    pub environment: String,
    pub service_version: String,
}

impl TelemetryConfig {
    pub fn from_env(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .ok()
                .filter(|endpoint| !endpoint.is_empty()),
            deployment_id: std::env::var("OTEL_DEPLOYMENT_ID")
                .unwrap_or_else(|_| crate::utils::generate_ulid()),
            environment: std::env::var("OTEL_DEPLOYMENT_ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            service_version: std::env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
        }
    }

    fn resource(&self) -> Resource {
        Resource::from_schema_url(
            [
                KeyValue::new(SERVICE_NAME, self.service_name.clone()),
                KeyValue::new(SERVICE_VERSION, self.service_version.clone()),
                KeyValue::new("deployment.environment", self.environment.clone()),
                KeyValue::new("deployment.id", self.deployment_id.clone()),
            ],
            SCHEMA_URL,
        )
    }

    fn tracer_provider(&self) -> Result<TracerProvider> {
        let builder = TracerProvider::builder()
            .with_resource(self.resource())
            .with_sampler(Sampler::AlwaysOn)
            .with_id_generator(RandomIdGenerator::default());

        let Some(endpoint) = self.otlp_endpoint.as_deref() else {
            return Ok(builder.build());
        };

        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_http()
            .with_endpoint(endpoint)
            .with_timeout(EXPORT_TIMEOUT)
            .build()?;

        Ok(builder
            .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
            .build())
    }
}

fn env_filter() -> Result<EnvFilter> {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    for directive in LOG_DIRECTIVES {
        filter = filter.add_directive(directive.parse()?);
    }
    Ok(filter)
}

/// Install the global subscriber: JSON logs filtered by `RUST_LOG` plus an
/// OpenTelemetry layer that exports spans when an OTLP endpoint is configured.
pub fn init_telemetry(config: TelemetryConfig) -> Result<()> {
    let tracer_provider = config.tracer_provider()?;
    global::set_tracer_provider(tracer_provider.clone());

    let tracer = tracer_provider.tracer(config.service_name.clone());
    let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .json()
        .with_filter(env_filter()?);

    tracing_subscriber::registry()
        .with(telemetry_layer)
        .with(fmt_layer)
        .init();

    tracing::info!(
        service_name = %config.service_name,
        service_version = %config.service_version,
        environment = %config.environment,
        exporting = config.otlp_endpoint.is_some(),
        "Telemetry initialized"
    );

    Ok(())
}

pub async fn shutdown_telemetry() {
    tracing::info!("Shutting down telemetry");
    global::shutdown_tracer_provider();
}

pub mod middleware {
    use axum::{
        extract::{MatchedPath, Request},
        middleware::Next,
        response::Response,
    };
    use opentelemetry::{
        global,
        trace::{SpanKind, TraceContextExt, Tracer},
        Context, KeyValue,
    };
    use opentelemetry_http::HeaderExtractor;
    use tracing::{field, Instrument};
    use tracing_opentelemetry::OpenTelemetrySpanExt;

    use crate::utils::share_hash_from_path;

    /// Continue any incoming trace context and wrap the request in a server
    /// span named by its route. Requests for a share carry its hash.
    pub async fn trace_layer(request: Request, next: Next) -> Response {
        let parent_context = global::get_text_map_propagator(|propagator| {
            propagator.extract(&HeaderExtractor(request.headers()))
        });

        let method = request.method().to_string();
        let route = request
            .extensions()
            .get::<MatchedPath>()
            .map(|path| path.as_str().to_string())
            .unwrap_or_else(|| request.uri().path().to_string());
        let share_hash = share_hash_from_path(request.uri().path()).map(str::to_string);

        let mut attributes = vec![
            KeyValue::new("http.request.method", method.clone()),
            KeyValue::new("http.route", route.clone()),
        ];
        if let Some(hash) = &share_hash {
            attributes.push(KeyValue::new("share.hash", hash.clone()));
        }

        let tracer = global::tracer("repl-http");
        let span_builder = tracer
            .span_builder(format!("{} {}", method, route))
            .with_kind(SpanKind::Server)
            .with_attributes(attributes);
        let otel_span = tracer.build_with_context(span_builder, &parent_context);
        let context = Context::current_with_span(otel_span);

        let tracing_span = tracing::info_span!(
            "http_request",
            method = %method,
            route = %route,
            share_hash = field::Empty,
        );
        if let Some(hash) = &share_hash {
            tracing_span.record("share_hash", hash.as_str());
        }
        tracing_span.set_parent(context.clone());

        let response = next.run(request).instrument(tracing_span.clone()).await;

        let status = response.status().as_u16();
        context
            .span()
            .set_attribute(KeyValue::new("http.response.status_code", i64::from(status)));

        tracing_span.in_scope(|| {
            tracing::debug!(
                status,
                trace_id = %context.span().span_context().trace_id(),
                "Request completed"
            );
        });

        response
    }
}
