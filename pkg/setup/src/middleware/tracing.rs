use http::{Request, Response};
use opentelemetry::{global, trace::TraceContextExt as _};
use opentelemetry_http::HeaderExtractor;
use std::task::{Context, Poll};
use tower::{Layer, Service, ServiceBuilder};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnResponse, Trace, TraceLayer};
use tracing::{Level, Span, field, info_span};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

type HttpTraceService<S> =
    Trace<TracePropagationService<S>, SharedClassifier<ServerErrorsAsFailures>, MakeSpan>;

/// A HTTP tracing layer. Extracts trace context and starts a span per request.
#[derive(Clone)]
pub struct TracingHttpServiceLayer;

impl<S> Layer<S> for TracingHttpServiceLayer {
    type Service = HttpTraceService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(MakeSpan)
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(TracePropagationLayer) // extracts trace context and sets trace id
            .service(inner)
    }
}

/// Layer that joins the request span to the caller's trace.
#[derive(Clone)]
pub struct TracePropagationLayer;

impl<S> Layer<S> for TracePropagationLayer {
    type Service = TracePropagationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TracePropagationService { inner }
    }
}

/// Service produced by [`TracePropagationLayer`].
#[derive(Clone)]
pub struct TracePropagationService<S> {
    inner: S,
}

impl<S, ReqBody, RespBody> Service<Request<ReqBody>> for TracePropagationService<S>
where
    S: Service<Request<ReqBody>, Response = Response<RespBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let parent_context = global::get_text_map_propagator(|propagator| {
            propagator.extract(&HeaderExtractor(req.headers()))
        });

        let span = Span::current();
        span.set_parent(parent_context);

        let trace_id = span.context().span().span_context().trace_id();
        span.record("trace_id", trace_id.to_string());

        self.inner.call(req)
    }
}

/// The way [`Span`]s will be created for [`Trace`].
///
/// Only the path is recorded, the query of a login callback carries the
/// authorization code. `user_id` is filled in by the bearer auth layer.
#[derive(Debug, Clone)]
pub struct MakeSpan;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpan {
    fn make_span(&mut self, req: &Request<B>) -> Span {
        info_span!(
            "request",
            method = %req.method(),
            path = %req.uri().path(),
            user_id = field::Empty,
            trace_id = field::Empty
        )
    }
}
