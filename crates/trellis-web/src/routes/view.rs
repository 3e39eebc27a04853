//! View routes
//!
//! [`view_route`] binds an HTTP path to a logical view path and a handler
//! that produces the page props. The route answers first loads with a full
//! document and navigations from a client with a mounted chain with either
//! a segment or a full document, marked in the response header.

use crate::{TrellisState, WebError};
use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures::StreamExt;
use serde::Serialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use trellis_core::{
    to_props, NavigationResponse, RawRequest, RenderedOutput, SegmentResponse, TrellisError,
    SEGMENT_CONTENT_TYPE,
};

/// What a view handler sees of the request
#[derive(Debug, Clone, Default)]
pub struct ViewRequest {
    /// Route parameters, e.g. `id` for `/users/{id}`
    pub params: HashMap<String, String>,
    /// The request as handed to the core
    pub raw: RawRequest,
}

impl ViewRequest {
    /// A route parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Route `path` (axum syntax) to the view registered at `view`
///
/// The handler's output is serialized into the page props.
pub fn view_route<H, Fut, T>(path: &str, view: impl Into<String>, handler: H) -> Router<TrellisState>
where
    H: Fn(ViewRequest) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    T: Serialize + Send,
{
    let view: String = view.into();
    Router::new().route(
        path,
        get(
            move |State(state): State<TrellisState>,
                  params: Option<Path<HashMap<String, String>>>,
                  request: Request| {
                let handler = handler.clone();
                let view = view.clone();
                async move {
                    let (parts, _body) = request.into_parts();
                    let params = params.map(|Path(p)| p).unwrap_or_default();
                    let mut response = render_view(&state, &view, params, &parts, handler)
                        .await
                        .unwrap_or_else(IntoResponse::into_response);
                    // page and segment bodies differ by mounted header, errors included
                    response
                        .headers_mut()
                        .insert(header::VARY, HeaderValue::from(state.mounted_header().clone()));
                    response
                }
            },
        ),
    )
}

async fn render_view<H, Fut, T>(
    state: &TrellisState,
    view: &str,
    params: HashMap<String, String>,
    parts: &Parts,
    handler: H,
) -> Result<Response, WebError>
where
    H: Fn(ViewRequest) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
    T: Serialize,
{
    let raw = raw_request(parts);
    let segment = parts.headers.contains_key(state.mounted_header());
    let trellis = state.trellis();

    let output = handler(ViewRequest {
        params,
        raw: raw.clone(),
    })
    .await
    .map_err(|error| {
        let failure = TrellisError::Handler {
            view: view.to_string(),
            message: format!("{error:#}"),
        };
        trellis.report(&failure, &trellis.request_meta(view, &raw));
        WebError::Handler { error, segment }
    })?;
    let props = to_props(&output).map_err(|source| {
        trellis.report(&source, &trellis.request_meta(view, &raw));
        WebError::Trellis { source, segment }
    })?;

    let response = trellis
        .handle(view, props, &raw)
        .map_err(|source| WebError::Trellis { source, segment })?;
    Ok(into_http(state, response))
}

/// Convert request parts into the core's request type
pub fn raw_request(parts: &Parts) -> RawRequest {
    RawRequest {
        method: parts.method.as_str().to_string(),
        uri: parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string()),
        headers: parts
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect(),
    }
}

fn into_http(state: &TrellisState, response: NavigationResponse) -> Response {
    let kind = HeaderValue::from_static(response.kind().as_str());
    let mut http = match response {
        NavigationResponse::Full(RenderedOutput::Document(document)) => html(Body::from(document)),
        NavigationResponse::Full(RenderedOutput::Stream(stream)) => {
            html(Body::from_stream(stream.map(Ok::<_, Infallible>)))
        }
        NavigationResponse::Segment(segment) => segment_response(&segment),
    };
    http.headers_mut().insert(state.response_header().clone(), kind);
    http
}

fn html(body: Body) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        body,
    )
        .into_response()
}

fn segment_response(segment: &SegmentResponse) -> Response {
    match serde_json::to_vec(segment) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, SEGMENT_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(e) => WebError::Trellis {
            source: trellis_core::TrellisError::serialization(format!("segment: {e}")),
            segment: true,
        }
        .into_response(),
    }
}
