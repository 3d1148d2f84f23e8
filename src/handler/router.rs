//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: extracts the resource code from
//! the path, dispatches on the method and turns the resolver's result into a
//! response.

use crate::cache::{ResolveError, ResourceCode, Source};
use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry, CacheStatus};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, CONTENT_LENGTH, REFERER, USER_AGENT};
use hyper::{HeaderMap, Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let mut access = state
        .config
        .logging
        .access_log
        .then(|| access_entry(&req, peer_addr));

    let (mut response, cache_status) = route_request(req, &state).await;
    http::set_server_header(&mut response, &state.config.http.server_name);

    if let Some(entry) = access.as_mut() {
        let body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.cache = cache_status;
        entry.finish(response.status().as_u16(), body_bytes, started);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Parse the code first, then dispatch on the method
///
/// A path without a code is answered with 400 whatever the method.
async fn route_request<B>(req: Request<B>, state: &AppState) -> (Response<Full<Bytes>>, CacheStatus)
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let Some(code) = ResourceCode::from_path(req.uri().path()) else {
        return (http::build_400_response(), CacheStatus::Bypass);
    };

    let method = req.method().clone();
    match method {
        Method::GET => serve_get(code, state).await,
        Method::PUT => (serve_put(code, req, state).await, CacheStatus::Bypass),
        Method::DELETE => (serve_delete(code, state).await, CacheStatus::Bypass),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            (http::build_405_response(), CacheStatus::Bypass)
        }
    }
}

async fn serve_get(code: ResourceCode, state: &AppState) -> (Response<Full<Bytes>>, CacheStatus) {
    match state.resolver.get(code).await {
        Ok(image) => {
            let status = match image.source {
                Source::Cache => CacheStatus::Hit,
                Source::Origin => CacheStatus::Miss,
            };
            (http::build_image_response(image.bytes), status)
        }
        Err(e) => (error_response(&e), failed_get_status(&e)),
    }
}

/// A storage fault ends the GET before the origin is asked
fn failed_get_status(err: &ResolveError) -> CacheStatus {
    match err {
        ResolveError::Storage(_) => CacheStatus::Bypass,
        ResolveError::NotFound | ResolveError::Origin(_) => CacheStatus::Miss,
    }
}

async fn serve_put<B>(code: ResourceCode, req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let body = match read_body(req, state.config.http.max_body_size).await {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    match state.resolver.put(code, body).await {
        Ok(()) => http::build_201_response(),
        Err(e) => error_response(&e),
    }
}

async fn serve_delete(code: ResourceCode, state: &AppState) -> Response<Full<Bytes>> {
    match state.resolver.delete(code).await {
        Ok(()) => http::build_deleted_response(),
        Err(e) => error_response(&e),
    }
}

/// Origin failures look like a plain miss to the client
fn error_response(err: &ResolveError) -> Response<Full<Bytes>> {
    match err {
        ResolveError::NotFound | ResolveError::Origin(_) => http::build_404_response(),
        ResolveError::Storage(_) => http::build_500_response(),
    }
}

/// Drain the whole request body into memory before anything is written
async fn read_body<B>(req: Request<B>, limit: Option<u64>) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let Some(max) = limit else {
        return match req.into_body().collect().await {
            Ok(collected) => Ok(collected.to_bytes()),
            Err(e) => {
                let err: BoxError = e.into();
                Err(body_read_failed(&err))
            }
        };
    };

    if let Some(declared) = content_length(req.headers()) {
        if declared > max {
            logger::log_warning(&format!(
                "Request body too large: {declared} bytes (max: {max})"
            ));
            return Err(http::build_413_response());
        }
    }

    let limited = Limited::new(req.into_body(), usize::try_from(max).unwrap_or(usize::MAX));
    match limited.collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!("Request body exceeded {max} bytes"));
            Err(http::build_413_response())
        }
        Err(e) => Err(body_read_failed(&e)),
    }
}

fn body_read_failed(err: &BoxError) -> Response<Full<Bytes>> {
    logger::log_error(&format!("Failed to read request body: {err}"));
    http::build_500_response()
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let uri = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_string(), ToString::to_string);
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(peer_addr.ip().to_string(), req.method().to_string(), uri);
    entry.http_version = match req.version() {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}
