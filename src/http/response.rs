//! HTTP response building module
//!
//! Every response the cache sends is built here: the image body on success
//! and a fixed plain-text line for everything else.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ALLOW, CONTENT_LENGTH, CONTENT_TYPE, SERVER};
use hyper::{Response, StatusCode};

pub const WELCOME_MESSAGE: &str = "Welcome to server";
pub const CREATED_MESSAGE: &str = "Created";
pub const DELETED_MESSAGE: &str = "Deleted";
pub const NOT_FOUND_MESSAGE: &str = "Not Found";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method Not Allowed";
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Payload Too Large";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

const TEXT_PLAIN: &str = "text/plain";
/// Every cache entry is stored as `<code>.jpg`
const IMAGE_CONTENT_TYPE: &str = "image/jpeg";
const ALLOWED_METHODS: &str = "GET, PUT, DELETE";

/// Build 200 response carrying a cached image
pub fn build_image_response(data: Bytes) -> Response<Full<Bytes>> {
    let content_length = data.len();

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, IMAGE_CONTENT_TYPE)
        .header(CONTENT_LENGTH, content_length)
        .body(Full::new(data))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            fallback(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

/// Build plain-text response with a fixed message
pub fn build_text_response(status: StatusCode, message: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .body(Full::new(Bytes::from_static(message.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            fallback(status)
        })
}

/// Build 400 response for paths that carry no resource code
pub fn build_400_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::BAD_REQUEST, WELCOME_MESSAGE)
}

pub fn build_201_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::CREATED, CREATED_MESSAGE)
}

pub fn build_deleted_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::OK, DELETED_MESSAGE)
}

pub fn build_404_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    let mut resp = build_text_response(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_MESSAGE);
    resp.headers_mut()
        .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    resp
}

pub fn build_413_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::PAYLOAD_TOO_LARGE, PAYLOAD_TOO_LARGE_MESSAGE)
}

/// Build 500 response; never carries error detail
pub fn build_500_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
}

/// Stamp the `Server` header on an outgoing response
pub fn set_server_header(resp: &mut Response<Full<Bytes>>, server_name: &str) {
    match HeaderValue::from_str(server_name) {
        Ok(value) => {
            resp.headers_mut().insert(SERVER, value);
        }
        Err(_) => log_build_error("Server header", &server_name),
    }
}

fn fallback(status: StatusCode) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::new()));
    *resp.status_mut() = status;
    resp
}

fn log_build_error(what: &str, error: &dyn std::fmt::Display) {
    crate::logger::log_error(&format!("Failed to build {what} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_image_response() {
        let resp = build_image_response(Bytes::from_static(b"\xff\xd8\xff"));
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "image/jpeg");
        assert_eq!(resp.headers()[CONTENT_LENGTH], "3");
        assert_eq!(body_of(resp).await, Bytes::from_static(b"\xff\xd8\xff"));
    }

    #[tokio::test]
    async fn test_text_responses() {
        let cases = [
            (build_400_response(), StatusCode::BAD_REQUEST, "Welcome to server"),
            (build_201_response(), StatusCode::CREATED, "Created"),
            (build_deleted_response(), StatusCode::OK, "Deleted"),
            (build_404_response(), StatusCode::NOT_FOUND, "Not Found"),
            (build_405_response(), StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"),
            (build_413_response(), StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large"),
            (build_500_response(), StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        ];

        for (resp, status, message) in cases {
            assert_eq!(resp.status(), status);
            assert_eq!(resp.headers()[CONTENT_TYPE], "text/plain");
            assert_eq!(body_of(resp).await, Bytes::from_static(message.as_bytes()));
        }
    }

    #[test]
    fn test_405_lists_allowed_methods() {
        let resp = build_405_response();
        assert_eq!(resp.headers()[ALLOW], "GET, PUT, DELETE");
    }

    #[test]
    fn test_server_header() {
        let mut resp = build_404_response();
        set_server_header(&mut resp, "imgcache");
        assert_eq!(resp.headers()[SERVER], "imgcache");

        let mut resp = build_404_response();
        set_server_header(&mut resp, "bad\nname");
        assert!(resp.headers().get(SERVER).is_none());
    }
}
