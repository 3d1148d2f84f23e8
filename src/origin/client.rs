//! HTTP origin backed by `reqwest`

use async_trait::async_trait;
use hyper::body::Bytes;
use reqwest::{Client, Url};

use super::{Origin, OriginError};
use crate::cache::ResourceCode;

/// Fetches `<base_url>/<code>` with a plain GET
#[derive(Debug, Clone)]
pub struct HttpOrigin {
    client: Client,
    base_url: String,
}

impl HttpOrigin {
    pub fn new(base_url: &str) -> Result<Self, OriginError> {
        let parsed = Url::parse(base_url).map_err(|e| OriginError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(OriginError::InvalidUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        // No request timeout: a slow origin keeps the client connection open.
        let client = Client::builder()
            .build()
            .map_err(|e| OriginError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, code: ResourceCode) -> String {
        format!("{}/{}", self.base_url, code.get())
    }
}

#[async_trait]
impl Origin for HttpOrigin {
    async fn fetch(&self, code: ResourceCode) -> Result<Bytes, OriginError> {
        let url = self.url_for(code);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| OriginError::Request {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(OriginError::Status {
                status: status.as_u16(),
                url,
            });
        }

        resp.bytes()
            .await
            .map_err(|source| OriginError::Request { url, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::server::conn::http1;
    use hyper::service::service_fn;
    use hyper::{Request, Response};
    use hyper_util::rt::TokioIo;
    use std::convert::Infallible;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    /// Loopback origin that serves `cat-<code>` for `/200` and `/418`, 404 otherwise
    async fn spawn_origin() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let service = service_fn(|req: Request<hyper::body::Incoming>| async move {
                        let resp = match req.uri().path() {
                            "/200" | "/418" => Response::new(Full::new(Bytes::from(format!(
                                "cat-{}",
                                &req.uri().path()[1..]
                            )))),
                            _ => Response::builder()
                                .status(404)
                                .body(Full::new(Bytes::from_static(b"nope")))
                                .unwrap(),
                        };
                        Ok::<_, Infallible>(resp)
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        addr
    }

    #[test]
    fn test_url_for_trims_trailing_slash() {
        let origin = HttpOrigin::new("https://http.cat/").unwrap();
        assert_eq!(origin.url_for(ResourceCode::new(404)), "https://http.cat/404");
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(matches!(
            HttpOrigin::new("not a url"),
            Err(OriginError::InvalidUrl { .. })
        ));
        assert!(matches!(
            HttpOrigin::new("ftp://example.com"),
            Err(OriginError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let addr = spawn_origin().await;
        let origin = HttpOrigin::new(&format!("http://{addr}")).unwrap();

        let body = origin.fetch(ResourceCode::new(418)).await.unwrap();
        assert_eq!(body, Bytes::from_static(b"cat-418"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let addr = spawn_origin().await;
        let origin = HttpOrigin::new(&format!("http://{addr}")).unwrap();

        match origin.fetch(ResourceCode::new(999)).await {
            Err(OriginError::Status { status, url }) => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/999"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_unreachable() {
        // Bind then drop to get a port with nothing listening
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let origin = HttpOrigin::new(&format!("http://{addr}")).unwrap();

        assert!(matches!(
            origin.fetch(ResourceCode::new(200)).await,
            Err(OriginError::Request { .. })
        ));
    }
}
