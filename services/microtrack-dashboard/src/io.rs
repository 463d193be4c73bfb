//! Data API transport and the JSON record fetch built on it

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::DashboardError;

/// Upper bound on one data API request, connect through body
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Status and raw body of one data API answer
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// GET transport to the data API, swappable in tests
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str) -> crate::Result<HttpResponse>;
}

/// Fetch the observation records at `url`.
///
/// A non-2xx status is an `Api` error. A body that is not a JSON array is a
/// `Json` error.
pub async fn fetch_records(http: &dyn HttpClient, url: &str) -> crate::Result<Vec<Value>> {
    let response = http.get(url).await?;
    if !response.is_success() {
        return Err(DashboardError::Api(format!(
            "GET {} returned status {}",
            url, response.status
        )));
    }

    let records: Vec<Value> = serde_json::from_str(&response.body)?;
    tracing::debug!("GET {} returned {} records", url, records.len());
    Ok(records)
}

/// `HttpClient` over a shared reqwest client
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new(timeout: Duration) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::Http(format!("Building HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

fn failure_kind(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        "timed out"
    } else if error.is_connect() {
        "could not connect"
    } else {
        "failed"
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> crate::Result<HttpResponse> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| DashboardError::Http(format!("GET {} {}: {}", url, failure_kind(&e), e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| DashboardError::Http(format!("GET {} body {}: {}", url, failure_kind(&e), e)))?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;
    use axum::routing::get;
    use axum::Router;

    /// Serve `router` on an ephemeral local port, returning its base URL
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn api_router() -> Router {
        Router::new()
            .route(
                "/api/plants",
                get(|| async { r#"[{"name": "Basil"}, {"name": "Arugula"}]"# }),
            )
            .route(
                "/api/accept",
                get(|headers: HeaderMap| async move {
                    headers
                        .get(ACCEPT)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string()
                }),
            )
    }

    fn mock_answering(status: u16, body: &'static str) -> MockHttpClient {
        let mut mock = MockHttpClient::new();
        mock.expect_get().times(1).returning(move |_| {
            Box::pin(async move {
                Ok(HttpResponse {
                    status,
                    body: body.to_string(),
                })
            })
        });
        mock
    }

    #[tokio::test]
    async fn fetch_records_from_live_server() {
        let base = serve(api_router()).await;
        let client = ReqwestHttpClient::new(REQUEST_TIMEOUT).unwrap();

        let records = fetch_records(&client, &format!("{}/api/plants", base))
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["name"], "Arugula");
    }

    #[tokio::test]
    async fn requests_ask_for_json() {
        let base = serve(api_router()).await;
        let client = ReqwestHttpClient::new(REQUEST_TIMEOUT).unwrap();

        let response = client.get(&format!("{}/api/accept", base)).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, "application/json");
    }

    #[tokio::test]
    async fn live_not_found_is_api_error() {
        let base = serve(api_router()).await;
        let client = ReqwestHttpClient::new(REQUEST_TIMEOUT).unwrap();
        let url = format!("{}/api/missing", base);

        let err = fetch_records(&client, &url).await.unwrap_err();

        match err {
            DashboardError::Api(msg) => {
                assert_eq!(msg, format!("GET {} returned status 404", url));
            }
            other => panic!("expected DashboardError::Api, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn closed_port_is_connect_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/api/plants", listener.local_addr().unwrap());
        drop(listener);
        let client = ReqwestHttpClient::new(REQUEST_TIMEOUT).unwrap();

        let err = fetch_records(&client, &url).await.unwrap_err();

        match err {
            DashboardError::Http(msg) => {
                assert!(msg.starts_with(&format!("GET {} could not connect:", url)), "{msg}");
            }
            other => panic!("expected DashboardError::Http, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_status_is_api_error() {
        let mock = mock_answering(503, "[]");
        let err = fetch_records(&mock, "http://api.test/api/plants")
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Api(msg) if msg.ends_with("status 503")));
    }

    #[tokio::test]
    async fn object_body_is_json_error() {
        let mock = mock_answering(200, r#"{"plants": []}"#);
        let err = fetch_records(&mock, "http://api.test/api/plants")
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Json(_)));
    }

    #[tokio::test]
    async fn empty_array_is_no_records() {
        let mock = mock_answering(200, "[]");
        let records = fetch_records(&mock, "http://api.test/api/plants")
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn success_covers_2xx_only() {
        let ok = HttpResponse {
            status: 204,
            body: String::new(),
        };
        let redirect = HttpResponse {
            status: 302,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }
}
