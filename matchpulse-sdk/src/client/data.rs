//! Data endpoint client (live pipeline → backend).

use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::{Client, StatusCode};
use url::Url;

use super::ClientError;
use crate::objects::Snapshot;

/// Path of the consolidated matches + standings endpoint.
pub const DATA_PATH: &str = "/api/data";

/// Path of the endpoint that tells the backend a match has finished.
pub const SYNC_NOTIFY_PATH: &str = "/api/sync-notify";

/// Typed HTTP client for the matchpulse **data endpoint**.
#[derive(Debug, Clone)]
pub struct DataClient {
    http: Client,
    base_url: Url,
}

impl DataClient {
    /// Create a new `DataClient`.
    ///
    /// * `base_url` – root URL of the site serving `/api/data`.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /api/data` – fetch the current categorized snapshot.
    ///
    /// With `force` set, intermediary caches are asked to revalidate.
    pub async fn fetch_snapshot(&self, force: bool) -> Result<Snapshot, ClientError> {
        let url = self.base_url.join(DATA_PATH)?;

        let mut request = self.http.get(url);
        if force {
            request = request
                .header(CACHE_CONTROL, "no-cache")
                .header(PRAGMA, "no-cache");
        }

        let resp = request.send().await?;
        parse_response(resp).await
    }

    /// `GET /api/sync-notify?matchId=…` – report that a match has ended so
    /// the backend persists its final data.
    pub async fn notify_match_end(&self, match_key: &str) -> Result<(), ClientError> {
        let url = self.base_url.join(SYNC_NOTIFY_PATH)?;

        let resp = self
            .http
            .get(url)
            .query(&[("matchId", match_key)])
            .send()
            .await?;

        check_status(resp).await.map(|_| ())
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ClientError::RateLimited);
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    Ok(resp)
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let resp = check_status(resp).await?;
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP response and return the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = stream.read(&mut buf).await.unwrap();
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&buf[..n]).into_owned()
        });
        (url, handle)
    }

    #[tokio::test]
    async fn test_forced_fetch_sends_no_cache() {
        let (url, server) =
            serve_once("200 OK", r#"{"matches":{"live":[],"upcoming":[],"finished":[]}}"#).await;
        let snapshot = DataClient::new(url).fetch_snapshot(true).await.unwrap();
        assert!(snapshot.is_empty());

        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(request.starts_with("get /api/data "));
        assert!(request.contains("cache-control: no-cache"));
    }

    #[tokio::test]
    async fn test_too_many_requests_is_rate_limited() {
        let (url, _server) = serve_once("429 Too Many Requests", "{}").await;
        let err = DataClient::new(url).fetch_snapshot(false).await.unwrap_err();
        assert!(matches!(err, ClientError::RateLimited));
    }

    #[tokio::test]
    async fn test_notify_match_end_query() {
        let (url, server) = serve_once("200 OK", r#"{"ok":true}"#).await;
        DataClient::new(url).notify_match_end("498112").await.unwrap();
        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/sync-notify?matchId=498112 "));
    }

    #[tokio::test]
    async fn test_server_error_keeps_body() {
        let (url, _server) = serve_once("503 Service Unavailable", "upstream down").await;
        let err = DataClient::new(url).notify_match_end("1").await.unwrap_err();
        match err {
            ClientError::Api { status, body } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "upstream down");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
