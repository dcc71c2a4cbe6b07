//! Async client for the tracker REST API.

use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use oeks_common::config::Config;
use oeks_common::history::{DateFilter, HistoryResponse};
use oeks_common::roster::{StaffListResponse, StaffRecord};
use oeks_common::timeline::TimelineResponse;
use oeks_common::video::{VideoHistoryResponse, VideoKind};

/// Errors from a single API call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid API URL {0}")]
    Url(String),
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned {status}")]
    Status { endpoint: String, status: StatusCode },
    #[error("cannot decode {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Thin wrapper over `reqwest::Client` bound to one backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Self::with_timeout(&config.api_base_url, config.http_timeout())
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Transport {
                endpoint: base_url.to_string(),
                source,
            })?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/staff-list`
    pub async fn staff_list(&self) -> Result<StaffListResponse, ApiError> {
        let url = self.endpoint(&["api", "staff-list"], &[])?;
        self.get_json(url).await
    }

    /// `GET /api/staff-history/:id?date=&limit=`
    pub async fn staff_history(
        &self,
        staff_id: &str,
        date: &DateFilter,
        limit: u32,
    ) -> Result<HistoryResponse, ApiError> {
        let limit = limit.to_string();
        let mut params = vec![("limit", limit.as_str())];
        if let Some(day) = date.query_value() {
            params.insert(0, ("date", day));
        }
        let url = self.endpoint(&["api", "staff-history", staff_id], &params)?;
        self.get_json(url).await
    }

    /// `GET /api/staff-videos/:id?date=&type=`
    pub async fn staff_videos(
        &self,
        staff_id: &str,
        date: &DateFilter,
        kind: Option<VideoKind>,
    ) -> Result<VideoHistoryResponse, ApiError> {
        let mut params = Vec::new();
        if let Some(day) = date.query_value() {
            params.push(("date", day));
        }
        if let Some(kind) = kind {
            params.push(("type", kind.as_str()));
        }
        let url = self.endpoint(&["api", "staff-videos", staff_id], &params)?;
        self.get_json(url).await
    }

    /// `GET /api/video-timeline/:id?date=`
    pub async fn video_timeline(
        &self,
        staff_id: &str,
        date: &DateFilter,
    ) -> Result<TimelineResponse, ApiError> {
        let params: Vec<_> = date.query_value().map(|d| ("date", d)).into_iter().collect();
        let url = self.endpoint(&["api", "video-timeline", staff_id], &params)?;
        self.get_json(url).await
    }

    /// `GET /api/staff/:id`
    pub async fn staff(&self, staff_id: &str) -> Result<StaffRecord, ApiError> {
        let url = self.endpoint(&["api", "staff", staff_id], &[])?;
        let mut record: StaffRecord = self.get_json(url).await?;
        if record.id.is_empty() {
            record.id = staff_id.to_string();
        }
        Ok(record)
    }

    /// URL of `GET /api/staff/:id/screenshot`.
    pub fn screenshot_url(&self, staff_id: &str) -> Result<Url, ApiError> {
        self.endpoint(&["api", "staff", staff_id, "screenshot"], &[])
    }

    /// Latest screenshot bytes.
    pub async fn staff_screenshot(&self, staff_id: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.screenshot_url(staff_id)?;
        let endpoint = url.path().to_string();
        let resp = self.send(url).await?;
        let bytes = resp.bytes().await.map_err(|source| ApiError::Decode {
            endpoint,
            source,
        })?;
        Ok(bytes.to_vec())
    }

    // ── helpers ──────────────────────────────────────────────────────────

    fn endpoint(&self, segments: &[&str], params: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Url(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Url(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    async fn send(&self, url: Url) -> Result<reqwest::Response, ApiError> {
        let endpoint = url.path().to_string();
        debug!("GET {url}");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;
        if !resp.status().is_success() {
            return Err(ApiError::Status {
                endpoint,
                status: resp.status(),
            });
        }
        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let endpoint = url.path().to_string();
        let resp = self.send(url).await?;
        resp.json::<T>()
            .await
            .map_err(|source| ApiError::Decode { endpoint, source })
    }
}

// ─── tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_timeout(base, Duration::from_secs(5)).unwrap()
    }

    /// Serve exactly one canned HTTP response and hand back the request line.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let task = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = stream.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            request.lines().next().unwrap_or_default().to_string()
        });
        (base, task)
    }

    #[test]
    fn test_endpoint_urls() {
        let c = client("http://tracker:8080/");
        let url = c.endpoint(&["api", "staff-history", "pc 1"], &[("date", "20240501"), ("limit", "50")]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://tracker:8080/api/staff-history/pc%201?date=20240501&limit=50"
        );
        assert_eq!(
            c.screenshot_url("pc_1").unwrap().as_str(),
            "http://tracker:8080/api/staff/pc_1/screenshot"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let c = client("http://gateway/tracker");
        let url = c.endpoint(&["api", "staff-list"], &[]).unwrap();
        assert_eq!(url.as_str(), "http://gateway/tracker/api/staff-list");
    }

    #[test]
    fn test_invalid_base_url() {
        let c = client("not a url");
        assert!(matches!(c.endpoint(&["api"], &[]), Err(ApiError::Url(_))));
    }

    #[tokio::test]
    async fn test_staff_list_decodes() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"staffList":["pc_1"],"staffData":{"pc_1":{"name":"Ayse","division":"IT","recording_status":"active","timestamp":"2024-05-01T10:00:00"}}}"#,
        )
        .await;
        let resp = client(&base).staff_list().await.unwrap();
        assert_eq!(resp.staff_list, ["pc_1"]);
        assert_eq!(resp.staff_data["pc_1"].name, "Ayse");
        assert_eq!(server.await.unwrap(), "GET /api/staff-list HTTP/1.1");
    }

    #[tokio::test]
    async fn test_history_omits_date_for_all() {
        let (base, server) = serve_once("200 OK", r#"{"history":[],"availableDates":[]}"#).await;
        let resp = client(&base)
            .staff_history("pc_1", &DateFilter::All, 50)
            .await
            .unwrap();
        assert!(resp.history.is_empty());
        assert_eq!(server.await.unwrap(), "GET /api/staff-history/pc_1?limit=50 HTTP/1.1");
    }

    #[tokio::test]
    async fn test_screenshot_bytes_returned() {
        let (base, server) = serve_once("200 OK", "\u{FF}\u{D8}jpeg-bytes").await;
        let bytes = client(&base).staff_screenshot("pc_1").await.unwrap();
        assert_eq!(bytes, "\u{FF}\u{D8}jpeg-bytes".as_bytes());
        assert_eq!(server.await.unwrap(), "GET /api/staff/pc_1/screenshot HTTP/1.1");
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let (base, _server) = serve_once("502 Bad Gateway", "{}").await;
        let err = client(&base).staff("pc_1").await.unwrap_err();
        match err {
            ApiError::Status { endpoint, status } => {
                assert_eq!(endpoint, "/api/staff/pc_1");
                assert_eq!(status, StatusCode::BAD_GATEWAY);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
