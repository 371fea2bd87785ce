/// Base HTTP plumbing: transport seam, reqwest transport, request pacing
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

// ============================================================================
// TRANSPORT
// ============================================================================

/// Raw HTTP answer handed back to the API client
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure before any HTTP status was received
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    Timeout(String),
    Connection(String),
    Other(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Timeout(msg) => write!(f, "Request timeout: {}", msg),
            TransportError::Connection(msg) => write!(f, "Connection failed: {}", msg),
            TransportError::Other(msg) => write!(f, "Request failed: {}", msg),
        }
    }
}

/// One GET request with query parameters. Implementations own timeouts.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<TransportResponse, TransportError>;
}

/// reqwest-backed transport with a fixed per-request timeout
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> Result<Self, String> {
        if timeout_secs == 0 {
            return Err("Timeout must be greater than zero".to_string());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("airdrop-tracker/0.1")
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl ApiTransport for HttpClient {
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(e.to_string())
                } else if e.is_connect() {
                    TransportError::Connection(e.to_string())
                } else {
                    TransportError::Other(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Other(format!("Failed to read body: {}", e)))?;

        Ok(TransportResponse { status, body })
    }
}

// ============================================================================
// RATE LIMITER
// ============================================================================

/// Enforces a minimum interval between consecutive requests
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    /// `max_per_second == 0` disables pacing
    pub fn new(max_per_second: u32) -> Self {
        let min_interval = if max_per_second > 0 {
            Duration::from_secs_f64(1.0 / f64::from(max_per_second))
        } else {
            Duration::ZERO
        };

        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Wait until the next request may be sent, then mark it as sent
    pub async fn acquire(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let mut last = self.last_request.lock().await;
        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_interval() {
        assert_eq!(RateLimiter::new(8).min_interval(), Duration::from_millis(125));
        assert!(RateLimiter::new(0).min_interval().is_zero());
    }

    #[tokio::test]
    async fn test_rate_limiter_spaces_requests() {
        let limiter = RateLimiter::new(20); // 50ms apart

        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(40));

        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(45));
    }

    #[test]
    fn test_http_client_rejects_zero_timeout() {
        assert!(HttpClient::new(0).is_err());
        assert_eq!(HttpClient::new(30).unwrap().timeout(), Duration::from_secs(30));
    }
}
