/// Scripted transport for exercising API consumers without a network
use crate::apis::client::{ApiTransport, TransportError, TransportResponse};
use crate::config::ApiConfig;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

type Handler = Box<dyn Fn(&RecordedRequest) -> Result<TransportResponse, TransportError> + Send + Sync>;

/// One request as the transport saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Answers from a FIFO queue first, then from the handler if one is set
pub struct ScriptedTransport {
    queue: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    handler: Option<Handler>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            handler: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> Result<TransportResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            queue: Mutex::new(VecDeque::new()),
            handler: Some(Box::new(handler)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push_json(&self, body: &str) {
        self.push_response(TransportResponse::ok(body));
    }

    pub fn push_response(&self, response: TransportResponse) {
        self.queue.lock().push_back(Ok(response));
    }

    pub fn push_error(&self, error: TransportError) {
        self.queue.lock().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Requests whose `action` parameter equals `action`
    pub fn requests_for(&self, action: &str) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.param("action") == Some(action))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ApiTransport for ScriptedTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<TransportResponse, TransportError> {
        let request = RecordedRequest {
            url: url.to_string(),
            query: query.to_vec(),
        };
        self.requests.lock().push(request.clone());

        if let Some(next) = self.queue.lock().pop_front() {
            return next;
        }
        match &self.handler {
            Some(handler) => handler(&request),
            None => Err(TransportError::Other("script exhausted".to_string())),
        }
    }
}

/// API settings with every delay disabled
pub fn test_api_config() -> ApiConfig {
    ApiConfig {
        retry_delay_ms: 0,
        rate_limit_delay_ms: 0,
        max_requests_per_second: 0,
        page_delay_ms: 0,
        receipt_delay_ms: 0,
        ..ApiConfig::default()
    }
}

/// `{"status":"1","message":"OK","result":<result>}`
pub fn ok_envelope(result: serde_json::Value) -> TransportResponse {
    TransportResponse::ok(
        serde_json::json!({"status": "1", "message": "OK", "result": result}).to_string(),
    )
}

/// JSON-RPC success answer used by proxy endpoints
pub fn rpc_envelope(result: serde_json::Value) -> TransportResponse {
    TransportResponse::ok(serde_json::json!({"jsonrpc": "2.0", "id": 1, "result": result}).to_string())
}
