use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::{HttpTransport, LlmError};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RecordedRequest {
    pub url: String,
    pub api_key: String,
    pub body: Value,
}

/// Replays queued bodies and records every request it sees.
#[derive(Clone, Default)]
pub(crate) struct RecordingTransport {
    pub responses: Arc<Mutex<VecDeque<Value>>>,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl RecordingTransport {
    pub fn with_responses(responses: Vec<Value>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            requests: Arc::default(),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests mutex").clone()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &Value,
    ) -> Result<Value, LlmError> {
        self.requests
            .lock()
            .expect("requests mutex")
            .push(RecordedRequest {
                url: url.to_string(),
                api_key: api_key.to_string(),
                body: body.clone(),
            });
        self.responses
            .lock()
            .expect("responses mutex")
            .pop_front()
            .ok_or_else(|| LlmError::Configuration("no response queued".to_string()))
    }
}
