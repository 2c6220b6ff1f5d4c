use super::{IdentificationRequest, VisionService};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted stand-in for the remote model.
///
/// Responses are returned in order and cycle once exhausted. With no
/// scripted responses a fixed rose identification is returned.
pub struct MockVisionClient {
    responses: Arc<Mutex<Vec<MockResponse>>>,
    call_count: Arc<Mutex<usize>>,
    prompts: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

#[derive(Debug, Clone)]
enum MockResponse {
    Text(String),
    NetworkError(String),
    ServerError(String),
}

const DEFAULT_RESPONSE: &str = "common_name: Rose\nscientific_name: Rosa\npoisonous: NO\nstory: NONE";

impl MockVisionClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.push(MockResponse::Text(response.into()))
    }

    pub fn with_network_error(self, message: impl Into<String>) -> Self {
        self.push(MockResponse::NetworkError(message.into()))
    }

    pub fn with_server_error(self, message: impl Into<String>) -> Self {
        self.push(MockResponse::ServerError(message.into()))
    }

    /// Sleep before answering, to exercise cancellation.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Prompt text of every request received so far.
    pub fn received_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn push(self, response: MockResponse) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }
}

impl Default for MockVisionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionService for MockVisionClient {
    async fn send(&self, request: IdentificationRequest) -> Result<String> {
        let index = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count - 1
        };
        self.prompts
            .lock()
            .unwrap()
            .push(request.prompt().to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let response = {
            let responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                MockResponse::Text(DEFAULT_RESPONSE.to_string())
            } else {
                responses[index % responses.len()].clone()
            }
        };

        match response {
            MockResponse::Text(text) => Ok(text),
            MockResponse::NetworkError(message) => Err(Error::Network(message)),
            MockResponse::ServerError(message) => Err(Error::Server(message)),
        }
    }
}
