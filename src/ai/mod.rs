//! Remote vision-model integration
//!
//! Builds the multimodal identification request and exchanges it with an
//! OpenAI-compatible chat completions endpoint (either the provider itself or
//! a proxy in front of it).

pub mod mime;
pub mod mock;
pub mod openai;
pub mod request;

pub use mock::MockVisionClient;
pub use openai::IdentificationClient;
pub use request::{IdentificationRequest, IdentificationRequestBuilder};

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait VisionService: Send + Sync {
    /// Send one request and return the model's textual answer.
    ///
    /// The request is consumed; every call is a separately billed inference.
    async fn send(&self, request: IdentificationRequest) -> Result<String>;
}
