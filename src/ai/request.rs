use super::mime::detect_image_mime;
use super::openai::types::{ChatCompletionRequest, ChatMessage, ChatMessageContent, MessagePart};
use crate::models::{ModelParameters, RESPONSE_SCHEMA_VERSION};
use crate::{prompts, Error, Result};
use base64::Engine as _;

/// A fully-built identification payload. Consumed by exactly one send.
#[derive(Debug)]
pub struct IdentificationRequest {
    payload: ChatCompletionRequest,
    prompt: String,
    image_len: usize,
}

impl IdentificationRequest {
    pub fn payload(&self) -> &ChatCompletionRequest {
        &self.payload
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Size of the encoded image before base64.
    pub fn image_len(&self) -> usize {
        self.image_len
    }

    pub fn into_payload(self) -> ChatCompletionRequest {
        self.payload
    }
}

pub struct IdentificationRequestBuilder {
    params: ModelParameters,
}

impl IdentificationRequestBuilder {
    pub fn new(params: ModelParameters) -> Self {
        Self { params }
    }

    pub fn build(&self, image: &[u8], location_hint: Option<&str>) -> Result<IdentificationRequest> {
        if image.is_empty() {
            return Err(Error::Validation(
                "cannot build a request without image data".to_string(),
            ));
        }

        let prompt = match location_hint.map(str::trim).filter(|h| !h.is_empty()) {
            Some(location) => format!(
                "{}\n\n{}",
                prompts::render(prompts::LOCATION_HINT, &[("location", location)]).trim_end(),
                prompts::IDENTIFY.trim_end()
            ),
            None => prompts::IDENTIFY.trim_end().to_string(),
        };

        let data_url = format!(
            "data:{};base64,{}",
            detect_image_mime(image),
            base64::engine::general_purpose::STANDARD.encode(image)
        );

        tracing::debug!(
            "Built identification request (schema v{}, {} image bytes, location hint: {})",
            RESPONSE_SCHEMA_VERSION,
            image.len(),
            location_hint.is_some_and(|h| !h.trim().is_empty())
        );

        let payload = ChatCompletionRequest {
            model: self.params.model.clone(),
            temperature: self.params.temperature,
            top_p: self.params.top_p,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(ChatMessageContent::Parts(vec![
                    MessagePart::text(prompt.clone()),
                    MessagePart::image(data_url),
                ])),
            }],
            max_tokens: self.params.max_tokens,
        };

        Ok(IdentificationRequest {
            payload,
            prompt,
            image_len: image.len(),
        })
    }
}

impl Default for IdentificationRequestBuilder {
    fn default() -> Self {
        Self::new(ModelParameters::default())
    }
}
