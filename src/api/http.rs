use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use tracing::debug;

use crate::api::{Capability, GenerationError, GenerationService};
use crate::utils::url::prompt_url;

pub const DEFAULT_TEXT_ENDPOINT: &str = "https://text.pollinations.ai";
pub const DEFAULT_IMAGE_ENDPOINT: &str = "https://image.pollinations.ai";

const IMAGE_PATH_PREFIX: &str = "prompt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub text: String,
    pub image: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT_ENDPOINT.to_string(),
            image: DEFAULT_IMAGE_ENDPOINT.to_string(),
        }
    }
}

/// [`GenerationService`] over plain `GET` requests.
///
/// Text replies are read from the response body. Image requests are followed
/// through any redirects and the final URL is the result; the body is never
/// downloaded on success.
#[derive(Clone)]
pub struct HttpGenerationClient {
    client: Client,
    endpoints: Endpoints,
}

impl HttpGenerationClient {
    pub fn new(client: Client, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn request_url(&self, capability: Capability, prompt: &str) -> Result<Url, GenerationError> {
        let (base, prefix) = match capability {
            Capability::Text => (&self.endpoints.text, ""),
            Capability::Image => (&self.endpoints.image, IMAGE_PATH_PREFIX),
        };
        let raw = prompt_url(base, prefix, prompt);
        Url::parse(&raw).map_err(|err| GenerationError::Endpoint {
            capability,
            endpoint: base.clone(),
            reason: err.to_string(),
        })
    }

    async fn send(
        &self,
        capability: Capability,
        prompt: &str,
    ) -> Result<Response, GenerationError> {
        let url = self.request_url(capability, prompt)?;
        debug!(%capability, %url, "sending generation request");
        self.client
            .get(url)
            .send()
            .await
            .map_err(|err| transport_error(capability, &err))
    }
}

fn transport_error(capability: Capability, err: &reqwest::Error) -> GenerationError {
    GenerationError::Transport {
        capability,
        reason: err.to_string(),
    }
}

fn status_error(
    capability: Capability,
    status: StatusCode,
    body: Option<String>,
) -> GenerationError {
    GenerationError::Status {
        capability,
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or_default().to_string(),
        body,
    }
}

#[async_trait]
impl GenerationService for HttpGenerationClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        let response = self.send(Capability::Text, prompt).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| transport_error(Capability::Text, &err))?;

        if status.is_success() {
            Ok(body)
        } else {
            debug!(status = status.as_u16(), "text generation returned an error status");
            Err(status_error(Capability::Text, status, Some(body)))
        }
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError> {
        let response = self.send(Capability::Image, prompt).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.url().to_string());
        }

        debug!(status = status.as_u16(), "image generation returned an error status");
        let body = response.text().await.ok();
        Err(status_error(Capability::Image, status, body))
    }
}
