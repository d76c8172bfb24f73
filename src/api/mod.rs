//! Boundary with the remote text and image generation services.

use std::error::Error;
use std::fmt;

use async_trait::async_trait;
use tracing::warn;

pub mod http;

pub use http::HttpGenerationClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Text,
    Image,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Text => "text",
            Capability::Image => "image",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures from a single generation request.
///
/// The `Display` output is written verbatim into the conversation, so it is
/// phrased for the person chatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The service answered with a non-success status.
    Status {
        capability: Capability,
        status: u16,
        reason: String,
        /// Diagnostic body, when it could be read.
        body: Option<String>,
    },

    /// No response was received.
    Transport {
        capability: Capability,
        reason: String,
    },

    /// The configured endpoint cannot carry a prompt segment.
    Endpoint {
        capability: Capability,
        endpoint: String,
        reason: String,
    },
}

impl GenerationError {
    pub fn capability(&self) -> Capability {
        match self {
            GenerationError::Status { capability, .. }
            | GenerationError::Transport { capability, .. }
            | GenerationError::Endpoint { capability, .. } => *capability,
        }
    }

    /// True for failures reported by (or on the way to) the remote service,
    /// as opposed to local misconfiguration.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            GenerationError::Status { .. } | GenerationError::Transport { .. }
        )
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::Status {
                capability,
                status,
                reason,
                body: Some(body),
            } => write!(
                f,
                "Error generating {capability}: {status} {reason} - {body}"
            ),
            GenerationError::Status {
                capability,
                status,
                reason,
                body: None,
            } => write!(f, "Error generating {capability}: {status} {reason}"),
            GenerationError::Transport { capability, reason } => {
                write!(f, "Network error during {capability} generation: {reason}")
            }
            GenerationError::Endpoint {
                capability,
                endpoint,
                reason,
            } => write!(f, "Invalid {capability} endpoint {endpoint}: {reason}"),
        }
    }
}

impl Error for GenerationError {}

/// Request/response access to the two generation services.
///
/// Each call is a single attempt with no retry, timeout or cancellation.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Generates a plain-text reply for `prompt`.
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Generates an image for `prompt`, returning the URL it can be loaded from.
    async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError>;
}

pub fn image_narration_prompt(image_prompt: &str) -> String {
    format!(
        "You are an AI generating an image based on the prompt \"{image_prompt}\". Briefly describe what kind of image you are creating in a conversational tone."
    )
}

pub fn image_narration_fallback(image_prompt: &str) -> String {
    format!("Okay, I'm generating an image for \"{image_prompt}\".")
}

/// Asks the text service to narrate the image about to be generated.
///
/// Never fails: any error degrades to a fixed sentence about the prompt.
pub async fn describe_image<S>(service: &S, image_prompt: &str) -> String
where
    S: GenerationService + ?Sized,
{
    match service
        .generate_text(&image_narration_prompt(image_prompt))
        .await
    {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "image narration failed, using fallback");
            image_narration_fallback(image_prompt)
        }
    }
}
