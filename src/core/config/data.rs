use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::api::http::{Endpoints, DEFAULT_IMAGE_ENDPOINT, DEFAULT_TEXT_ENDPOINT};
use crate::utils::url::normalize_base_url;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Base URL of the text generation service
    pub text_endpoint: Option<String>,
    /// Base URL of the image generation service (requests go to `<base>/prompt/...`)
    pub image_endpoint: Option<String>,
}

/// Keys accepted by `chatterbox set` and `chatterbox unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    TextEndpoint,
    ImageEndpoint,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 2] = [ConfigKey::TextEndpoint, ConfigKey::ImageEndpoint];

    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "text-endpoint" => Some(ConfigKey::TextEndpoint),
            "image-endpoint" => Some(ConfigKey::ImageEndpoint),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::TextEndpoint => "text-endpoint",
            ConfigKey::ImageEndpoint => "image-endpoint",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Config {
    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        match key {
            ConfigKey::TextEndpoint => self.text_endpoint.as_deref(),
            ConfigKey::ImageEndpoint => self.image_endpoint.as_deref(),
        }
    }

    /// Stores an endpoint after checking that it parses as an absolute URL.
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<(), String> {
        let value = normalize_base_url(value.trim());
        reqwest::Url::parse(&value).map_err(|err| format!("Invalid URL '{value}': {err}"))?;
        *self.slot(key) = Some(value);
        Ok(())
    }

    pub fn unset(&mut self, key: ConfigKey) {
        *self.slot(key) = None;
    }

    /// Endpoints to use, with command-line overrides taking precedence over
    /// the file and built-in defaults filling the gaps.
    pub fn endpoints(
        &self,
        text_override: Option<&str>,
        image_override: Option<&str>,
    ) -> Endpoints {
        let text = text_override
            .or(self.text_endpoint.as_deref())
            .unwrap_or(DEFAULT_TEXT_ENDPOINT);
        let image = image_override
            .or(self.image_endpoint.as_deref())
            .unwrap_or(DEFAULT_IMAGE_ENDPOINT);
        Endpoints {
            text: text.to_string(),
            image: image.to_string(),
        }
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        for key in ConfigKey::ALL {
            match self.get(key) {
                Some(value) => println!("  {key}: {value}"),
                None => println!("  {key}: (unset)"),
            }
        }
    }

    fn slot(&mut self, key: ConfigKey) -> &mut Option<String> {
        match key {
            ConfigKey::TextEndpoint => &mut self.text_endpoint,
            ConfigKey::ImageEndpoint => &mut self.image_endpoint,
        }
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
