use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Ai => "ai",
        }
    }

    pub fn is_user(self) -> bool {
        self == Sender::User
    }
}

impl AsRef<str> for Sender {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for Sender {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Sender::User),
            "ai" => Ok(Sender::Ai),
            _ => Err(format!("invalid message sender: {value}")),
        }
    }
}

impl TryFrom<String> for Sender {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Sender> for String {
    fn from(value: Sender) -> Self {
        value.as_str().to_string()
    }
}

/// One entry in a session history.
///
/// Messages are never edited after they are appended. When `is_image` is set,
/// `content` holds the URL of the generated image rather than prose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub content: String,
    #[serde(default)]
    pub is_image: bool,
}

impl Message {
    pub fn new(sender: Sender, content: impl Into<String>, is_image: bool) -> Self {
        Self {
            sender,
            content: content.into(),
            is_image,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content, false)
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(Sender::Ai, content, false)
    }

    pub fn ai_image(url: impl Into<String>) -> Self {
        Self::new(Sender::Ai, url, true)
    }

    pub fn is_user(&self) -> bool {
        self.sender.is_user()
    }
}
