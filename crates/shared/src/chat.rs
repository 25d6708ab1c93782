//! Conversation data model shared by the request builder, the completion
//! client, and the session objects.
//!
//! `Turn` and `Part` serialize directly into the wire shape the
//! `generateContent` endpoint expects, so there is no separate DTO layer.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// Base64 image payload with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// One fragment of a turn: text, or an inline image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text),
            Part::InlineData { .. } => None,
        }
    }
}

/// One message unit in a conversation. Immutable once appended to history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Turn {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Role::User,
            parts,
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::text(text)],
        }
    }
}

/// A pending image, as produced by the UI's file-select or paste capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub mime_type: String,
    pub data: String,
}

impl ImageAttachment {
    /// Parse a `data:image/png;base64,...` URL as delivered by the browser
    /// side. The payload is everything after the first comma; the MIME type
    /// sits between `:` and `;` in the header.
    pub fn from_data_url(url: &str) -> Result<Self, ChatError> {
        let (meta, data) = url
            .split_once(',')
            .ok_or_else(|| ChatError::InvalidAttachment("missing data payload".into()))?;
        let mime_type = meta
            .split_once(':')
            .map(|(_, rest)| rest)
            .and_then(|rest| rest.split(';').next())
            .filter(|m| !m.is_empty())
            .ok_or_else(|| ChatError::InvalidAttachment("missing MIME type".into()))?;
        Ok(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    /// Build an attachment from raw bytes (e.g. a dropped file).
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: BASE64_STANDARD.encode(bytes),
        }
    }

    /// Re-assemble the data URL, for preview display.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn into_part(self) -> Part {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: self.mime_type,
                data: self.data,
            },
        }
    }
}

/// Append-only sequence of turns for the multi-turn variant.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
