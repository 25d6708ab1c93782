//! Display events the widget core feeds to its UI shell.
//!
//! The UI adapter owns all element references; it consumes these events to
//! insert rendered messages and toggle the loading indicator.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display-side classification of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A display-only projection of one message: pre-rendered HTML plus data
/// URLs for attached image previews. Not authoritative conversation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub id: Uuid,
    pub sender: Sender,
    pub html: String,
    /// Data URLs for attached image previews, in attachment order.
    pub images: Vec<String>,
    /// Wall-clock label, e.g. "14:03".
    pub timestamp: String,
}

impl RenderedMessage {
    pub fn new(sender: Sender, html: impl Into<String>, images: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            html: html.into(),
            images,
            timestamp: Utc::now().format("%H:%M").to_string(),
        }
    }

    pub fn user(html: impl Into<String>, images: Vec<String>) -> Self {
        Self::new(Sender::User, html, images)
    }

    pub fn bot(html: impl Into<String>) -> Self {
        Self::new(Sender::Bot, html, Vec::new())
    }
}

/// Everything the core tells the UI shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WidgetEvent {
    /// Append a rendered message to the display surface.
    MessageAdded(RenderedMessage),
    /// Show or hide the typing/loading indicator.
    LoadingChanged(bool),
}
