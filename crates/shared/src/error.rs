//! Error taxonomy for the widget core.
//!
//! Every variant maps to a visible message; nothing is fatal to the
//! embedding page. `Network`, `Api` and the two response-shape errors come
//! out of the completion client; the rest are caller-side.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatError {
    /// The entered credential failed the active validation policy.
    #[error("{0}")]
    InvalidKey(String),

    /// Neither text nor attachments were provided; nothing to send.
    #[error("nothing to send: message text and attachments are both empty")]
    EmptyInput,

    /// A pasted or selected image could not be decoded into an attachment.
    #[error("invalid image attachment: {0}")]
    InvalidAttachment(String),

    /// Transport-level failure before any response body arrived.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with an `error` object; message is verbatim.
    #[error("{0}")]
    Api(String),

    /// The response parsed but carried no candidates.
    #[error("the service returned no candidates")]
    EmptyResponse,

    /// The response body was not the expected shape.
    #[error("unexpected response format from the service")]
    MalformedResponse,
}

impl ChatError {
    /// The wording shown to the user in the chat surface.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::InvalidKey(msg) => msg.clone(),
            ChatError::EmptyInput => "Please enter a message or attach an image.".to_string(),
            ChatError::InvalidAttachment(_) => {
                "That image could not be read. Please try another one.".to_string()
            }
            ChatError::Network(_) => "Network Error: Unable to reach the AI service.".to_string(),
            ChatError::Api(msg) => format!("Error: {}", msg),
            // Both response-shape failures collapse to one generic message.
            ChatError::EmptyResponse | ChatError::MalformedResponse => {
                "Received an unexpected response from the AI service.".to_string()
            }
        }
    }
}
