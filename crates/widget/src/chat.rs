//! The floating chat popup session: multi-turn history, pending image
//! attachments, and a session-only prefix-checked key.
//!
//! While no key is held, submitted text is interpreted as a key attempt.
//! The UI adapter is responsible for preventing a second submission while
//! one is in flight; this object does not guard against overlap.

use tracing::info;

use providers::gemini::CompletionClient;
use providers::request;
use render::bubble;
use shared::chat::{ConversationHistory, ImageAttachment, Turn};
use shared::error::ChatError;
use shared::events::{RenderedMessage, WidgetEvent};

use crate::credential::{CredentialHolder, KeyPolicy};

/// Behavioral constraints sent once per conversation, as the first turn.
pub const CHAT_SYSTEM_INSTRUCTION: &str = "\
You are a helpful assistant on a programming Q&A site. \
You are an expert in Python exploratory data analysis (pandas, seaborn, matplotlib) and Java development.
1. If the user asks a question about Python EDA or Java, answer it clearly with code examples where necessary.
2. If an image is provided, analyze it in the context of Python EDA or Java (e.g., explain an error screenshot, interpret a data plot).
3. If the user asks about other topics, politely refuse and remind them of your expertise.
4. Keep answers concise and helpful.";

const KEY_ACCEPTED_MESSAGE: &str =
    "API key accepted! How can I help you with Python EDA or Java today?";

pub struct ChatWidget<C> {
    client: C,
    credentials: CredentialHolder,
    history: ConversationHistory,
    pending_images: Vec<ImageAttachment>,
}

impl<C: CompletionClient> ChatWidget<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            credentials: CredentialHolder::session_only(KeyPolicy::GooglePrefixed),
            history: ConversationHistory::new(),
            pending_images: Vec::new(),
        }
    }

    pub fn has_key(&self) -> bool {
        self.credentials.get().is_some()
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Queue an image from the UI's file-select capture.
    pub fn attach_image(&mut self, image: ImageAttachment) {
        self.pending_images.push(image);
    }

    /// Queue an image from a paste event's data URL.
    pub fn attach_data_url(&mut self, url: &str) -> Result<(), ChatError> {
        self.pending_images.push(ImageAttachment::from_data_url(url)?);
        Ok(())
    }

    /// The UI's "clear images" trigger.
    pub fn clear_images(&mut self) {
        self.pending_images.clear();
    }

    pub fn pending_images(&self) -> &[ImageAttachment] {
        &self.pending_images
    }

    /// One submission: consumes the pending attachments, performs at most
    /// one network call, and returns the display events in order. The
    /// loading indicator is always cleared as the final event of a sent
    /// request, on success and failure alike.
    pub async fn submit(&mut self, raw_text: &str) -> Vec<WidgetEvent> {
        let text = raw_text.trim().to_string();
        let images = std::mem::take(&mut self.pending_images);

        // Nothing to do; mirrors the widget ignoring an empty send.
        if text.is_empty() && images.is_empty() {
            return Vec::new();
        }

        if self.credentials.get().is_none() {
            return match self.credentials.set(&text) {
                Ok(()) => {
                    info!("chat API key accepted");
                    vec![WidgetEvent::MessageAdded(RenderedMessage::bot(
                        bubble::render_bot_text(KEY_ACCEPTED_MESSAGE),
                    ))]
                }
                Err(e) => {
                    // The send didn't happen, so give the attachments back.
                    self.pending_images = images;
                    vec![WidgetEvent::MessageAdded(RenderedMessage::bot(
                        bubble::render_bot_text(&e.user_message()),
                    ))]
                }
            };
        }
        let api_key = self
            .credentials
            .get()
            .map(|k| k.as_str().to_string())
            .unwrap_or_default();

        let mut events = vec![
            WidgetEvent::MessageAdded(RenderedMessage::user(
                bubble::render_user_text(&text),
                images.iter().map(|i| i.to_data_url()).collect(),
            )),
            WidgetEvent::LoadingChanged(true),
        ];

        let outcome = match request::build_contents(
            self.history.turns(),
            CHAT_SYSTEM_INSTRUCTION,
            &text,
            &images,
        ) {
            Ok(contents) => self.client.generate(&api_key, contents).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(reply) => {
                self.history.push(request::user_turn(&text, &images));
                self.history.push(Turn::model_text(&reply));
                events.push(WidgetEvent::MessageAdded(RenderedMessage::bot(
                    bubble::render_bot_text(&reply),
                )));
            }
            Err(e) => {
                events.push(WidgetEvent::MessageAdded(RenderedMessage::bot(
                    bubble::render_bot_text(&e.user_message()),
                )));
            }
        }
        events.push(WidgetEvent::LoadingChanged(false));
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::chat::Part;
    use shared::events::Sender;
    use std::sync::Mutex;

    const GOOD_KEY: &str = "AIzaSyA-0123456789abcdefghij";

    struct StubClient {
        reply: Result<String, ChatError>,
        calls: Mutex<Vec<Vec<Turn>>>,
    }

    impl StubClient {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(err: ChatError) -> Self {
            Self {
                reply: Err(err),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl CompletionClient for StubClient {
        async fn generate(&self, _api_key: &str, contents: Vec<Turn>) -> Result<String, ChatError> {
            self.calls.lock().unwrap().push(contents);
            self.reply.clone()
        }
    }

    fn png() -> ImageAttachment {
        ImageAttachment {
            mime_type: "image/png".into(),
            data: "AAAA".into(),
        }
    }

    fn message_htmls(events: &[WidgetEvent]) -> Vec<(Sender, String)> {
        events
            .iter()
            .filter_map(|e| match e {
                WidgetEvent::MessageAdded(m) => Some((m.sender, m.html.clone())),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_empty_submission_emits_nothing() {
        let mut widget = ChatWidget::new(StubClient::replying("hi"));
        assert!(widget.submit("   ").await.is_empty());
    }

    #[tokio::test]
    async fn test_short_key_rejected() {
        let mut widget = ChatWidget::new(StubClient::replying("hi"));
        let events = widget.submit("AIzaShort").await;
        assert!(!widget.has_key());
        let messages = message_htmls(&events);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, Sender::Bot);
        assert!(messages[0].1.contains("AIza"));
    }

    #[tokio::test]
    async fn test_key_rejection_restores_attachments() {
        let mut widget = ChatWidget::new(StubClient::replying("hi"));
        widget.attach_image(png());
        widget.submit("not-a-key").await;
        assert_eq!(widget.pending_images().len(), 1);
    }

    #[tokio::test]
    async fn test_key_acceptance_welcomes_without_sending() {
        let mut widget = ChatWidget::new(StubClient::replying("hi"));
        let events = widget.submit(GOOD_KEY).await;
        assert!(widget.has_key());
        let messages = message_htmls(&events);
        assert!(messages[0].1.contains("API key accepted!"));
        // The key attempt is not a chat turn and triggers no request.
        assert!(widget.history().is_empty());
    }

    #[tokio::test]
    async fn test_successful_send_grows_history_by_two() {
        let mut widget = ChatWidget::new(StubClient::replying("hello **there**"));
        widget.submit(GOOD_KEY).await;

        let events = widget.submit("hi bot").await;
        assert_eq!(widget.history().len(), 2);
        assert_eq!(widget.history().turns()[1].role, shared::chat::Role::Model);

        let messages = message_htmls(&events);
        assert_eq!(messages[0], (Sender::User, "hi bot".to_string()));
        assert_eq!(
            messages[1],
            (Sender::Bot, "hello <strong>there</strong>".to_string())
        );
        assert!(matches!(events.last(), Some(WidgetEvent::LoadingChanged(false))));
    }

    #[tokio::test]
    async fn test_system_instruction_sent_only_on_first_exchange() {
        let client = StubClient::replying("ok");
        let mut widget = ChatWidget::new(client);
        widget.submit(GOOD_KEY).await;
        widget.submit("first").await;
        widget.submit("second").await;

        let calls = widget.client.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        // First call: system turn, then the user turn.
        assert_eq!(calls[0].len(), 2);
        assert_eq!(
            calls[0][0].parts[0].as_text(),
            Some(CHAT_SYSTEM_INSTRUCTION)
        );
        // Second call: prior two turns plus the new user turn, no re-insert.
        assert_eq!(calls[1].len(), 3);
        assert_eq!(calls[1][0].parts[0].as_text(), Some("first"));
        assert_eq!(calls[1][2].parts[0].as_text(), Some("second"));
    }

    #[tokio::test]
    async fn test_attachments_ride_along_and_clear_on_send() {
        let mut widget = ChatWidget::new(StubClient::replying("seen"));
        widget.submit(GOOD_KEY).await;
        widget.attach_image(png());
        widget
            .attach_data_url("data:image/jpeg;base64,BBBB")
            .unwrap();

        let events = widget.submit("look at these").await;
        assert!(widget.pending_images().is_empty());

        let calls = widget.client.calls.lock().unwrap();
        let user_turn = calls[0].last().unwrap();
        assert_eq!(user_turn.parts.len(), 3);
        assert!(matches!(user_turn.parts[1], Part::InlineData { .. }));

        // The displayed user message carries both previews.
        if let WidgetEvent::MessageAdded(msg) = &events[0] {
            assert_eq!(msg.images.len(), 2);
            assert_eq!(msg.images[1], "data:image/jpeg;base64,BBBB");
        } else {
            panic!("expected user message first");
        }
    }

    #[tokio::test]
    async fn test_failed_send_leaves_history_and_clears_loading() {
        let mut widget = ChatWidget::new(StubClient::failing(ChatError::Network(
            "connection refused".into(),
        )));
        widget.submit(GOOD_KEY).await;

        let events = widget.submit("hello?").await;
        assert!(widget.history().is_empty());

        let messages = message_htmls(&events);
        assert_eq!(messages[1].0, Sender::Bot);
        assert!(messages[1].1.contains("Network Error"));
        assert!(matches!(events.last(), Some(WidgetEvent::LoadingChanged(false))));
    }

    #[tokio::test]
    async fn test_api_error_surfaced_verbatim() {
        let mut widget =
            ChatWidget::new(StubClient::failing(ChatError::Api("quota exceeded".into())));
        widget.submit(GOOD_KEY).await;
        let events = widget.submit("hi").await;
        let messages = message_htmls(&events);
        assert_eq!(messages[1].1, "Error: quota exceeded");
    }
}
