//! The interactive code-section panel: stateless, single-shot, with a key
//! persisted across reloads.
//!
//! Each run is independent; the system instruction is prepended to every
//! request because there is no conversation history to anchor it.

use tracing::info;

use providers::gemini::CompletionClient;
use providers::request;
use render::codebox;
use shared::error::ChatError;

use crate::credential::{CredentialHolder, KeyPolicy, KeyStore};

/// Instruction for the code panels: code only, fenced, with the fixed
/// header line when tracing execution (the renderer strips both).
pub const CODEBOX_SYSTEM_INSTRUCTION: &str = "\
You are a code generator embedded in an interactive documentation page. \
Respond with only the code for the user's request, inside a single fenced code block, with no commentary. \
If the user asks you to run or trace code, begin the reply with the line 'Output of the Code' followed by the result.";

pub struct CodePanel<C> {
    client: C,
    credentials: CredentialHolder,
}

impl<C: CompletionClient> CodePanel<C> {
    pub fn new(client: C) -> Self {
        Self::with_store(client, KeyStore::open_default())
    }

    /// Panel backed by an explicit store location (used by tests).
    pub fn with_store(client: C, store: KeyStore) -> Self {
        Self {
            client,
            credentials: CredentialHolder::persistent(KeyPolicy::AnyNonEmpty, store),
        }
    }

    pub fn has_key(&self) -> bool {
        self.credentials.get().is_some()
    }

    /// The key-modal save action: validates and persists.
    pub fn save_key(&mut self, raw: &str) -> Result<(), ChatError> {
        self.credentials.set(raw)?;
        info!("code panel API key saved");
        Ok(())
    }

    /// One generation: build the single-shot contents, perform the call,
    /// return the cleaned and highlighted HTML fragment.
    pub async fn run(&self, prompt: &str) -> Result<String, ChatError> {
        let key = self.credentials.get().ok_or_else(|| {
            ChatError::InvalidKey("No API key saved. Open the key settings and paste your key.".to_string())
        })?;

        let contents = request::build_single_shot(CODEBOX_SYSTEM_INSTRUCTION, prompt, &[])?;
        let reply = self.client.generate(key.as_str(), contents).await?;
        Ok(codebox::render_code(&reply))
    }
}
