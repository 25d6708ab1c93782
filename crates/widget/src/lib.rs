//! Session objects driven by a thin UI adapter.
//!
//! `ChatWidget` backs the floating chat popup (multi-turn, attachments,
//! prefix-checked session key); `CodePanel` backs the stateless interactive
//! code sections (persisted key, single-shot requests). Both are generic
//! over the completion client so tests can run without a network.

pub mod chat;
pub mod codebox;
pub mod credential;
