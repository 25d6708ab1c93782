//! Request construction: turns a system instruction, prior history, the
//! current text, and pending attachments into the ordered `contents` list.
//!
//! The system instruction travels as a synthetic `user` turn (the endpoint
//! has no dedicated slot in this payload shape). The stateful variant only
//! inserts it on the first exchange; the stateless variant prepends it on
//! every call.

use shared::chat::{ImageAttachment, Part, Turn};
use shared::error::ChatError;

/// Build the current user turn: text part first (only when non-empty), then
/// one inline-image part per attachment, in attachment order.
pub fn user_turn(user_text: &str, images: &[ImageAttachment]) -> Turn {
    let mut parts = Vec::with_capacity(1 + images.len());
    let text = user_text.trim();
    if !text.is_empty() {
        parts.push(Part::text(text));
    }
    for image in images {
        parts.push(image.clone().into_part());
    }
    Turn::user(parts)
}

fn ensure_sendable(user_text: &str, images: &[ImageAttachment]) -> Result<(), ChatError> {
    if user_text.trim().is_empty() && images.is_empty() {
        return Err(ChatError::EmptyInput);
    }
    Ok(())
}

/// Stateful variant: `[systemTurn?, ...history, newUserTurn]`, where the
/// system turn is inserted only when `history` is empty at send time.
pub fn build_contents(
    history: &[Turn],
    system_instruction: &str,
    user_text: &str,
    images: &[ImageAttachment],
) -> Result<Vec<Turn>, ChatError> {
    ensure_sendable(user_text, images)?;

    let mut contents = Vec::with_capacity(history.len() + 2);
    if history.is_empty() {
        contents.push(Turn::user(vec![Part::text(system_instruction)]));
    }
    contents.extend_from_slice(history);
    contents.push(user_turn(user_text, images));
    Ok(contents)
}

/// Stateless variant: the system turn always leads, followed by the single
/// user turn. There is no history to carry.
pub fn build_single_shot(
    system_instruction: &str,
    user_text: &str,
    images: &[ImageAttachment],
) -> Result<Vec<Turn>, ChatError> {
    ensure_sendable(user_text, images)?;

    Ok(vec![
        Turn::user(vec![Part::text(system_instruction)]),
        user_turn(user_text, images),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::chat::Role;

    const SYSTEM: &str = "You are a helpful assistant.";

    fn png(data: &str) -> ImageAttachment {
        ImageAttachment {
            mime_type: "image/png".into(),
            data: data.into(),
        }
    }

    #[test]
    fn test_text_only_produces_single_text_part() {
        let contents = build_contents(&[], SYSTEM, "hello there", &[]).unwrap();
        let user = contents.last().unwrap();
        assert_eq!(user.parts.len(), 1);
        assert_eq!(user.parts[0].as_text(), Some("hello there"));
    }

    #[test]
    fn test_images_preserve_attachment_order() {
        let images = vec![png("first"), png("second"), png("third")];
        let contents = build_contents(&[], SYSTEM, "look", &images).unwrap();
        let user = contents.last().unwrap();
        assert_eq!(user.parts.len(), 4);
        for (i, expected) in ["first", "second", "third"].iter().enumerate() {
            match &user.parts[i + 1] {
                Part::InlineData { inline_data } => {
                    assert_eq!(inline_data.data, *expected);
                    assert_eq!(inline_data.mime_type, "image/png");
                }
                other => panic!("expected inline image, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_image_without_text_has_no_text_part() {
        let contents = build_contents(&[], SYSTEM, "   ", &[png("only")]).unwrap();
        let user = contents.last().unwrap();
        assert_eq!(user.parts.len(), 1);
        assert!(user.parts[0].as_text().is_none());
    }

    #[test]
    fn test_empty_input_rejected_only_when_both_empty() {
        assert_eq!(
            build_contents(&[], SYSTEM, "  ", &[]),
            Err(ChatError::EmptyInput)
        );
        assert!(build_contents(&[], SYSTEM, "text", &[]).is_ok());
        assert!(build_contents(&[], SYSTEM, "", &[png("x")]).is_ok());
        assert_eq!(
            build_single_shot(SYSTEM, "", &[]),
            Err(ChatError::EmptyInput)
        );
    }

    #[test]
    fn test_system_turn_inserted_on_empty_history() {
        let contents = build_contents(&[], SYSTEM, "hi", &[]).unwrap();
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].role, Role::User);
        assert_eq!(contents[0].parts[0].as_text(), Some(SYSTEM));
    }

    #[test]
    fn test_system_turn_not_reinserted_with_history() {
        let history = vec![
            Turn::user(vec![Part::text(SYSTEM)]),
            Turn::user(vec![Part::text("hi")]),
            Turn::model_text("hello!"),
        ];
        let contents = build_contents(&history, SYSTEM, "and again", &[]).unwrap();
        assert_eq!(contents.len(), 4);
        // Prior turns come through unchanged, new user turn last.
        assert_eq!(contents[..3], history[..]);
        assert_eq!(contents[3].parts[0].as_text(), Some("and again"));
    }

    #[test]
    fn test_single_shot_always_leads_with_system() {
        let contents = build_single_shot(SYSTEM, "generate code", &[]).unwrap();
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].parts[0].as_text(), Some(SYSTEM));
        assert_eq!(contents[1].parts[0].as_text(), Some("generate code"));
    }

    #[test]
    fn test_user_text_is_trimmed() {
        let contents = build_contents(&[], SYSTEM, "  padded  ", &[]).unwrap();
        assert_eq!(contents.last().unwrap().parts[0].as_text(), Some("padded"));
    }
}
