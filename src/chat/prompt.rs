//! Prompt text sent to the model for a chat turn.

use std::fmt::Write as _;

use crate::types::Material;

/// Instruction placed before every user message.
pub const SYSTEM_PROMPT: &str = "You are \"Copilot\", a helpful Learning Assistant designed to help users learn anything they want to learn.

Your role:
- Help users understand new concepts and topics
- Provide clear, easy-to-understand explanations
- Be friendly, encouraging, and patient
- Break down complex topics into simple parts
- Give practical examples when helpful
- Respond in the same language the user uses

When users ask about learning materials, mention that you can provide curated recommendations including videos, articles, books, and courses.

Always be helpful and focus on making learning enjoyable and accessible.";

/// Build the full prompt: instruction, optional material list, user message.
#[must_use]
pub fn build_chat_prompt(message: &str, materials: &[Material]) -> String {
    let mut prompt = String::from(SYSTEM_PROMPT);

    if !materials.is_empty() {
        prompt.push_str(
            "\n\nThe user asked for learning materials. These materials from our library \
             match the request and will be shown to the user as cards below your reply. \
             Introduce them briefly and explain how they help:\n",
        );
        for material in materials {
            // Writing to a String cannot fail.
            let _ = write!(
                prompt,
                "\n- {} ({}, {})",
                material.title, material.material_type, material.subject
            );
            if let Some(author) = &material.author {
                let _ = write!(prompt, " by {author}");
            }
            if let Some(duration) = &material.duration {
                let _ = write!(prompt, ", {duration}");
            }
            if !material.description.is_empty() {
                let _ = write!(prompt, ": {}", material.description);
            }
        }
    }

    let _ = write!(prompt, "\n\nUser message: {message}");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::material;
    use crate::types::MaterialType;

    #[test]
    fn test_plain_prompt() {
        assert_eq!(
            build_chat_prompt("Apa itu inflasi?", &[]),
            format!("{SYSTEM_PROMPT}\n\nUser message: Apa itu inflasi?")
        );
    }

    #[test]
    fn test_prompt_lists_materials() {
        let mut video = material(1, "ekonomi", MaterialType::Video, 0);
        video.author = Some("Bu Sari".to_string());
        video.duration = Some("12 menit".to_string());
        let book = material(2, "ekonomi", MaterialType::Book, 1);

        let prompt = build_chat_prompt("Berikan saya materi ekonomi", &[video, book]);

        assert!(prompt.starts_with(SYSTEM_PROMPT));
        assert!(prompt.contains(
            "\n- Materi ekonomi 1 (video, ekonomi) by Bu Sari, 12 menit: Deskripsi materi 1"
        ));
        assert!(prompt.contains("\n- Materi ekonomi 2 (book, ekonomi): Deskripsi materi 2"));
        assert!(prompt.ends_with("\n\nUser message: Berikan saya materi ekonomi"));
    }
}
