//! Prompt construction for conversational retrieval.
//!
//! A follow-up question is first rewritten into a standalone question using the
//! conversation so far; retrieval runs on that, and the answer prompt carries
//! the retrieved passages plus the prior turns.

use docqa_core::constants::NO_ANSWER_MESSAGE;
use docqa_core::{Chunk, Turn};

use crate::chat_model::ChatMessage;

/// Turns of history included in prompts; older turns are dropped.
pub const MAX_HISTORY_TURNS: usize = 12;

fn recent(history: &[Turn]) -> &[Turn] {
    let start = history.len().saturating_sub(MAX_HISTORY_TURNS);
    history.get(start..).unwrap_or_default()
}

/// Messages asking the model to rewrite `question` so it stands on its own.
#[must_use]
pub fn condense_question_messages(history: &[Turn], question: &str) -> Vec<ChatMessage> {
    let transcript = recent(history)
        .iter()
        .map(|turn| format!("{}: {}", turn.speaker, turn.text))
        .collect::<Vec<_>>()
        .join("\n");
    let prompt = format!(
        "Given the following conversation and a follow up question, rephrase the follow up \
         question to be a standalone question, in its original language. Reply with the \
         question only.\n\nChat History:\n{transcript}\nFollow Up Input: {question}\nStandalone question:"
    );
    vec![ChatMessage::user(prompt)]
}

/// Messages asking the model to answer `question` from `context` only.
#[must_use]
pub fn answer_messages(context: &[Chunk], history: &[Turn], question: &str) -> Vec<ChatMessage> {
    let context_text = if context.is_empty() {
        "(no relevant passages were found)".to_owned()
    } else {
        context
            .iter()
            .map(|chunk| match chunk.page {
                Some(page) => format!("[page {page}]\n{}", chunk.text),
                None => chunk.text.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    };

    let mut messages = Vec::with_capacity(history.len().min(MAX_HISTORY_TURNS) + 2);
    messages.push(ChatMessage::system(format!(
        "You answer questions about a document the user uploaded. Answer based only on the \
         provided context. If the answer is not in the context, say \"{NO_ANSWER_MESSAGE}\""
    )));
    messages.extend(recent(history).iter().map(ChatMessage::from));
    messages.push(ChatMessage::user(format!(
        "Context:\n{context_text}\n\nQuestion: {question}"
    )));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat_model::Role;

    fn chunk(text: &str, page: Option<u32>) -> Chunk {
        Chunk { text: text.to_owned(), page, source: "doc.pdf".to_owned() }
    }

    #[test]
    fn answer_prompt_layout() {
        let history = vec![Turn::user("What is X?"), Turn::assistant("X is a letter.")];
        let messages =
            answer_messages(&[chunk("X marks the spot.", Some(3))], &history, "Where is it?");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains(NO_ANSWER_MESSAGE));
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[2].role, Role::Assistant);
        let last = &messages[3];
        assert_eq!(last.role, Role::User);
        assert!(last.content.contains("[page 3]\nX marks the spot."));
        assert!(last.content.ends_with("Question: Where is it?"));
    }

    #[test]
    fn answer_prompt_without_context() {
        let messages = answer_messages(&[], &[], "Anything?");
        assert!(messages[1].content.contains("no relevant passages"));
    }

    #[test]
    fn history_is_capped() {
        let history: Vec<Turn> = (0..20)
            .flat_map(|i| [Turn::user(format!("q{i}")), Turn::assistant(format!("a{i}"))])
            .collect();
        let messages = answer_messages(&[], &history, "last");
        assert_eq!(messages.len(), MAX_HISTORY_TURNS + 2);
        assert_eq!(messages[1].content, "q14");
    }

    #[test]
    fn condense_prompt_contains_transcript() {
        let history = vec![Turn::user("Who wrote it?"), Turn::assistant("Ada.")];
        let messages = condense_question_messages(&history, "When?");
        assert_eq!(messages.len(), 1);
        let prompt = &messages[0].content;
        assert!(prompt.contains("user: Who wrote it?\nassistant: Ada."));
        assert!(prompt.contains("Follow Up Input: When?"));
    }
}
