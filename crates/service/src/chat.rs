//! Conversational retrieval over one document's index.

use std::collections::HashSet;
use std::sync::Arc;

use docqa_core::{Chunk, SourceRef, Turn};
use docqa_embeddings::Embedder;
use docqa_llm::{ChatModel, prompts};
use docqa_storage::VectorIndex;

use crate::error::ServiceError;

/// A generated answer and the passages it was grounded on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    /// Distinct `(source, page)` pairs in retrieval order.
    pub sources: Vec<SourceRef>,
}

pub struct ChatOrchestrator {
    embedder: Arc<dyn Embedder>,
    chat_model: Arc<dyn ChatModel>,
    top_k: usize,
}

impl ChatOrchestrator {
    pub fn new(embedder: Arc<dyn Embedder>, chat_model: Arc<dyn ChatModel>, top_k: usize) -> Self {
        Self { embedder, chat_model, top_k: top_k.max(1) }
    }

    /// Answers `question` from `index`, taking prior `history` into account.
    ///
    /// With history present the question is first rewritten into a
    /// standalone one so retrieval does not depend on earlier turns.
    pub async fn answer(
        &self,
        index: &VectorIndex,
        question: &str,
        history: &[Turn],
    ) -> Result<Answer, ServiceError> {
        let standalone = self.standalone_question(question, history).await?;

        let embedder = Arc::clone(&self.embedder);
        let query = standalone.clone();
        let vector = tokio::task::spawn_blocking(move || embedder.embed_one(&query)).await??;

        let hits = index.search(&vector, self.top_k)?;
        tracing::debug!(
            retrieved = hits.len(),
            best_score = hits.first().map(|h| h.score),
            "retrieved context"
        );
        let context: Vec<Chunk> = hits.into_iter().map(|hit| hit.chunk).collect();
        let sources = distinct_sources(&context);

        let messages = prompts::answer_messages(&context, history, &standalone);
        let text = self.chat_model.complete(&messages).await?;
        Ok(Answer { text: text.trim().to_owned(), sources })
    }

    async fn standalone_question(
        &self,
        question: &str,
        history: &[Turn],
    ) -> Result<String, ServiceError> {
        if history.is_empty() {
            return Ok(question.to_owned());
        }
        let rewritten = self
            .chat_model
            .complete(&prompts::condense_question_messages(history, question))
            .await?;
        let rewritten = rewritten.trim();
        if rewritten.is_empty() {
            return Ok(question.to_owned());
        }
        tracing::debug!(original = question, standalone = rewritten, "condensed follow-up question");
        Ok(rewritten.to_owned())
    }
}

fn distinct_sources(chunks: &[Chunk]) -> Vec<SourceRef> {
    let mut seen = HashSet::new();
    chunks.iter().map(Chunk::source_ref).filter(|source| seen.insert(source.clone())).collect()
}
