//! Shared constants for docqa.
//!
//! Centralizes defaults that would otherwise be duplicated across crates.

/// The only document format accepted for upload.
pub const ACCEPTED_CONTENT_TYPE: &str = "application/pdf";

/// Every PDF file starts with this header.
pub const PDF_MAGIC: &[u8] = b"%PDF-";

/// Extension used for stored uploads.
pub const UPLOAD_EXTENSION: &str = "pdf";

/// Title used when the upload carries no filename.
pub const DEFAULT_TITLE: &str = "document.pdf";

/// Upload directory name under the data dir.
pub const UPLOAD_DIR_NAME: &str = "uploaded_pdfs";

/// Sessions file name under the data dir.
pub const SESSIONS_FILE_NAME: &str = "sessions.json";

/// Maximum length of a session identifier.
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Target chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Characters shared between neighbouring chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 150;

/// Number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 4;

/// Upper bound for a single ingestion run.
pub const DEFAULT_INGEST_TIMEOUT_SECS: u64 = 120;

/// Upper bound for answer generation (condense + retrieve + answer).
pub const DEFAULT_ANSWER_TIMEOUT_SECS: u64 = 90;

/// Live vector indices kept in memory before least-recently-used eviction.
pub const DEFAULT_MAX_LIVE_INDICES: usize = 64;

/// Maximum accepted upload body (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com";

/// Default chat model.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Sampling temperature for answers.
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.3;

/// Retries for transient LLM failures.
pub const DEFAULT_LLM_MAX_RETRIES: u32 = 3;

/// First retry delay; doubled on every further attempt.
pub const DEFAULT_LLM_RETRY_BASE_MS: u64 = 1000;

/// Answer returned when the document does not contain the answer.
pub const NO_ANSWER_MESSAGE: &str = "I cannot answer based on the information provided.";
