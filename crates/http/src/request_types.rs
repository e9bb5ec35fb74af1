//! Request types (Deserialize)

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub user_query: String,
}
