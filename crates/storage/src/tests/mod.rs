//! Test utilities and module declarations for storage tests.

use std::path::PathBuf;
use std::sync::Arc;

use docqa_core::{Chunk, NewSession};
use tempfile::TempDir;

use crate::{JsonSessionStore, VectorIndex};

mod upload_tests;

pub async fn create_test_store(max_live_indices: usize) -> (JsonSessionStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonSessionStore::open(temp_dir.path().join("sessions.json"), max_live_indices)
        .await
        .unwrap();
    (store, temp_dir)
}

pub fn new_session(id: &str, title: &str) -> NewSession {
    NewSession {
        session_id: id.to_owned(),
        title: title.to_owned(),
        source_file_path: PathBuf::from(format!("uploaded_pdfs/{id}.pdf")),
    }
}

pub fn tiny_index(text: &str) -> Arc<VectorIndex> {
    let chunk = Chunk { text: text.to_owned(), page: Some(1), source: "doc.pdf".to_owned() };
    Arc::new(VectorIndex::build("test", 2, vec![chunk], vec![vec![1.0, 0.0]]).unwrap())
}
