use anyhow::Result;
use docqa_core::Config;
use docqa_storage::JsonSessionStore;

/// Read-only: the sessions file is never rewritten or moved.
pub(crate) async fn run(config: &Config) -> Result<()> {
    let sessions = JsonSessionStore::read_persisted(config.sessions_file.clone()).await?;
    println!("{}", serde_json::to_string_pretty(&sessions)?);
    Ok(())
}
