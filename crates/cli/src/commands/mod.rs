pub(crate) mod ingest;
pub(crate) mod serve;
pub(crate) mod sessions;
