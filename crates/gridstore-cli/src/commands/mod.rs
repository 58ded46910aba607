pub mod ingest;
pub mod schema;
