pub mod backend;
pub mod reader;
pub mod schema;
pub mod stats;
pub mod store;
pub mod types;
pub mod writer;

pub use backend::{Downloader, SearchBackend};
pub use reader::IndexReader;
pub use schema::{Field, FieldKind, Schema};
pub use store::{IndexInfo, IndexStore};
pub use types::*;
pub use writer::IndexWriter;
