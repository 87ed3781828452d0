pub mod lifecycle;
pub mod parser;
pub mod router;
pub mod selection;

pub use lifecycle::{BufferEdit, BuildKind, IndexLifecycle, PendingSearch, REFRESH_TOKEN, Response};
pub use parser::{MATCH_ALL, Query, SearchQuery};
pub use router::Router;
pub use selection::select_datasets;
