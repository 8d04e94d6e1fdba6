//! Durable persistence for named assistant sessions.
//!
//! One session record captures the conversation entries, the active model
//! identifier, and the optional workspace root, under an explicit format
//! version. The store is a thin file layer; conversation semantics live in
//! `code_assistant`.

mod error;
mod paths;
mod schema;
mod store;

pub use error::SessionStoreError;
pub use paths::{is_valid_session_name, session_file_name, session_root};
pub use schema::{RecordedCall, SessionEntry, SessionRecord, FORMAT_VERSION};
pub use store::{new_record, SessionStore};
