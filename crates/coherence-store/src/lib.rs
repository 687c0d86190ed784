pub mod error;
pub mod json_bridge;
pub mod schema;
pub mod store;

pub use error::{Result, StoreError};
pub use json_bridge::{EXPORT_VERSION, JournalExport};
pub use store::{JOURNAL_FILE, Listener, Store, default_base_dir};
