//! External collaborators for the Pine Script static analysis core: a
//! directory scanner and a documentation blob loader.
//!
//! Neither module is reachable from `pinelint-core` — the core never touches
//! the filesystem, and these wrappers never parse Pine source themselves.

pub mod docs;
pub mod error;
pub mod scanner;

pub use docs::load_reference_index;
pub use error::{ToolsError, ToolsResult};
pub use scanner::{scan, FileItem, ScanOptions, DEFAULT_MAX_FILE_BYTES};
