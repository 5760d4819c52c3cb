//! Request handler module
//!
//! Classification of request paths, SPA fallback dispatch and the static file
//! collaborator it delegates to.

pub mod classifier;
mod context;
pub mod dispatcher;
pub mod static_files;

pub use classifier::{PathClassifier, StaticFileMatcher};
pub use context::RequestContext;
pub use dispatcher::{Dispatcher, RequestOutcome, ServeTarget, SERVER_NAME};
pub use static_files::{FileServer, FsFileServer};
