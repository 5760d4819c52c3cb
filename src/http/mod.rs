//! HTTP protocol layer module
//!
//! Protocol helpers shared by the file server and the dispatcher, free of any
//! routing policy.

pub mod compress;
pub mod etag;
pub mod mime;
pub mod path;
pub mod range;
pub mod response;

pub use path::normalize_path;
pub use range::ByteRange;
pub use response::FileResponse;
