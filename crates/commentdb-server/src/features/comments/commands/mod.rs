pub mod clear;
pub mod commit;
pub mod upload;

pub use clear::{ClearCommentsCommand, ClearCommentsError, ClearCommentsResponse};
pub use commit::{CommitCommentsCommand, CommitCommentsError, CommitCommentsResponse};
pub use upload::{UploadCommentsCommand, UploadCommentsError, UploadCommentsResponse};
