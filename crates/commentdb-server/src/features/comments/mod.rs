pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{
    ClearCommentsCommand, ClearCommentsError, ClearCommentsResponse, CommitCommentsCommand,
    CommitCommentsError, CommitCommentsResponse, UploadCommentsCommand, UploadCommentsError,
    UploadCommentsResponse,
};

pub use queries::{
    ListCommentsError, ListCommentsParams, ListCommentsQuery, ListCommentsResponse,
    PaginationMetadata, SortField, SortOrder,
};

pub use routes::comments_routes;
