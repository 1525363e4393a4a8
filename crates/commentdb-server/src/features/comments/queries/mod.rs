pub mod list;

pub use list::{
    ListCommentsError, ListCommentsParams, ListCommentsQuery, ListCommentsResponse, SortField,
    SortOrder,
};
pub use crate::features::shared::pagination::PaginationMetadata;
