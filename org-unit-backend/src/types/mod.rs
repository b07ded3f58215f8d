pub mod datetime;
pub mod pagination;
pub mod query;
pub mod response;

pub use datetime::{advance_past, truncated_now};
pub use pagination::{PaginatedResponse, PaginationMeta, PaginationQuery, MAX_PAGE, MAX_PAGE_SIZE};
pub use query::{SortOrder, SortQuery};
pub use response::StatusResponse;
