pub(crate) mod error;
pub(crate) mod projects;
pub(crate) mod results;
pub(crate) mod search;

pub(crate) use error::ApiError;
