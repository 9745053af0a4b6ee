pub mod credential;
pub mod enums;
pub mod error;
pub mod query;
