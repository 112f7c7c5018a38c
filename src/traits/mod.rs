//! Trait definitions for Shopify resource operations.
//!
//! Each entity type implements the traits it supports. Implementations only
//! describe the call (path, verb, envelope key, body); the
//! [`RequestExecutor`](crate::RequestExecutor) does the rest.

mod count;
mod create;
mod delete;
mod get;
mod list;
mod update;

pub use count::Count;
pub use create::Create;
pub use delete::Delete;
pub use get::Get;
pub use list::List;
pub use update::Update;
