//! Service layer for the message board.
//! - `messages` holds the domain types and the list/create/delete operations.
//! - `storage` holds the file-backed accessor that loads and saves the whole collection.
//! - Errors are typed in `errors` and mapped to HTTP by the server crate.

pub mod errors;
pub mod messages;
pub mod storage;
#[cfg(test)]
pub mod test_support;

pub use configs::{CorruptPolicy, IdStrategy};
