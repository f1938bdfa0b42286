//! SQLite backend for the Tally feedback ledger.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Because that thread executes one
//! closure at a time, and every multi-statement operation runs in a single
//! `IMMEDIATE` transaction inside one closure, concurrent requests observe
//! either all or none of an operation's writes.

mod comments;
mod encode;
mod ideas;
mod responses;
mod schema;
mod store;
mod supporters;
mod tags;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
