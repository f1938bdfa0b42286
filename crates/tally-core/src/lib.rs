//! Core types and trait definitions for the Tally feedback ledger.
//!
//! This crate has no HTTP or database dependencies. It owns the idea
//! lifecycle rules; storage backends only persist what these rules decide.

pub mod comment;
pub mod error;
pub mod idea;
pub mod lifecycle;
pub mod ranking;
pub mod scope;
pub mod slug;
pub mod store;
pub mod tag;

pub use error::{Classify, Error, ErrorKind, Result};
