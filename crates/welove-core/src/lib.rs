//! Core types and trait definitions for the welove quote service.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the rules that decide which quote is "of the day", which site message is
//! on display, how poll choices are drawn and how popularity counters are
//! kept inside their 32-bit column.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod mail;
pub mod message;
pub mod notify;
pub mod poll;
pub mod popularity;
pub mod profile;
pub mod quote;
pub mod random;
pub mod rotation;
pub mod selection;
pub mod service;
pub mod store;

pub use error::{Error, Result};
pub use service::QuoteService;

#[cfg(test)]
mod testing;
