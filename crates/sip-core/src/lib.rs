//! Core types and trait definitions for the sip personal ranking engine.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! rating math and opponent selection are pure functions; persistence is
//! expressed through the [`store::RankingStore`] trait.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod elo;
pub mod error;
pub mod item;
pub mod rating;
pub mod selection;
pub mod store;
pub mod tier;

pub use error::{Classify, Error, ErrorKind, Result};
pub use tier::Tier;
