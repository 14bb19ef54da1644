//! SQLite backend for the tally durable ledger.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. The toggle transaction —
//! membership flip plus counter column in one commit — lives here, as
//! close to the database as it can get.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteLedger;

#[cfg(test)]
mod tests;
