//! The tally engagement service.
//!
//! Wires the durable ledger and the ephemeral counter cache together:
//! the toggle path (likes, scraps) with its immediate-absolute cache
//! refresh, the view path with its periodic-additive flush, and the
//! scheduler that drives the flush. The ledger is always the source of
//! truth; every cache failure is absorbed here and logged, never
//! propagated past this crate.

pub mod engagement;
pub mod error;
pub mod scheduler;

pub use engagement::{Engagement, FlushStats, MembershipFlags};
pub use error::{Error, Result};
pub use scheduler::SchedulerHandle;
