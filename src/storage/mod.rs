//! Persistence interface and implementations
//!
//! The engines read team season records, games and schedule reports through
//! [`StatsStore`] and stage every change in a [`UnitOfWork`] that is committed
//! atomically at the end of an operation.

pub mod memory;
pub mod mock;
pub mod store;
pub mod unit_of_work;

// Re-export commonly used types
pub use memory::InMemoryStatsStore;
pub use mock::MockStatsStore;
pub use store::{ChangeSet, GameChange, StatsStore};
pub use unit_of_work::UnitOfWork;
