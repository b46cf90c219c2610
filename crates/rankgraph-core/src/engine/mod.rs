//! The ranking engine.
//!
//! This module provides:
//! - **errors**: Error types for ranking failures
//! - **graph**: Entity graph of candidate/role subjects and their entities
//! - **builder**: Graph construction from profiles
//! - **bandit**: Graph-warm-started Thompson Sampling over candidates
//! - **snapshot**: Export/restore of bandit learning state

pub mod bandit;
pub mod builder;
pub mod errors;
pub mod graph;
pub mod snapshot;
