//! Test support: database containers, fixtures and in-memory doubles.

pub mod helpers;

pub use context::TestContext;
