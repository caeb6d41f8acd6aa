//! Shared test utilities for the sysset workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`] - git repository fixtures at three realism levels
//! - [`tree`] - [`tree::TestTree`] with a virtual repository and a real target prefix

pub mod git;
pub mod tree;
