//! fixflow domain model.
//!
//! Canonical definitions for the records that cross the core's boundary:
//! - `Issue`: one detected problem, produced by the upstream lint run
//! - `Component`: a contiguous, named line range of a file
//! - `FixResponse`: the structured reply of the invocation collaborator

pub mod component;
pub mod error;
pub mod issue;
pub mod response;

pub use component::{content_digest, Component, ComponentType};
pub use error::{DomainError, Result};
pub use issue::{count_by_code, distinct_codes, Issue};
pub use response::FixResponse;
