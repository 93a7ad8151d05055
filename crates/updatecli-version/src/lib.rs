//! Updatecli Version - Version selection for updatecli resources
//!
//! This crate picks one version out of an unordered list of candidate
//! strings (tags, branches, releases) according to a [`Filter`].

mod filter;
mod ordering;
mod semantic;
mod time;
pub mod types;

pub use filter::Filter;
pub use semantic::{compare_precedence, parse_lenient, Constraint};
pub use types::{FilterKind, Version};
