//! Concrete scm backends

mod git;
mod hosted;
mod search;
mod workspace;

pub use git::GitScm;
pub use hosted::{default_host, HostedScm};
pub(crate) use hosted::with_scheme;
pub use search::SearchScm;
