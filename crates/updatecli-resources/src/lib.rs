//! Updatecli Resources - Resource plugins for updatecli
//!
//! A resource answers three questions about some upstream artifact: which
//! version is current ([`Resource::source`]), whether a given value holds
//! ([`Resource::condition`]) and how to bring it in line
//! ([`Resource::target`]). Plugins are looked up by kind in a
//! [`ResourceRegistry`] and configured from a [`Manifest`].

pub mod gitbranch;
pub mod gittag;
pub mod manifest;
pub mod registry;
pub mod remotetag;
#[cfg(test)]
mod testing;
mod traits;

pub use gitbranch::GitBranch;
pub use gittag::GitTag;
pub use manifest::{
    load_manifest, Manifest, ManifestIssue, ResourceConfig, Stage, DEFAULT_SCM_ID,
};
pub use registry::{BuildFn, ResourceContext, ResourceRegistry};
pub use remotetag::RemoteTag;
pub use traits::Resource;
