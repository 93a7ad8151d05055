//! Resource registry

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use updatecli_core::error::{ResourceError, Result};
use updatecli_core::Config;
use updatecli_git::{GitHandler, NativeGit};

use crate::gitbranch::{self, GitBranch};
use crate::gittag::{self, GitTag};
use crate::remotetag::{self, RemoteTag};
use crate::traits::Resource;

/// Collaborators handed to every resource at construction
#[derive(Clone)]
pub struct ResourceContext {
    /// Git queries for local repositories
    pub git: Arc<dyn GitHandler>,
    /// Tool configuration
    pub config: Config,
}

impl ResourceContext {
    /// Context over the local git installation
    pub fn new(config: Config) -> Self {
        Self {
            git: Arc::new(NativeGit),
            config,
        }
    }
}

impl Default for ResourceContext {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Constructor of a resource from its spec payload
pub type BuildFn = fn(Value, &ResourceContext) -> Result<Box<dyn Resource>>;

struct Plugin {
    kind: &'static str,
    build: BuildFn,
}

/// Registry of available resource kinds
pub struct ResourceRegistry {
    plugins: Vec<Plugin>,
}

impl ResourceRegistry {
    /// Create a new registry with all built-in resources
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(gittag::KIND, GitTag::build);
        registry.register(gitbranch::KIND, GitBranch::build);
        registry.register(remotetag::KIND, RemoteTag::build);
        registry
    }

    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Register a resource kind; a later registration replaces an earlier one
    pub fn register(&mut self, kind: &'static str, build: BuildFn) {
        self.plugins.retain(|p| p.kind != kind);
        self.plugins.push(Plugin { kind, build });
    }

    /// Whether `kind` is registered
    pub fn contains(&self, kind: &str) -> bool {
        self.plugins.iter().any(|p| p.kind == kind)
    }

    /// Get resource kinds
    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.kind).collect()
    }

    /// Build a resource of `kind` from its spec payload.
    ///
    /// The kind selects the spec shape; the payload is only decoded once
    /// the kind is known.
    pub fn build(
        &self,
        kind: &str,
        spec: Value,
        ctx: &ResourceContext,
    ) -> Result<Box<dyn Resource>> {
        let plugin = self
            .plugins
            .iter()
            .find(|p| p.kind == kind.to_lowercase())
            .ok_or_else(|| ResourceError::UnsupportedKind(kind.to_string()))?;

        debug!(kind = plugin.kind, "building resource");
        (plugin.build)(spec, ctx)
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
