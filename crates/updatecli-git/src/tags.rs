//! Tag operations

use git2::Signature;
use tracing::{debug, info, instrument};

use crate::repository::{GitRepo, Result};
use crate::types::{commit_time, TagInfo};
use updatecli_core::error::GitError;

/// Tagger used for annotated tags when git has no identity configured
const FALLBACK_TAGGER: (&str, &str) = ("updatecli", "bot@updatecli.io");

impl GitRepo {
    /// All tags, oldest tagged commit first
    #[instrument(skip(self))]
    pub fn tags(&self) -> Result<Vec<TagInfo>> {
        let names = self.repo.tag_names(None)?;
        let mut tags = Vec::new();

        for name in names.iter().flatten() {
            if let Some(tag) = self.find_tag(name)? {
                tags.push(tag);
            }
        }

        tags.sort_by_key(|t| t.timestamp);
        debug!(count = tags.len(), "listed all tags");
        Ok(tags)
    }

    /// Find a specific tag by name
    pub fn find_tag(&self, name: &str) -> Result<Option<TagInfo>> {
        let tag_ref = format!("refs/tags/{}", name);

        match self.repo.find_reference(&tag_ref) {
            Ok(reference) => {
                let commit = reference.peel_to_commit()?;
                let message = reference
                    .peel_to_tag()
                    .ok()
                    .and_then(|tag| tag.message().map(|m| m.trim_end().to_string()));

                Ok(Some(TagInfo {
                    name: name.to_string(),
                    commit_hash: commit.id().to_string(),
                    message,
                    timestamp: commit_time(&commit),
                }))
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::Git2(e)),
        }
    }

    /// Create a tag on HEAD, annotated when a message is given
    #[instrument(skip(self), fields(name, annotated = message.is_some()))]
    pub fn create_tag(&self, name: &str, message: Option<&str>) -> Result<TagInfo> {
        if self.find_tag(name)?.is_some() {
            return Err(GitError::TagExists(name.to_string()));
        }

        let head = self.head_commit()?;

        if let Some(msg) = message {
            let sig = match self.repo.signature() {
                Ok(sig) => sig,
                Err(_) => Signature::now(FALLBACK_TAGGER.0, FALLBACK_TAGGER.1)?,
            };
            self.repo.tag(name, head.as_object(), &sig, msg, false)?;
        } else {
            self.repo.tag_lightweight(name, head.as_object(), false)?;
        }

        info!(name, annotated = message.is_some(), "created tag");
        Ok(TagInfo {
            name: name.to_string(),
            commit_hash: head.id().to_string(),
            message: message.map(|m| m.to_string()),
            timestamp: commit_time(&head),
        })
    }
}
