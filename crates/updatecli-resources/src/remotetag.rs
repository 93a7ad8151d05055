//! `remotetag` resource: tags listed through a hosting service API

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use updatecli_core::config::HttpConfig;
use updatecli_core::error::{ResourceError, Result};
use updatecli_core::types::{ConditionResult, SourceResult, TargetResult};
use updatecli_scm::{HostedApi, ScmHandler, ScmKind};
use updatecli_version::Filter;

use crate::registry::ResourceContext;
use crate::traits::{decode_spec, first_set, select, Resource};

/// Resource kind
pub const KIND: &str = "remotetag";

/// `remotetag` spec
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteTagSpec {
    /// Hosting service; github when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ScmKind>,
    /// Repository owner or group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Repository name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Instance URL; the public instance when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// API token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Filter selecting the tag
    #[serde(
        rename = "versionfilter",
        alias = "versionFilter",
        skip_serializing_if = "Filter::is_zero"
    )]
    pub version_filter: Filter,
    /// Exact tag checked by the condition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Tags of a hosted repository
#[derive(Debug)]
pub struct RemoteTag {
    owner: String,
    repository: String,
    tag: Option<String>,
    filter: Filter,
    api: HostedApi,
}

impl RemoteTag {
    /// Validate `spec` and prepare its API client
    pub fn new(spec: RemoteTagSpec, http: &HttpConfig) -> Result<Self> {
        let missing: Vec<&str> = [("owner", &spec.owner), ("repository", &spec.repository)]
            .into_iter()
            .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
            .map(|(name, _)| name)
            .collect();
        if !missing.is_empty() {
            return Err(ResourceError::Validation(format!(
                "{} parameter(s) required: [{}]",
                KIND,
                missing.join(",")
            ))
            .into());
        }

        let kind = spec.provider.unwrap_or(ScmKind::Github);
        let endpoint = HostedApi::endpoint_for(kind, spec.url.as_deref())?;
        let api = HostedApi::new(kind, &endpoint, spec.token.as_deref(), http)?;

        let mut filter = spec.version_filter;
        filter.init()?;

        Ok(Self {
            owner: spec.owner.unwrap_or_default(),
            repository: spec.repository.unwrap_or_default(),
            tag: spec.tag,
            filter,
            api,
        })
    }

    pub(crate) fn build(spec: Value, ctx: &ResourceContext) -> Result<Box<dyn Resource>> {
        let spec: RemoteTagSpec = decode_spec(KIND, spec)?;
        Ok(Box::new(Self::new(spec, &ctx.config.http)?))
    }

    fn tags(&self) -> Result<Vec<String>> {
        let tags = self.api.list_tags(&self.owner, &self.repository)?;
        debug!(count = tags.len(), "retrieved remote tags");
        Ok(tags)
    }
}

impl Resource for RemoteTag {
    fn kind(&self) -> &'static str {
        KIND
    }

    #[instrument(skip(self, _scm), fields(resource = KIND, repository = %self.repository))]
    fn source(&self, _scm: Option<&dyn ScmHandler>) -> Result<SourceResult> {
        let tags = self.tags()?;
        Ok(match select(&self.filter, &tags)? {
            Some(version) => SourceResult::found(
                version.original_version(),
                version.original_version(),
                format!(
                    "tag {:?} found on {}/{}",
                    version.original_version(),
                    self.owner,
                    self.repository
                ),
            ),
            None => SourceResult::unmatched(format!(
                "no tag found matching pattern {:?} on {}/{}",
                self.filter.pattern, self.owner, self.repository
            )),
        })
    }

    #[instrument(skip(self, _scm), fields(resource = KIND, repository = %self.repository))]
    fn condition(&self, source: &str, _scm: Option<&dyn ScmHandler>) -> Result<ConditionResult> {
        let tags = self.tags()?;

        if let Some(tag) = first_set(self.tag.as_deref(), source) {
            let pass = tags.iter().any(|t| t == tag);
            return Ok(ConditionResult::from_pass(
                pass,
                if pass {
                    format!("tag {:?} found", tag)
                } else {
                    format!("no tag found matching {:?}", tag)
                },
            ));
        }

        Ok(match select(&self.filter, &tags)? {
            Some(_) => ConditionResult::from_pass(
                true,
                format!("tag matching {:?} found", self.filter.pattern),
            ),
            None => ConditionResult::unmatched(format!(
                "no tag found matching pattern {:?}",
                self.filter.pattern
            )),
        })
    }

    fn target(
        &self,
        _source: &str,
        _scm: Option<&dyn ScmHandler>,
        _dry_run: bool,
    ) -> Result<TargetResult> {
        Err(ResourceError::Unsupported {
            resource: KIND.to_string(),
            operation: "target",
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use updatecli_core::types::StepStatus;
    use updatecli_core::UpdatecliError;
    use updatecli_version::FilterKind;

    fn spec(url: String) -> RemoteTagSpec {
        RemoteTagSpec {
            provider: Some(ScmKind::Gitea),
            owner: Some("updatecli".to_string()),
            repository: Some("website".to_string()),
            url: Some(url),
            version_filter: Filter::new(FilterKind::Semver, "~1"),
            ..Default::default()
        }
    }

    fn serve_tags(server: &mut Server, body: &str) -> mockito::Mock {
        server
            .mock("GET", "/api/v1/repos/updatecli/website/tags")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create()
    }

    #[test]
    fn test_source_selects_from_remote_tags() {
        let mut server = Server::new();
        let mock = serve_tags(
            &mut server,
            r#"[{"name": "v2.0.0"}, {"name": "v1.4.0"}, {"name": "v1.3.2"}]"#,
        );

        let resource = RemoteTag::new(spec(server.url()), &HttpConfig::default()).unwrap();
        let result = resource.source(None).unwrap();

        mock.assert();
        assert_eq!(result.status, StepStatus::Success);
        assert_eq!(result.value.as_deref(), Some("v1.4.0"));
    }

    #[test]
    fn test_source_without_match() {
        let mut server = Server::new();
        let _mock = serve_tags(&mut server, r#"[{"name": "v2.0.0"}]"#);

        let resource = RemoteTag::new(spec(server.url()), &HttpConfig::default()).unwrap();
        assert_eq!(resource.source(None).unwrap().status, StepStatus::Unmatched);
    }

    #[test]
    fn test_condition_checks_exact_tag() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/api/v1/repos/updatecli/website/tags")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"[{"name": "v2.0.0"}, {"name": "v1.4.0"}]"#)
            .expect(2)
            .create();

        let resource = RemoteTag::new(spec(server.url()), &HttpConfig::default()).unwrap();
        assert!(resource.condition("v1.4.0", None).unwrap().pass);
        assert!(!resource.condition("v1.5.0", None).unwrap().pass);
        mock.assert();
    }

    #[test]
    fn test_api_errors_propagate() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", "/api/v1/repos/updatecli/website/tags")
            .match_query(Matcher::Any)
            .with_status(404)
            .create();

        let resource = RemoteTag::new(spec(server.url()), &HttpConfig::default()).unwrap();
        assert!(matches!(
            resource.source(None),
            Err(UpdatecliError::Api(_))
        ));
    }

    #[test]
    fn test_target_is_unsupported() {
        let resource = RemoteTag::new(
            spec("https://gitea.example.com".to_string()),
            &HttpConfig::default(),
        )
        .unwrap();
        assert!(matches!(
            resource.target("v1.0.0", None, false),
            Err(UpdatecliError::Resource(ResourceError::Unsupported { operation: "target", .. }))
        ));
    }

    #[test]
    fn test_requires_owner_and_repository() {
        let err = RemoteTag::new(RemoteTagSpec::default(), &HttpConfig::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation error: remotetag parameter(s) required: [owner,repository]"
        );
    }

    #[test]
    fn test_listing_unsupported_provider() {
        let spec = RemoteTagSpec {
            provider: Some(ScmKind::Bitbucket),
            ..spec("https://bitbucket.org".to_string())
        };
        assert!(RemoteTag::new(spec, &HttpConfig::default()).is_err());
    }
}
