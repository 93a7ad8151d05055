//! Scm configuration and auto-discovery

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::kind::ScmKind;
use crate::remote::RemoteUrl;
use crate::spec::{GitSpec, HostedSpec, ScmSpec};
use updatecli_core::error::ScmError;
use updatecli_git::{redact_url, GitHandler};

/// Branch assigned to auto-discovered configurations
pub const DEFAULT_BRANCH: &str = "main";

/// Namespace of the environment overrides, followed by `_<STEP-NAME>`
pub const ENV_PREFIX: &str = "UPDATECLI_SCM";

/// Environment prefix of the scm configuration named `name`
pub fn env_prefix(name: &str) -> String {
    format!("{}_{}", ENV_PREFIX, name).to_uppercase()
}

/// The `{kind, spec, disabled}` triple of one scm configuration.
///
/// Deserialization reads `kind` first and then decodes `spec` into the
/// shape that kind selects; unknown kinds are rejected there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawScmConfig", into = "RawScmConfig")]
pub struct ScmConfig {
    /// Backend kind
    pub kind: Option<ScmKind>,
    /// Backend settings
    pub spec: Option<ScmSpec>,
    /// Turn off the scm, including auto-discovery
    pub disabled: bool,
    /// Settings given without a `kind`, decoded once auto-guess finds it
    pub untyped_spec: Option<serde_json::Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct RawScmConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    spec: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    disabled: bool,
}

impl TryFrom<RawScmConfig> for ScmConfig {
    type Error = ScmError;

    fn try_from(raw: RawScmConfig) -> Result<Self, Self::Error> {
        let kind = raw
            .kind
            .filter(|k| !k.is_empty())
            .map(|k| k.parse::<ScmKind>())
            .transpose()?;

        let (spec, untyped_spec) = match (kind, raw.spec.filter(|v| !v.is_null())) {
            (Some(kind), Some(payload)) => (Some(ScmSpec::decode(kind, payload)?), None),
            (None, payload) => (None, payload),
            (_, None) => (None, None),
        };

        Ok(Self {
            kind,
            spec,
            disabled: raw.disabled,
            untyped_spec,
        })
    }
}

impl From<ScmConfig> for RawScmConfig {
    fn from(config: ScmConfig) -> Self {
        Self {
            kind: config.kind.map(String::from),
            spec: config
                .spec
                .as_ref()
                .map(ScmSpec::to_value)
                .or(config.untyped_spec),
            disabled: config.disabled,
        }
    }
}

impl ScmConfig {
    /// An enabled configuration of `spec`'s kind
    pub fn new(spec: ScmSpec) -> Self {
        Self {
            kind: Some(spec.kind()),
            spec: Some(spec),
            ..Default::default()
        }
    }

    /// A disabled configuration
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Default::default()
        }
    }

    /// Check the `{kind, spec, disabled}` consistency rules
    pub fn validate(&self) -> Result<(), ScmError> {
        let mut errors = Vec::new();

        if self.disabled {
            if self.kind.is_some() {
                errors.push("specified value for 'kind' found while SCM is disabled".to_string());
            }
            if self.spec.is_some() || self.untyped_spec.is_some() {
                errors.push("specified value for 'spec' found while SCM is disabled".to_string());
            }
        } else {
            if self.kind.is_none() {
                errors.push("missing value for parameter 'kind'".to_string());
            }
            if self.spec.is_none() && self.untyped_spec.is_none() {
                errors.push("missing value for parameter 'spec'".to_string());
            }
            if let (Some(kind), Some(spec)) = (self.kind, &self.spec) {
                if spec.kind() != kind {
                    errors.push(format!(
                        "spec of kind {:?} does not match kind {:?}",
                        spec.kind().as_str(),
                        kind.as_str()
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ScmError::WrongConfig(errors.join(",")))
        }
    }

    /// Fill `kind` and `spec` from the `origin` remote of `working_dir`.
    ///
    /// `<ENV_PREFIX>_<NAME>_*` variables (read through `lookup`) win over
    /// the discovered values, and settings already present on the receiver
    /// win over both. A receiver whose kind disagrees with the discovered one
    /// is an error. Settings given without a kind are decoded as the
    /// discovered kind.
    #[instrument(skip(self, git, lookup), fields(dir = %working_dir.display()))]
    pub fn auto_guess(
        &mut self,
        name: &str,
        working_dir: &Path,
        git: &dyn GitHandler,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Result<(), ScmError> {
        if self.disabled {
            debug!(name, "scm disabled, skipping auto-guess");
            return Ok(());
        }

        let remotes = git
            .remote_urls(working_dir)
            .map_err(ScmError::RemoteQuery)?;
        debug!(
            remotes = ?remotes.values().map(|u| redact_url(u)).collect::<Vec<_>>(),
            "found remotes"
        );

        let origin = remotes
            .get("origin")
            .ok_or_else(|| ScmError::NoOriginRemote(working_dir.to_path_buf()))?;

        let remote = RemoteUrl::parse(origin);
        let kind = ScmKind::from_hostname(remote.hostname());

        let mut guessed = match kind {
            ScmKind::Git => ScmSpec::Git(GitSpec {
                url: Some(origin.clone()),
                directory: Some(working_dir.to_path_buf()),
                branch: Some(DEFAULT_BRANCH.to_string()),
                ..Default::default()
            }),
            _ => {
                let (owner, repository) = remote.owner_repository()?;
                let hosted = HostedSpec {
                    owner: Some(owner),
                    repository: Some(repository),
                    directory: Some(working_dir.to_path_buf()),
                    branch: Some(DEFAULT_BRANCH.to_string()),
                    ..Default::default()
                };
                ScmSpec::hosted(kind, hosted)
            }
        };

        guessed.populate_from_env(&env_prefix(name), lookup);

        let mismatch = |configured: ScmKind| ScmError::KindMismatch {
            directory: working_dir.to_path_buf(),
            step: name.to_string(),
            discovered: kind.to_string(),
            configured: configured.to_string(),
        };

        if let Some(configured) = self.kind.filter(|k| *k != kind) {
            return Err(mismatch(configured));
        }
        let declared = match self.untyped_spec.clone() {
            Some(payload) if self.spec.is_none() => Some(ScmSpec::decode(kind, payload)?),
            _ => None,
        };
        if let Some(current) = declared.as_ref().or(self.spec.as_ref()) {
            if current.kind() != kind {
                return Err(mismatch(current.kind()));
            }
            guessed = guessed.merge(current)?;
        }

        info!(
            name,
            kind = %kind,
            url = %redact_url(remote.as_str()),
            branch = guessed.branch().unwrap_or(DEFAULT_BRANCH),
            "auto-guessed scm configuration"
        );

        self.kind = Some(kind);
        self.spec = Some(guessed);
        self.untyped_spec = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use updatecli_core::error::GitError;
    use updatecli_git::{BranchInfo, TagInfo};

    /// Serves fixed remotes, or fails the query when none are set
    struct MockGit {
        remotes: Option<BTreeMap<String, String>>,
    }

    impl MockGit {
        fn with_remotes(remotes: &[(&str, &str)]) -> Self {
            Self {
                remotes: Some(
                    remotes
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                ),
            }
        }

        fn failing() -> Self {
            Self { remotes: None }
        }
    }

    impl GitHandler for MockGit {
        fn remote_urls(&self, directory: &Path) -> updatecli_git::Result<BTreeMap<String, String>> {
            self.remotes
                .clone()
                .ok_or_else(|| GitError::RemoteListFailed(directory.to_path_buf()))
        }

        fn tags(&self, _directory: &Path) -> updatecli_git::Result<Vec<TagInfo>> {
            Ok(Vec::new())
        }

        fn branches(&self, _directory: &Path) -> updatecli_git::Result<Vec<BranchInfo>> {
            Ok(Vec::new())
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn dir() -> PathBuf {
        PathBuf::from("/home/olblak/updatecli")
    }

    #[test]
    fn test_auto_guess_github_ssh() {
        let git = MockGit::with_remotes(&[("origin", "git@github.com:olblak/updatecli.git")]);
        let mut config = ScmConfig::default();
        config.auto_guess("default", &dir(), &git, &no_env).unwrap();

        assert_eq!(config.kind, Some(ScmKind::Github));
        let spec = config.spec.as_ref().and_then(ScmSpec::as_hosted).unwrap();
        assert_eq!(spec.owner.as_deref(), Some("olblak"));
        assert_eq!(spec.repository.as_deref(), Some("updatecli"));
        assert_eq!(spec.branch.as_deref(), Some("main"));
        assert_eq!(spec.directory.as_deref(), Some(dir().as_path()));
    }

    #[test]
    fn test_auto_guess_unknown_host_keeps_url() {
        let git = MockGit::with_remotes(&[("origin", "https://10.0.2.4:443/olblak/updatecli")]);
        let mut config = ScmConfig::default();
        config.auto_guess("default", &dir(), &git, &no_env).unwrap();

        assert_eq!(config.kind, Some(ScmKind::Git));
        match config.spec {
            Some(ScmSpec::Git(ref spec)) => {
                assert_eq!(
                    spec.url.as_deref(),
                    Some("https://10.0.2.4:443/olblak/updatecli")
                );
                assert_eq!(spec.branch.as_deref(), Some("main"));
            }
            ref other => panic!("expected git spec, got {:?}", other),
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auto_guess_gitlab_and_bitbucket() {
        let git = MockGit::with_remotes(&[("origin", "https://gitlab.com/olblak/updatecli.git")]);
        let mut config = ScmConfig::default();
        config.auto_guess("default", &dir(), &git, &no_env).unwrap();
        assert_eq!(config.kind, Some(ScmKind::Gitlab));

        let git = MockGit::with_remotes(&[("origin", "git@bitbucket.org:olblak/updatecli.git")]);
        let mut config = ScmConfig::default();
        config.auto_guess("default", &dir(), &git, &no_env).unwrap();
        assert_eq!(config.kind, Some(ScmKind::Bitbucket));
    }

    #[test]
    fn test_auto_guess_requires_origin() {
        let git = MockGit::with_remotes(&[
            ("upstream", "https://github.com/updatecli/updatecli.git"),
            ("fork", "git@github.com:olblak/updatecli.git"),
        ]);
        let mut config = ScmConfig::default();
        let err = config.auto_guess("default", &dir(), &git, &no_env).unwrap_err();

        assert!(matches!(err, ScmError::NoOriginRemote(_)));
        assert_eq!(config, ScmConfig::default());
    }

    #[test]
    fn test_auto_guess_remote_query_failure() {
        let mut config = ScmConfig::default();
        let err = config
            .auto_guess("default", &dir(), &MockGit::failing(), &no_env)
            .unwrap_err();
        assert!(matches!(err, ScmError::RemoteQuery(_)));
    }

    #[test]
    fn test_auto_guess_malformed_github_remote() {
        let git = MockGit::with_remotes(&[("origin", "git@github.com:updatecli.git")]);
        let mut config = ScmConfig::default();
        let err = config.auto_guess("default", &dir(), &git, &no_env).unwrap_err();
        assert!(matches!(err, ScmError::MalformedRemoteUrl(_)));
    }

    #[test]
    fn test_auto_guess_unknown_host_skips_owner_repository() {
        let git = MockGit::with_remotes(&[("origin", "git@git.example.com:updatecli.git")]);
        let mut config = ScmConfig::default();
        config.auto_guess("default", &dir(), &git, &no_env).unwrap();

        assert_eq!(config.kind, Some(ScmKind::Git));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auto_guess_kind_mismatch_on_spec() {
        let git = MockGit::with_remotes(&[("origin", "https://10.0.2.4:443/olblak/updatecli")]);
        let mut config = ScmConfig {
            kind: None,
            spec: Some(ScmSpec::Github(HostedSpec {
                token: Some("t".to_string()),
                ..Default::default()
            })),
            ..Default::default()
        };
        let err = config.auto_guess("default", &dir(), &git, &no_env).unwrap_err();

        match err {
            ScmError::KindMismatch {
                discovered,
                configured,
                ..
            } => {
                assert_eq!(discovered, "git");
                assert_eq!(configured, "github");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_auto_guess_kind_mismatch_on_kind_only() {
        let git = MockGit::with_remotes(&[("origin", "git@github.com:olblak/updatecli.git")]);
        let mut config = ScmConfig {
            kind: Some(ScmKind::Gitea),
            ..Default::default()
        };
        let err = config.auto_guess("default", &dir(), &git, &no_env).unwrap_err();
        assert!(matches!(err, ScmError::KindMismatch { .. }));
    }

    #[test]
    fn test_auto_guess_caller_fields_win() {
        let git = MockGit::with_remotes(&[("origin", "git@github.com:olblak/updatecli.git")]);
        let mut config = ScmConfig::new(ScmSpec::Github(HostedSpec {
            branch: Some("v1".to_string()),
            token: Some("secret".to_string()),
            ..Default::default()
        }));
        config.auto_guess("default", &dir(), &git, &no_env).unwrap();

        let spec = config.spec.as_ref().and_then(ScmSpec::as_hosted).unwrap();
        assert_eq!(spec.branch.as_deref(), Some("v1"));
        assert_eq!(spec.token.as_deref(), Some("secret"));
        assert_eq!(spec.owner.as_deref(), Some("olblak"));
    }

    #[test]
    fn test_auto_guess_environment_overrides() {
        let git = MockGit::with_remotes(&[("origin", "git@github.com:olblak/updatecli.git")]);
        let lookup = |name: &str| match name {
            "UPDATECLI_SCM_RELEASE_BRANCH" => Some("stable".to_string()),
            "UPDATECLI_SCM_RELEASE_TOKEN" => Some("from-env".to_string()),
            _ => None,
        };
        let mut config = ScmConfig::default();
        config.auto_guess("release", &dir(), &git, &lookup).unwrap();

        let spec = config.spec.as_ref().and_then(ScmSpec::as_hosted).unwrap();
        assert_eq!(spec.branch.as_deref(), Some("stable"));
        assert_eq!(spec.token.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_auto_guess_declared_partial_git() {
        let git = MockGit::with_remotes(&[("origin", "https://git.example.com/team/project.git")]);
        let mut config: ScmConfig =
            serde_yaml::from_str("kind: git\nspec:\n  branch: develop\n").unwrap();
        config.auto_guess("default", &dir(), &git, &no_env).unwrap();

        match config.spec {
            Some(ScmSpec::Git(ref spec)) => {
                assert_eq!(
                    spec.url.as_deref(),
                    Some("https://git.example.com/team/project.git")
                );
                assert_eq!(spec.branch.as_deref(), Some("develop"));
                assert_eq!(spec.directory.as_deref(), Some(dir().as_path()));
            }
            ref other => panic!("expected git spec, got {:?}", other),
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auto_guess_decodes_spec_without_kind() {
        let git = MockGit::with_remotes(&[("origin", "git@github.com:olblak/updatecli.git")]);
        let mut config: ScmConfig =
            serde_yaml::from_str("spec:\n  branch: v2\n  token: secret\n").unwrap();
        assert_eq!(config.kind, None);
        config.auto_guess("default", &dir(), &git, &no_env).unwrap();

        assert_eq!(config.kind, Some(ScmKind::Github));
        assert_eq!(config.untyped_spec, None);
        let spec = config.spec.as_ref().and_then(ScmSpec::as_hosted).unwrap();
        assert_eq!(spec.branch.as_deref(), Some("v2"));
        assert_eq!(spec.token.as_deref(), Some("secret"));
        assert_eq!(spec.owner.as_deref(), Some("olblak"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auto_guess_skips_disabled() {
        let git = MockGit::failing();
        let mut config = ScmConfig::disabled();
        config.auto_guess("default", &dir(), &git, &no_env).unwrap();
        assert_eq!(config, ScmConfig::disabled());
    }

    #[test]
    fn test_validate_consistency() {
        assert!(ScmConfig::disabled().validate().is_ok());

        let err = ScmConfig::default().validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "wrong scm configuration: missing value for parameter 'kind',missing value for parameter 'spec'"
        );

        let config = ScmConfig {
            disabled: true,
            ..ScmConfig::new(ScmSpec::empty(ScmKind::Git))
        };
        assert!(config.validate().is_err());

        let config = ScmConfig {
            kind: Some(ScmKind::Gitlab),
            spec: Some(ScmSpec::empty(ScmKind::Github)),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_two_phase() {
        let config: ScmConfig = serde_yaml::from_str(
            "kind: github\nspec:\n  owner: updatecli\n  repository: website\n  token: t\n",
        )
        .unwrap();
        assert_eq!(config.kind, Some(ScmKind::Github));
        assert!(matches!(config.spec, Some(ScmSpec::Github(_))));

        let err = serde_yaml::from_str::<ScmConfig>("kind: svn\nspec: {}\n").unwrap_err();
        assert!(err.to_string().contains("svn"));

        let config: ScmConfig = serde_yaml::from_str("spec:\n  url: x\n").unwrap();
        assert_eq!(config.untyped_spec, Some(serde_json::json!({"url": "x"})));
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "wrong scm configuration: missing value for parameter 'kind'"
        );

        let config: ScmConfig = serde_yaml::from_str("disabled: true\n").unwrap();
        assert_eq!(config, ScmConfig::disabled());
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = ScmConfig::new(ScmSpec::Git(GitSpec {
            url: Some("https://example.com/r.git".to_string()),
            ..Default::default()
        }));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "git", "spec": {"url": "https://example.com/r.git"}})
        );
        let back: ScmConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_env_prefix() {
        assert_eq!(env_prefix("default"), "UPDATECLI_SCM_DEFAULT");
    }
}
