//! Remote URL decomposition
//!
//! Accepts absolute URLs (`https://`, `http://`, `ssh://`, `git://`,
//! `file://`) and scp-like references, either `[user@]host:owner/repo.git`
//! or `[user@]host:port:owner/repo.git`.

use url::Url;

use updatecli_core::error::ScmError;

const URL_SCHEMES: [&str; 5] = ["http", "https", "ssh", "git", "file"];

/// A remote URL split into hostname and path segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUrl {
    raw: String,
    hostname: String,
    port: Option<u16>,
    segments: Vec<String>,
}

impl RemoteUrl {
    /// Decompose `raw`; never fails, unknown shapes yield an empty hostname
    pub fn parse(raw: &str) -> Self {
        if let Ok(url) = Url::parse(raw) {
            if URL_SCHEMES.contains(&url.scheme()) {
                return Self {
                    raw: raw.to_string(),
                    hostname: url.host_str().unwrap_or_default().to_string(),
                    port: url.port(),
                    segments: split_path(url.path()),
                };
            }
        }

        let Some((left, right)) = raw.split_once(':') else {
            return Self {
                raw: raw.to_string(),
                hostname: String::new(),
                port: None,
                segments: split_path(raw),
            };
        };

        let hostname = left.rsplit_once('@').map_or(left, |(_, host)| host);
        let (port, path) = match right.split_once(':') {
            Some((port, path)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
                (port.parse().ok(), path)
            }
            _ => (None, right),
        };

        Self {
            raw: raw.to_string(),
            hostname: hostname.to_string(),
            port,
            segments: split_path(path),
        }
    }

    /// The URL as given
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Hostname, empty for local paths
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Explicit port, if any
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// `(owner, repository)` taken from the last two path segments, `.git` trimmed
    pub fn owner_repository(&self) -> Result<(String, String), ScmError> {
        let malformed = || ScmError::MalformedRemoteUrl(self.raw.clone());

        let [.., owner, repository] = self.segments.as_slice() else {
            return Err(malformed());
        };
        let repository = repository.trim_end_matches(".git");
        if repository.is_empty() {
            return Err(malformed());
        }

        Ok((owner.clone(), repository.to_string()))
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("git@github.com:olblak/updatecli.git", "github.com", None)]
    #[case("https://github.com/olblak/updatecli.git", "github.com", None)]
    #[case("ssh://git@github.com/olblak/updatecli.git", "github.com", None)]
    #[case("https://10.0.2.4:443/olblak/updatecli", "10.0.2.4", None)]
    #[case("http://gitea.local:3000/olblak/updatecli", "gitea.local", Some(3000))]
    #[case("gitlab.example.com:2222:olblak/updatecli.git", "gitlab.example.com", Some(2222))]
    #[case("gitlab.example.com:olblak/updatecli.git", "gitlab.example.com", None)]
    #[case("git@gitlab.example.com:2222:olblak/updatecli.git", "gitlab.example.com", Some(2222))]
    fn test_parse_hostname(
        #[case] raw: &str,
        #[case] hostname: &str,
        #[case] port: Option<u16>,
    ) {
        let remote = RemoteUrl::parse(raw);
        assert_eq!(remote.hostname(), hostname);
        assert_eq!(remote.port(), port);
        assert_eq!(remote.as_str(), raw);
        assert_eq!(
            remote.owner_repository().unwrap(),
            ("olblak".to_string(), "updatecli".to_string())
        );
    }

    #[test]
    fn test_single_colon_and_port_forms_agree() {
        let with_port = RemoteUrl::parse("git@example.com:22:owner/repo.git");
        let without_port = RemoteUrl::parse("git@example.com:owner/repo.git");
        assert_eq!(with_port.hostname(), without_port.hostname());
        assert_eq!(
            with_port.owner_repository().unwrap(),
            without_port.owner_repository().unwrap()
        );
    }

    #[rstest]
    #[case("git@github.com:updatecli.git")]
    #[case("https://github.com/updatecli")]
    #[case("https://github.com/")]
    #[case("git@github.com:olblak/.git")]
    fn test_malformed(#[case] raw: &str) {
        let err = RemoteUrl::parse(raw).owner_repository().unwrap_err();
        assert!(matches!(err, ScmError::MalformedRemoteUrl(ref url) if url == raw));
    }

    #[test]
    fn test_local_path_has_no_hostname() {
        assert_eq!(RemoteUrl::parse("/srv/git/updatecli.git").hostname(), "");
        assert_eq!(RemoteUrl::parse("file:///srv/git/updatecli.git").hostname(), "");
    }

    #[test]
    fn test_last_two_segments_win() {
        let remote = RemoteUrl::parse("https://gitlab.com/group/subgroup/project.git");
        assert_eq!(
            remote.owner_repository().unwrap(),
            ("subgroup".to_string(), "project".to_string())
        );
    }
}
