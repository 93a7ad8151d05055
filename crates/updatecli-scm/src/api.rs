//! Paginated tag and branch listing against hosting APIs
//!
//! One blocking request per page, issued sequentially while the host
//! reports more pages (`Link: rel="last"` for github and gitea,
//! `X-Page`/`X-Total-Pages` for gitlab).

use std::time::{Duration, Instant};

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::backends::default_host;
use crate::kind::ScmKind;
use updatecli_core::config::{HttpConfig, DEFAULT_HTTP_PAGE_SIZE, DEFAULT_HTTP_TIMEOUT_SECS};
use updatecli_core::error::{ApiError, ScmError};

/// Items requested per page
pub const DEFAULT_PAGE_SIZE: u32 = DEFAULT_HTTP_PAGE_SIZE;

/// Timeout of one page request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS);

/// One page of results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Page number, starting at 1
    pub current: u32,
    /// Last page number reported by the host
    pub last: u32,
}

/// Fetch pages starting at 1 until `current >= last`
pub fn paginate<T>(
    mut fetch: impl FnMut(u32) -> Result<Page<T>, ApiError>,
) -> Result<Vec<T>, ApiError> {
    let mut items = Vec::new();
    let mut page = 1;

    loop {
        let result = fetch(page)?;
        items.extend(result.items);
        if result.current >= result.last {
            break;
        }
        page = result.current + 1;
    }

    Ok(items)
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

/// Client for the github, gitlab and gitea REST APIs
#[derive(Debug, Clone)]
pub struct HostedApi {
    kind: ScmKind,
    endpoint: String,
    token: Option<String>,
    page_size: u32,
    client: Client,
}

impl HostedApi {
    /// Client for `kind` talking to the API root `endpoint`
    pub fn new(
        kind: ScmKind,
        endpoint: &str,
        token: Option<&str>,
        http: &HttpConfig,
    ) -> Result<Self, ScmError> {
        if !matches!(kind, ScmKind::Github | ScmKind::Gitlab | ScmKind::Gitea) {
            return Err(ScmError::Unsupported {
                kind: kind.to_string(),
                operation: "list",
            });
        }

        let client = Client::builder()
            .user_agent(&http.user_agent)
            .timeout(http.timeout())
            .build()
            .map_err(|e| ApiError::Request {
                url: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            kind,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()).map(str::to_string),
            page_size: http.page_size,
            client,
        })
    }

    /// API root for `kind` hosted at `url` (public instance when `None`)
    pub fn endpoint_for(kind: ScmKind, url: Option<&str>) -> Result<String, ScmError> {
        let host = url
            .filter(|u| !u.is_empty())
            .or(default_host(kind))
            .ok_or_else(|| ScmError::Validation {
                kind: kind.to_string(),
                message: format!("{} parameter(s) required: [url]", kind),
            })?;
        let base = crate::backends::with_scheme(host);

        Ok(match kind {
            ScmKind::Github if base == "https://github.com" => "https://api.github.com".to_string(),
            ScmKind::Github => format!("{}/api/v3", base),
            ScmKind::Gitlab => format!("{}/api/v4", base),
            ScmKind::Gitea => format!("{}/api/v1", base),
            other => {
                return Err(ScmError::Unsupported {
                    kind: other.to_string(),
                    operation: "list",
                })
            }
        })
    }

    /// Every tag name of `owner/repository`, in API order
    pub fn list_tags(&self, owner: &str, repository: &str) -> Result<Vec<String>, ApiError> {
        self.list("tags", owner, repository)
    }

    /// Every branch name of `owner/repository`, in API order
    pub fn list_branches(&self, owner: &str, repository: &str) -> Result<Vec<String>, ApiError> {
        self.list("branches", owner, repository)
    }

    #[instrument(skip(self), fields(kind = %self.kind))]
    fn list(&self, resource: &str, owner: &str, repository: &str) -> Result<Vec<String>, ApiError> {
        let start = Instant::now();
        let url = self.resource_url(resource, owner, repository);
        let names = paginate(|page| self.fetch_page(&url, page))?;

        info!(
            count = names.len(),
            duration_ms = start.elapsed().as_millis(),
            "listed {}",
            resource
        );
        Ok(names)
    }

    fn resource_url(&self, resource: &str, owner: &str, repository: &str) -> String {
        match self.kind {
            ScmKind::Gitlab => {
                let project: String =
                    url::form_urlencoded::byte_serialize(format!("{}/{}", owner, repository).as_bytes())
                        .collect();
                format!("{}/projects/{}/repository/{}", self.endpoint, project, resource)
            }
            _ => format!("{}/repos/{}/{}/{}", self.endpoint, owner, repository, resource),
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let Some(token) = &self.token else {
            return request;
        };
        match self.kind {
            ScmKind::Gitlab => request.header("PRIVATE-TOKEN", token),
            ScmKind::Gitea => request.header("Authorization", format!("token {}", token)),
            _ => request
                .header("Authorization", format!("Bearer {}", token))
                .header("Accept", "application/vnd.github+json"),
        }
    }

    fn fetch_page(&self, url: &str, page: u32) -> Result<Page<String>, ApiError> {
        let size_param = match self.kind {
            ScmKind::Gitea => "limit",
            _ => "per_page",
        };
        let request = self
            .client
            .get(url)
            .query(&[(size_param, self.page_size), ("page", page)]);

        let response = self
            .authorize(request)
            .send()
            .map_err(|e| ApiError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), url, "hosting API returned an error");
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let last = self.last_page(&response).unwrap_or(page).max(page);
        let items: Vec<Named> = response.json().map_err(|e| {
            warn!(error = %e, url, "failed to parse hosting API response");
            ApiError::InvalidResponse {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        debug!(page, last, count = items.len(), "fetched page");
        Ok(Page {
            items: items.into_iter().map(|n| n.name).collect(),
            current: page,
            last,
        })
    }

    fn last_page(&self, response: &Response) -> Option<u32> {
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        match self.kind {
            ScmKind::Gitlab => header("x-total-pages").and_then(|v| v.trim().parse().ok()),
            _ => header("link").and_then(|v| last_page_from_link(&v)),
        }
    }
}

/// Page number of the `rel="last"` entry of a `Link` header
pub(crate) fn last_page_from_link(link: &str) -> Option<u32> {
    link.split(',')
        .find(|part| part.contains("rel=\"last\""))
        .and_then(|part| {
            let start = part.find('<')? + 1;
            let end = part.find('>')?;
            Url::parse(part.get(start..end)?).ok()
        })
        .and_then(|url| {
            url.query_pairs()
                .find(|(k, _)| k == "page")
                .and_then(|(_, v)| v.parse().ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn page_query(size_param: &str, page: u32) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded(size_param.into(), DEFAULT_PAGE_SIZE.to_string()),
            Matcher::UrlEncoded("page".into(), page.to_string()),
        ])
    }

    #[test]
    fn test_paginate_stops_at_last_page() {
        let mut requested = Vec::new();
        let items = paginate(|page| {
            requested.push(page);
            Ok(Page {
                items: vec![page],
                current: page,
                last: 3,
            })
        })
        .unwrap();

        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(requested, vec![1, 2, 3]);
    }

    #[test]
    fn test_paginate_single_page() {
        let items = paginate(|page| {
            Ok(Page {
                items: vec!["a"],
                current: page,
                last: page,
            })
        })
        .unwrap();
        assert_eq!(items, vec!["a"]);
    }

    #[test]
    fn test_paginate_propagates_errors() {
        let result: Result<Vec<u8>, _> = paginate(|_| {
            Err(ApiError::Status {
                url: "u".to_string(),
                status: 500,
            })
        });
        assert!(matches!(result, Err(ApiError::Status { status: 500, .. })));
    }

    #[test]
    fn test_last_page_from_link() {
        let link = r#"<https://api.github.com/repositories/1/tags?per_page=30&page=2>; rel="next", <https://api.github.com/repositories/1/tags?per_page=30&page=4>; rel="last""#;
        assert_eq!(last_page_from_link(link), Some(4));
        assert_eq!(
            last_page_from_link(r#"<https://x/tags?page=1>; rel="prev""#),
            None
        );
    }

    #[test]
    fn test_github_tags_follow_link_header() {
        let mut server = Server::new();
        let path = "/repos/updatecli/updatecli/tags";
        let link = format!(r#"<{}{}?per_page=30&page=2>; rel="last""#, server.url(), path);

        let first = server
            .mock("GET", path)
            .match_query(page_query("per_page", 1))
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("link", &link)
            .with_body(r#"[{"name": "v0.2.0"}, {"name": "v0.1.0"}]"#)
            .create();
        let second = server
            .mock("GET", path)
            .match_query(page_query("per_page", 2))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"name": "v0.0.1"}]"#)
            .create();

        let api = HostedApi::new(
            ScmKind::Github,
            &server.url(),
            Some("secret"),
            &HttpConfig::default(),
        )
        .unwrap();
        let tags = api.list_tags("updatecli", "updatecli").unwrap();

        first.assert();
        second.assert();
        assert_eq!(tags, vec!["v0.2.0", "v0.1.0", "v0.0.1"]);
    }

    #[test]
    fn test_gitlab_branches_follow_total_pages() {
        let mut server = Server::new();
        let path = "/projects/updatecli%2Fwebsite/repository/branches";

        let first = server
            .mock("GET", path)
            .match_query(page_query("per_page", 1))
            .match_header("private-token", "secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("x-page", "1")
            .with_header("x-total-pages", "2")
            .with_body(r#"[{"name": "main"}]"#)
            .create();
        let second = server
            .mock("GET", path)
            .match_query(page_query("per_page", 2))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("x-page", "2")
            .with_header("x-total-pages", "2")
            .with_body(r#"[{"name": "v1"}]"#)
            .create();

        let api = HostedApi::new(
            ScmKind::Gitlab,
            &server.url(),
            Some("secret"),
            &HttpConfig::default(),
        )
        .unwrap();
        let branches = api.list_branches("updatecli", "website").unwrap();

        first.assert();
        second.assert();
        assert_eq!(branches, vec!["main", "v1"]);
    }

    #[test]
    fn test_gitea_uses_limit_parameter() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/repos/olblak/updatecli/tags")
            .match_query(page_query("limit", 1))
            .match_header("authorization", "token secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"name": "v1.0.0"}]"#)
            .create();

        let api = HostedApi::new(
            ScmKind::Gitea,
            &server.url(),
            Some("secret"),
            &HttpConfig::default(),
        )
        .unwrap();
        assert_eq!(api.list_tags("olblak", "updatecli").unwrap(), vec!["v1.0.0"]);
        mock.assert();
    }

    #[test]
    fn test_error_status() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/repos/nonexistent/repo/tags")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"message": "Not Found"}"#)
            .create();

        let api = HostedApi::new(ScmKind::Github, &server.url(), None, &HttpConfig::default())
            .unwrap();
        let result = api.list_tags("nonexistent", "repo");

        mock.assert();
        assert!(matches!(result, Err(ApiError::Status { status: 404, .. })));
    }

    #[test]
    fn test_invalid_body() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", "/repos/o/r/tags")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create();

        let api = HostedApi::new(ScmKind::Github, &server.url(), None, &HttpConfig::default())
            .unwrap();
        assert!(matches!(
            api.list_tags("o", "r"),
            Err(ApiError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_endpoint_for() {
        assert_eq!(
            HostedApi::endpoint_for(ScmKind::Github, None).unwrap(),
            "https://api.github.com"
        );
        assert_eq!(
            HostedApi::endpoint_for(ScmKind::Github, Some("github.example.com")).unwrap(),
            "https://github.example.com/api/v3"
        );
        assert_eq!(
            HostedApi::endpoint_for(ScmKind::Gitlab, None).unwrap(),
            "https://gitlab.com/api/v4"
        );
        assert!(HostedApi::endpoint_for(ScmKind::Gitea, None).is_err());
        assert!(matches!(
            HostedApi::endpoint_for(ScmKind::Bitbucket, None),
            Err(ScmError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_listing_unsupported_kind() {
        let err = HostedApi::new(ScmKind::Stash, "http://x", None, &HttpConfig::default())
            .unwrap_err();
        assert!(matches!(err, ScmError::Unsupported { operation: "list", .. }));
    }
}
