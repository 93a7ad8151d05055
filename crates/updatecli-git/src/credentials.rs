//! Credential handling for remote URLs

use url::Url;

/// Username sent with a token when none is configured
pub const DEFAULT_TOKEN_USERNAME: &str = "oauth2";

/// Embed `username`/`password` into an http(s) remote URL.
///
/// Other URLs (ssh, scp-like, local paths) are returned unchanged, as is
/// any URL when no password is given.
pub fn authenticated_url(raw: &str, username: Option<&str>, password: Option<&str>) -> String {
    let Some(password) = password.filter(|p| !p.is_empty()) else {
        return raw.to_string();
    };

    match Url::parse(raw) {
        Ok(mut url) if matches!(url.scheme(), "http" | "https") => {
            let username = username
                .filter(|u| !u.is_empty())
                .unwrap_or(DEFAULT_TOKEN_USERNAME);
            if url.set_username(username).is_err() || url.set_password(Some(password)).is_err() {
                return raw.to_string();
            }
            url.to_string()
        }
        _ => raw.to_string(),
    }
}

/// Remove any credentials from a URL before it is logged or displayed
pub fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) if !url.username().is_empty() || url.password().is_some() => {
            if url.set_username("").is_err() || url.set_password(None).is_err() {
                return raw.to_string();
            }
            url.to_string()
        }
        _ => raw.to_string(),
    }
}

/// Username and password embedded in an http(s) URL
pub(crate) fn url_credentials(raw: &str) -> Option<(String, String)> {
    let url = Url::parse(raw).ok()?;
    let password = url.password()?;
    let username = match url.username() {
        "" => DEFAULT_TOKEN_USERNAME,
        user => user,
    };
    Some((username.to_string(), password.to_string()))
}

/// Replace every credential-bearing URL of `args` inside `text`
pub(crate) fn redact_text(text: &str, args: &[&str]) -> String {
    args.iter()
        .filter(|arg| arg.contains("://"))
        .fold(text.to_string(), |acc, arg| acc.replace(arg, &redact_url(arg)))
}
