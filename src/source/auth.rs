use crate::config::{AuthConfig, AuthKind};
use url::Url;

const REDACTED: &str = "****";

/// Remote URL with credentials embedded, plus what is safe to log.
#[derive(Debug, Clone)]
pub(crate) struct RemoteCredentials {
    fetch_url: String,
    display_url: String,
    /// Longest first, so a userinfo span is replaced before its parts.
    secrets: Vec<(String, String)>,
}

impl RemoteCredentials {
    pub fn new(raw_url: &str, auth: &AuthConfig) -> Self {
        let display_url = strip_userinfo(raw_url);
        let token = auth
            .token
            .as_deref()
            .filter(|token| auth.kind == AuthKind::Token && !token.is_empty());

        let fetch_url = match (token, Url::parse(raw_url)) {
            (Some(token), Ok(mut url)) if matches!(url.scheme(), "http" | "https") => {
                let username = auth.username.as_deref().unwrap_or("git");
                if url.set_username(username).is_ok() && url.set_password(Some(token)).is_ok() {
                    url.to_string()
                } else {
                    raw_url.to_string()
                }
            }
            _ => raw_url.to_string(),
        };

        let secrets = secrets_for(&fetch_url, token);
        Self {
            fetch_url,
            display_url,
            secrets,
        }
    }

    /// URL handed to git, credentials included.
    pub fn fetch_url(&self) -> &str {
        &self.fetch_url
    }

    /// URL safe to log or persist in `.git/config`.
    pub fn display_url(&self) -> &str {
        &self.display_url
    }

    /// Scrub the token from arbitrary text such as git stderr.
    pub fn redact(&self, text: &str) -> String {
        self.secrets
            .iter()
            .fold(text.to_string(), |acc, (secret, replacement)| {
                acc.replace(secret.as_str(), replacement)
            })
    }
}

/// Every spelling of the password that git may echo back: the userinfo
/// span as it appears in the URL, the percent-encoded password, and the
/// raw token.
fn secrets_for(fetch_url: &str, token: Option<&str>) -> Vec<(String, String)> {
    let mut secrets = Vec::new();
    if let Ok(url) = Url::parse(fetch_url)
        && let Some(password) = url.password()
    {
        let username = url.username();
        secrets.push((
            format!("{username}:{password}@"),
            format!("{username}:{REDACTED}@"),
        ));
        secrets.push((password.to_string(), REDACTED.to_string()));
    }
    if let Some(token) = token {
        secrets.push((token.to_string(), REDACTED.to_string()));
    }
    secrets.retain(|(secret, _)| !secret.is_empty());
    secrets.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    secrets.dedup_by(|a, b| a.0 == b.0);
    secrets
}

pub(crate) fn strip_userinfo(raw_url: &str) -> String {
    match Url::parse(raw_url) {
        Ok(mut url) if url.password().is_some() || !url.username().is_empty() => {
            if matches!(url.scheme(), "http" | "https") {
                let _ = url.set_password(None);
                let _ = url.set_username("");
            }
            url.to_string()
        }
        _ => raw_url.to_string(),
    }
}
