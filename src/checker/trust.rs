// src/checker/trust.rs
// =============================================================================
// Decides whether a link target is allowed to receive the bearer credential.
//
// The token is meant for one internal site. Sending it to every host a
// document happens to link to would leak it, so the check is an explicit,
// configured allow-list instead of an inline string comparison.
//
// Entry forms:
// - "https://docs.internal.example.com/api"  URL prefix: same scheme, host and
//                                            port, path starting on a segment
// - "internal.example.com"                   exact host
// - "*.example.com"                          any strict subdomain
//
// Everything is compared on parsed URL components, never on the raw string:
// "https://trusted.com:x@evil.io/" has host evil.io, whatever its text says.
// =============================================================================

use tracing::warn;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rule {
    Prefix {
        scheme: String,
        host: String,
        port: Option<u16>,
        path: String,
    },
    Host(String),
    Subdomain(String),
}

/// Allow-list of hosts that may receive the credential
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedHosts {
    rules: Vec<Rule>,
}

impl TrustedHosts {
    /// Builds the list from raw configuration entries.
    ///
    /// Blank entries are skipped. URL entries that do not parse, have no host
    /// or carry credentials are dropped with a warning, so they trust nothing.
    pub fn parse<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = entries
            .into_iter()
            .filter_map(|entry| {
                let entry = entry.as_ref().trim();
                if entry.is_empty() {
                    None
                } else if entry.contains("://") {
                    prefix_rule(entry)
                } else if let Some(parent) = entry.strip_prefix("*.") {
                    Some(Rule::Subdomain(parent.to_ascii_lowercase()))
                } else {
                    Some(Rule::Host(entry.to_ascii_lowercase()))
                }
            })
            .collect();

        TrustedHosts { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns true if `target` may be sent the credential
    pub fn matches(&self, target: &Url) -> bool {
        // A URL carrying userinfo is never trusted
        if !target.username().is_empty() || target.password().is_some() {
            return false;
        }

        // Url already lowercases the host for http(s)
        let Some(host) = target.host_str() else {
            return false;
        };

        self.rules.iter().any(|rule| match rule {
            Rule::Prefix {
                scheme,
                host: trusted_host,
                port,
                path,
            } => {
                target.scheme() == scheme
                    && host == trusted_host
                    && target.port_or_known_default() == *port
                    && path_matches(path, target.path())
            }
            Rule::Host(trusted) => host == trusted,
            Rule::Subdomain(parent) => host
                .strip_suffix(parent.as_str())
                .is_some_and(|rest| rest.ends_with('.') && rest.len() > 1),
        })
    }
}

// Parsing normalises case and default ports the same way targets are parsed
fn prefix_rule(entry: &str) -> Option<Rule> {
    let url = match Url::parse(entry) {
        Ok(url) => url,
        Err(e) => {
            warn!(entry, error = %e, "ignoring unparseable trusted host");
            return None;
        }
    };

    if !url.username().is_empty() || url.password().is_some() {
        warn!(entry, "ignoring trusted host with credentials in it");
        return None;
    }

    let Some(host) = url.host_str() else {
        warn!(entry, "ignoring trusted host without a host name");
        return None;
    };

    Some(Rule::Prefix {
        scheme: url.scheme().to_string(),
        host: host.to_string(),
        port: url.port_or_known_default(),
        path: url.path().to_string(),
    })
}

// "/api" matches "/api" and "/api/v1" but not "/apis"
fn path_matches(prefix: &str, path: &str) -> bool {
    let Some(rest) = path.strip_prefix(prefix) else {
        return false;
    };

    prefix.ends_with('/') || rest.is_empty() || rest.starts_with('/')
}
