// src/checker/http.rs
// =============================================================================
// This module checks if links are alive by making HTTP requests.
//
// Key functionality:
// - Makes one HTTP HEAD request per link (lightweight, no body download)
// - Optionally repeats as GET when a server refuses HEAD (405 / 501)
// - Attaches the bearer token only to trusted hosts
// - Classifies the outcome: 200 is OK, everything else is a recorded failure
//
// The network itself sits behind the `Transport` trait, so the verifier can be
// tested without sockets and the real reqwest client stays a thin adapter.
//
// Rust concepts:
// - Traits: `Transport` is the seam between policy and network
// - Generics: `Verifier<T: Transport>` is resolved at compile time
// - impl Future in traits: async methods without boxing
// =============================================================================

use crate::checker::markdown::{Link, LinkKind};
use crate::checker::trust::TrustedHosts;
use crate::config::Credential;
use reqwest::Client;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// How many redirects a probe follows before giving up
const MAX_REDIRECTS: usize = 5;

/// Result of checking one link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum LinkStatus {
    /// Server answered 200
    Ok,
    /// Server answered with any other status code
    HttpError(u16),
    /// No HTTP answer at all (DNS, refused connection, TLS, timeout)
    NetworkError(String),
    /// Placeholder or unparseable target - never sent over the network
    Malformed,
}

/// One link together with its verification result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkOutcome {
    pub link: Link,
    #[serde(flatten)]
    pub status: LinkStatus,
}

impl LinkOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, LinkStatus::Ok)
    }

    /// Short human-readable reason, used in console lines and annotations
    pub fn reason(&self) -> String {
        match (&self.status, self.link.kind) {
            (LinkStatus::Ok, _) => "OK".to_string(),
            (LinkStatus::HttpError(code), _) => format!("Status: {}", code),
            (LinkStatus::NetworkError(message), _) => format!("Error: {}", message),
            (LinkStatus::Malformed, LinkKind::EmptyImage) => "Empty image link".to_string(),
            (LinkStatus::Malformed, LinkKind::Inline) => "Malformed URL".to_string(),
        }
    }
}

/// HTTP method used for a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    Head,
    Get,
}

/// Everything a transport needs to send one request
#[derive(Debug, Clone, Copy)]
pub struct Probe<'a> {
    pub method: ProbeMethod,
    pub url: &'a Url,
    /// Bearer token, already filtered by the trusted-host rule
    pub bearer: Option<&'a str>,
}

/// A probe that got no HTTP response
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    #[error("timeout")]
    Timeout,
    #[error("{0}")]
    Failed(String),
}

/// Sends a single request and reports the response status code
pub trait Transport {
    fn probe(&self, probe: Probe<'_>) -> impl Future<Output = Result<u16, ProbeError>> + Send;
}

/// The production transport: a shared reqwest client
///
/// reqwest drops the Authorization header when a redirect leaves the
/// original host, so following redirects does not leak the token.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    // Builds one client for the whole run (connection pooling)
    //
    // Parameters:
    //   timeout: upper bound for a single request, connect through last byte
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    async fn probe(&self, probe: Probe<'_>) -> Result<u16, ProbeError> {
        let method = match probe.method {
            ProbeMethod::Head => reqwest::Method::HEAD,
            ProbeMethod::Get => reqwest::Method::GET,
        };

        let mut request = self.client.request(method, probe.url.clone());
        if let Some(token) = probe.bearer {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(response) => Ok(response.status().as_u16()),
            Err(e) => Err(categorize_error(e)),
        }
    }
}

// Turns a reqwest error into something worth printing
//
// reqwest's own Display is usually just "error sending request for url (...)",
// so the underlying causes are appended.
fn categorize_error(error: reqwest::Error) -> ProbeError {
    if error.is_timeout() {
        ProbeError::Timeout
    } else if error.is_redirect() {
        ProbeError::Failed("too many redirects".to_string())
    } else if error.is_connect() {
        ProbeError::Failed(format!("connection failed: {}", root_cause(&error)))
    } else {
        ProbeError::Failed(root_cause(&error))
    }
}

fn root_cause(error: &(dyn std::error::Error + 'static)) -> String {
    let mut current = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

/// Applies the checking policy to links: credential gating, method fallback,
/// status classification
pub struct Verifier<T> {
    transport: T,
    credential: Option<Credential>,
    trusted: TrustedHosts,
    get_fallback: bool,
}

impl<T> fmt::Debug for Verifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier")
            .field("credential", &self.credential)
            .field("trusted", &self.trusted)
            .field("get_fallback", &self.get_fallback)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Verifier<T> {
    pub fn new(transport: T, credential: Option<Credential>, trusted: TrustedHosts) -> Self {
        Verifier {
            transport,
            credential,
            trusted,
            get_fallback: false,
        }
    }

    /// Repeat a HEAD probe as GET when the server answers 405 or 501
    pub fn with_get_fallback(mut self, enabled: bool) -> Self {
        self.get_fallback = enabled;
        self
    }

    /// The token to send to `url`, if any
    pub fn bearer_for(&self, url: &Url) -> Option<&str> {
        let credential = self.credential.as_ref()?;
        if self.trusted.matches(url) {
            Some(credential.expose())
        } else {
            None
        }
    }

    // Checks a single link
    //
    // Never fails: every problem becomes a LinkStatus so the run can keep going.
    pub async fn verify(&self, link: Link) -> LinkOutcome {
        // Placeholders are failures whether or not the URL is reachable
        if link.kind == LinkKind::EmptyImage {
            return LinkOutcome { link, status: LinkStatus::Malformed };
        }

        let url = match Url::parse(&link.target) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => return LinkOutcome { link, status: LinkStatus::Malformed },
        };

        let bearer = self.bearer_for(&url);
        debug!(
            url = %url,
            authenticated = bearer.is_some(),
            "probing {}:{}",
            link.document.display(),
            link.line
        );

        let mut result = self
            .transport
            .probe(Probe { method: ProbeMethod::Head, url: &url, bearer })
            .await;

        if self.get_fallback && matches!(result, Ok(405) | Ok(501)) {
            debug!(url = %url, "HEAD refused, falling back to GET");
            result = self
                .transport
                .probe(Probe { method: ProbeMethod::Get, url: &url, bearer })
                .await;
        }

        LinkOutcome { link, status: classify(result) }
    }
}

// Only an exact 200 counts as success
fn classify(result: Result<u16, ProbeError>) -> LinkStatus {
    match result {
        Ok(200) => LinkStatus::Ok,
        Ok(code) => LinkStatus::HttpError(code),
        Err(e) => LinkStatus::NetworkError(e.to_string()),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a Transport trait?
//    - The verifier decides WHAT to send (method, token) and how to read the
//      answer; the transport only knows HOW to send it
//    - Tests swap in a fake transport that records every probe
//
// 2. What is `impl Future<Output = ...> + Send` in a trait?
//    - It is how a trait declares an async method without extra crates
//    - Implementations can simply write `async fn probe(...)`
//    - `+ Send` promises the future can move between runtime threads
//
// 3. Why does verify() return LinkOutcome and not Result?
//    - A broken link is an expected result, not a program error
//    - Keeping it as data lets the run continue to the next link (fail-slow)
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    type Responder = fn(ProbeMethod, &str) -> Result<u16, ProbeError>;

    // Records every probe and answers through a plain function
    struct FakeTransport {
        respond: Responder,
        seen: Mutex<Vec<(ProbeMethod, String, Option<String>)>>,
    }

    impl FakeTransport {
        fn new(respond: Responder) -> Self {
            FakeTransport { respond, seen: Mutex::new(Vec::new()) }
        }
    }

    impl Transport for FakeTransport {
        async fn probe(&self, probe: Probe<'_>) -> Result<u16, ProbeError> {
            self.seen.lock().unwrap().push((
                probe.method,
                probe.url.to_string(),
                probe.bearer.map(str::to_string),
            ));
            (self.respond)(probe.method, probe.url.as_str())
        }
    }

    fn link(target: &str, kind: LinkKind) -> Link {
        Link {
            target: target.to_string(),
            line: 3,
            column: 1,
            document: PathBuf::from("docs/a.md"),
            kind,
        }
    }

    fn always_ok(_: ProbeMethod, _: &str) -> Result<u16, ProbeError> {
        Ok(200)
    }

    fn token() -> Option<Credential> {
        Credential::new("secret-token")
    }

    #[tokio::test]
    async fn test_ok_and_http_error_classification() {
        fn respond(_: ProbeMethod, url: &str) -> Result<u16, ProbeError> {
            if url.ends_with("/404") { Ok(404) } else if url.ends_with("/204") { Ok(204) } else { Ok(200) }
        }
        let verifier = Verifier::new(FakeTransport::new(respond), None, TrustedHosts::default());

        let ok = verifier.verify(link("https://example.com/ok", LinkKind::Inline)).await;
        assert_eq!(ok.status, LinkStatus::Ok);
        assert!(ok.is_ok());

        let missing = verifier.verify(link("https://example.com/404", LinkKind::Inline)).await;
        assert_eq!(missing.status, LinkStatus::HttpError(404));
        assert_eq!(missing.reason(), "Status: 404");

        // Only 200 is success, other 2xx codes are recorded failures
        let no_content = verifier.verify(link("https://example.com/204", LinkKind::Inline)).await;
        assert_eq!(no_content.status, LinkStatus::HttpError(204));
    }

    #[tokio::test]
    async fn test_transport_errors_become_network_errors() {
        fn respond(_: ProbeMethod, url: &str) -> Result<u16, ProbeError> {
            if url.contains("slow") {
                Err(ProbeError::Timeout)
            } else {
                Err(ProbeError::Failed("dns error".to_string()))
            }
        }
        let verifier = Verifier::new(FakeTransport::new(respond), None, TrustedHosts::default());

        let slow = verifier.verify(link("https://slow.example.com/", LinkKind::Inline)).await;
        assert_eq!(slow.status, LinkStatus::NetworkError("timeout".to_string()));

        let gone = verifier.verify(link("https://nowhere.invalid/", LinkKind::Inline)).await;
        assert_eq!(gone.status, LinkStatus::NetworkError("dns error".to_string()));
    }

    #[tokio::test]
    async fn test_empty_image_is_never_probed() {
        let transport = FakeTransport::new(always_ok);
        let verifier = Verifier::new(transport, None, TrustedHosts::default());

        let outcome = verifier
            .verify(link("https://example.com/img.png", LinkKind::EmptyImage))
            .await;

        assert_eq!(outcome.status, LinkStatus::Malformed);
        assert_eq!(outcome.reason(), "Empty image link");
        assert!(verifier.transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_target_is_malformed() {
        let verifier = Verifier::new(FakeTransport::new(always_ok), None, TrustedHosts::default());
        let outcome = verifier.verify(link("https://exa mple.com/", LinkKind::Inline)).await;
        assert_eq!(outcome.status, LinkStatus::Malformed);
        assert!(verifier.transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_credential_only_sent_to_trusted_hosts() {
        let trusted = TrustedHosts::parse(["https://internal.example.com"]);
        let verifier = Verifier::new(FakeTransport::new(always_ok), token(), trusted);

        verifier.verify(link("https://internal.example.com/page", LinkKind::Inline)).await;
        verifier.verify(link("https://third-party.example.org/page", LinkKind::Inline)).await;
        verifier.verify(link("https://internal.example.com.evil.io/page", LinkKind::Inline)).await;
        verifier.verify(link("https://internal.example.com:x@evil.io/steal", LinkKind::Inline)).await;
        verifier.verify(link("https://internal.example.com@evil.io/steal", LinkKind::Inline)).await;
        verifier.verify(link("https://internal.example.com:8443/page", LinkKind::Inline)).await;

        let seen = verifier.transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 6);
        assert_eq!(seen[0].2.as_deref(), Some("secret-token"));
        for (_, url, bearer) in &seen[1..] {
            assert_eq!(*bearer, None, "token sent to {}", url);
        }
    }

    #[tokio::test]
    async fn test_no_credential_means_no_header_even_for_trusted_hosts() {
        let trusted = TrustedHosts::parse(["internal.example.com"]);
        let verifier = Verifier::new(FakeTransport::new(always_ok), None, trusted);

        verifier.verify(link("https://internal.example.com/page", LinkKind::Inline)).await;

        let seen = verifier.transport.seen.lock().unwrap();
        assert_eq!(seen[0].2, None);
    }

    #[tokio::test]
    async fn test_head_is_the_only_probe_by_default() {
        fn respond(_: ProbeMethod, _: &str) -> Result<u16, ProbeError> {
            Ok(405)
        }
        let verifier = Verifier::new(FakeTransport::new(respond), None, TrustedHosts::default());

        let outcome = verifier.verify(link("https://example.com/", LinkKind::Inline)).await;

        assert_eq!(outcome.status, LinkStatus::HttpError(405));
        let seen = verifier.transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, ProbeMethod::Head);
    }

    #[tokio::test]
    async fn test_get_fallback_after_method_not_allowed() {
        fn respond(method: ProbeMethod, _: &str) -> Result<u16, ProbeError> {
            match method {
                ProbeMethod::Head => Ok(405),
                ProbeMethod::Get => Ok(200),
            }
        }
        let verifier = Verifier::new(FakeTransport::new(respond), None, TrustedHosts::default())
            .with_get_fallback(true);

        let outcome = verifier.verify(link("https://example.com/", LinkKind::Inline)).await;

        assert_eq!(outcome.status, LinkStatus::Ok);
        let seen = verifier.transport.seen.lock().unwrap();
        let methods: Vec<_> = seen.iter().map(|s| s.0).collect();
        assert_eq!(methods, vec![ProbeMethod::Head, ProbeMethod::Get]);
    }

    #[tokio::test]
    async fn test_get_fallback_does_not_retry_errors() {
        fn respond(_: ProbeMethod, _: &str) -> Result<u16, ProbeError> {
            Err(ProbeError::Timeout)
        }
        let verifier = Verifier::new(FakeTransport::new(respond), None, TrustedHosts::default())
            .with_get_fallback(true);

        verifier.verify(link("https://example.com/", LinkKind::Inline)).await;

        assert_eq!(verifier.transport.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_credential_is_redacted_in_debug_output() {
        let verifier = Verifier::new(FakeTransport::new(always_ok), token(), TrustedHosts::default());
        let printed = format!("{:?}", verifier);
        assert!(!printed.contains("secret-token"));
    }

    // --- HttpTransport against a local server ---------------------------------

    fn transport() -> HttpTransport {
        HttpTransport::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_http_transport_sends_head() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/ok", server.uri())).unwrap();
        let status = transport()
            .probe(Probe { method: ProbeMethod::Head, url: &url, bearer: None })
            .await;

        assert_eq!(status, Ok(200));
    }

    #[tokio::test]
    async fn test_http_transport_reports_404() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/404", server.uri())).unwrap();
        let status = transport()
            .probe(Probe { method: ProbeMethod::Head, url: &url, bearer: None })
            .await;

        assert_eq!(status, Ok(404));
    }

    #[tokio::test]
    async fn test_http_transport_attaches_bearer_header() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/private"))
            .and(header("Authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/private", server.uri())).unwrap();
        let status = transport()
            .probe(Probe { method: ProbeMethod::Head, url: &url, bearer: Some("secret-token") })
            .await;

        // Without the header the mock would not match and wiremock answers 404
        assert_eq!(status, Ok(200));
    }

    #[tokio::test]
    async fn test_verifier_over_http_withholds_token_from_untrusted_server() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let trusted = TrustedHosts::parse(["https://internal.example.com"]);
        let verifier = Verifier::new(transport(), token(), trusted);

        let outcome = verifier
            .verify(link(&format!("{}/public", server.uri()), LinkKind::Inline))
            .await;
        assert_eq!(outcome.status, LinkStatus::Ok);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_http_transport_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/slow", server.uri())).unwrap();
        let transport = HttpTransport::new(Duration::from_millis(200)).unwrap();
        let status = transport
            .probe(Probe { method: ProbeMethod::Head, url: &url, bearer: None })
            .await;

        assert_eq!(status, Err(ProbeError::Timeout));
    }

    #[tokio::test]
    async fn test_outcome_serializes_with_flattened_status() {
        let outcome = LinkOutcome {
            link: link("https://example.com/404", LinkKind::Inline),
            status: LinkStatus::HttpError(404),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "http_error");
        assert_eq!(json["detail"], 404);
        assert_eq!(json["link"]["line"], 3);
    }
}
