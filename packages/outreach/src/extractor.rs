//! Website context extraction.
//!
//! Fetches a prospect's site with a bounded timeout and reduces the markup
//! to a [`ContextSummary`]. Every failure is converted into
//! [`SiteContext::Unavailable`]; nothing raised here reaches the batch.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::FetchError;
use crate::types::context::{ContextSummary, SiteContext};

/// Default bound on a single site fetch, body included.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Bodies beyond this size are cut off before parsing.
const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Elements whose text makes up the excerpt, matched in document order.
const EXCERPT_SELECTOR: &str = "p, h1, h2, h3, li";

/// Source of website context for a prospect.
#[async_trait]
pub trait ContextSource: Send + Sync {
    /// Extract context for `url`. Never fails; problems surface as
    /// [`SiteContext::Unavailable`].
    async fn extract(&self, url: &str) -> SiteContext;

    fn name(&self) -> &str;
}

/// Context source backed by a plain HTTP fetch and HTML parsing.
pub struct HttpContextExtractor {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpContextExtractor {
    /// Create an extractor whose fetches give up after `timeout`.
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        // Browser-like User-Agent; many marketing sites reject obvious bots
        let user_agent = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.5"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, timeout })
    }

    /// Use a preconfigured HTTP client. Its own timeout governs fetches.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, raw_url: &str) -> Result<ContextSummary, FetchError> {
        let url = normalize_url(raw_url)?;
        let url_str = url.to_string();
        debug!(url = %url_str, "Fetching website context");

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&url_str, e))?;

        let status = response.status();
        if let Some(content_type) = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_textual(content_type) {
                return Err(FetchError::UnsupportedContent {
                    url: url_str,
                    content_type: content_type.to_string(),
                });
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::from_reqwest(&url_str, e))?
        {
            body.extend_from_slice(&chunk);
            if body.len() >= MAX_BODY_BYTES {
                debug!(url = %url_str, "Body exceeds limit, truncating");
                body.truncate(MAX_BODY_BYTES);
                break;
            }
        }

        if !status.is_success() {
            if body.iter().all(u8::is_ascii_whitespace) {
                return Err(FetchError::Status {
                    url: url_str,
                    status: status.as_u16(),
                });
            }
            debug!(url = %url_str, status = %status, "Non-success status, parsing body anyway");
        }

        // Parse off the async workers; a parser panic becomes a Parse error
        let html = String::from_utf8_lossy(&body).into_owned();
        tokio::task::spawn_blocking(move || summarize_html(&html))
            .await
            .map_err(|e| FetchError::Parse {
                url: url_str,
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl ContextSource for HttpContextExtractor {
    async fn extract(&self, url: &str) -> SiteContext {
        match self.fetch(url).await {
            Ok(summary) => {
                info!(url = %url, title = %summary.title, "Website context extracted");
                SiteContext::Available(summary)
            }
            Err(err) => {
                warn!(url = %url, error = %err, "Website context unavailable");
                SiteContext::Unavailable(err)
            }
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Reduce an HTML document to a bounded summary.
///
/// Tolerates malformed markup; missing pieces fall back to the
/// placeholder strings of [`ContextSummary`].
pub fn summarize_html(html: &str) -> ContextSummary {
    let document = Html::parse_document(html);
    ContextSummary::new(
        extract_title(&document),
        extract_description(&document),
        extract_excerpt(&document),
    )
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

fn extract_description(document: &Html) -> Option<String> {
    let selector = Selector::parse("meta[name]").ok()?;
    document
        .select(&selector)
        .find(|el| {
            el.value()
                .attr("name")
                .is_some_and(|n| n.trim().eq_ignore_ascii_case("description"))
        })
        .and_then(|el| el.value().attr("content"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

fn extract_excerpt(document: &Html) -> Option<String> {
    let selector = Selector::parse(EXCERPT_SELECTOR).ok()?;
    let texts: Vec<String> = document
        .select(&selector)
        .map(|el: ElementRef<'_>| el.text().collect::<String>())
        .collect();

    if texts.is_empty() {
        return None;
    }
    Some(texts.join(" "))
}

/// Accept bare domains by assuming https.
fn normalize_url(raw: &str) -> Result<Url, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FetchError::InvalidUrl {
            url: raw.to_string(),
            reason: "empty URL".to_string(),
        });
    }

    let parsed = match Url::parse(trimmed) {
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{trimmed}")),
        // `host:port` parses as an opaque URL whose scheme is the host
        Ok(url) if url.cannot_be_a_base() && starts_with_port(url.path()) => {
            Url::parse(&format!("https://{trimmed}"))
        }
        other => other,
    };

    let url = parsed.map_err(|e| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(FetchError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {scheme:?}"),
        }),
    }
}

fn starts_with_port(path: &str) -> bool {
    let digits = path.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && matches!(path.as_bytes().get(digits), None | Some(b'/'))
}

fn is_textual(content_type: &str) -> bool {
    let ct = content_type.to_ascii_lowercase();
    ct.starts_with("text/") || ct.contains("html") || ct.contains("xml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubSite;
    use crate::types::context::{MAX_EXCERPT_CHARS, NO_CONTENT, NO_DESCRIPTION, NO_TITLE};
    use proptest::prelude::*;

    fn local_extractor(timeout: Duration) -> HttpContextExtractor {
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .unwrap();
        HttpContextExtractor::new(timeout).unwrap().with_client(client)
    }

    #[test]
    fn test_summarize_full_document() {
        let html = r#"
            <html><head>
              <title> Acme Widgets </title>
              <meta name="description" content="Industrial widgets since 1950">
            </head><body>
              <h1>Welcome</h1>
              <p>We build widgets.</p>
              <ul><li>Fast</li><li>Cheap</li></ul>
              <h4>Ignored heading</h4>
              <div>Ignored div</div>
            </body></html>
        "#;
        let summary = summarize_html(html);

        assert_eq!(summary.title, "Acme Widgets");
        assert_eq!(summary.description, "Industrial widgets since 1950");
        assert_eq!(summary.excerpt, "Welcome We build widgets. Fast Cheap");
    }

    #[test]
    fn test_summarize_empty_document_uses_fallbacks() {
        let summary = summarize_html("");
        assert_eq!(summary.title, NO_TITLE);
        assert_eq!(summary.description, NO_DESCRIPTION);
        assert_eq!(summary.excerpt, NO_CONTENT);
    }

    #[test]
    fn test_summarize_tolerates_malformed_markup() {
        let html = "<html><head><title>Broken</title><body><p>unclosed <li>item <h2>head</p></div></span>";
        let summary = summarize_html(html);
        assert_eq!(summary.title, "Broken");
        assert!(summary.excerpt.contains("unclosed"));
        assert!(summary.excerpt.contains("head"));
        assert_eq!(summary.description, NO_DESCRIPTION);
    }

    #[test]
    fn test_description_without_content_falls_back() {
        let summary = summarize_html(r#"<meta name="description"><p>x</p>"#);
        assert_eq!(summary.description, NO_DESCRIPTION);

        let summary = summarize_html(r#"<meta name="Description" content="Mixed case">"#);
        assert_eq!(summary.description, "Mixed case");
    }

    #[test]
    fn test_excerpt_preserves_document_order() {
        let html = "<li>one</li><h3>two</h3><p>three</p><h1>four</h1>";
        assert_eq!(summarize_html(html).excerpt, "one two three four");
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("example.com").unwrap().as_str(),
            "https://example.com/"
        );
        assert_eq!(
            normalize_url(" http://example.com/about ").unwrap().as_str(),
            "http://example.com/about"
        );
        assert!(matches!(
            normalize_url(""),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(matches!(
            normalize_url("ftp://example.com"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_normalize_bare_domain_with_scheme_in_query() {
        assert_eq!(
            normalize_url("example.invalid/?next=http://x").unwrap().as_str(),
            "https://example.invalid/?next=http://x"
        );
        assert_eq!(
            normalize_url("www.acme.example/path").unwrap().as_str(),
            "https://www.acme.example/path"
        );
    }

    #[test]
    fn test_normalize_bare_host_with_port() {
        assert_eq!(
            normalize_url("localhost:8080/about").unwrap().as_str(),
            "https://localhost:8080/about"
        );
        assert!(matches!(
            normalize_url("mailto:jo@acme.com"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_is_textual() {
        assert!(is_textual("text/html; charset=utf-8"));
        assert!(is_textual("application/xhtml+xml"));
        assert!(is_textual("text/plain"));
        assert!(!is_textual("application/pdf"));
        assert!(!is_textual("image/png"));
    }

    proptest! {
        #[test]
        fn prop_excerpt_never_exceeds_limit(
            paragraphs in proptest::collection::vec(".{0,400}", 0..40)
        ) {
            let html: String = paragraphs
                .iter()
                .map(|p| format!("<p>{p}</p>"))
                .collect();
            let summary = summarize_html(&html);
            prop_assert!(summary.excerpt.chars().count() <= MAX_EXCERPT_CHARS);
        }
    }

    #[test]
    fn test_large_document_excerpt_is_bounded() {
        let html = "<p>lorem ipsum dolor sit amet</p>".repeat(10_000);
        let summary = summarize_html(&html);
        assert_eq!(summary.excerpt.chars().count(), MAX_EXCERPT_CHARS);
    }

    #[tokio::test]
    async fn test_extract_available() {
        let site = StubSite::serve(
            200,
            "text/html",
            "<title>Stub</title><p>Hello from the stub</p>",
        )
        .await
        .unwrap();

        let context = local_extractor(Duration::from_secs(5))
            .extract(site.url())
            .await;

        let summary = context.summary().expect("context should be available");
        assert_eq!(summary.title, "Stub");
        assert_eq!(summary.excerpt, "Hello from the stub");
    }

    #[tokio::test]
    async fn test_extract_parses_error_page_with_body() {
        let site = StubSite::serve(404, "text/html", "<title>Not Found</title><p>Gone</p>")
            .await
            .unwrap();

        let context = local_extractor(Duration::from_secs(5))
            .extract(site.url())
            .await;

        assert_eq!(context.summary().unwrap().title, "Not Found");
    }

    #[tokio::test]
    async fn test_extract_error_status_without_body_is_unavailable() {
        let site = StubSite::serve(503, "text/html", "").await.unwrap();

        let context = local_extractor(Duration::from_secs(5))
            .extract(site.url())
            .await;

        assert!(matches!(
            context.error(),
            Some(FetchError::Status { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_extract_binary_content_is_unavailable() {
        let site = StubSite::serve(200, "application/octet-stream", vec![0u8, 159, 146, 150])
            .await
            .unwrap();

        let context = local_extractor(Duration::from_secs(5))
            .extract(site.url())
            .await;

        assert!(matches!(
            context.error(),
            Some(FetchError::UnsupportedContent { .. })
        ));
    }

    #[tokio::test]
    async fn test_extract_timeout_is_unavailable() {
        let site = StubSite::silent().await.unwrap();

        let started = std::time::Instant::now();
        let context = local_extractor(Duration::from_millis(300))
            .extract(site.url())
            .await;

        assert!(matches!(context.error(), Some(FetchError::Timeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_extract_redirect_loop_is_unavailable() {
        let site = StubSite::redirect_to_self().await.unwrap();

        let context = local_extractor(Duration::from_secs(5))
            .extract(site.url())
            .await;

        assert!(matches!(context.error(), Some(FetchError::Http { .. })));
    }

    #[tokio::test]
    async fn test_extract_connection_refused_is_unavailable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let context = local_extractor(Duration::from_secs(2))
            .extract(&format!("http://{addr}"))
            .await;

        assert!(!context.is_available());
    }
}
