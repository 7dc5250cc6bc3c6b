use std::time::Duration;

use pretty_assertions::assert_eq;
use wikisim::{ContentFetcher, ExcerptStatus, FetcherConfig, UNAVAILABLE_MARKER};
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADA_PAGE: &str = r#"
<html>
  <body>
    <div id="mw-content-text">
      <p class="mw-empty-elt">
      </p>
      <p><b>Augusta Ada King, Countess of Lovelace</b> was an English
         mathematician and writer.</p>
      <p>She was the only legitimate child of Lord Byron.</p>
    </div>
  </body>
</html>
"#;

fn fetcher_for(server: &MockServer) -> ContentFetcher {
    ContentFetcher::new(FetcherConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
        ..FetcherConfig::default()
    })
    .expect("fetcher")
}

#[tokio::test]
async fn extracts_first_non_empty_paragraph() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/Ada_Lovelace"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ADA_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let excerpt = fetcher_for(&server).fetch("Ada Lovelace").await;

    assert_eq!(excerpt.status, ExcerptStatus::Found);
    assert_eq!(
        excerpt.text,
        "Augusta Ada King, Countess of Lovelace was an English mathematician and writer."
    );
    assert_eq!(excerpt.source_url, format!("{}/wiki/Ada_Lovelace", server.uri()));
}

#[tokio::test]
async fn not_found_page_yields_unavailable_marker() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/Missing_Article"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<p>Not here</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let excerpt = fetcher_for(&server).fetch("Missing Article").await;

    assert_eq!(excerpt.status, ExcerptStatus::Unavailable);
    assert_eq!(excerpt.text, UNAVAILABLE_MARKER);
    assert_eq!(
        excerpt.source_url,
        format!("{}/wiki/Missing_Article", server.uri())
    );
}

#[tokio::test]
async fn server_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/Flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let excerpt = fetcher_for(&server).fetch("Flaky").await;
    assert_eq!(excerpt.status, ExcerptStatus::Unavailable);
}

#[tokio::test]
async fn page_without_paragraphs_yields_empty_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/Stub"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><div>Only a div</div><p> </p></body></html>"),
        )
        .mount(&server)
        .await;

    let excerpt = fetcher_for(&server).fetch("Stub").await;
    assert_eq!(excerpt.status, ExcerptStatus::Empty);
    assert_eq!(excerpt.text, "");
}

#[tokio::test]
async fn repeated_fetches_hit_the_network_each_time() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/Ada_Lovelace"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ADA_PAGE))
        .expect(2)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let first = fetcher.fetch("Ada Lovelace").await;
    let second = fetcher.fetch("Ada Lovelace").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn unreachable_host_yields_unavailable_marker() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    drop(server);

    let fetcher = ContentFetcher::new(FetcherConfig {
        base_url: base_url.clone(),
        timeout: Duration::from_secs(2),
        ..FetcherConfig::default()
    })
    .expect("fetcher");
    let excerpt = fetcher.fetch("Ada Lovelace").await;

    assert_eq!(excerpt.status, ExcerptStatus::Unavailable);
    assert_eq!(excerpt.text, UNAVAILABLE_MARKER);
    assert_eq!(excerpt.source_url, format!("{base_url}/wiki/Ada_Lovelace"));
}
