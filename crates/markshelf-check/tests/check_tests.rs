use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use markshelf_check::{
    CheckConfig, CheckError, HttpProbe, LinkChecker, LinkStatus, ProbeFailure, ProbeMethod, ReqwestProbe,
    check_link,
};
use markshelf_core::{Bookmark, FlatBookmark, Folder, flatten};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Script = HashMap<(String, ProbeMethod), Result<u16, ProbeFailure>>;

/// In-memory probe answering from a fixed script; unknown URLs answer 200.
#[derive(Default)]
struct ScriptedProbe {
    script: Script,
    calls: Mutex<Vec<(String, ProbeMethod)>>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedProbe {
    fn answer(mut self, url: &str, method: ProbeMethod, result: Result<u16, ProbeFailure>) -> Self {
        self.script.insert((url.to_string(), method), result);
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl HttpProbe for ScriptedProbe {
    async fn probe(
        &self,
        url: &str,
        method: ProbeMethod,
        _timeout: Duration,
    ) -> Result<u16, ProbeFailure> {
        if url.contains("panic") {
            panic!("probe exploded");
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.calls.lock().unwrap().push((url.to_string(), method));
        self.script
            .get(&(url.to_string(), method))
            .cloned()
            .unwrap_or(Ok(200))
    }
}

fn flat(urls: &[&str]) -> Vec<FlatBookmark> {
    let mut root = Folder::root();
    for (i, url) in urls.iter().enumerate() {
        root.push(Bookmark::new(format!("bookmark {i}"), *url));
    }
    flatten(&root)
}

fn config(concurrency: usize) -> CheckConfig {
    CheckConfig::builder()
        .concurrency(concurrency)
        .build()
        .unwrap()
}

fn statuses(broken: &[markshelf_check::BrokenLink]) -> HashMap<String, String> {
    broken
        .iter()
        .map(|b| (b.url().to_string(), b.status.to_string()))
        .collect()
}

#[tokio::test]
async fn test_classifies_each_outcome() {
    let probe = ScriptedProbe::default()
        .answer("https://gone.example/", ProbeMethod::Head, Ok(404))
        .answer("https://gone.example/", ProbeMethod::Get, Ok(404))
        .answer("https://slow.example/", ProbeMethod::Head, Err(ProbeFailure::Timeout))
        .answer("https://down.example/", ProbeMethod::Head, Err(ProbeFailure::Connection))
        .answer("https://loop.example/", ProbeMethod::Head, Err(ProbeFailure::TooManyRedirects))
        .answer("https://tls.example/", ProbeMethod::Head, Err(ProbeFailure::Other("tls handshake".into())))
        .answer("https://server.example/", ProbeMethod::Head, Ok(503));

    let checker = LinkChecker::with_probe(probe, config(4)).unwrap();
    let bookmarks = flat(&[
        "https://ok.example/",
        "https://gone.example/",
        "https://slow.example/",
        "https://down.example/",
        "https://loop.example/",
        "https://tls.example/",
        "https://server.example/",
    ]);

    let broken = checker.check_all(&bookmarks).await;
    let statuses = statuses(&broken);

    assert_eq!(broken.len(), 6);
    assert!(!statuses.contains_key("https://ok.example/"));
    assert_eq!(statuses["https://gone.example/"], "HTTP 404");
    assert_eq!(statuses["https://slow.example/"], "Timeout");
    assert_eq!(statuses["https://down.example/"], "Connection Error");
    assert_eq!(statuses["https://loop.example/"], "Too Many Redirects");
    assert_eq!(statuses["https://tls.example/"], "tls handshake");
    assert_eq!(statuses["https://server.example/"], "HTTP 503");
}

#[tokio::test]
async fn test_head_rejection_falls_back_to_get() {
    for code in [403, 404, 405] {
        let probe = ScriptedProbe::default()
            .answer("https://nohead.example/", ProbeMethod::Head, Ok(code))
            .answer("https://nohead.example/", ProbeMethod::Get, Ok(200));

        let status = check_link(&probe, "https://nohead.example/", Duration::from_secs(1)).await;
        assert_eq!(status, LinkStatus::Http(200));
        assert_eq!(probe.calls.lock().unwrap().len(), 2);
    }
}

#[tokio::test]
async fn test_other_client_errors_do_not_retry() {
    let probe = ScriptedProbe::default().answer("https://x.example/", ProbeMethod::Head, Ok(410));

    let status = check_link(&probe, "https://x.example/", Duration::from_secs(1)).await;
    assert_eq!(status, LinkStatus::Http(410));
    assert_eq!(probe.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_and_pseudo_urls_are_not_probed() {
    let checker = LinkChecker::with_probe(ScriptedProbe::default(), config(2)).unwrap();
    let bookmarks = flat(&[
        "javascript:void(0)",
        "about:blank",
        "ftp://files.example/x",
        "not a url",
        "",
        "https://ok.example/",
    ]);

    let broken = checker.check_all(&bookmarks).await;
    assert!(broken.is_empty());
}

#[tokio::test]
async fn test_fragment_and_space_urls_are_probed() {
    let probe = ScriptedProbe::default()
        .answer("https://github.com#readme", ProbeMethod::Head, Ok(410))
        .answer("https://example.com/My Page.html", ProbeMethod::Head, Ok(410));
    let checker = LinkChecker::with_probe(probe, config(2)).unwrap();

    let broken = checker
        .check_all(&flat(&[
            "https://github.com#readme",
            "https://example.com/My Page.html",
            "https://example.com/search?q=rust lang",
        ]))
        .await;
    let statuses = statuses(&broken);

    assert_eq!(broken.len(), 2);
    assert_eq!(statuses["https://github.com#readme"], "HTTP 410");
    assert_eq!(statuses["https://example.com/My Page.html"], "HTTP 410");
}

#[test]
fn test_zero_concurrency_or_timeout_is_rejected() {
    let zero_concurrency = CheckConfig {
        concurrency: 0,
        ..CheckConfig::default()
    };
    let err = LinkChecker::with_probe(ScriptedProbe::default(), zero_concurrency)
        .err()
        .unwrap();
    assert!(matches!(err, CheckError::InvalidConfig { .. }));

    let zero_timeout = CheckConfig {
        timeout_secs: 0,
        ..CheckConfig::default()
    };
    assert!(matches!(
        LinkChecker::with_probe(ScriptedProbe::default(), zero_timeout),
        Err(CheckError::InvalidConfig { .. })
    ));
}

#[tokio::test]
async fn test_exclude_patterns_skip_probe() {
    let probe = ScriptedProbe::default()
        .answer("https://intranet.corp/wiki", ProbeMethod::Head, Ok(500));
    let config = CheckConfig::builder()
        .exclude_patterns(vec!["https://intranet.corp/*".to_string()])
        .build()
        .unwrap();

    let checker = LinkChecker::with_probe(probe, config).unwrap();
    assert!(checker.check_all(&flat(&["https://intranet.corp/wiki"])).await.is_empty());
}

#[tokio::test]
async fn test_panicking_probe_does_not_abort_batch() {
    let probe = ScriptedProbe::default()
        .answer("https://gone.example/", ProbeMethod::Head, Ok(410));
    let checker = LinkChecker::with_probe(probe, config(2)).unwrap();

    let broken = checker
        .check_all(&flat(&[
            "https://panic.example/",
            "https://gone.example/",
            "https://ok.example/",
        ]))
        .await;
    let statuses = statuses(&broken);

    assert_eq!(broken.len(), 2);
    assert_eq!(statuses["https://panic.example/"], "Error: probe exploded");
    assert_eq!(statuses["https://gone.example/"], "HTTP 410");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_is_bounded() {
    let probe = ScriptedProbe::default().with_delay(Duration::from_millis(20));
    let checker = LinkChecker::with_probe(probe, config(3)).unwrap();

    let urls: Vec<String> = (0..24).map(|i| format!("https://site{i}.example/")).collect();
    let refs: Vec<&str> = urls.iter().map(String::as_str).collect();
    let mut progress = checker.subscribe();

    let broken = checker.check_all(&flat(&refs)).await;
    assert!(broken.is_empty());

    let probe = checker_probe_stats(&checker);
    assert!(probe.0 <= 3, "max in flight was {}", probe.0);
    assert_eq!(probe.1, 24);

    let mut last = None;
    while let Ok(update) = progress.try_recv() {
        last = Some(update);
    }
    let last = last.unwrap();
    assert_eq!(last.checked, 24);
    assert_eq!(last.total, 24);
    assert!(last.is_complete());
}

#[tokio::test]
async fn test_cancelled_run_reports_nothing_pending() {
    let probe = ScriptedProbe::default()
        .answer("https://gone.example/", ProbeMethod::Head, Ok(500))
        .with_delay(Duration::from_secs(30));
    let checker = LinkChecker::with_probe(probe, config(1)).unwrap();

    let token = checker.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let broken = checker.check_all(&flat(&["https://gone.example/"])).await;
    assert!(broken.is_empty());
}

#[tokio::test]
async fn test_deadline_stops_run() {
    let probe = ScriptedProbe::default()
        .answer("https://gone.example/", ProbeMethod::Head, Ok(500))
        .with_delay(Duration::from_secs(30));
    let config = CheckConfig::builder().deadline_secs(1u64).build().unwrap();
    let checker = LinkChecker::with_probe(probe, config).unwrap();

    let started = std::time::Instant::now();
    let broken = checker.check_all(&flat(&["https://gone.example/"])).await;

    assert!(broken.is_empty());
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_find_broken_links_reports_folder_path() {
    let tree = Folder::root().with_child(
        Folder::new("Work").with_child(Bookmark::new("Old wiki", "https://wiki.example/")),
    );
    let probe = ScriptedProbe::default()
        .answer("https://wiki.example/", ProbeMethod::Head, Ok(404))
        .answer("https://wiki.example/", ProbeMethod::Get, Ok(404));
    let checker = LinkChecker::with_probe(probe, config(2)).unwrap();

    let broken = checker.find_broken_links(&tree).await;
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].bookmark.folder_path, vec!["Bookmarks", "Work"]);
    assert_eq!(broken[0].bookmark.title(), "Old wiki");
}

fn checker_probe_stats(checker: &LinkChecker<ScriptedProbe>) -> (usize, usize) {
    let probe = checker.probe();
    (
        probe.max_in_flight.load(Ordering::SeqCst),
        probe.calls.lock().unwrap().len(),
    )
}

// reqwest-backed probe against a local mock server

fn reqwest_probe(timeout_secs: u64) -> (ReqwestProbe, Duration) {
    let config = CheckConfig::builder()
        .timeout_secs(timeout_secs)
        .build()
        .unwrap();
    (ReqwestProbe::new(&config).unwrap(), config.timeout())
}

#[tokio::test]
async fn test_reqwest_head_405_then_get() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .expect(1)
        .mount(&server)
        .await;

    let (probe, timeout) = reqwest_probe(5);
    let status = check_link(&probe, &format!("{}/page", server.uri()), timeout).await;
    assert_eq!(status, LinkStatus::Http(200));
}

#[tokio::test]
async fn test_reqwest_not_found() {
    let server = MockServer::start().await;
    Mock::given(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (probe, timeout) = reqwest_probe(5);
    let status = check_link(&probe, &format!("{}/missing", server.uri()), timeout).await;
    assert_eq!(status, LinkStatus::Http(404));
    assert!(status.is_broken());
}

#[tokio::test]
async fn test_reqwest_follows_redirects() {
    let server = MockServer::start().await;
    Mock::given(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("Location", format!("{}/new", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(path("/new"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let (probe, timeout) = reqwest_probe(5);
    let status = check_link(&probe, &format!("{}/old", server.uri()), timeout).await;
    assert_eq!(status, LinkStatus::Http(200));
}

#[tokio::test]
async fn test_reqwest_timeout() {
    let server = MockServer::start().await;
    Mock::given(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let (probe, timeout) = reqwest_probe(1);
    let status = check_link(&probe, &format!("{}/slow", server.uri()), timeout).await;
    assert_eq!(status, LinkStatus::Timeout);
}

#[tokio::test]
async fn test_reqwest_connection_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let (probe, timeout) = reqwest_probe(2);
    let status = check_link(&probe, &format!("http://127.0.0.1:{port}/"), timeout).await;
    assert_eq!(status, LinkStatus::ConnectionError);
}

#[tokio::test]
async fn test_checker_end_to_end_over_http() {
    let server = MockServer::start().await;
    Mock::given(path("/alive"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(path("/dead"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let alive = format!("{}/alive", server.uri());
    let dead = format!("{}/dead", server.uri());
    let checker = LinkChecker::new(config(2)).unwrap();

    let broken = checker.check_all(&flat(&[&alive, &dead])).await;
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].url(), dead);
    assert_eq!(broken[0].status.to_string(), "HTTP 410");
}
