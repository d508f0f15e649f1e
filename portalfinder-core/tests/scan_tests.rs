// Tests for scan execution

use portalfinder_core::scan::{ScanOptions, execute_scan, format_verdict_line};
use portalfinder_core::sink::{AppendWriter, OutputFormat, persist_report};
use portalfinder_scanner::{
    CancellationToken, ClassificationVerdict, DetectionMethod, ProbeConfig,
};
use std::fs;
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn options(candidates: Vec<String>) -> ScanOptions {
    ScanOptions {
        candidates,
        probe: ProbeConfig::extended(),
        concurrency: 4,
        verbose: false,
        show_progress: false,
    }
}

fn verdict(candidate: &str, matched: bool) -> ClassificationVerdict {
    ClassificationVerdict {
        candidate: candidate.to_string(),
        matched,
        method: if matched {
            DetectionMethod::KeywordWithForm
        } else {
            DetectionMethod::None
        },
        matched_keyword: matched.then(|| "sign in".to_string()),
        redirect_target: None,
        matched_path: matched.then(|| "login".to_string()),
    }
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[tokio::test]
async fn test_login_page_with_form_is_detected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<form action="/x"><p>Sign in</p></form>"#),
        )
        .mount(&server)
        .await;

    let report = execute_scan(
        options(vec![server.uri()]),
        None,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.matched.len(), 1);
    let verdict = &report.matched[0];
    assert_eq!(verdict.candidate, server.uri());
    assert_eq!(verdict.method, DetectionMethod::KeywordWithForm);
    assert_eq!(verdict.matched_keyword.as_deref(), Some("sign in"));
}

#[tokio::test]
async fn test_not_found_host_is_excluded() {
    let server = MockServer::start().await;

    let report = execute_scan(
        options(vec![server.uri()]),
        None,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(report.matched.is_empty());
    assert_eq!(report.completed, 1);
    assert_eq!(report.progress.events, 1);
    assert_eq!(report.progress.last.map(|e| e.completed), Some(1));
    assert_eq!(report.progress.last.map(|e| e.total), Some(1));
}

#[tokio::test]
async fn test_redirecting_signup_reports_target() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/signup"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "/welcome")
                .set_body_string(r#"<form method="post">Sign up</form>"#),
        )
        .mount(&server)
        .await;

    let report = execute_scan(
        options(vec![server.uri()]),
        None,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.matched.len(), 1);
    assert_eq!(report.matched[0].redirect_target.as_deref(), Some("/welcome"));
}

#[tokio::test]
async fn test_mixed_candidates_progress_reaches_total() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/portal/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<form>Log in</form>"))
        .mount(&server)
        .await;

    let candidates = vec![
        format!("{}/portal", server.uri()),
        format!("{}/blog", server.uri()),
        "http://127.0.0.1:1".to_string(),
    ];

    let report = execute_scan(
        options(candidates.clone()),
        None,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.completed, 3);
    assert!(!report.cancelled);
    assert_eq!(report.matched_candidates(), vec![candidates[0].clone()]);
    assert_eq!(report.progress.events, 3);
    assert_eq!(report.progress.last.map(|e| e.completed), Some(3));
}

#[tokio::test]
async fn test_append_writer_receives_matches_during_scan() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<form>Register</form>"))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("valid.txt");
    let writer = AppendWriter::open(&out).await.unwrap();

    let report = execute_scan(
        options(vec![server.uri()]),
        Some(writer),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.appended, Some(1));
    assert_eq!(fs::read_to_string(&out).unwrap(), format!("{}\n", server.uri()));
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = execute_scan(
        options(vec!["http://127.0.0.1:1".to_string()]),
        None,
        cancel,
    )
    .await
    .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.completed, 0);
    assert_eq!(report.progress.events, 0);
}

#[tokio::test]
async fn test_invalid_probe_config_fails_fast() {
    let mut opts = options(vec!["http://127.0.0.1:1".to_string()]);
    opts.probe = ProbeConfig::extended().with_form_pattern("<form[");

    let result = execute_scan(opts, None, CancellationToken::new()).await;
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Failed to prepare scan"));
}

// ============================================================================
// Report persistence
// ============================================================================

#[tokio::test]
async fn test_persist_report_text_and_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<form>Sign in</form>"))
        .mount(&server)
        .await;

    let report = execute_scan(
        options(vec![server.uri()]),
        None,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let temp_dir = TempDir::new().unwrap();

    let text_path = temp_dir.path().join("valid.txt");
    persist_report(&text_path, OutputFormat::Text, &report).unwrap();
    assert_eq!(
        fs::read_to_string(&text_path).unwrap(),
        format!("{}\n", server.uri())
    );

    let json_path = temp_dir.path().join("report.json");
    persist_report(&json_path, OutputFormat::Json, &report).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["total"], 1);
    assert_eq!(json["completed"], 1);
    assert_eq!(json["cancelled"], false);
    assert_eq!(json["matched"][0]["method"], "keyword_with_form");
    assert_eq!(json["matched"][0]["matched_keyword"], "sign in");
    assert!(json["matched"][0].get("redirect_target").is_none());
}

// ============================================================================
// Verdict lines
// ============================================================================

#[test]
fn test_format_positive_line() {
    colored::control::set_override(false);

    let mut v = verdict("https://a.test", true);
    let line = format_verdict_line(&v, false).unwrap();
    assert_eq!(
        line,
        "[v] Account portal found: https://a.test [Detected via: Keywords in body with form, Keyword: sign in]"
    );

    v.redirect_target = Some("/welcome".to_string());
    let line = format_verdict_line(&v, false).unwrap();
    assert!(line.contains("https://a.test -> redirect to: /welcome"));
}

#[test]
fn test_format_negative_line_only_when_verbose() {
    colored::control::set_override(false);

    let v = verdict("https://b.test", false);
    assert_eq!(format_verdict_line(&v, false), None);
    assert_eq!(
        format_verdict_line(&v, true).as_deref(),
        Some("[x] No account portal found: https://b.test")
    );
}
