#![cfg(unix)]

use std::sync::Arc;
use std::time::Duration;

use a11y_batch::{run, CheckError, Checker, CommandChecker, FindingType, RunOptions, Target};

/// A `sh -c` checker; the appended `--reporter json <url>` arrive as `$1..$3`.
fn shell_checker(script: &str) -> CommandChecker {
    CommandChecker::new("sh").with_args(["-c", script, "sh"])
}

#[tokio::test]
async fn test_findings_parsed_from_stdout() {
    let checker = shell_checker(
        r#"cat > /dev/null; printf '[{"type":"error","message":"Missing lang on %s","selector":"html","typeCode":1},{"type":"notice","message":"Check headings"}]' "$3"; exit 2"#,
    );

    let findings = checker
        .check(&Target::from("http://localhost:8090/failing-1"))
        .await
        .unwrap();

    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].kind, FindingType::Error);
    assert_eq!(
        findings[0].message,
        "Missing lang on http://localhost:8090/failing-1"
    );
    assert_eq!(findings[1].kind, FindingType::Notice);
}

#[tokio::test]
async fn test_reporter_flag_is_passed() {
    let checker = shell_checker(
        r#"cat > /dev/null; if [ "$1" = "--reporter" ] && [ "$2" = "json" ]; then printf '[]'; fi"#,
    );
    let findings = checker.check(&Target::from("http://localhost/")).await.unwrap();
    assert!(findings.is_empty());
}

#[tokio::test]
async fn test_target_options_sent_on_stdin() {
    let checker = shell_checker(
        r#"if grep -q WCAG2AAA; then printf '[]'; else printf 'no options'; fi"#,
    );
    let target: Target = serde_json::from_value(serde_json::json!({
        "url": "http://localhost/",
        "standard": "WCAG2AAA"
    }))
    .unwrap();

    assert!(checker.check(&target).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_program_is_unreachable() {
    let checker = CommandChecker::new("a11y-batch-no-such-checker-program");
    let err = checker
        .check(&Target::from("http://notahost:8090/erroring-1"))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Page \"http://notahost:8090/erroring-1\" could not be opened"
    );
}

#[tokio::test]
async fn test_non_json_output_is_unreachable() {
    let checker = shell_checker("cat > /dev/null; echo 'Error: net::ERR_NAME_NOT_RESOLVED' >&2; exit 1");
    let err = checker.check(&Target::from("http://notahost/")).await.unwrap_err();
    assert_eq!(err, CheckError::Unreachable("http://notahost/".to_string()));
}

#[tokio::test]
async fn test_timeout_becomes_failure() {
    let checker = shell_checker("sleep 5").with_timeout(Some(Duration::from_millis(100)));
    let err = checker.check(&Target::from("http://slow/")).await.unwrap_err();
    assert_eq!(
        err,
        CheckError::TimedOut {
            url: "http://slow/".to_string(),
            elapsed_ms: 100
        }
    );
}

#[tokio::test]
async fn test_batch_over_command_checker() {
    let checker = shell_checker(
        r#"cat > /dev/null; case "$3" in
            *failing*) printf '[{"type":"error","message":"Bad"}]' ;;
            *passing*) printf '[{"type":"warning","message":"Hmm"}]' ;;
            *) exit 1 ;;
        esac"#,
    );
    let targets = vec![
        Target::from("http://notahost/erroring"),
        Target::from("http://localhost/failing"),
        Target::from("http://localhost/passing"),
    ];

    let report = run(targets, Arc::new(checker), RunOptions::default())
        .await
        .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.passes, 1);
    assert_eq!(report.results["http://localhost/failing"].len(), 1);
    assert!(report.results["http://notahost/erroring"][0].is_failure());
    assert!(report.results["http://localhost/passing"].is_empty());
}
