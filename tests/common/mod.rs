#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use a11y_batch::{CheckError, Checker, Finding, FindingType, Target};

pub const UNREACHABLE_URL: &str = "http://notahost:8090/erroring-1";
pub const FAILING_URL: &str = "http://localhost:8090/failing-1";
pub const PASSING_URL: &str = "http://localhost:8090/passing-1";

/// Checker with canned results per URL that also tracks how many checks
/// are in flight at once.
#[derive(Default)]
pub struct ScriptedChecker {
    outcomes: HashMap<String, Result<Vec<Finding>, CheckError>>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
    started: Mutex<Vec<String>>,
}

impl ScriptedChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcome(
        mut self,
        url: &str,
        outcome: Result<Vec<Finding>, CheckError>,
    ) -> Self {
        self.outcomes.insert(url.to_string(), outcome);
        self
    }

    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }
}

impl Checker for ScriptedChecker {
    async fn check(&self, target: &Target) -> Result<Vec<Finding>, CheckError> {
        let url = target.url().to_string();
        self.started.lock().unwrap().push(url.clone());
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.get(&url).copied().unwrap_or(self.default_delay);
        tokio::time::sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.outcomes.get(&url).cloned().unwrap_or(Ok(vec![]))
    }
}

pub fn lang_finding() -> Finding {
    Finding {
        code: Some("WCAG2AA.Principle3.Guideline3_1.3_1_1.H57.2".to_string()),
        context: Some("<html><head>\n\t<meta charset=\"utf-8\">\n...</html>".to_string()),
        message: "The html element should have a lang or xml:lang attribute which describes the language of the document.".to_string(),
        selector: Some("html".to_string()),
        kind: FindingType::Error,
        type_code: Some(1),
        extra: Default::default(),
    }
}

pub fn notice(message: &str) -> Finding {
    let mut finding = Finding::new(FindingType::Notice, message);
    finding.type_code = Some(3);
    finding
}

/// The three-URL scenario: one unreachable, one with a single error, one clean.
pub fn mixed_checker() -> ScriptedChecker {
    ScriptedChecker::new()
        .with_outcome(
            UNREACHABLE_URL,
            Err(CheckError::Unreachable(UNREACHABLE_URL.to_string())),
        )
        .with_outcome(FAILING_URL, Ok(vec![lang_finding(), notice("Check contrast")]))
        .with_outcome(PASSING_URL, Ok(vec![notice("Check headings")]))
}

pub fn mixed_targets() -> Vec<Target> {
    vec![
        Target::from(UNREACHABLE_URL),
        Target::from(FAILING_URL),
        Target::from(PASSING_URL),
    ]
}

pub fn urls(count: usize) -> Vec<Target> {
    (0..count)
        .map(|i| Target::from(format!("http://localhost:8090/page-{}", i)))
        .collect()
}
