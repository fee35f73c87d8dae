//! Capability probing: live checks against the execution environment.
//!
//! The only component in the engine that performs real I/O. Every sub-probe
//! runs concurrently under its own timeout, and nothing a probe does can
//! abort the suite: timeouts, provider failures and panics are all recorded
//! as `fail` results with details, then aggregation proceeds.

mod native;
mod provider;

pub use native::NativeProvider;
pub use provider::{CapabilityProvider, ProbeOutcome, UnsupportedProvider};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Pass-rate thresholds for the overall verdict.
const PASS_RATE_OK: f64 = 0.90;
const PASS_RATE_PARTIAL: f64 = 0.70;

/// Supported-capability thresholds for the operating window estimate.
const WINDOW_EXTENDED: f64 = 0.90;
const WINDOW_STANDARD: f64 = 0.70;
const WINDOW_LIMITED: f64 = 0.50;

const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// The capabilities the engine knows how to exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    PersistentStore,
    StructuredDatabase,
    BackgroundWorker,
    ResponseCache,
    DurableQueue,
    PayloadCompression,
    SyncReadiness,
    SemanticCache,
}

impl Capability {
    pub const ALL: [Capability; 8] = [
        Capability::PersistentStore,
        Capability::StructuredDatabase,
        Capability::BackgroundWorker,
        Capability::ResponseCache,
        Capability::DurableQueue,
        Capability::PayloadCompression,
        Capability::SyncReadiness,
        Capability::SemanticCache,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::PersistentStore => "persistent key/value store",
            Self::StructuredDatabase => "structured local database",
            Self::BackgroundWorker => "background worker registration",
            Self::ResponseCache => "response caching layer",
            Self::DurableQueue => "durable write queue",
            Self::PayloadCompression => "payload compression",
            Self::SyncReadiness => "synchronization readiness",
            Self::SemanticCache => "semantic cache",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::PersistentStore => "store and re-read key/value state across restarts",
            Self::StructuredDatabase => "create, populate and query a local database",
            Self::BackgroundWorker => "register a background worker and receive its result",
            Self::ResponseCache => "cache repeated reads with eviction",
            Self::DurableQueue => "queue writes durably and replay them",
            Self::PayloadCompression => "compress and restore a sync payload",
            Self::SyncReadiness => "drain queued writes when connectivity returns",
            Self::SemanticCache => "serve repeated queries from a fingerprint cache",
        }
    }

    fn invoke(self, provider: &dyn CapabilityProvider) -> ProbeOutcome {
        match self {
            Self::PersistentStore => provider.persistent_store(),
            Self::StructuredDatabase => provider.structured_database(),
            Self::BackgroundWorker => provider.background_worker(),
            Self::ResponseCache => provider.response_cache(),
            Self::DurableQueue => provider.durable_queue(),
            Self::PayloadCompression => provider.payload_compression(),
            Self::SyncReadiness => provider.sync_readiness(),
            Self::SemanticCache => provider.semantic_cache(),
        }
    }
}

/// Result status of one capability test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pass,
    Fail,
    Skip,
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// One executed sub-probe. `details` is never empty, `duration_ms` is
/// recorded even on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityTest {
    pub name: String,
    pub description: String,
    pub status: TestStatus,
    pub duration_ms: u64,
    pub details: String,
}

/// Declared support for one capability, independent of test pass/fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilitySupport {
    pub capability: String,
    pub supported: bool,
    pub notes: String,
}

/// Aggregated verdict over the suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Pass,
    Partial,
    Fail,
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Partial => write!(f, "partial"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// How long the platform can be expected to run unattended offline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingWindow {
    Extended,
    Standard,
    Limited,
    Minimal,
}

impl OperatingWindow {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Extended => "multi-week offline operation",
            Self::Standard => "about one week offline",
            Self::Limited => "a few days offline",
            Self::Minimal => "online-only operation recommended",
        }
    }
}

impl std::fmt::Display for OperatingWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Extended => write!(f, "extended"),
            Self::Standard => write!(f, "standard"),
            Self::Limited => write!(f, "limited"),
            Self::Minimal => write!(f, "minimal"),
        }
    }
}

/// Immutable result of one probe run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityReport {
    pub timestamp: DateTime<Utc>,
    pub overall_status: OverallStatus,
    pub tests: Vec<CapabilityTest>,
    pub capabilities: Vec<CapabilitySupport>,
    pub recommendations: Vec<String>,
    pub estimated_operating_window: OperatingWindow,
}

/// Per-run probe settings.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Individual timeout per sub-probe. A probe that exceeds it is
    /// recorded as failed, never left pending.
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

/// Runs the capability suite against an injected provider.
pub struct CapabilityProber {
    provider: Arc<dyn CapabilityProvider>,
    config: ProbeConfig,
}

impl CapabilityProber {
    pub fn new(provider: Arc<dyn CapabilityProvider>) -> Self {
        Self {
            provider,
            config: ProbeConfig::default(),
        }
    }

    pub fn with_config(provider: Arc<dyn CapabilityProvider>, config: ProbeConfig) -> Self {
        Self { provider, config }
    }

    /// Run every sub-probe concurrently and aggregate. Never returns an
    /// error: the worst case is a report full of failed tests.
    pub async fn probe_all(&self) -> CapabilityReport {
        let timeout = self.config.timeout;
        let handles: Vec<_> = Capability::ALL
            .iter()
            .map(|&cap| {
                let provider = Arc::clone(&self.provider);
                tokio::spawn(async move {
                    let start = Instant::now();
                    let outcome = tokio::time::timeout(
                        timeout,
                        tokio::task::spawn_blocking(move || cap.invoke(provider.as_ref())),
                    )
                    .await;
                    let duration_ms = start.elapsed().as_millis() as u64;
                    (outcome, duration_ms)
                })
            })
            .collect();

        let mut tests = Vec::with_capacity(Capability::ALL.len());
        let mut capabilities = Vec::with_capacity(Capability::ALL.len());
        for (cap, handle) in Capability::ALL.iter().zip(handles) {
            let (test, support) = match handle.await {
                Ok((outcome, duration_ms)) => record_probe(*cap, outcome, duration_ms, timeout),
                // The outer task only awaits; if it is torn down anyway,
                // record the probe as failed rather than dropping it.
                Err(e) => record_probe(
                    *cap,
                    Ok(Err(e)),
                    timeout.as_millis() as u64,
                    timeout,
                ),
            };
            if test.status != TestStatus::Pass {
                warn!(probe = %test.name, status = %test.status, details = %test.details, "capability probe did not pass");
            } else {
                debug!(probe = %test.name, duration_ms = test.duration_ms, "capability probe passed");
            }
            tests.push(test);
            capabilities.push(support);
        }

        build_report(tests, capabilities)
    }
}

type ProbeRunResult = Result<Result<ProbeOutcome, tokio::task::JoinError>, tokio::time::error::Elapsed>;

fn record_probe(
    cap: Capability,
    outcome: ProbeRunResult,
    duration_ms: u64,
    timeout: Duration,
) -> (CapabilityTest, CapabilitySupport) {
    let (status, details, supported, notes) = match outcome {
        Ok(Ok(ProbeOutcome::Pass { detail })) => {
            (TestStatus::Pass, detail, true, "verified by live probe".to_string())
        }
        Ok(Ok(ProbeOutcome::Fail { detail })) => (
            TestStatus::Fail,
            detail.clone(),
            false,
            format!("probe failed: {detail}"),
        ),
        Ok(Ok(ProbeOutcome::Unsupported { detail })) => (
            TestStatus::Skip,
            detail.clone(),
            false,
            format!("not available: {detail}"),
        ),
        Ok(Err(join_err)) => (
            TestStatus::Fail,
            format!("probe aborted: {join_err}"),
            false,
            "probe aborted before completion".to_string(),
        ),
        Err(_) => (
            TestStatus::Fail,
            format!("timed out after {} ms", timeout.as_millis()),
            false,
            "probe exceeded its timeout".to_string(),
        ),
    };

    (
        CapabilityTest {
            name: cap.name().to_string(),
            description: cap.description().to_string(),
            status,
            duration_ms,
            details,
        },
        CapabilitySupport {
            capability: cap.name().to_string(),
            supported,
            notes,
        },
    )
}

/// Pure aggregation over executed tests; separated so unit tests can drive
/// it without the async runner.
pub fn build_report(
    tests: Vec<CapabilityTest>,
    capabilities: Vec<CapabilitySupport>,
) -> CapabilityReport {
    let total = tests.len();
    let skipped = tests.iter().filter(|t| t.status == TestStatus::Skip).count();
    let passed = tests.iter().filter(|t| t.status == TestStatus::Pass).count();

    let pass_rate = if total > skipped {
        passed as f64 / (total - skipped) as f64
    } else {
        0.0
    };
    let overall_status = if pass_rate >= PASS_RATE_OK {
        OverallStatus::Pass
    } else if pass_rate >= PASS_RATE_PARTIAL {
        OverallStatus::Partial
    } else {
        OverallStatus::Fail
    };

    let supported_ratio = if capabilities.is_empty() {
        0.0
    } else {
        capabilities.iter().filter(|c| c.supported).count() as f64 / capabilities.len() as f64
    };
    let estimated_operating_window = if supported_ratio >= WINDOW_EXTENDED {
        OperatingWindow::Extended
    } else if supported_ratio >= WINDOW_STANDARD {
        OperatingWindow::Standard
    } else if supported_ratio >= WINDOW_LIMITED {
        OperatingWindow::Limited
    } else {
        OperatingWindow::Minimal
    };

    let mut recommendations = Vec::new();
    for test in tests.iter().filter(|t| t.status == TestStatus::Fail) {
        recommendations.push(format!("Investigate {}: {}", test.name, test.details));
    }
    for cap in capabilities
        .iter()
        .filter(|c| !c.supported && !c.notes.starts_with("probe failed"))
    {
        recommendations.push(format!("Provision {} ({})", cap.capability, cap.notes));
    }
    if recommendations.is_empty() {
        recommendations.push(
            "All capability checks passed; platform is ready for offline-first operation"
                .to_string(),
        );
        recommendations
            .push("Schedule a supervised 7-day trial voyage before extended deployment".to_string());
    }

    CapabilityReport {
        timestamp: Utc::now(),
        overall_status,
        tests,
        capabilities,
        recommendations,
        estimated_operating_window,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test(name: &str, status: TestStatus) -> CapabilityTest {
        CapabilityTest {
            name: name.to_string(),
            description: "test".to_string(),
            status,
            duration_ms: 1,
            details: "detail".to_string(),
        }
    }

    fn make_support(name: &str, supported: bool) -> CapabilitySupport {
        CapabilitySupport {
            capability: name.to_string(),
            supported,
            notes: "notes".to_string(),
        }
    }

    #[test]
    fn test_pass_rate_excludes_skipped() {
        // 9 passes, 1 skip: rate 9/9 -> pass.
        let mut tests: Vec<_> = (0..9)
            .map(|i| make_test(&format!("t{i}"), TestStatus::Pass))
            .collect();
        tests.push(make_test("skipped", TestStatus::Skip));
        let caps = vec![make_support("c", true)];
        let report = build_report(tests, caps);
        assert_eq!(report.overall_status, OverallStatus::Pass);
    }

    #[test]
    fn test_overall_pass_implies_rate_bound() {
        let cases = [
            (10, 0, 0),
            (9, 1, 0),
            (7, 3, 0),
            (7, 0, 3),
            (0, 0, 8),
        ];
        for (pass, fail, skip) in cases {
            let mut tests = Vec::new();
            for i in 0..pass {
                tests.push(make_test(&format!("p{i}"), TestStatus::Pass));
            }
            for i in 0..fail {
                tests.push(make_test(&format!("f{i}"), TestStatus::Fail));
            }
            for i in 0..skip {
                tests.push(make_test(&format!("s{i}"), TestStatus::Skip));
            }
            let total = tests.len();
            let report = build_report(tests, vec![make_support("c", true)]);
            if report.overall_status == OverallStatus::Pass {
                let counted = total - skip;
                assert!(counted > 0);
                assert!(pass as f64 / counted as f64 >= 0.90);
            }
        }
    }

    #[test]
    fn test_all_skipped_is_fail_with_minimal_window() {
        let tests = vec![make_test("a", TestStatus::Skip), make_test("b", TestStatus::Skip)];
        let caps = vec![make_support("a", false), make_support("b", false)];
        let report = build_report(tests, caps);
        assert_eq!(report.overall_status, OverallStatus::Fail);
        assert_eq!(report.estimated_operating_window, OperatingWindow::Minimal);
    }

    #[test]
    fn test_window_tiers_from_supported_fraction() {
        let window_for = |supported: usize, total: usize| {
            let caps: Vec<_> = (0..total).map(|i| make_support(&format!("c{i}"), i < supported)).collect();
            build_report(vec![make_test("t", TestStatus::Pass)], caps).estimated_operating_window
        };
        assert_eq!(window_for(10, 10), OperatingWindow::Extended);
        assert_eq!(window_for(8, 10), OperatingWindow::Standard);
        assert_eq!(window_for(5, 10), OperatingWindow::Limited);
        assert_eq!(window_for(2, 10), OperatingWindow::Minimal);
    }

    #[test]
    fn test_recommendations_never_empty() {
        let report = build_report(
            vec![make_test("t", TestStatus::Pass)],
            vec![make_support("c", true)],
        );
        assert!(!report.recommendations.is_empty());
        assert!(report.recommendations[0].contains("ready"));

        let report = build_report(
            vec![make_test("t", TestStatus::Fail)],
            vec![make_support("c", true)],
        );
        assert!(report.recommendations[0].starts_with("Investigate"));
    }

    #[tokio::test]
    async fn test_panicking_probe_is_isolated() {
        struct PanickyProvider;
        impl CapabilityProvider for PanickyProvider {
            fn structured_database(&self) -> ProbeOutcome {
                panic!("internal database error");
            }
            fn persistent_store(&self) -> ProbeOutcome {
                ProbeOutcome::pass("store ok")
            }
        }

        let prober = CapabilityProber::new(Arc::new(PanickyProvider));
        let report = prober.probe_all().await;

        assert_eq!(report.tests.len(), Capability::ALL.len());
        let db = report
            .tests
            .iter()
            .find(|t| t.name == "structured local database")
            .unwrap();
        assert_eq!(db.status, TestStatus::Fail);
        assert!(!db.details.is_empty());

        let store = report
            .tests
            .iter()
            .find(|t| t.name == "persistent key/value store")
            .unwrap();
        assert_eq!(store.status, TestStatus::Pass);
    }

    #[tokio::test]
    async fn test_slow_probe_times_out() {
        struct SlowProvider;
        impl CapabilityProvider for SlowProvider {
            fn response_cache(&self) -> ProbeOutcome {
                std::thread::sleep(Duration::from_millis(500));
                ProbeOutcome::pass("too late")
            }
        }

        let prober = CapabilityProber::with_config(
            Arc::new(SlowProvider),
            ProbeConfig {
                timeout: Duration::from_millis(50),
            },
        );
        let report = prober.probe_all().await;
        let cache = report
            .tests
            .iter()
            .find(|t| t.name == "response caching layer")
            .unwrap();
        assert_eq!(cache.status, TestStatus::Fail);
        assert!(cache.details.contains("timed out"));
    }

    #[tokio::test]
    async fn test_unsupported_provider_all_skip() {
        let prober = CapabilityProber::new(Arc::new(UnsupportedProvider));
        let report = prober.probe_all().await;
        assert!(report.tests.iter().all(|t| t.status == TestStatus::Skip));
        assert_eq!(report.overall_status, OverallStatus::Fail);
        assert!(report.capabilities.iter().all(|c| !c.supported));
    }
}
