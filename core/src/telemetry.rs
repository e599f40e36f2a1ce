use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Prosesslokalt register for pipeline-tellerne.
/// Hver kamp telles én gang, på samme sted som den havner i `SeasonReport`.
pub struct Telemetry {
    registry: Registry,
    matches_rated: IntCounter,
    matches_skipped: IntCounter,
    matches_failed: IntCounterVec,
}

static TELEMETRY: Lazy<Telemetry> = Lazy::new(|| {
    let registry = Registry::new();

    let matches_rated = IntCounter::new("effort_matches_rated_total", "Matches given an effort rating")
        .expect("valid counter opts");
    let matches_skipped = IntCounter::new(
        "effort_matches_skipped_total",
        "Matches skipped because their data directory is missing",
    )
    .expect("valid counter opts");
    let matches_failed = IntCounterVec::new(
        Opts::new("effort_matches_failed_total", "Matches that produced no output"),
        &["stage"],
    )
    .expect("valid counter opts");

    registry
        .register(Box::new(matches_rated.clone()))
        .expect("register matches_rated");
    registry
        .register(Box::new(matches_skipped.clone()))
        .expect("register matches_skipped");
    registry
        .register(Box::new(matches_failed.clone()))
        .expect("register matches_failed");

    Telemetry {
        registry,
        matches_rated,
        matches_skipped,
        matches_failed,
    }
});

/// Hvor en kamp falt ut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Korrupt metrikkfil, eller grensene ble aldri definert.
    Extract,
    /// Ratingen ble beregnet, men output-fila kunne ikke skrives.
    Write,
    /// Substitusjonsanalysen feilet for kampen.
    Substitution,
}

impl FailureStage {
    fn label(self) -> &'static str {
        match self {
            FailureStage::Extract => "extract",
            FailureStage::Write => "write",
            FailureStage::Substitution => "substitution",
        }
    }
}

pub fn record_rated() {
    TELEMETRY.matches_rated.inc();
}

pub fn record_skipped() {
    TELEMETRY.matches_skipped.inc();
}

pub fn record_failed(stage: FailureStage) {
    TELEMETRY
        .matches_failed
        .with_label_values(&[stage.label()])
        .inc();
}

pub fn rated_total() -> u64 {
    TELEMETRY.matches_rated.get()
}

pub fn skipped_total() -> u64 {
    TELEMETRY.matches_skipped.get()
}

pub fn failed_total(stage: FailureStage) -> u64 {
    TELEMETRY
        .matches_failed
        .with_label_values(&[stage.label()])
        .get()
}

/// Tekstformat (Prometheus exposition) for alle tellerne.
pub fn gather_text() -> String {
    let mut buf = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&TELEMETRY.registry.gather(), &mut buf) {
        log::warn!("klarte ikke å serialisere tellere: {e}");
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}
