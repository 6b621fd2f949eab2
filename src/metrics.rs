use lazy_static::lazy_static;
use once_cell::sync::{Lazy, OnceCell};
use prometheus::{core::Collector, IntCounter, Registry};
use tracing::error;

lazy_static! {
    static ref CAPTURE_RUNS_TOTAL: IntCounter = IntCounter::new(
        "snapgrid_capture_runs_total",
        "Capture runs completed with all targets stored"
    )
    .unwrap();
    static ref CAPTURE_FAILURES_TOTAL: IntCounter = IntCounter::new(
        "snapgrid_capture_failures_total",
        "Capture runs aborted by a launch, capture or storage failure"
    )
    .unwrap();
    static ref SESSIONS_LAUNCHED_TOTAL: IntCounter = IntCounter::new(
        "snapgrid_sessions_launched_total",
        "Browser sessions launched"
    )
    .unwrap();
    static ref SESSIONS_CLOSED_TOTAL: IntCounter = IntCounter::new(
        "snapgrid_sessions_closed_total",
        "Browser sessions closed after the idle budget expired"
    )
    .unwrap();
    static ref ARTIFACTS_STORED_TOTAL: IntCounter = IntCounter::new(
        "snapgrid_artifacts_stored_total",
        "Screenshot artifacts written to the object store"
    )
    .unwrap();
}

static GLOBAL_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);
static REGISTER_ONCE: OnceCell<()> = OnceCell::new();

fn register<C>(registry: &Registry, collector: C)
where
    C: Collector + Clone + Send + Sync + 'static,
{
    if let Err(err) = registry.register(Box::new(collector.clone())) {
        if !matches!(err, prometheus::Error::AlreadyReg) {
            error!(?err, "failed to register snapgrid metric");
        }
    }
}

pub fn register_metrics() {
    REGISTER_ONCE.get_or_init(|| {
        let registry = global_registry();
        register(registry, CAPTURE_RUNS_TOTAL.clone());
        register(registry, CAPTURE_FAILURES_TOTAL.clone());
        register(registry, SESSIONS_LAUNCHED_TOTAL.clone());
        register(registry, SESSIONS_CLOSED_TOTAL.clone());
        register(registry, ARTIFACTS_STORED_TOTAL.clone());
    });
}

pub fn global_registry() -> &'static Registry {
    &GLOBAL_REGISTRY
}

pub fn record_capture_run() {
    CAPTURE_RUNS_TOTAL.inc();
}

pub fn record_capture_failure() {
    CAPTURE_FAILURES_TOTAL.inc();
}

pub fn record_session_launched() {
    SESSIONS_LAUNCHED_TOTAL.inc();
}

pub fn record_session_closed() {
    SESSIONS_CLOSED_TOTAL.inc();
}

pub fn record_artifact_stored() {
    ARTIFACTS_STORED_TOTAL.inc();
}
