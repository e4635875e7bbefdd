//! 日志初始化、进程级计数指标与 cycle_id 生成。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 计数指标快照。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub cycles_started: u64,
    pub cycles_completed: u64,
    pub fetch_success: u64,
    pub fetch_failure: u64,
    pub up_to_date: u64,
    pub transform_failure: u64,
    pub submit_success: u64,
    pub submit_failure: u64,
    pub state_failure: u64,
    pub cycle_latency_ms_total: u64,
    pub cycle_latency_ms_count: u64,
}

/// 进程级计数指标。
pub struct TelemetryMetrics {
    cycles_started: AtomicU64,
    cycles_completed: AtomicU64,
    fetch_success: AtomicU64,
    fetch_failure: AtomicU64,
    up_to_date: AtomicU64,
    transform_failure: AtomicU64,
    submit_success: AtomicU64,
    submit_failure: AtomicU64,
    state_failure: AtomicU64,
    cycle_latency_ms_total: AtomicU64,
    cycle_latency_ms_count: AtomicU64,
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            cycles_started: AtomicU64::new(0),
            cycles_completed: AtomicU64::new(0),
            fetch_success: AtomicU64::new(0),
            fetch_failure: AtomicU64::new(0),
            up_to_date: AtomicU64::new(0),
            transform_failure: AtomicU64::new(0),
            submit_success: AtomicU64::new(0),
            submit_failure: AtomicU64::new(0),
            state_failure: AtomicU64::new(0),
            cycle_latency_ms_total: AtomicU64::new(0),
            cycle_latency_ms_count: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles_started: self.cycles_started.load(Ordering::Relaxed),
            cycles_completed: self.cycles_completed.load(Ordering::Relaxed),
            fetch_success: self.fetch_success.load(Ordering::Relaxed),
            fetch_failure: self.fetch_failure.load(Ordering::Relaxed),
            up_to_date: self.up_to_date.load(Ordering::Relaxed),
            transform_failure: self.transform_failure.load(Ordering::Relaxed),
            submit_success: self.submit_success.load(Ordering::Relaxed),
            submit_failure: self.submit_failure.load(Ordering::Relaxed),
            state_failure: self.state_failure.load(Ordering::Relaxed),
            cycle_latency_ms_total: self.cycle_latency_ms_total.load(Ordering::Relaxed),
            cycle_latency_ms_count: self.cycle_latency_ms_count.load(Ordering::Relaxed),
        }
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 cycle_id。
pub fn new_cycle_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn record_cycle_started() {
    metrics().cycles_started.fetch_add(1, Ordering::Relaxed);
}

/// 记录一轮完成及其耗时（毫秒）。
pub fn record_cycle_completed(latency_ms: u64) {
    let metrics = metrics();
    metrics.cycles_completed.fetch_add(1, Ordering::Relaxed);
    metrics
        .cycle_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .cycle_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}

pub fn record_fetch_success() {
    metrics().fetch_success.fetch_add(1, Ordering::Relaxed);
}

pub fn record_fetch_failure() {
    metrics().fetch_failure.fetch_add(1, Ordering::Relaxed);
}

/// 记录因水位相同而跳过的次数。
pub fn record_up_to_date() {
    metrics().up_to_date.fetch_add(1, Ordering::Relaxed);
}

pub fn record_transform_failure() {
    metrics().transform_failure.fetch_add(1, Ordering::Relaxed);
}

/// 记录中间件返回 201 的次数。
pub fn record_submit_success() {
    metrics().submit_success.fetch_add(1, Ordering::Relaxed);
}

pub fn record_submit_failure() {
    metrics().submit_failure.fetch_add(1, Ordering::Relaxed);
}

/// 记录水位读写失败次数。
pub fn record_state_failure() {
    metrics().state_failure.fetch_add(1, Ordering::Relaxed);
}
