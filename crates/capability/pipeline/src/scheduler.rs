//! 固定间隔调度。
//!
//! 下一轮的触发时刻从上一轮的计划时刻起算，不受本轮耗时影响；
//! 本轮超时错过的触发点直接跳过，两轮之间从不重叠。

use crate::{CycleReport, PollCycle};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;

/// 可被调度的一轮任务。
#[async_trait]
pub trait CycleRunner: Send + Sync {
    async fn run_cycle(&self) -> CycleReport;
}

#[async_trait]
impl CycleRunner for PollCycle {
    async fn run_cycle(&self) -> CycleReport {
        self.run().await
    }
}

/// 调度器参数。
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    interval: Duration,
    initial_delay: Duration,
}

impl Scheduler {
    /// 首轮立即执行。间隔为 0 时按 1 秒处理。
    pub fn new(interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            Duration::from_secs(1)
        } else {
            interval
        };
        Self {
            interval,
            initial_delay: Duration::ZERO,
        }
    }

    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 持续调度直到 `shutdown` 完成，返回已执行的轮数。
    ///
    /// `shutdown` 只在两轮之间生效，进行中的一轮总会执行完。
    pub async fn run<R, F>(&self, runner: &R, shutdown: F) -> u64
    where
        R: CycleRunner + ?Sized,
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.initial_delay, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        let mut cycles = 0u64;
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!(target: "bridge.poll", cycles = cycles, "scheduler_stopped");
                    break;
                }
                scheduled_at = ticker.tick() => {
                    let report = runner.run_cycle().await;
                    cycles += 1;
                    let next_at = scheduled_at + self.interval;
                    info!(
                        target: "bridge.poll",
                        cycle_id = %report.cycle_id,
                        cycles = cycles,
                        overrun = Instant::now() >= next_at,
                        interval_secs = self.interval.as_secs(),
                        "next_cycle_scheduled"
                    );
                }
            }
        }
        cycles
    }
}
