//! 轮询流水线：拉取 → 去重 → 转换 → 提交，以及固定间隔调度。

mod scheduler;

pub use scheduler::{CycleRunner, Scheduler};

use bridge_ingest::ReadingFetcher;
use bridge_normalize::PayloadTransformer;
use bridge_storage::NodeStateStore;
use bridge_submit::MiddlewareSubmitter;
use bridge_telemetry::{
    new_cycle_id, record_cycle_completed, record_cycle_started, record_fetch_failure,
    record_fetch_success, record_state_failure, record_submit_failure, record_submit_success,
    record_transform_failure, record_up_to_date,
};
use domain::{DeliveryPolicy, NodeConfig, NodeState, RawReading};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, warn};

/// 单节点在一轮中的处理结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeOutcome {
    FetchFailed { reason: String },
    UpToDate { entry_id: i64 },
    TransformFailed { entry_id: i64, reason: String },
    Submitted { entry_id: i64 },
    SubmissionFailed { entry_id: i64, reason: String },
    StateFailed { reason: String },
}

impl NodeOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeOutcome::FetchFailed { .. } => "fetch_failed",
            NodeOutcome::UpToDate { .. } => "up_to_date",
            NodeOutcome::TransformFailed { .. } => "transform_failed",
            NodeOutcome::Submitted { .. } => "submitted",
            NodeOutcome::SubmissionFailed { .. } => "submission_failed",
            NodeOutcome::StateFailed { .. } => "state_failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(
            self,
            NodeOutcome::UpToDate { .. } | NodeOutcome::Submitted { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeReport {
    pub node_id: String,
    pub outcome: NodeOutcome,
}

/// 一轮轮询的汇总，节点顺序与配置顺序一致。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle_id: String,
    pub nodes: Vec<NodeReport>,
}

impl CycleReport {
    pub fn submitted(&self) -> usize {
        self.nodes
            .iter()
            .filter(|report| matches!(report.outcome, NodeOutcome::Submitted { .. }))
            .count()
    }

    pub fn failures(&self) -> usize {
        self.nodes
            .iter()
            .filter(|report| report.outcome.is_failure())
            .count()
    }

    pub fn outcome(&self, node_id: &str) -> Option<&NodeOutcome> {
        self.nodes
            .iter()
            .find(|report| report.node_id == node_id)
            .map(|report| &report.outcome)
    }
}

/// 去重判定：读数 id 与策略对应的水位不同即处理。
pub fn should_process(state: &NodeState, reading: &RawReading, policy: DeliveryPolicy) -> bool {
    state.is_new(reading.entry_id, policy)
}

struct PollCycleInner {
    nodes: Vec<NodeConfig>,
    fetcher: Arc<dyn ReadingFetcher>,
    transformer: PayloadTransformer,
    submitter: Arc<dyn MiddlewareSubmitter>,
    states: Arc<dyn NodeStateStore>,
    policy: DeliveryPolicy,
}

/// 单轮轮询入口。
///
/// 节点逐个串行处理；任一节点失败只影响自身，整轮总会遍历完所有节点。
#[derive(Clone)]
pub struct PollCycle {
    inner: Arc<PollCycleInner>,
}

impl PollCycle {
    pub fn new(
        nodes: Vec<NodeConfig>,
        fetcher: Arc<dyn ReadingFetcher>,
        transformer: PayloadTransformer,
        submitter: Arc<dyn MiddlewareSubmitter>,
        states: Arc<dyn NodeStateStore>,
        policy: DeliveryPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(PollCycleInner {
                nodes,
                fetcher,
                transformer,
                submitter,
                states,
                policy,
            }),
        }
    }

    pub fn nodes(&self) -> &[NodeConfig] {
        &self.inner.nodes
    }

    pub fn states(&self) -> Arc<dyn NodeStateStore> {
        self.inner.states.clone()
    }

    pub fn policy(&self) -> DeliveryPolicy {
        self.inner.policy
    }

    /// 执行一轮。
    pub async fn run(&self) -> CycleReport {
        let cycle_id = new_cycle_id();
        let span = tracing::info_span!("poll_cycle", cycle_id = %cycle_id);
        self.run_nodes(cycle_id).instrument(span).await
    }

    async fn run_nodes(&self, cycle_id: String) -> CycleReport {
        record_cycle_started();
        let started_at = Instant::now();
        info!(
            target: "bridge.poll",
            nodes = self.inner.nodes.len(),
            policy = self.inner.policy.as_str(),
            "poll_cycle_started"
        );

        let mut reports = Vec::with_capacity(self.inner.nodes.len());
        for node in &self.inner.nodes {
            let outcome = self.process_node(node).await;
            log_outcome(node, &outcome);
            reports.push(NodeReport {
                node_id: node.node_id.clone(),
                outcome,
            });
        }

        let report = CycleReport {
            cycle_id,
            nodes: reports,
        };
        let elapsed_ms = started_at.elapsed().as_millis() as u64;
        record_cycle_completed(elapsed_ms);
        info!(
            target: "bridge.poll",
            submitted = report.submitted(),
            failures = report.failures(),
            elapsed_ms = elapsed_ms,
            "poll_cycle_completed"
        );
        report
    }

    async fn process_node(&self, node: &NodeConfig) -> NodeOutcome {
        let inner = &self.inner;

        // 1. 拉取最新读数；失败即本轮无新数据
        let reading = match inner.fetcher.fetch_last(&node.channel_id, &node.api_key).await {
            Ok(reading) => {
                record_fetch_success();
                reading
            }
            Err(err) => {
                record_fetch_failure();
                return NodeOutcome::FetchFailed {
                    reason: err.to_string(),
                };
            }
        };
        let entry_id = reading.entry_id;

        // 2. 水位去重
        let mut state = match inner.states.load(&node.node_id).await {
            Ok(state) => state,
            Err(err) => {
                record_state_failure();
                return NodeOutcome::StateFailed {
                    reason: err.to_string(),
                };
            }
        };
        if !should_process(&state, &reading, inner.policy) {
            record_up_to_date();
            return NodeOutcome::UpToDate { entry_id };
        }

        // 3. 转换；失败不推进水位
        let payload = match inner.transformer.transform(&node.node_id, &reading) {
            Ok(payload) => payload,
            Err(err) => {
                record_transform_failure();
                return NodeOutcome::TransformFailed {
                    entry_id,
                    reason: err.to_string(),
                };
            }
        };
        info!(
            target: "bridge.poll",
            node_id = %node.node_id,
            entry_id = entry_id,
            created_at = %reading.created_at,
            content = %payload.content,
            "node_new_reading"
        );

        // 转换成功即推进 seen 水位，与提交结果无关
        state.mark_seen(entry_id);
        if let Err(err) = inner.states.save(&node.node_id, state).await {
            record_state_failure();
            return NodeOutcome::StateFailed {
                reason: err.to_string(),
            };
        }

        // 4. 提交
        match inner.submitter.submit(node, &payload).await {
            Ok(()) => {
                record_submit_success();
                state.mark_delivered(entry_id);
                if let Err(err) = inner.states.save(&node.node_id, state).await {
                    record_state_failure();
                    warn!(
                        target: "bridge.poll",
                        node_id = %node.node_id,
                        entry_id = entry_id,
                        error = %err,
                        "delivered_watermark_save_failed"
                    );
                }
                NodeOutcome::Submitted { entry_id }
            }
            Err(err) => {
                record_submit_failure();
                NodeOutcome::SubmissionFailed {
                    entry_id,
                    reason: err.to_string(),
                }
            }
        }
    }
}

fn log_outcome(node: &NodeConfig, outcome: &NodeOutcome) {
    let node_id = node.node_id.as_str();
    match outcome {
        NodeOutcome::FetchFailed { reason } => {
            warn!(target: "bridge.poll", node_id = %node_id, reason = %reason, "node_fetch_failed");
        }
        NodeOutcome::UpToDate { entry_id } => {
            info!(target: "bridge.poll", node_id = %node_id, entry_id = *entry_id, "node_up_to_date");
        }
        NodeOutcome::TransformFailed { entry_id, reason } => {
            warn!(
                target: "bridge.poll",
                node_id = %node_id,
                entry_id = *entry_id,
                reason = %reason,
                "node_transform_failed"
            );
        }
        NodeOutcome::Submitted { entry_id } => {
            info!(
                target: "bridge.poll",
                node_id = %node_id,
                entry_id = *entry_id,
                "content_instance_created"
            );
        }
        NodeOutcome::SubmissionFailed { entry_id, reason } => {
            warn!(
                target: "bridge.poll",
                node_id = %node_id,
                entry_id = *entry_id,
                reason = %reason,
                "content_instance_rejected"
            );
        }
        NodeOutcome::StateFailed { reason } => {
            warn!(target: "bridge.poll", node_id = %node_id, reason = %reason, "node_state_failed");
        }
    }
}
