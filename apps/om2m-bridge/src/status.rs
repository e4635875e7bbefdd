//! 只读状态接口
//!
//! - GET /health
//! - GET /status：计数指标 + 各节点水位（按配置顺序）

use api_contract::{ApiResponse, BridgeStatusDto, MetricsSnapshotDto, NodeStatusDto};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use bridge_pipeline::PollCycle;
use bridge_storage::NodeStateStore;
use bridge_telemetry::metrics;
use domain::DeliveryPolicy;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct StatusState {
    pub states: Arc<dyn NodeStateStore>,
    pub node_ids: Arc<Vec<String>>,
    pub policy: DeliveryPolicy,
    pub poll_interval_seconds: u64,
}

impl StatusState {
    pub fn for_cycle(cycle: &PollCycle, poll_interval_seconds: u64) -> Self {
        Self {
            states: cycle.states(),
            node_ids: Arc::new(
                cycle
                    .nodes()
                    .iter()
                    .map(|node| node.node_id.clone())
                    .collect(),
            ),
            policy: cycle.policy(),
            poll_interval_seconds,
        }
    }
}

pub fn create_status_router(state: StatusState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

async fn status(State(state): State<StatusState>) -> Response {
    let recorded = match state.states.list().await {
        Ok(list) => list.into_iter().collect::<HashMap<_, _>>(),
        Err(err) => {
            warn!(target: "bridge.status", error = %err, "status_state_unavailable");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::<()>::error("STATE.UNAVAILABLE", err.to_string())),
            )
                .into_response();
        }
    };

    let nodes = state
        .node_ids
        .iter()
        .map(|node_id| {
            let node_state = recorded.get(node_id).copied().unwrap_or_default();
            NodeStatusDto {
                node_id: node_id.clone(),
                last_entry_id: node_state.last_entry_id,
                last_delivered_entry_id: node_state.last_delivered_entry_id,
            }
        })
        .collect();

    let snapshot = metrics().snapshot();
    let body = BridgeStatusDto {
        delivery_policy: state.policy.as_str().to_string(),
        poll_interval_seconds: state.poll_interval_seconds,
        metrics: MetricsSnapshotDto {
            cycles_started: snapshot.cycles_started,
            cycles_completed: snapshot.cycles_completed,
            fetch_success: snapshot.fetch_success,
            fetch_failure: snapshot.fetch_failure,
            up_to_date: snapshot.up_to_date,
            transform_failure: snapshot.transform_failure,
            submit_success: snapshot.submit_success,
            submit_failure: snapshot.submit_failure,
            state_failure: snapshot.state_failure,
            cycle_latency_ms_total: snapshot.cycle_latency_ms_total,
            cycle_latency_ms_count: snapshot.cycle_latency_ms_count,
        },
        nodes,
    };
    (StatusCode::OK, Json(ApiResponse::success(body))).into_response()
}
