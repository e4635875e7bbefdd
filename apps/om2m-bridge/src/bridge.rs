//! 桥接链路装配模块
//!
//! 把拉取器、转换器、提交器和水位存储组装成 [`PollCycle`]。

use bridge_config::AppConfig;
use bridge_ingest::{HttpFetcherConfig, HttpReadingFetcher};
use bridge_normalize::PayloadTransformer;
use bridge_pipeline::PollCycle;
use bridge_storage::{InMemoryNodeStateStore, JsonFileNodeStateStore, NodeStateStore};
use bridge_submit::HttpSubmitter;
use domain::NodeConfig;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn build_poll_cycle(
    config: &AppConfig,
    nodes: Vec<NodeConfig>,
) -> Result<PollCycle, Box<dyn std::error::Error>> {
    let fetcher = HttpReadingFetcher::new(HttpFetcherConfig {
        base_url: config.telemetry_base_url.clone(),
        timeout: config.http_timeout(),
    })?;
    let submitter = HttpSubmitter::new(config.http_timeout())?;
    let transformer = PayloadTransformer::new(config.field_mapping.clone());

    // 水位存储：默认内存，配置文件路径后才持久化
    let states: Arc<dyn NodeStateStore> = match &config.state_file {
        Some(path) => {
            let store = JsonFileNodeStateStore::open(path).await?;
            info!(path = %path.display(), "node state: json file");
            Arc::new(store)
        }
        None => {
            warn!("node state: in-memory, every node's first poll after restart counts as new");
            Arc::new(InMemoryNodeStateStore::new())
        }
    };

    info!(
        telemetry = %fetcher.base_url(),
        water_level_field = %transformer.mapping().water_level,
        temperature_field = %transformer.mapping().temperature,
        policy = config.delivery_policy.as_str(),
        timeout_secs = ?config.http_timeout_seconds,
        "poll cycle assembled"
    );

    Ok(PollCycle::new(
        nodes,
        Arc::new(fetcher),
        transformer,
        Arc::new(submitter),
        states,
        config.delivery_policy,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::State,
        http::StatusCode,
        routing::{get, post},
    };
    use bridge_pipeline::NodeOutcome;
    use domain::{DeliveryPolicy, FieldMapping};
    use std::sync::Mutex;

    type Posted = Arc<Mutex<Vec<serde_json::Value>>>;

    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{}", addr)
    }

    async fn create_cin(
        State(posted): State<Posted>,
        Json(body): Json<serde_json::Value>,
    ) -> StatusCode {
        posted.lock().expect("lock").push(body);
        StatusCode::CREATED
    }

    fn config(telemetry_base_url: String, state_file: Option<std::path::PathBuf>) -> AppConfig {
        AppConfig {
            nodes_file: "nodes_info.json".into(),
            telemetry_base_url,
            poll_interval_seconds: 600,
            om2m_origin: "dev_guest:dev_guest".to_string(),
            http_timeout_seconds: Some(5),
            state_file,
            delivery_policy: DeliveryPolicy::AtMostOnce,
            field_mapping: FieldMapping::default(),
            status_addr: None,
        }
    }

    async fn servers(posted: Posted) -> (String, String) {
        let telemetry = Router::new().route(
            "/channels/:channel_id/feeds/last.json",
            get(|| async {
                Json(serde_json::json!({
                    "created_at": "2024-06-01T12:00:00Z",
                    "entry_id": 42,
                    "field6": "1.5",
                    "field7": "26.3"
                }))
            }),
        );
        let om2m = Router::new()
            .route("/~/in-cse/in-name/AE-WM-WL/:node/Data", post(create_cin))
            .with_state(posted);
        (spawn_server(telemetry).await, spawn_server(om2m).await)
    }

    #[tokio::test]
    async fn assembled_cycle_bridges_reading_once() {
        let posted: Posted = Arc::default();
        let (telemetry_url, om2m_url) = servers(posted.clone()).await;
        let nodes = vec![NodeConfig::new(
            "WM-WL-KH00-00",
            "2188211",
            "KEY1",
            format!("{}/~/in-cse/in-name/AE-WM-WL/WM-WL-KH00-00/Data", om2m_url),
            "dev_guest:dev_guest",
        )];

        let cycle = build_poll_cycle(&config(telemetry_url, None), nodes)
            .await
            .expect("assemble");
        let first = cycle.run().await;
        let second = cycle.run().await;

        assert_eq!(
            first.outcome("WM-WL-KH00-00"),
            Some(&NodeOutcome::Submitted { entry_id: 42 })
        );
        assert_eq!(
            second.outcome("WM-WL-KH00-00"),
            Some(&NodeOutcome::UpToDate { entry_id: 42 })
        );
        let posted = posted.lock().expect("lock");
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0]["m2m:cin"]["con"], "[1717263000, 1.5, 26.3]");
        assert_eq!(posted[0]["m2m:cin"]["lbl"][1], "WM-WL-KH00-00");
    }

    #[tokio::test]
    async fn persisted_watermark_survives_rebuild() {
        let posted: Posted = Arc::default();
        let (telemetry_url, om2m_url) = servers(posted.clone()).await;
        let dir = tempfile::tempdir().expect("tempdir");
        let state_file = dir.path().join("state.json");
        let nodes = vec![NodeConfig::new(
            "WM-WL-KH00-00",
            "2188211",
            "KEY1",
            format!("{}/~/in-cse/in-name/AE-WM-WL/WM-WL-KH00-00/Data", om2m_url),
            "dev_guest:dev_guest",
        )];

        let cycle = build_poll_cycle(&config(telemetry_url.clone(), Some(state_file.clone())), nodes.clone())
            .await
            .expect("assemble");
        cycle.run().await;
        drop(cycle);

        // 模拟进程重启
        let restarted = build_poll_cycle(&config(telemetry_url, Some(state_file)), nodes)
            .await
            .expect("reassemble");
        let report = restarted.run().await;
        assert_eq!(
            report.outcome("WM-WL-KH00-00"),
            Some(&NodeOutcome::UpToDate { entry_id: 42 })
        );
        assert_eq!(posted.lock().expect("lock").len(), 1);
    }
}
