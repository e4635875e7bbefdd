//! oneM2M 桥接进程：按固定间隔把遥测通道的最新读数转发为 content instance。

mod bridge;
mod status;

use bridge_config::{AppConfig, load_nodes};
use bridge_pipeline::Scheduler;
use bridge_telemetry::init_tracing;
use status::{StatusState, create_status_router};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在）
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    init_tracing();

    // 节点列表启动时加载一次，运行期只读
    let nodes = load_nodes(&config.nodes_file, &config.om2m_origin)?;
    info!(
        nodes = nodes.len(),
        nodes_file = %config.nodes_file.display(),
        "nodes_loaded"
    );

    let poll_cycle = bridge::build_poll_cycle(&config, nodes).await?;

    // 可选的只读状态接口
    if let Some(addr) = config.status_addr.as_deref() {
        let router = create_status_router(StatusState::for_cycle(
            &poll_cycle,
            config.poll_interval_seconds,
        ));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(target: "bridge.status", addr = %addr, "status_listening");
        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, router).await {
                warn!(target: "bridge.status", error = %err, "status_server_stopped");
            }
        });
    }

    let scheduler = Scheduler::new(config.poll_interval());
    info!(
        interval_secs = scheduler.interval().as_secs(),
        "scheduler_started"
    );
    let cycles = scheduler.run(&poll_cycle, shutdown_signal()).await;
    info!(cycles = cycles, "bridge_stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "ctrl_c listener failed; running until killed");
        std::future::pending::<()>().await;
    }
}
