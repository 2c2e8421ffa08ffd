use anyhow::Result;
use sentinel_dashboard::*;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let api = remote::HttpDashboardApi::new(&app_config.remote)?;
    tracing::info!(
        base_url = api.base_url(),
        write_policy = ?app_config.refresh.write_policy,
        "Polling anomaly-detection service"
    );
    let controller = Arc::new(controller::AggregationController::new(
        api,
        app_config.refresh.write_policy,
    ));
    let counters = Arc::new(dashboard::CounterBoard::spawn(
        controller.subscribe(),
        Duration::from_millis(app_config.counter.tick_ms),
    ));
    let mut scheduler = scheduler::Scheduler::start(
        controller.clone(),
        Duration::from_millis(app_config.refresh.interval_ms),
    );

    let app = routes::app(controller, counters, app_config.clone());
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            scheduler.stop().await;
            result?;
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(_) => {
                        let _ = tokio::signal::ctrl_c().await;
                        return;
                    }
                };
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            #[cfg(not(unix))]
            {
                let _ = tokio::signal::ctrl_c().await;
            }
        } => {
            tracing::info!("Received shutdown signal");
            scheduler.stop().await;
        }
    }

    Ok(())
}
