use anyhow::Context;
use floatmap::{
    data::{strategy_for, HttpServices, OsrmRouter},
    input::KeyCode,
    layers::{HeadlessEngine, HeadlessTarget},
    ui::{OverlayDriver, OverlayWidget, UiEvent},
    WidgetConfig,
};
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc;

/// Runs the overlay headless against the configured backend.
///
/// Usage: `floatmap-app [config.json]`. Ctrl-C closes the overlay as Escape would.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            WidgetConfig::from_json(&json).with_context(|| format!("parsing config {path}"))?
        }
        None => WidgetConfig::default(),
    };
    log::info!(
        "starting overlay: {}",
        serde_json::to_string(&config.mode).unwrap_or_default()
    );

    let services = Arc::new(HttpServices::from_config(&config)?);
    let router = Arc::new(OsrmRouter::from_config(&config)?);
    let strategy = strategy_for(&config.mode, services);
    let widget = OverlayWidget::new(config, HeadlessEngine::new(), strategy, router)?;

    let (events, rx) = mpsc::unbounded_channel();
    let mut driver = OverlayDriver::new(widget, rx)?;

    let interrupt = events.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = interrupt.send(UiEvent::Key(KeyCode::Escape));
        }
    });
    // Render ticks retry a deferred mount, the same way a host frame loop would
    tokio::spawn(async move {
        let mut frames = tokio::time::interval(Duration::from_secs(1));
        loop {
            frames.tick().await;
            if events.send(UiEvent::Render).is_err() {
                break;
            }
        }
    });

    let target = HeadlessTarget::attached("floatmap-root");
    driver.run(&target).await?;

    let widget = driver.into_widget();
    log::info!(
        "overlay closed; {} map(s) created, {} still live",
        widget.engine().maps_created(),
        widget.engine().live_maps()
    );
    Ok(())
}
