//! keyfob appliance entry point.
//!
//! Wires the adapters to the application components and runs the tick loop:
//!
//! ```text
//! main()
//!  └─ load_config()            -- TOML, immutable after this point
//!  └─ BridgeEmitter::start()   -- TCP reconnect loop to the HID bridge
//!  └─ http_api::serve()        -- axum surface feeding the request queue
//!  └─ Appliance::run()         -- 50 ms cooperative tick loop
//! ```
//!
//! Ctrl-C clears the shared running flag; the loop notices on its next tick.

use std::net::ToSocketAddrs;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use keyfob_appliance::application::classify_press::InputClassifier;
use keyfob_appliance::application::dispatch_command::CommandDispatcher;
use keyfob_appliance::application::indicator::IndicatorDriver;
use keyfob_appliance::application::run_macro::HidEmitter;
use keyfob_appliance::application::supervise_link::LinkSupervisor;
use keyfob_appliance::config::{load_config, AppConfig};
use keyfob_appliance::infrastructure::button::ButtonSource;
#[cfg(target_os = "linux")]
use keyfob_appliance::infrastructure::button::EvdevButton;
use keyfob_appliance::infrastructure::hid_link::{BridgeEmitter, BridgeEmitterConfig};
use keyfob_appliance::infrastructure::http_api;
use keyfob_appliance::infrastructure::indicator_pin::SysfsLedPin;
use keyfob_appliance::infrastructure::link_probe::OperstateProbe;
use keyfob_appliance::runtime::Appliance;

/// `--config <path>` is the only command-line option.
fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.appliance.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config(config_path_from_args().as_deref())
        .context("configuration could not be loaded")?;
    init_logging(&config);

    info!("keyfob appliance starting");

    let running = Arc::new(AtomicBool::new(true));

    // ── HID bridge emitter ────────────────────────────────────────────────────
    let bridge_spec = format!("{}:{}", config.bridge.target_host, config.bridge.target_port);
    let bridge_addr = bridge_spec
        .to_socket_addrs()
        .with_context(|| format!("invalid bridge address {bridge_spec:?}"))?
        .next()
        .with_context(|| format!("bridge address {bridge_spec:?} resolved to nothing"))?;
    let emitter = Arc::new(BridgeEmitter::new(BridgeEmitterConfig {
        target_addr: bridge_addr,
        reconnect_interval: Duration::from_secs(config.bridge.reconnect_secs),
        appliance_id: Uuid::new_v4(),
        appliance_name: config.bridge.appliance_name.clone(),
        ..Default::default()
    }));
    Arc::clone(&emitter).start(Arc::clone(&running));

    // ── Physical adapters ─────────────────────────────────────────────────────
    #[cfg(target_os = "linux")]
    let button: Box<dyn ButtonSource> = Box::new(
        EvdevButton::open(
            std::path::Path::new(&config.button.device_path),
            config.button.key_code,
        )
        .context("button device could not be opened")?,
    );
    #[cfg(not(target_os = "linux"))]
    let button: Box<dyn ButtonSource> = {
        warn!("no button backend on this platform; physical input disabled");
        Box::new(keyfob_appliance::infrastructure::button::ScriptedButton::idle())
    };
    let indicator = IndicatorDriver::new(Box::new(SysfsLedPin::new(
        &config.indicator.led_brightness_path,
    )));
    let probe = OperstateProbe::new(&config.network.interface);

    // ── Command surface ───────────────────────────────────────────────────────
    let (api_tx, api_rx) = mpsc::channel(16);
    let http_addr = format!("{}:{}", config.http.bind_address, config.http.port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("failed to bind command surface on {http_addr}"))?;
    tokio::spawn(async move {
        if let Err(e) = http_api::serve(listener, api_tx).await {
            warn!("command surface stopped: {e}");
        }
    });

    // ── Core assembly ─────────────────────────────────────────────────────────
    let dispatcher = CommandDispatcher::new(
        Some(config.http.shared_secret.clone()),
        Arc::clone(&emitter) as Arc<dyn HidEmitter>,
    );
    let appliance = Appliance::new(
        InputClassifier::new(config.button.long_press_ms),
        LinkSupervisor::new(
            config.network.fail_threshold_ms,
            config.network.flash_period_ms,
        ),
        indicator,
        dispatcher,
        button,
        Box::new(probe),
        api_rx,
        Duration::from_millis(config.appliance.tick_period_ms),
    );

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    let running_flag = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_flag.store(false, Ordering::Relaxed);
        }
    });

    info!(
        interface = %config.network.interface,
        bridge = %bridge_addr,
        "keyfob appliance ready"
    );
    appliance.run(running).await;

    info!("keyfob appliance stopped");
    Ok(())
}
