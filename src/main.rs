use actix_web::{App, HttpServer, web::Data};
use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use log::{debug, error, info};
use netcfg_reconciler::{
    api::{Api, ScreenLimits},
    config::AppConfig,
    controller_client::ControllerClient,
    settings_store::{FileSettingsStore, SettingsStore},
};
use std::io::Write;
use tokio::signal::unix::{SignalKind, signal};

type SettingsApi = Api<ControllerClient, FileSettingsStore>;

#[actix_web::main]
async fn main() {
    if let Err(e) = run().await {
        error!("application error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    initialize();

    let config = AppConfig::get();
    let store = FileSettingsStore::open(&config.paths.network_config_file)
        .context("failed to open settings store")?;
    let client = ControllerClient::new().context("failed to create controller client")?;

    info!(
        "committed network config from {:?}: {:?}",
        store.path(),
        store.current()
    );

    let limits = ScreenLimits {
        max_screens: config.ui.max_screens,
        idle_timeout: config.ui.screen_idle_timeout,
    };
    let api = SettingsApi::with_limits(client, store, config.developer_tools, limits);
    let api = Data::new(api);
    let bind_address = (config.ui.bind_address, config.ui.port);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(api.clone())
            .configure(SettingsApi::routes)
    })
    .bind(bind_address)
    .context(format!("failed to bind {bind_address:?}"))?
    .disable_signals()
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    info!("listening on {}:{}", bind_address.0, bind_address.1);

    let mut sigterm =
        signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            debug!("ctrl-c received");
        },
        _ = sigterm.recv() => {
            debug!("SIGTERM received");
        },
        result = server_task => {
            match result {
                Ok(Ok(())) => debug!("server stopped normally"),
                Ok(Err(e)) => error!("server stopped with error: {e}"),
                Err(e) => error!("server task panicked: {e}"),
            }
        },
    };

    info!("shutting down");
    server_handle.stop(true).await;
    info!("shutdown complete");

    Ok(())
}

fn initialize() {
    log_panics::init();

    let mut builder = if cfg!(debug_assertions) {
        Builder::from_env(Env::default().default_filter_or("debug"))
    } else {
        Builder::from_env(Env::default().default_filter_or("info"))
    };

    builder.format(|f, record| match record.level() {
        log::Level::Error => {
            eprintln!("{}", record.args());
            Ok(())
        }
        _ => {
            writeln!(f, "{}", record.args())
        }
    });

    builder.target(Target::Stdout).init();

    info!("module version: {}", env!("CARGO_PKG_VERSION"));
}
