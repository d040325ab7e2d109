use std::process::ExitCode;
use std::sync::Arc;

use ota_devserver::bootstrap::{self, Layout};
use ota_devserver::config::Config;
use ota_devserver::error::StartupError;
use ota_devserver::handler::{ResponderOptions, StaticResponder};
use ota_devserver::logger::{self, LogWriter};
use ota_devserver::{netinfo, server};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[ERROR] {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), StartupError> {
    let mut cfg = Config::load()?;
    cfg.apply_args(std::env::args().skip(1))?;

    let writer = logger::init(&cfg)?;

    let root = cfg.root_dir();
    if bootstrap::ensure_layout(&root, cfg.server.port)? == Layout::Created {
        logger::log_layout_created(&root);
    }

    // Create Tokio runtime, thread count from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg, writer))
}

async fn async_main(cfg: Config, writer: Arc<LogWriter>) -> Result<(), StartupError> {
    let addr = cfg
        .get_socket_addr()
        .map_err(|e| StartupError::Config(config::ConfigError::Message(e)))?;

    let root = cfg.root_dir();
    let responder = StaticResponder::new(&root, ResponderOptions::from(&cfg), writer)
        .map_err(|source| StartupError::Root { path: root, source })?;

    let listener =
        server::create_listener(addr).map_err(|source| StartupError::Bind { addr, source })?;

    logger::log_server_start(
        &listener.local_addr()?,
        responder.root(),
        netinfo::local_ip(),
        &cfg,
    );

    server::run(
        listener,
        Arc::new(responder),
        server::ConnectionSettings::from(&cfg.performance),
        server::shutdown_signal(),
    )
    .await?;

    logger::log_server_stopped();
    Ok(())
}
