use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use spahost::config::{Config, Overrides, DEFAULT_CONFIG_PATH};
use spahost::logger::{Logger, WriterLogger};
use spahost::server::{shutdown_signal, Server};

/// Static file server with SPA fallback
#[derive(Debug, Parser)]
#[command(name = "spahost", version, about)]
struct Cli {
    /// Listen address, host:port
    #[arg(long)]
    addr: Option<String>,

    /// Cache duration, e.g. 720h or 1h30m
    #[arg(long = "cd")]
    cache_duration: Option<String>,

    /// TLS certificate file (PEM)
    #[arg(long)]
    cert: Option<String>,

    /// TLS private key file (PEM)
    #[arg(long)]
    key: Option<String>,

    /// Gzip compressible responses
    #[arg(long)]
    compress: bool,

    /// Index document, relative to the static directory
    #[arg(long)]
    index: Option<String>,

    /// Static directory to serve
    #[arg(long)]
    dir: Option<String>,

    /// regex, stat or static
    #[arg(long = "route-mode")]
    route_mode: Option<String>,

    /// Config file path; the extension selects the format
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            addr: self.addr.clone(),
            cache_duration: self.cache_duration.clone(),
            cert_file: self.cert.clone(),
            key_file: self.key.clone(),
            compress: Some(self.compress),
            index_file: self.index.clone(),
            static_dir: self.dir.clone(),
            route_mode: self.route_mode.clone(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let cfg = match Config::load_from(&cli.config, &cli.overrides()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("[FATAL] {e}");
            return ExitCode::FAILURE;
        }
    };

    let logger: Arc<dyn Logger> = match WriterLogger::from_config(&cfg.logging) {
        Ok(logger) => Arc::new(logger),
        Err(e) => {
            eprintln!("[FATAL] Failed to set up logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(cfg, &logger) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger.fatal(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cfg: Config, logger: &Arc<dyn Logger>) -> Result<(), Box<dyn std::error::Error>> {
    // Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger.info(&format!("Using {workers} worker threads"));
    }
    let runtime = runtime_builder.build()?;

    let access_log_format = cfg
        .logging
        .access_log
        .then(|| cfg.logging.access_log_format.clone());

    let mut server = Server::new(cfg.server)?;
    server.set_logger(Arc::clone(logger));
    server.set_access_log_format(access_log_format);
    server.set_performance(cfg.performance);

    let config = server.config();
    logger.info(&format!("Serving {}", config.static_dir.display()));
    logger.info(&format!("Route mode: {}", config.route_mode));
    logger.info(&format!("Listening address: {}", config.addr));

    let shutdown = shutdown_signal(Arc::clone(logger));
    runtime.block_on(server.listen_and_serve_until(shutdown))?;
    Ok(())
}
