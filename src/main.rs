use anyhow::Context;
use clap::Parser;
use estatex_api::{ApiState, RestApi};
use estatex_search::{AppContext, ContextConfig};
use estatex_storage::StorageManager;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Real-estate search backend
#[derive(Parser, Debug)]
#[command(name = "estatex")]
#[command(about = "Property recommendations, price estimates and city comparison", long_about = None)]
struct Args {
    /// Residential property dataset (CSV)
    #[arg(long, env = "ESTATEX_DATA_FILE", default_value = "./data/properties.csv")]
    data_file: PathBuf,

    /// Rental dataset (CSV) for /api/recommend/
    #[arg(long, env = "ESTATEX_RENTAL_DATA_FILE")]
    rental_data_file: Option<PathBuf>,

    /// City metrics (CSV) for /api/move-meter/
    #[arg(long, env = "ESTATEX_CITY_DATA_FILE")]
    city_data_file: Option<PathBuf>,

    /// Directory holding the fitted model artifacts
    #[arg(long, env = "ESTATEX_MODEL_DIR", default_value = "./models")]
    model_dir: PathBuf,

    /// Directory for the user/session/listing store
    #[arg(long, env = "ESTATEX_DB_DIR", default_value = "./data/db")]
    db_dir: PathBuf,

    /// HTTP API port
    #[arg(long, env = "ESTATEX_HTTP_PORT", default_value_t = 8000)]
    http_port: u16,

    /// Log level, overridden by RUST_LOG
    #[arg(long, env = "ESTATEX_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// HTTP worker threads (defaults to the number of CPUs)
    #[arg(long, env = "ESTATEX_WORKERS")]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::from_level(log_level).into()));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting EstateX v{}", env!("CARGO_PKG_VERSION"));
    info!("Data file: {:?}", args.data_file);
    info!("Model directory: {:?}", args.model_dir);
    info!("HTTP API port: {}", args.http_port);

    let config = ContextConfig {
        data_file: args.data_file.clone(),
        model_dir: args.model_dir.clone(),
        rental_data_file: args.rental_data_file.clone(),
        city_data_file: args.city_data_file.clone(),
    };
    let context = AppContext::load(&config)
        .with_context(|| format!("failed to load application context from {:?}", args.model_dir))?;
    info!("Application context ready");

    let storage = Arc::new(
        StorageManager::new(&args.db_dir)
            .with_context(|| format!("failed to open store at {:?}", args.db_dir))?,
    );
    info!("Storage initialized");

    let state = ApiState::new(Arc::new(context), storage);
    let http_port = args.http_port;
    let workers = args.workers;
    let http_handle = std::thread::spawn(move || {
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(state, http_port, workers).await {
                error!("HTTP server error: {}", e);
            }
        })
    });

    info!("EstateX started successfully");
    info!("HTTP API: http://localhost:{}/", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
