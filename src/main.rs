use enova_printouts::config::Config;
use enova_printouts::service::Trigger;
use enova_printouts::shutdown::ShutdownSignal;
use enova_printouts::{EnovaApi, ReportPipeline, SessionManager};
use mimalloc::MiMalloc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %cfg.enova.base_url,
        database = %cfg.enova.database,
        login = %cfg.enova.login,
        proxy = %cfg.basic.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        template = %cfg.report.template_path.display(),
        output = %cfg.report.output_path.display(),
        format = %cfg.report.format,
        "Starting enova printouts worker"
    );

    let cancel = CancellationToken::new();
    ShutdownSignal::install()?.cancel_on_receipt(cancel.clone());

    let backend = EnovaApi::new(&cfg.enova, cfg.basic.proxy.as_ref())?;
    let mut sessions = SessionManager::new(backend, cfg.enova.credentials());
    let pipeline = ReportPipeline::new(&cfg.report);
    let trigger = Trigger::from_worker(&cfg.worker, cancel);
    info!(schedule = %trigger.schedule(), "Report trigger armed");

    let result = trigger.serve(&mut sessions, &pipeline).await;
    if let Err(e) = &result {
        error!(error = %e, "enova printouts worker terminated with error");
    }
    result.map_err(Into::into)
}
