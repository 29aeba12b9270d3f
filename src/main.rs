use actix_web::{App, HttpServer, web::Data};
use email_deliverability::config::Config;
use email_deliverability::openapi::ApiDoc;
use email_deliverability::routes;
use email_deliverability::state::AppState;
use email_deliverability::telemetry;
use email_deliverability::validation::disposable::DisposableDomains;
use email_deliverability::validation::dnsmx::{DomainIntelligence, TrustDnsLookup};
use email_deliverability::validation::pipeline::ValidationPipeline;
use email_deliverability::validation::smtp::{SmtpProbe, SmtpProbeConfig};
use std::io;
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Email Deliverability Service Entry Point
///
/// Loads configuration from the environment (and `.env`), builds the
/// validation pipeline and serves:
/// - `GET /health`
/// - `POST /validate/single`, `POST /validate/bulk`
/// - Swagger UI: `/swagger-ui/`, OpenAPI document: `/api-docs/openapi.json`
#[actix_web::main]
async fn main() -> io::Result<()> {
    let config = Config::from_env().map_err(io::Error::other)?;
    telemetry::init(config.log_format);

    let disposable = Arc::new(match &config.disposable_domains_file {
        Some(path) => DisposableDomains::from_file(path).map_err(|e| {
            error!(error = %e, "Could not load disposable domain list");
            io::Error::other(e)
        })?,
        None => DisposableDomains::with_defaults(),
    });

    if let Some(path) = &config.disposable_domains_file {
        reload_on_hangup(Arc::clone(&disposable), path.clone())?;
    }

    let dns = TrustDnsLookup::from_system_conf(config.dns_timeout).map_err(|e| {
        error!(error = %e, "Could not initialise DNS resolver");
        io::Error::other(e)
    })?;

    let prober = SmtpProbe::new(SmtpProbeConfig {
        port: config.smtp_port,
        sender: config.probe_sender.clone(),
        helo: config.probe_helo.clone(),
    });

    let pipeline = ValidationPipeline::new(
        DomainIntelligence::new(Arc::new(dns), disposable),
        Arc::new(prober),
    );
    let state = Data::new(AppState::new(pipeline, &config));

    info!(
        host = %config.host,
        port = config.port,
        bulk_concurrency = config.bulk_concurrency,
        disposable_domains = state.pipeline.intelligence().disposable_domains().len(),
        "Starting email deliverability service"
    );

    let json_body_limit = config.json_body_limit;
    HttpServer::new(move || {
        let openapi = ApiDoc::openapi();

        App::new()
            .app_data(state.clone())
            .app_data(routes::json_config(json_body_limit))
            .configure(routes::configure)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

/// Re-reads the disposable domain list every time the process gets `SIGHUP`.
#[cfg(unix)]
fn reload_on_hangup(disposable: Arc<DisposableDomains>, path: String) -> io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangups = signal(SignalKind::hangup())?;
    tokio::spawn(async move {
        while hangups.recv().await.is_some() {
            if let Err(e) = disposable.reload_from_file(&path) {
                warn!(error = %e, "Keeping previous disposable domain list");
            }
        }
    });
    Ok(())
}

#[cfg(not(unix))]
fn reload_on_hangup(_disposable: Arc<DisposableDomains>, _path: String) -> io::Result<()> {
    Ok(())
}
