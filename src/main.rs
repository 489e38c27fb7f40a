// SPDX-License-Identifier: Apache-2.0
use actix_files::Files;
use actix_web::{App, HttpServer, web};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

use prospecta::firm::{self, FirmConfigSource};
use prospecta::logging;
use prospecta::prospect::ProspectRegistry;
use prospecta::routes::{self, AppState};
use prospecta::settings::Settings;
use prospecta::store::JsonFileStore;
use prospecta::templates::TemplateEngine;

const APP_NAME: &str = "prospecta";

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    logging::init(APP_NAME, settings.log_format)?;

    info!("🚪 Starting prospecta...");
    settings.log_summary();
    if settings.environment.is_development() {
        warn!("⚠️  Development mode. Placeholder firm data may be served.");
    }

    // Production refuses to start without a real firm configuration
    let firm = firm::load(
        &FirmConfigSource::new(settings.firm_config.clone()),
        settings.environment,
    )?;
    let store = JsonFileStore::open(&settings.prospects_file)?;

    let state = web::Data::new(AppState {
        registry: ProspectRegistry::new(Arc::new(store)),
        templates: TemplateEngine::from_dir(&settings.templates_dir),
        firm,
    });
    let static_dir = settings.static_dir.clone();

    info!("Listening on {}", settings.bind_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .configure(routes::configure)
            .service(Files::new("/static", static_dir.clone()))
    })
    .bind(settings.bind_addr.as_str())?
    .client_request_timeout(Duration::from_secs(60))
    .run()
    .await?;

    Ok(())
}
