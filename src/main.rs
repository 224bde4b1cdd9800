use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use intern_match::config::Settings;
use intern_match::error::{handle_json_payload_error, handle_query_payload_error};
use intern_match::routes;
use intern_match::startup::{build_identity, build_store, seed_catalog, StartupError};
use intern_match::AppState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn startup_failed(e: StartupError) -> std::io::Error {
    error!("Startup failed: {}", e);
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting Intern Match service...");

    let store = build_store(&settings.storage).await.map_err(startup_failed)?;

    if settings.catalog.seed_on_startup {
        seed_catalog(store.as_ref(), &settings.catalog)
            .await
            .map_err(startup_failed)?;
    }

    let identity = build_identity(&settings.auth, store.clone()).map_err(startup_failed)?;

    let app_state = AppState::new(store, identity, settings.cache.catalog_ttl_secs);

    info!(
        "Catalog cache {} (TTL: {}s)",
        if app_state.catalog.is_enabled() { "enabled" } else { "disabled" },
        settings.cache.catalog_ttl_secs
    );

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
