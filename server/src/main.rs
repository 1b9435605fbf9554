// server/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use storefront_server::config::AppConfig;
use storefront_server::state::AppState;
use storefront_server::telemetry::init_tracing;
use storefront_server::web::configure_app_routes;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  let app_config = match AppConfig::from_env() {
    Ok(cfg) => cfg,
    Err(e) => {
      eprintln!("Failed to load application configuration: {}", e);
      std::process::exit(1);
    }
  };
  init_tracing(app_config.log_format);
  info!(backend = ?app_config.storage_backend, "Starting storefront server...");

  let server_address = app_config.bind_address();
  let app_state = match AppState::build(app_config).await {
    Ok(state) => state,
    Err(e) => {
      error!(error = %e, "Failed to initialise application state.");
      std::process::exit(1);
    }
  };

  info!("Binding server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
