mod config;
mod error;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "no .env loaded");
    }

    let config = config::ServerConfig::from_env().expect("invalid configuration");
    let model = services::model::build_model(&config);
    tracing::info!(model = model.name(), max_file_size = config.max_file_size, "age model ready");

    let addr = config.bind_addr();
    let state = state::AppState::new(model, config);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(&addr).await.expect("failed to bind");

    tracing::info!(%addr, "age prediction api listening");
    axum::serve(listener, app).await.expect("server failed");
}
