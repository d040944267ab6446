use lambda_http::{run, service_fn, tracing, Error, Request};
use langlearn_shared::{config::Config, AppState};
use std::sync::Arc;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    // Build the store and session signer once at startup
    let config = Config::from_env()?;
    let state = AppState::from_config(&config).await;

    run(service_fn(move |event: Request| {
        let state = Arc::clone(&state);
        async move { http_handler::function_handler(event, state).await }
    }))
    .await
}
