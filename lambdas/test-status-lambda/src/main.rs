use aws_lambda_events::event::eventbridge::EventBridgeEvent;
use chrono::{DateTime, Utc};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use langlearn_shared::{config::Config, language_tests::complete_due_tests, AppState};
use serde_json::{json, Value};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let config = Config::from_env()?;
    let state = AppState::from_config(&config).await;

    run(service_fn(move |event: LambdaEvent<EventBridgeEvent>| {
        let state = Arc::clone(&state);
        async move { function_handler(&state, event).await }
    }))
    .await
}

/// Scheduled rule target: close out tests whose time window has passed.
async fn function_handler(state: &AppState, event: LambdaEvent<EventBridgeEvent>) -> Result<Value, Error> {
    tracing::info!("Test status sweep triggered by {:?}", event.payload.source);
    let completed = sweep(state, Utc::now()).await?;
    Ok(json!({ "completed": completed }))
}

async fn sweep(state: &AppState, now: DateTime<Utc>) -> Result<usize, Error> {
    let completed = complete_due_tests(state.store.as_ref(), now).await?;
    tracing::info!("Marked {} tests as completed", completed);
    Ok(completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use langlearn_shared::session::SessionSigner;
    use langlearn_shared::store::{Filter, MemoryStore, Table, TableStore};

    #[tokio::test]
    async fn test_sweep_completes_elapsed_tests() {
        let state = AppState::new(Arc::new(MemoryStore::new()), SessionSigner::new("sweep-secret"));
        for (id, time) in [("past", "2026-03-01T08:00:00Z"), ("future", "2026-12-01T08:00:00Z")] {
            state
                .store
                .insert(
                    Table::Tests,
                    json!({"id": id, "test_time": time, "test_duration": 60, "status": "upcoming"})
                        .as_object()
                        .cloned()
                        .unwrap(),
                )
                .await
                .unwrap();
        }

        let now = DateTime::parse_from_rfc3339("2026-06-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(sweep(&state, now).await.unwrap(), 1);

        let completed = state
            .store
            .find(Table::Tests, &Filter::new().eq("status", "completed"))
            .await
            .unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0]["id"], "past");
    }
}
