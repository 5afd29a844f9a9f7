use std::error::Error;
use std::sync::Arc;

use common::config::Config;
use enrichment::dataset::{DatasetStore, RecordStore};
use enrichment::executable_utils::{initialize_executable, initialize_tracing, run_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    println!("Starting enrichment service...");
    let config: Config = initialize_executable()?;
    initialize_tracing(&config.server.log_level);

    let store: Arc<dyn RecordStore> = Arc::new(DatasetStore::load(&config.dataset.path).await?);
    tracing::info!(records = store.count(), "dataset ready");

    run_server(config.server, store).await
}
