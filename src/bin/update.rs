//! Update script: change one user by unique key, then promote a batch.

use record_store::config::Config;
use record_store::error::AppError;
use record_store::query::{IntFilter, UserFilter};
use record_store::store::{RecordStore, UserKey, UserUpdate};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "info".to_string())
                .parse()
                .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    if let Err(e) = run().await {
        tracing::error!("update failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;
    let store = RecordStore::connect(&config.database_path).await?;
    let result = update(&store).await;
    store.close().await;
    result
}

async fn update(store: &RecordStore) -> Result<(), AppError> {
    // Fails with NotFound if the seed script has not been run.
    let updated = store
        .update_user(
            &UserKey::email("alice@example.com"),
            &UserUpdate::default().age(31),
        )
        .await?;
    println!("updated user: {}", pretty(&updated));

    let count = store
        .update_many_users(
            &UserFilter::default().age(IntFilter::Lt(30)),
            &UserUpdate::default().role("ADMIN"),
        )
        .await?;
    println!("promoted users under 30: {count}");

    Ok(())
}

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "<unprintable>".to_string())
}
