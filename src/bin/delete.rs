//! Delete script: remove one user by unique key, then clear the rest.

use record_store::config::Config;
use record_store::error::AppError;
use record_store::query::{IntFilter, UserFilter};
use record_store::store::{RecordStore, UserKey};

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
        tracing::error!("delete failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;
    let store = RecordStore::connect(&config.database_path).await?;
    let result = delete(&store).await;
    store.close().await;
    result
}

async fn delete(store: &RecordStore) -> Result<(), AppError> {
    // Fails with NotFound if the seed script has not been run. Preferences
    // and posts go with the user by cascade.
    let deleted = store.delete_user(&UserKey::email("bob@example.com")).await?;
    println!("deleted user: {}", pretty(&deleted));

    let count = store
        .delete_many_users(&UserFilter::default().age(IntFilter::Equals(25)))
        .await?;
    println!("deleted users aged 25: {count}");

    // The empty filter matches everyone.
    let remaining = store.delete_many_users(&UserFilter::default()).await?;
    println!("deleted remaining users: {remaining}");

    Ok(())
}

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "<unprintable>".to_string())
}
