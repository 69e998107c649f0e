//! Seed script: create the demo users with their preferences and posts.
//!
//! All logs go to stderr; stdout is reserved for the printed records.

use record_store::config::Config;
use record_store::error::AppError;
use record_store::store::{NewPost, NewPreferences, NewUser, RecordStore};

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
        tracing::error!("seed failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;
    tracing::info!("seed starting: database={}", config.database_path);

    let store = RecordStore::connect(&config.database_path).await?;
    let result = seed(&store).await;
    // The connection is released on every exit path before the result is
    // inspected.
    store.close().await;
    result
}

async fn seed(store: &RecordStore) -> Result<(), AppError> {
    let user1 = store
        .create_user(
            NewUser::new("alice@example.com", "Alice", 30)
                .with_preferences(NewPreferences::new("dark")),
        )
        .await?;

    let user2 = store
        .create_user(
            NewUser::new("bob@example.com", "Bob", 25)
                .with_preferences(NewPreferences::new("light")),
        )
        .await?;

    store
        .create_post(NewPost::new(user1.id, "Hello from Alice").with_published(true))
        .await?;
    store
        .create_post(NewPost::new(user2.id, "Draft notes"))
        .await?;

    println!("Created user: {}", pretty(&user1));
    println!("Created user: {}", pretty(&user2));
    Ok(())
}

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "<unprintable>".to_string())
}
