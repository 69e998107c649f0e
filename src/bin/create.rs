//! Create script: insert a user with nested preferences and print a
//! projection of the created record.

use record_store::config::Config;
use record_store::error::AppError;
use record_store::store::{NewPreferences, NewUser, PreferencesSelect, RecordStore, UserSelect};

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
        tracing::error!("create failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;
    let store = RecordStore::connect(&config.database_path).await?;
    let result = create(&store).await;
    store.close().await;
    result
}

async fn create(store: &RecordStore) -> Result<(), AppError> {
    let new_user = store
        .create_user(
            NewUser::new("ert@example.com", "TestUser", 25)
                .with_preferences(NewPreferences::new("dark")),
        )
        .await?;

    // Project to id, name, and the nested preferences theme only.
    let select = UserSelect {
        id: true,
        name: true,
        preferences: Some(PreferencesSelect {
            theme: true,
            ..PreferencesSelect::default()
        }),
        ..UserSelect::default()
    };

    let projected = select.project(&new_user);
    println!(
        "Created new user: {}",
        serde_json::to_string_pretty(&projected).unwrap_or_else(|_| "<unprintable>".to_string())
    );
    Ok(())
}
