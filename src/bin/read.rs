//! Read script: walk through the lookup and query surface against a
//! seeded database.

use record_store::config::Config;
use record_store::error::AppError;
use record_store::query::{
    IntFilter, PreferencesFilter, SortOrder, StringFilter, UserField, UserFilter, UserQuery,
};
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
        tracing::error!("read failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;
    let store = RecordStore::connect(&config.database_path).await?;
    let result = read(&store).await;
    store.close().await;
    result
}

async fn read(store: &RecordStore) -> Result<(), AppError> {
    // Unique lookup on the composite (name, age) key. Prints null when no
    // record matches.
    let user = store.find_unique_user(&UserKey::name_age("me", 1)).await?;
    println!("user by (name, age): {}", pretty(&user));

    // First match in default id order.
    let first = store
        .find_first_user(&UserFilter::default().age(IntFilter::Equals(25)))
        .await?;
    println!("first user aged 25: {}", pretty(&first));

    // All matches.
    let aged = store
        .find_many_users(
            &UserQuery::default().filter(UserFilter::default().age(IntFilter::Equals(25))),
        )
        .await?;
    println!("users aged 25: {}", pretty(&aged));

    // Distinct names, ordered, then windowed.
    let windowed = store
        .find_many_users(
            &UserQuery::default()
                .order_by(UserField::Name, SortOrder::Asc)
                .distinct([UserField::Name])
                .skip(2)
                .take(3),
        )
        .await?;
    println!("distinct names, skip 2 take 3: {}", pretty(&windowed));

    // Combined conditions: a relation filter on preferences, a conjunction
    // of age bounds, and a disjunction on the name.
    let conditions = UserQuery::default()
        .filter(
            UserFilter::default()
                .preferences(PreferencesFilter::default().theme(StringFilter::equals("dark")))
                .and(
                    UserFilter::default()
                        .age(IntFilter::Gt(1))
                        .age(IntFilter::Lt(30))
                        .age(IntFilter::Not(25)),
                )
                .and(
                    UserFilter::default()
                        .or(UserFilter::default().name(StringFilter::contains("e")))
                        .or(UserFilter::default().name(StringFilter::starts_with("J"))),
                ),
        )
        .include_preferences()
        .include_posts();
    let matching = store.find_many_users(&conditions).await?;
    println!("dark-theme users matching conditions: {}", pretty(&matching));

    Ok(())
}

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "<unprintable>".to_string())
}
