// src/main.rs

use std::{net::SocketAddr, sync::Arc};

use dotenvy::dotenv;
use schoolhub::{
    config::Config,
    error::AppError,
    models::account::{Account, Role},
    routes,
    services::achievements::seed_default_catalog,
    state::AppState,
    store::RecordStore,
    utils::hash::hash_password,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let store = RecordStore::open(&config.data_dir).expect("Failed to open data directory");
    tracing::info!("Records stored in {}", store.root().display());

    // Seed Admin Account
    if let Err(e) = seed_admin_account(&store, &config) {
        tracing::error!("Failed to seed admin account: {:?}", e);
    }

    match seed_default_catalog(&store) {
        Ok(true) => tracing::info!("Default achievement catalog written."),
        Ok(false) => {}
        Err(e) => tracing::error!("Failed to seed achievement catalog: {}", e),
    }

    let port = config.port;
    let state = AppState {
        store: Arc::new(store),
        config,
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Start the server
    axum::serve(listener, app).await.unwrap();
}

fn seed_admin_account(store: &RecordStore, config: &Config) -> Result<(), AppError> {
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        return Ok(());
    };

    let password_hash = hash_password(password)?;
    let created = store.update(|accounts: &mut Vec<Account>| {
        if accounts.iter().any(|a| &a.username == username) {
            return Ok::<_, AppError>(false);
        }
        accounts.push(Account {
            id: Uuid::new_v4().to_string(),
            username: username.clone(),
            password_hash,
            role: Role::Admin,
            person_id: None,
        });
        Ok(true)
    })?;

    if created {
        tracing::info!("Admin account '{}' created.", username);
    }
    Ok(())
}
