use std::sync::Arc;

use chrono::Duration;
use feed_server::data::memory::{InMemoryPostRepository, InMemoryUserRepository};
use feed_server::data::post_repository::{PostRepository, PostgresPostRepository};
use feed_server::data::user_repository::{PostgresUserRepository, UserRepository};
use feed_server::infrastructure::config::AppConfig;
use feed_server::infrastructure::database::{create_pool, run_migrations};
use feed_server::infrastructure::logging::init_logging;
use feed_server::infrastructure::security::JwtKeys;
use feed_server::server::{AppServices, start_rest_server};
use tracing::warn;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env()?;

    let (user_repo, post_repo) = match &config.database_url {
        Some(database_url) => {
            let pool = create_pool(database_url).await?;
            run_migrations(&pool).await?;
            (
                Arc::new(PostgresUserRepository::new(pool.clone())) as Arc<dyn UserRepository>,
                Arc::new(PostgresPostRepository::new(pool)) as Arc<dyn PostRepository>,
            )
        }
        None => {
            warn!(
                "DATABASE_URL is not set, using the in-process store; \
                 data will not survive a restart"
            );
            (
                Arc::new(InMemoryUserRepository::new()) as Arc<dyn UserRepository>,
                Arc::new(InMemoryPostRepository::new()) as Arc<dyn PostRepository>,
            )
        }
    };

    let keys = JwtKeys::new(
        config.jwt_secret.clone(),
        Duration::hours(config.jwt_ttl_hours),
    );
    let services = AppServices::new(user_repo, post_repo, keys);

    start_rest_server(config, services).await
}
