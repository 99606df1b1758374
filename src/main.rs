use std::sync::Arc;

use actix_web::{App, HttpServer, cookie::Key, middleware};

use prism::auth::{rate_limit::RateLimiter, session};
use prism::config::Config;
use prism::handlers::AppState;
use prism::lifecycle::LifecycleManager;
use prism::notify::LogNotifier;
use prism::store::{MemoryStore, PgStore, ProposalStore, UserStore};
use prism::db;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(std::io::Error::other)?;

    let (proposals, users): (Arc<dyn ProposalStore>, Arc<dyn UserStore>) =
        match &config.database_url {
            Some(url) => {
                let pool = db::init_pool(url, config.db_max_connections)
                    .await
                    .map_err(std::io::Error::other)?;
                db::run_migrations(&pool).await.map_err(std::io::Error::other)?;
                let store = Arc::new(PgStore::new(pool));
                (store.clone() as Arc<dyn ProposalStore>, store as Arc<dyn UserStore>)
            }
            None => {
                log::warn!("No DATABASE_URL set: using in-memory store (data lost on restart)");
                let store = Arc::new(MemoryStore::new());
                (store.clone() as Arc<dyn ProposalStore>, store as Arc<dyn UserStore>)
            }
        };

    let state = AppState {
        lifecycle: LifecycleManager::new(proposals, Arc::new(LogNotifier)),
        users,
        limiter: RateLimiter::new(config.login_max_attempts, config.login_window),
    };

    let secret_key = match &config.session_key {
        Some(bytes) => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(bytes.as_slice())
        }
        None => Key::generate(),
    };
    let secure = config.session_secure;

    log::info!("Starting server at http://{}", config.bind);

    HttpServer::new(move || {
        App::new()
            .wrap(session::middleware(secret_key.clone(), secure))
            .wrap(middleware::Logger::default())
            .configure(state.clone().configure())
    })
    .bind(&config.bind)?
    .run()
    .await
}
