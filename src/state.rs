use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn},
    storage::LocalStore,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub store: Arc<LocalStore>,
}

impl AppState {
    pub fn new(pool: DbPool, orm: OrmConn, config: AppConfig) -> Self {
        let store = LocalStore::new(&config.upload_dir, &config.public_base_url);
        Self {
            pool,
            orm,
            config: Arc::new(config),
            store: Arc::new(store),
        }
    }
}
