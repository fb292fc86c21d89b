use crate::classifier::ClassifierClient;
use crate::config::Config;
use crate::judge::JudgeClient;
use axum::extract::FromRef;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub judge: JudgeClient,
    pub classifier: ClassifierClient,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for JudgeClient {
    fn from_ref(state: &AppState) -> Self {
        state.judge.clone()
    }
}

impl FromRef<AppState> for ClassifierClient {
    fn from_ref(state: &AppState) -> Self {
        state.classifier.clone()
    }
}
