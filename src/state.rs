use crate::db::DbPool;
use crate::mailer::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub mailer: Mailer,
}

impl axum::extract::FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}
