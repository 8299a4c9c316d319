use crate::{api::AppState, config, error, server};

pub async fn serve(require_auth: bool) {
    let state = AppState::in_memory(
        config::token_ttl_secs(),
        require_auth || config::require_auth(),
    );

    if let Err(e) = server::start_api_server(state).await {
        error!("Expense API stopped. Err: {}", e);
    }
}
