use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use std::{net::SocketAddr, str::FromStr};
use tokio::net::TcpListener;

use crate::{Res, api, api::AppState, config, info};

/// Builds the full router. Every route is served both at the root and under
/// the `/api` prefix.
pub fn router(state: AppState) -> Router {
    let mut expenses = Router::new()
        .route(
            "/expenses",
            get(api::list_expenses)
                .post(api::create_expense)
                .put(api::update_expense),
        )
        .route(
            "/expenses/{id}",
            put(api::update_expense_by_id).delete(api::delete_expense),
        );

    if state.require_auth {
        expenses = expenses.route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_session,
        ));
    }

    let routes = Router::new()
        .route("/health", get(api::health))
        .route("/auth/signup", post(api::signup))
        .route("/auth/login", post(api::login))
        .route("/auth/logout", post(api::logout))
        .merge(expenses)
        .with_state(state);

    Router::new().merge(routes.clone()).nest("/api", routes)
}

/// Serves `state` on an already bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, state: AppState) -> Res<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub async fn start_api_server(state: AppState) -> Res<()> {
    let addr = SocketAddr::from_str(&config::server_addr())
        .map_err(|e| format!("Failed to parse server address: {}", e))?;

    let listener = TcpListener::bind(&addr).await?;
    info!(
        "Expense API listening on http://{} (auth {})",
        addr,
        if state.require_auth { "required" } else { "optional" }
    );

    serve(listener, state).await
}
