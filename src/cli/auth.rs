use crate::{
    client::ExpenseClient,
    error, info,
    session::SessionManager,
    success,
    types::{Credential, Credentials},
    warning,
};

pub async fn signup(username: String, password: String) {
    let client = api_client();
    match client.signup(&Credentials { username, password }).await {
        Ok(credential) => {
            store(credential.clone()).await;
            success!("Account created. Logged in as {}.", credential.username);
        }
        Err(e) => error!("Signup failed. Err: {}", e),
    }
}

pub async fn login(username: String, password: String) {
    let client = api_client();
    match client.login(&Credentials { username, password }).await {
        Ok(credential) => {
            store(credential.clone()).await;
            success!("Logged in as {}.", credential.username);
        }
        Err(e) => error!("Login failed. Err: {}", e),
    }
}

pub async fn logout() {
    match SessionManager::load_valid_token().await {
        Some(token) => {
            let client = api_client().with_token(Some(token));
            if let Err(e) = client.logout().await {
                warning!("Server did not accept logout: {}", e);
            }
        }
        None => info!("No active session."),
    }

    if let Err(e) = SessionManager::clear().await {
        error!("Failed to remove session. Err: {}", e);
    }
    success!("Logged out.");
}

pub(super) fn api_client() -> ExpenseClient {
    match ExpenseClient::from_env() {
        Ok(client) => client,
        Err(e) => error!("Cannot create API client. Err: {}", e),
    }
}

async fn store(credential: Credential) {
    if let Err(e) = SessionManager::new(credential).persist().await {
        error!("Failed to save session. Err: {}", e);
    }
}
