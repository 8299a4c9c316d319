use reqwest::Method;

use crate::{
    error::ClientError,
    types::{Credential, Credentials, SuccessResponse},
};

use super::{ExpenseClient, send};

impl ExpenseClient {
    /// Creates an account via `POST /auth/signup` and returns the session
    /// issued for it.
    ///
    /// # Returns
    ///
    /// - `Ok(Credential)` - Token, username and lifetime of the new session
    /// - `Err(ClientError::Status)` - `400` for an empty username or short
    ///   password, `409` when the username is taken
    pub async fn signup(&self, credentials: &Credentials) -> Result<Credential, ClientError> {
        send(self.request(Method::POST, "/auth/signup").json(credentials)).await
    }

    /// Logs in via `POST /auth/login`. Wrong credentials surface as a `401`
    /// status carrying the server's message.
    pub async fn login(&self, credentials: &Credentials) -> Result<Credential, ClientError> {
        send(self.request(Method::POST, "/auth/login").json(credentials)).await
    }

    /// `POST /auth/logout`, revokes the token this client carries.
    pub async fn logout(&self) -> Result<SuccessResponse, ClientError> {
        send(self.request(Method::POST, "/auth/logout")).await
    }
}
