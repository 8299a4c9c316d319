use reqwest::Method;

use crate::{
    error::ClientError,
    types::{Expense, ExpensePatch, NewExpense, SuccessResponse},
    utils,
};

use super::{ExpenseClient, send};

impl ExpenseClient {
    /// Fetches every stored expense via `GET /expenses`.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Expense>)` - All records in the order the server stored them
    /// - `Err(ClientError::Status)` - The server rejected the request, e.g.
    ///   `401` when a session is required and this client holds none
    /// - `Err(ClientError::Transport)` - Network failure, timeout or an
    ///   undecodable body
    ///
    /// # Example
    ///
    /// ```
    /// let client = ExpenseClient::from_env()?;
    /// for expense in client.list_expenses().await? {
    ///     println!("{} {}", expense.id, expense.amount);
    /// }
    /// ```
    pub async fn list_expenses(&self) -> Result<Vec<Expense>, ClientError> {
        send(self.request(Method::GET, "/expenses")).await
    }

    /// Creates an expense via `POST /expenses`.
    ///
    /// Each call carries a fresh `Idempotency-Key`, so a transport-level retry
    /// of the same request cannot create a second record.
    ///
    /// # Arguments
    ///
    /// * `expense` - Create payload; the server requires `amount` and `date`
    ///
    /// # Returns
    ///
    /// - `Ok(Expense)` - The stored record with its server-assigned id
    /// - `Err(ClientError::Status)` - `400` with the server's validation message
    /// - `Err(ClientError::Transport)` - Network failure or timeout
    pub async fn create_expense(&self, expense: &NewExpense) -> Result<Expense, ClientError> {
        let builder = self
            .request(Method::POST, "/expenses")
            .header("Idempotency-Key", utils::generate_token())
            .json(expense);
        send(builder).await
    }

    /// Updates an expense via `PUT /expenses`; the patch must carry the target
    /// id. Fields left as `None` keep their stored value.
    ///
    /// # Returns
    ///
    /// - `Ok(Expense)` - The merged record
    /// - `Err(ClientError::Status)` - `404` for an unknown id, `400` for a
    ///   missing id or invalid values
    pub async fn update_expense(&self, patch: &ExpensePatch) -> Result<Expense, ClientError> {
        send(self.request(Method::PUT, "/expenses").json(patch)).await
    }

    /// Deletes an expense via `DELETE /expenses/{id}`. Fails with a `404`
    /// status when the record is already gone.
    pub async fn delete_expense(&self, id: u64) -> Result<SuccessResponse, ClientError> {
        send(self.request(Method::DELETE, &format!("/expenses/{}", id))).await
    }
}
