use crate::domain::{Customer, NewCustomer};

#[mockall::automock]
#[async_trait::async_trait]
pub trait CustomerPort {
    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, Error>;
    async fn get_customer(&self, customer_id: i64) -> Result<Option<Customer>, Error>;
    async fn update_customer(&self, customer: Customer) -> Result<Customer, Error>;
    /// Remove a customer
    ///
    /// Credits owned by the customer are removed along with it.
    async fn delete_customer(&self, customer: Customer) -> Result<(), Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Uniqueness violation on the tax id or the email
    #[error("conflict: {0}")]
    Conflict(String),

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
