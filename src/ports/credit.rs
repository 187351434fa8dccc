use uuid::Uuid;

use crate::domain::{Credit, NewCredit};

#[mockall::automock]
#[async_trait::async_trait]
pub trait CreditPort {
    /// Persist a new credit
    ///
    /// A credit code is generated when the request does not carry one. Credits breaking
    /// [`NewCredit::terms_violation`] are rejected with [`Error::InvalidTerms`].
    async fn insert_credit(&self, credit: NewCredit) -> Result<Credit, Error>;
    async fn get_credit_by_code(&self, credit_code: Uuid) -> Result<Option<Credit>, Error>;
    /// All credits owned by a customer, in no particular order
    ///
    /// Unknown customers have no credits, this is not an error.
    async fn list_credits_by_customer(&self, customer_id: i64) -> Result<Vec<Credit>, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Another credit already uses this code
    #[error("conflict: credit code {0} already exists")]
    Conflict(Uuid),

    /// Value or number of installments out of range
    #[error("invalid credit terms: {0}")]
    InvalidTerms(String),

    /// The owning customer disappeared between resolution and insertion
    #[error("customer {0} does not exist")]
    MissingCustomer(i64),

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
