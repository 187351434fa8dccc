use std::{borrow::Cow, future::Future, pin::Pin, sync::Arc};

pub mod credit;
pub mod customer;

/// Future returned by every command
pub type CommandFuture<T> = Pin<Box<dyn Future<Output = Result<T, Error>> + Send>>;

/// Entry point for all operations on customers and credits
///
/// Each operation is a request type with its own `tower::Service` implementation, see the
/// [`customer`] and [`credit`] modules.
pub struct DomainLogic<CU, CR> {
    customers: Arc<CU>,
    credits: Arc<CR>,
}

impl<CU, CR> DomainLogic<CU, CR> {
    pub fn new(customers: Arc<CU>, credits: Arc<CR>) -> Self {
        Self { customers, credits }
    }
}

impl<CU, CR> Clone for DomainLogic<CU, CR> {
    fn clone(&self) -> Self {
        Self {
            customers: self.customers.clone(),
            credits: self.credits.clone(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("customer port error: {0}")]
    Customer(#[from] crate::ports::customer::Error),
    #[error("credit port error: {0}")]
    Credit(#[from] crate::ports::credit::Error),

    /// A customer id or credit code that does not exist
    #[error("{0}")]
    NotFound(Cow<'static, str>),

    /// The first installment falls outside of the allowed window
    #[error("Day of first installment must be in the next 3 months")]
    InvalidInstallmentDate,

    /// The credit exists but belongs to someone else; the message names no owner
    #[error("Contact admin")]
    AuthorizationMismatch,
}

impl Error {
    /// Whether the error comes from a uniqueness constraint in a store
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Error::Customer(crate::ports::customer::Error::Conflict(_))
                | Error::Credit(crate::ports::credit::Error::Conflict(_))
        )
    }
}
