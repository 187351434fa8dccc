use std::task::{Context, Poll};

use crate::{
    domain::{Customer, CustomerPatch, NewCustomer},
    ports::customer::CustomerPort,
};
use tower::Service;
use tracing::{debug, info};

use super::{CommandFuture, DomainLogic, Error};

pub struct SaveCustomer(pub NewCustomer);

pub struct FindCustomer {
    pub customer_id: i64,
}

pub struct UpdateCustomer {
    pub customer_id: i64,
    pub patch: CustomerPatch,
}

pub struct DeleteCustomer {
    pub customer_id: i64,
}

/// Load a customer or fail with [`Error::NotFound`]
pub(crate) async fn find_customer<CU>(customers: &CU, customer_id: i64) -> Result<Customer, Error>
where
    CU: CustomerPort + ?Sized,
{
    customers
        .get_customer(customer_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Id {customer_id} not found").into()))
}

impl<CU, CR> Service<SaveCustomer> for DomainLogic<CU, CR>
where
    CU: CustomerPort + Send + Sync + 'static,
    CR: Send + Sync + 'static,
{
    type Response = Customer;
    type Error = Error;
    type Future = CommandFuture<Customer>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: SaveCustomer) -> Self::Future {
        let customers = self.customers.clone();
        Box::pin(async move {
            let customer = customers.insert_customer(req.0).await?;
            info!(customer_id = customer.id, "customer saved");
            Ok(customer)
        })
    }
}

impl<CU, CR> Service<FindCustomer> for DomainLogic<CU, CR>
where
    CU: CustomerPort + Send + Sync + 'static,
    CR: Send + Sync + 'static,
{
    type Response = Customer;
    type Error = Error;
    type Future = CommandFuture<Customer>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: FindCustomer) -> Self::Future {
        let customers = self.customers.clone();
        Box::pin(async move {
            debug!(customer_id = req.customer_id, "finding customer");
            find_customer(customers.as_ref(), req.customer_id).await
        })
    }
}

impl<CU, CR> Service<UpdateCustomer> for DomainLogic<CU, CR>
where
    CU: CustomerPort + Send + Sync + 'static,
    CR: Send + Sync + 'static,
{
    type Response = Customer;
    type Error = Error;
    type Future = CommandFuture<Customer>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: UpdateCustomer) -> Self::Future {
        let customers = self.customers.clone();
        Box::pin(async move {
            let existing = find_customer(customers.as_ref(), req.customer_id).await?;
            let customer = customers
                .update_customer(existing.merge(req.patch))
                .await?;
            info!(customer_id = customer.id, "customer updated");
            Ok(customer)
        })
    }
}

impl<CU, CR> Service<DeleteCustomer> for DomainLogic<CU, CR>
where
    CU: CustomerPort + Send + Sync + 'static,
    CR: Send + Sync + 'static,
{
    type Response = ();
    type Error = Error;
    type Future = CommandFuture<()>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: DeleteCustomer) -> Self::Future {
        let customers = self.customers.clone();
        Box::pin(async move {
            let customer = find_customer(customers.as_ref(), req.customer_id).await?;
            customers.delete_customer(customer).await?;
            info!(customer_id = req.customer_id, "customer deleted");
            Ok(())
        })
    }
}
