use std::task::{Context, Poll};

use crate::{
    domain::{self, Credit, NewCredit},
    ports::{credit::CreditPort, customer::CustomerPort},
};
use chrono::{NaiveDate, Utc};
use tower::Service;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{customer::find_customer, CommandFuture, DomainLogic, Error};

/// Create a credit for an existing customer
pub struct SaveCredit(pub NewCredit);

/// Look up a credit on behalf of the customer claiming to own it
pub struct FindCredit {
    pub credit_code: Uuid,
    pub customer_id: i64,
}

pub struct ListCredits {
    pub customer_id: i64,
}

impl<CU, CR> Service<SaveCredit> for DomainLogic<CU, CR>
where
    CU: CustomerPort + Send + Sync + 'static,
    CR: CreditPort + Send + Sync + 'static,
{
    type Response = Credit;
    type Error = Error;
    type Future = CommandFuture<Credit>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: SaveCredit) -> Self::Future {
        let customers = self.customers.clone();
        let credits = self.credits.clone();
        Box::pin(async move {
            let new_credit = req.0;

            // The owner must exist before anything else is checked
            let customer = find_customer(customers.as_ref(), new_credit.customer_id).await?;

            validate_first_installment(new_credit.day_first_installment, today())?;

            let credit = credits
                .insert_credit(NewCredit {
                    customer_id: customer.id,
                    ..new_credit
                })
                .await?;
            info!(
                credit_code = %credit.credit_code,
                customer_id = credit.customer.id,
                "credit saved"
            );
            Ok(credit)
        })
    }
}

impl<CU, CR> Service<FindCredit> for DomainLogic<CU, CR>
where
    CU: Send + Sync + 'static,
    CR: CreditPort + Send + Sync + 'static,
{
    type Response = Credit;
    type Error = Error;
    type Future = CommandFuture<Credit>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: FindCredit) -> Self::Future {
        let credits = self.credits.clone();
        Box::pin(async move {
            debug!(credit_code = %req.credit_code, customer_id = req.customer_id, "finding credit");
            let credit = credits
                .get_credit_by_code(req.credit_code)
                .await?
                .ok_or_else(|| {
                    Error::NotFound(format!("Credit code {} not found", req.credit_code).into())
                })?;

            if credit.customer.id != req.customer_id {
                warn!(
                    credit_code = %req.credit_code,
                    customer_id = req.customer_id,
                    "credit requested by a customer who does not own it"
                );
                return Err(Error::AuthorizationMismatch);
            }

            Ok(credit)
        })
    }
}

/// No existence check is made on the customer, so unknown ids yield an empty list.
impl<CU, CR> Service<ListCredits> for DomainLogic<CU, CR>
where
    CU: Send + Sync + 'static,
    CR: CreditPort + Send + Sync + 'static,
{
    type Response = Vec<Credit>;
    type Error = Error;
    type Future = CommandFuture<Vec<Credit>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ListCredits) -> Self::Future {
        let credits = self.credits.clone();
        Box::pin(async move {
            debug!(customer_id = req.customer_id, "listing credits");
            Ok(credits.list_credits_by_customer(req.customer_id).await?)
        })
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn validate_first_installment(
    day_first_installment: NaiveDate,
    today: NaiveDate,
) -> Result<(), Error> {
    if domain::is_within_installment_window(day_first_installment, today) {
        return Ok(());
    }

    warn!(
        %day_first_installment,
        deadline = %domain::first_installment_deadline(today),
        "first installment outside of the allowed window"
    );
    Err(Error::InvalidInstallmentDate)
}
