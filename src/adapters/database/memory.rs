use crate::{
    domain::{Credit, Customer, NewCredit, NewCustomer},
    ports::{
        credit::{self, CreditPort},
        customer::{self, CustomerPort},
    },
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use uuid::Uuid;

/// In-memory store for customers and credits
///
/// Enforces the same constraints as the relational schema: unique cpf, email and credit code,
/// credit value and installment ranges, credits referencing an existing customer, and credits
/// removed along with their owner.
#[derive(Clone, Debug, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    customers: HashMap<i64, Customer>,
    /// Credits keyed by code; the owner is stored by id and joined on read.
    credits: HashMap<Uuid, StoredCredit>,
    last_customer_id: i64,
    last_credit_id: i64,
}

#[derive(Debug)]
struct StoredCredit {
    id: i64,
    credit: NewCredit,
}

impl State {
    fn resolve(&self, stored: &StoredCredit, credit_code: Uuid) -> Option<Credit> {
        let customer = self.customers.get(&stored.credit.customer_id)?.clone();
        Some(stored.credit.clone().into_credit(stored.id, credit_code, customer))
    }

    fn check_unique(&self, candidate: &Customer) -> Result<(), customer::Error> {
        for other in self.customers.values().filter(|other| other.id != candidate.id) {
            if other.cpf == candidate.cpf {
                return Err(customer::Error::Conflict(format!(
                    "cpf {} already registered",
                    candidate.cpf
                )));
            }
            if other.email == candidate.email {
                return Err(customer::Error::Conflict(format!(
                    "email {} already registered",
                    candidate.email
                )));
            }
        }
        Ok(())
    }
}

impl MemoryDatabase {
    fn lock(&self) -> Result<MutexGuard<'_, State>, ErasedPoisonError> {
        self.state.lock().map_err(ErasedPoisonError::from)
    }
}

#[async_trait::async_trait]
impl CustomerPort for MemoryDatabase {
    async fn insert_customer(
        &self,
        new_customer: NewCustomer,
    ) -> Result<Customer, customer::Error> {
        let mut state = self.lock()?;
        let customer = new_customer.into_customer(state.last_customer_id + 1);
        state.check_unique(&customer)?;

        state.last_customer_id = customer.id;
        state.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn get_customer(&self, customer_id: i64) -> Result<Option<Customer>, customer::Error> {
        Ok(self.lock()?.customers.get(&customer_id).cloned())
    }

    async fn update_customer(&self, customer: Customer) -> Result<Customer, customer::Error> {
        let mut state = self.lock()?;
        if !state.customers.contains_key(&customer.id) {
            return Err(customer::Error::Adapter(
                format!("customer {} is not stored", customer.id).into(),
            ));
        }
        state.check_unique(&customer)?;

        state.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn delete_customer(&self, customer: Customer) -> Result<(), customer::Error> {
        let mut state = self.lock()?;
        state.customers.remove(&customer.id);
        state
            .credits
            .retain(|_, stored| stored.credit.customer_id != customer.id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl CreditPort for MemoryDatabase {
    async fn insert_credit(&self, new_credit: NewCredit) -> Result<Credit, credit::Error> {
        if let Some(violation) = new_credit.terms_violation() {
            return Err(credit::Error::InvalidTerms(violation));
        }
        let mut state = self.lock()?;
        let credit_code = new_credit.credit_code.unwrap_or_else(Uuid::new_v4);
        if state.credits.contains_key(&credit_code) {
            return Err(credit::Error::Conflict(credit_code));
        }
        let Some(customer) = state.customers.get(&new_credit.customer_id).cloned() else {
            return Err(credit::Error::MissingCustomer(new_credit.customer_id));
        };

        state.last_credit_id += 1;
        let id = state.last_credit_id;
        state.credits.insert(
            credit_code,
            StoredCredit {
                id,
                credit: NewCredit {
                    credit_code: Some(credit_code),
                    ..new_credit.clone()
                },
            },
        );
        Ok(new_credit.into_credit(id, credit_code, customer))
    }

    async fn get_credit_by_code(
        &self,
        credit_code: Uuid,
    ) -> Result<Option<Credit>, credit::Error> {
        let state = self.lock()?;
        Ok(state
            .credits
            .get(&credit_code)
            .and_then(|stored| state.resolve(stored, credit_code)))
    }

    async fn list_credits_by_customer(
        &self,
        customer_id: i64,
    ) -> Result<Vec<Credit>, credit::Error> {
        let state = self.lock()?;
        Ok(state
            .credits
            .iter()
            .filter(|(_, stored)| stored.credit.customer_id == customer_id)
            .filter_map(|(code, stored)| state.resolve(stored, *code))
            .collect())
    }
}

/// Erased [`PoisonError`]
///
/// `PoisonError` keeps the `MutexGuard` internally, which is not send. Thus we erase the error
/// and only keep the string representation instead.
#[derive(Debug, thiserror::Error)]
#[error("poison error: {0}")]
pub struct ErasedPoisonError(String);

impl<T> From<PoisonError<T>> for ErasedPoisonError {
    fn from(err: PoisonError<T>) -> Self {
        Self(err.to_string())
    }
}

impl From<ErasedPoisonError> for customer::Error {
    fn from(err: ErasedPoisonError) -> Self {
        Self::Adapter(Box::new(err))
    }
}

impl From<ErasedPoisonError> for credit::Error {
    fn from(err: ErasedPoisonError) -> Self {
        Self::Adapter(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, Status};
    use chrono::NaiveDate;
    use rstest::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use speculoos::prelude::*;
    use tower::BoxError;

    fn new_customer(cpf: &str, email: &str) -> NewCustomer {
        NewCustomer {
            first_name: "Lucas".to_string(),
            last_name: "Santos".to_string(),
            cpf: cpf.to_string(),
            email: email.to_string(),
            income: dec!(10000.0),
            password: "12345".to_string(),
            address: Address {
                zip_code: "12345".to_string(),
                street: "Rua do Lucas".to_string(),
            },
        }
    }

    fn new_credit(customer_id: i64, credit_code: Option<Uuid>) -> NewCredit {
        NewCredit {
            credit_code,
            ..NewCredit::new(
                customer_id,
                dec!(10000.0),
                NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                4,
            )
        }
    }

    #[fixture]
    fn database() -> MemoryDatabase {
        MemoryDatabase::default()
    }

    #[rstest]
    #[tokio::test]
    async fn test_insert_assigns_sequential_ids(database: MemoryDatabase) -> Result<(), BoxError> {
        let first = database
            .insert_customer(new_customer("578.821.400-90", "lucas@test.com"))
            .await?;
        let second = database
            .insert_customer(new_customer("004.339.580-57", "another@test.com"))
            .await?;

        assert_that!(first.id).is_equal_to(1);
        assert_that!(second.id).is_equal_to(2);
        Ok(())
    }

    #[rstest]
    #[case("578.821.400-90", "lucas2@test.com")]
    #[case("836.157.550-22", "lucas@test.com")]
    #[tokio::test]
    async fn test_insert_duplicate_customer(
        database: MemoryDatabase,
        #[case] cpf: &str,
        #[case] email: &str,
    ) -> Result<(), BoxError> {
        // GIVEN a stored customer
        database
            .insert_customer(new_customer("578.821.400-90", "lucas@test.com"))
            .await?;

        // WHEN inserting a customer sharing the cpf or the email
        let res = database.insert_customer(new_customer(cpf, email)).await;

        // THEN it is rejected as a conflict
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, customer::Error::Conflict(_)));
        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_keeps_own_unique_fields(database: MemoryDatabase) -> Result<(), BoxError> {
        let mut customer = database
            .insert_customer(new_customer("578.821.400-90", "lucas@test.com"))
            .await?;
        customer.last_name = "Ferreira".to_string();

        let res = database.update_customer(customer.clone()).await;

        assert_that!(res).is_ok().is_equal_to(&customer);
        let stored = database.get_customer(customer.id).await?;
        assert_that!(stored).is_some().is_equal_to(&customer);
        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_credit_generated_code(database: MemoryDatabase) -> Result<(), BoxError> {
        // GIVEN a stored customer
        let customer = database
            .insert_customer(new_customer("578.821.400-90", "lucas@test.com"))
            .await?;

        // WHEN inserting a credit without a code
        let credit = database.insert_credit(new_credit(customer.id, None)).await?;

        // THEN a code is generated and the credit can be found with it
        assert_that!(credit.credit_code.is_nil()).is_false();
        assert_that!(credit.status).is_equal_to(Status::InProgress);
        let found = database.get_credit_by_code(credit.credit_code).await?;
        assert_that!(found).is_some().is_equal_to(&credit);
        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_credit_duplicate_code(database: MemoryDatabase) -> Result<(), BoxError> {
        let customer = database
            .insert_customer(new_customer("578.821.400-90", "lucas@test.com"))
            .await?;
        let code = Uuid::parse_str("65becc00-9d9b-4080-a8d2-88bd154580f1")?;
        database
            .insert_credit(new_credit(customer.id, Some(code)))
            .await?;

        let res = database.insert_credit(new_credit(customer.id, Some(code))).await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, credit::Error::Conflict(c) if *c == code));
        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_credit_missing_customer(database: MemoryDatabase) {
        let res = database.insert_credit(new_credit(99, None)).await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, credit::Error::MissingCustomer(99)));
    }

    #[rstest]
    #[case(dec!(-5), 4)]
    #[case(dec!(0), 4)]
    #[case(dec!(10), 0)]
    #[case(dec!(10), 49)]
    #[case(dec!(10), 500)]
    #[tokio::test]
    async fn test_credit_invalid_terms(
        database: MemoryDatabase,
        #[case] credit_value: Decimal,
        #[case] number_of_installments: u32,
    ) -> Result<(), BoxError> {
        // GIVEN a stored customer
        let customer = database
            .insert_customer(new_customer("578.821.400-90", "lucas@test.com"))
            .await?;

        // WHEN inserting a credit with out of range terms
        let res = database
            .insert_credit(NewCredit {
                credit_value,
                number_of_installments,
                ..new_credit(customer.id, None)
            })
            .await;

        // THEN it is rejected and nothing is stored
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, credit::Error::InvalidTerms(_)));
        assert_that!(database.list_credits_by_customer(customer.id).await?).has_length(0);
        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_unknown_credit_code(database: MemoryDatabase) -> Result<(), BoxError> {
        let code = Uuid::parse_str("119b1eff-8d8d-4e24-8978-3e9bf8617763")?;

        let res = database.get_credit_by_code(code).await?;

        assert_that!(res).is_none();
        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_list_by_customer(database: MemoryDatabase) -> Result<(), BoxError> {
        // GIVEN two customers with credits
        let customer = database
            .insert_customer(new_customer("578.821.400-90", "lucas@test.com"))
            .await?;
        let another = database
            .insert_customer(new_customer("004.339.580-57", "another@test.com"))
            .await?;
        let first = database.insert_credit(new_credit(customer.id, None)).await?;
        let second = database.insert_credit(new_credit(customer.id, None)).await?;
        let other = database.insert_credit(new_credit(another.id, None)).await?;

        // WHEN listing the first customer's credits
        let credits = database.list_credits_by_customer(customer.id).await?;

        // THEN only their credits are returned
        assert_that!(credits).has_length(2);
        assert_that!(credits).contains(&first);
        assert_that!(credits).contains(&second);
        assert_that!(credits).does_not_contain(&other);
        // An unknown customer simply has no credits
        let credits = database.list_credits_by_customer(-1).await?;
        assert_that!(credits).has_length(0);
        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_cascades(database: MemoryDatabase) -> Result<(), BoxError> {
        // GIVEN a customer with a credit
        let customer = database
            .insert_customer(new_customer("578.821.400-90", "lucas@test.com"))
            .await?;
        let credit = database.insert_credit(new_credit(customer.id, None)).await?;

        // WHEN deleting the customer
        database.delete_customer(customer.clone()).await?;

        // THEN the customer and its credits are gone
        assert_that!(database.get_customer(customer.id).await?).is_none();
        assert_that!(database.get_credit_by_code(credit.credit_code).await?).is_none();
        assert_that!(database.list_credits_by_customer(customer.id).await?).has_length(0);
        Ok(())
    }
}
