//! PostgreSQL adapter
//!
//! Uniqueness and referential integrity are enforced by the schema in `migrations/`; this module
//! only translates the resulting PostgreSQL error codes into port errors.

use std::time::Duration;

use crate::{
    config::DatabaseSettings,
    domain::{Address, Credit, Customer, NewCredit, NewCustomer, Status},
    ports::{
        credit::{self, CreditPort},
        customer::{self, CustomerPort},
    },
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{
    postgres::{PgPool, PgPoolOptions},
    FromRow,
};
use tracing::info;
use uuid::Uuid;

// https://www.postgresql.org/docs/current/errcodes-appendix.html
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

const CREDIT_COLUMNS: &str = r#"
    cr.id, cr.credit_code, cr.credit_value, cr.day_first_installment,
    cr.number_of_installments, cr.status,
    cu.id AS customer_id, cu.first_name, cu.last_name, cu.cpf, cu.email,
    cu.income, cu.password, cu.zip_code, cu.street
"#;

#[derive(Clone, Debug)]
pub struct PostgresDatabase {
    pool: PgPool,
}

impl PostgresDatabase {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool and bring the schema up to date
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, sqlx::Error> {
        info!(
            max_connections = settings.max_connections,
            "connecting to database"
        );
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
            .connect(&settings.url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("database ready");

        Ok(Self::new(pool))
    }
}

#[derive(FromRow)]
struct CustomerRow {
    id: i64,
    first_name: String,
    last_name: String,
    cpf: String,
    email: String,
    income: Decimal,
    password: String,
    zip_code: String,
    street: String,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            cpf: row.cpf,
            email: row.email,
            income: row.income,
            password: row.password,
            address: Address {
                zip_code: row.zip_code,
                street: row.street,
            },
        }
    }
}

/// A credit joined with its owner
#[derive(FromRow)]
struct CreditRow {
    id: i64,
    credit_code: Uuid,
    credit_value: Decimal,
    day_first_installment: NaiveDate,
    number_of_installments: i32,
    status: String,
    customer_id: i64,
    first_name: String,
    last_name: String,
    cpf: String,
    email: String,
    income: Decimal,
    password: String,
    zip_code: String,
    street: String,
}

impl TryFrom<CreditRow> for Credit {
    type Error = credit::Error;

    fn try_from(row: CreditRow) -> Result<Self, Self::Error> {
        let status = Status::parse(&row.status).ok_or_else(|| {
            credit::Error::Adapter(format!("unknown credit status {:?}", row.status).into())
        })?;
        let number_of_installments = u32::try_from(row.number_of_installments)
            .map_err(|err| credit::Error::Adapter(Box::new(err)))?;

        Ok(Credit {
            id: row.id,
            credit_code: row.credit_code,
            credit_value: row.credit_value,
            day_first_installment: row.day_first_installment,
            number_of_installments,
            status,
            customer: CustomerRow {
                id: row.customer_id,
                first_name: row.first_name,
                last_name: row.last_name,
                cpf: row.cpf,
                email: row.email,
                income: row.income,
                password: row.password,
                zip_code: row.zip_code,
                street: row.street,
            }
            .into(),
        })
    }
}

fn violates(err: &sqlx::Error, code: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(code),
        _ => false,
    }
}

fn database_message(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        _ => err.to_string(),
    }
}

/// Translate a failed credit insert into a port error
fn insert_credit_error(err: sqlx::Error, credit_code: Uuid, customer_id: i64) -> credit::Error {
    if violates(&err, UNIQUE_VIOLATION) {
        credit::Error::Conflict(credit_code)
    } else if violates(&err, FOREIGN_KEY_VIOLATION) {
        credit::Error::MissingCustomer(customer_id)
    } else if violates(&err, CHECK_VIOLATION) {
        credit::Error::InvalidTerms(database_message(&err))
    } else {
        err.into()
    }
}

#[async_trait::async_trait]
impl CustomerPort for PostgresDatabase {
    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, customer::Error> {
        let row: CustomerRow = sqlx::query_as(
            r#"
            INSERT INTO customers
                (first_name, last_name, cpf, email, income, password, zip_code, street)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, first_name, last_name, cpf, email, income, password, zip_code, street
            "#,
        )
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.cpf)
        .bind(&customer.email)
        .bind(customer.income)
        .bind(&customer.password)
        .bind(&customer.address.zip_code)
        .bind(&customer.address.street)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get_customer(&self, customer_id: i64) -> Result<Option<Customer>, customer::Error> {
        let row: Option<CustomerRow> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, cpf, email, income, password, zip_code, street
            FROM customers
            WHERE id = $1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn update_customer(&self, customer: Customer) -> Result<Customer, customer::Error> {
        let row: CustomerRow = sqlx::query_as(
            r#"
            UPDATE customers
            SET first_name = $2, last_name = $3, cpf = $4, email = $5, income = $6,
                password = $7, zip_code = $8, street = $9
            WHERE id = $1
            RETURNING id, first_name, last_name, cpf, email, income, password, zip_code, street
            "#,
        )
        .bind(customer.id)
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.cpf)
        .bind(&customer.email)
        .bind(customer.income)
        .bind(&customer.password)
        .bind(&customer.address.zip_code)
        .bind(&customer.address.street)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn delete_customer(&self, customer: Customer) -> Result<(), customer::Error> {
        sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(customer.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl CreditPort for PostgresDatabase {
    async fn insert_credit(&self, new_credit: NewCredit) -> Result<Credit, credit::Error> {
        if let Some(violation) = new_credit.terms_violation() {
            return Err(credit::Error::InvalidTerms(violation));
        }
        let credit_code = new_credit.credit_code.unwrap_or_else(Uuid::new_v4);
        let number_of_installments = i32::try_from(new_credit.number_of_installments)
            .map_err(|err| credit::Error::Adapter(Box::new(err)))?;

        let row: CreditRow = sqlx::query_as(&format!(
            r#"
            WITH cr AS (
                INSERT INTO credits (credit_code, credit_value, day_first_installment,
                                     number_of_installments, status, customer_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            SELECT {CREDIT_COLUMNS}
            FROM cr
            JOIN customers cu ON cu.id = cr.customer_id
            "#
        ))
        .bind(credit_code)
        .bind(new_credit.credit_value)
        .bind(new_credit.day_first_installment)
        .bind(number_of_installments)
        .bind(new_credit.status.as_str())
        .bind(new_credit.customer_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| insert_credit_error(err, credit_code, new_credit.customer_id))?;

        Credit::try_from(row)
    }

    async fn get_credit_by_code(
        &self,
        credit_code: Uuid,
    ) -> Result<Option<Credit>, credit::Error> {
        let row: Option<CreditRow> = sqlx::query_as(&format!(
            r#"
            SELECT {CREDIT_COLUMNS}
            FROM credits cr
            JOIN customers cu ON cu.id = cr.customer_id
            WHERE cr.credit_code = $1
            "#
        ))
        .bind(credit_code)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Credit::try_from).transpose()
    }

    async fn list_credits_by_customer(
        &self,
        customer_id: i64,
    ) -> Result<Vec<Credit>, credit::Error> {
        let rows: Vec<CreditRow> = sqlx::query_as(&format!(
            r#"
            SELECT {CREDIT_COLUMNS}
            FROM credits cr
            JOIN customers cu ON cu.id = cr.customer_id
            WHERE cr.customer_id = $1
            "#
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Credit::try_from).collect()
    }
}

impl From<sqlx::Error> for customer::Error {
    fn from(err: sqlx::Error) -> Self {
        if violates(&err, UNIQUE_VIOLATION) {
            return Self::Conflict(database_message(&err));
        }
        Self::Adapter(Box::new(err))
    }
}

impl From<sqlx::Error> for credit::Error {
    fn from(err: sqlx::Error) -> Self {
        Self::Adapter(Box::new(err))
    }
}
