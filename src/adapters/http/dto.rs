//! Request and response bodies

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{is_valid_cpf, is_valid_email, FieldErrors};
use crate::domain::{
    Address, Credit, Customer, CustomerPatch, NewCredit, NewCustomer, Status, MAX_INSTALLMENTS,
};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub first_name: String,
    pub last_name: String,
    pub cpf: String,
    pub income: Decimal,
    pub email: String,
    pub password: String,
    pub zip_code: String,
    pub street: String,
}

impl CustomerDto {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.require_non_empty("firstName", &self.first_name);
        errors.require_non_empty("lastName", &self.last_name);
        if errors.require_non_empty("cpf", &self.cpf) && !is_valid_cpf(&self.cpf) {
            errors.add("cpf", "invalid cpf");
        }
        if errors.require_non_empty("email", &self.email) && !is_valid_email(&self.email) {
            errors.add("email", "invalid email");
        }
        errors.require_non_empty("password", &self.password);
        errors.require_non_empty("zipCode", &self.zip_code);
        errors.require_non_empty("street", &self.street);
        errors.into_result()
    }
}

impl From<CustomerDto> for NewCustomer {
    fn from(dto: CustomerDto) -> Self {
        NewCustomer {
            first_name: dto.first_name,
            last_name: dto.last_name,
            cpf: dto.cpf,
            email: dto.email,
            income: dto.income,
            password: dto.password,
            address: Address {
                zip_code: dto.zip_code,
                street: dto.street,
            },
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdateDto {
    pub first_name: String,
    pub last_name: String,
    pub income: Decimal,
    pub zip_code: String,
    pub street: String,
}

impl CustomerUpdateDto {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.require_non_empty("firstName", &self.first_name);
        errors.require_non_empty("lastName", &self.last_name);
        errors.require_non_empty("zipCode", &self.zip_code);
        errors.require_non_empty("street", &self.street);
        errors.into_result()
    }
}

impl From<CustomerUpdateDto> for CustomerPatch {
    fn from(dto: CustomerUpdateDto) -> Self {
        CustomerPatch {
            first_name: dto.first_name,
            last_name: dto.last_name,
            income: dto.income,
            zip_code: dto.zip_code,
            street: dto.street,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditDto {
    pub credit_value: Decimal,
    pub day_first_installment: NaiveDate,
    /// Signed so that negative input reaches validation instead of failing deserialization
    pub number_of_installments: i64,
    pub customer_id: i64,
}

impl CreditDto {
    /// `today` is the lower bound for the first installment
    ///
    /// The upper bound is a business rule and is checked by the credit command.
    pub fn validate(&self, today: NaiveDate) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if self.credit_value <= Decimal::ZERO {
            errors.add("creditValue", "creditValue must be positive");
        }
        if self.day_first_installment < today {
            errors.add(
                "dayFirstInstallment",
                "dayFirstInstallment must be a future or present date",
            );
        }
        if self.number_of_installments <= 0 {
            errors.add("numberOfInstallments", "numberOfInstallments must be positive");
        } else if self.number_of_installments > i64::from(MAX_INSTALLMENTS) {
            errors.add(
                "numberOfInstallments",
                format!("numberOfInstallments cannot be bigger than {MAX_INSTALLMENTS}"),
            );
        }
        errors.into_result()
    }

    /// Validate and convert into a credit request
    pub fn into_new_credit(self, today: NaiveDate) -> Result<NewCredit, FieldErrors> {
        self.validate(today)?;
        let number_of_installments = u32::try_from(self.number_of_installments).map_err(|_| {
            let mut errors = FieldErrors::default();
            errors.add("numberOfInstallments", "numberOfInstallments must be positive");
            errors
        })?;

        Ok(NewCredit::new(
            self.customer_id,
            self.credit_value,
            self.day_first_installment,
            number_of_installments,
        ))
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerView {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub cpf: String,
    pub income: Decimal,
    pub email: String,
    pub zip_code: String,
    pub street: String,
}

impl From<Customer> for CustomerView {
    fn from(customer: Customer) -> Self {
        CustomerView {
            id: customer.id,
            first_name: customer.first_name,
            last_name: customer.last_name,
            cpf: customer.cpf,
            income: customer.income,
            email: customer.email,
            zip_code: customer.address.zip_code,
            street: customer.address.street,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreditView {
    pub credit_code: Uuid,
    pub credit_value: Decimal,
    pub number_of_installments: u32,
    pub day_first_installment: NaiveDate,
}

impl From<Credit> for CreditView {
    fn from(credit: Credit) -> Self {
        CreditView {
            credit_code: credit.credit_code,
            credit_value: credit.credit_value,
            number_of_installments: credit.number_of_installments,
            day_first_installment: credit.day_first_installment,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ListCreditView {
    pub credits: Vec<CreditView>,
}

/// A credit as shown to its owner
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCreditView {
    pub credit_code: Uuid,
    pub credit_value: Decimal,
    pub number_of_installments: u32,
    pub status: Status,
    pub email_customer: String,
    pub income_customer: Decimal,
}

impl From<Credit> for CustomerCreditView {
    fn from(credit: Credit) -> Self {
        CustomerCreditView {
            credit_code: credit.credit_code,
            credit_value: credit.credit_value,
            number_of_installments: credit.number_of_installments,
            status: credit.status,
            email_customer: credit.customer.email,
            income_customer: credit.customer.income,
        }
    }
}

/// `customerId` query parameter
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerIdQuery {
    pub customer_id: i64,
}
