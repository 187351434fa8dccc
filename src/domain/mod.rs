use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of calendar months, counted from today, in which the first installment must fall
pub const FIRST_INSTALLMENT_WINDOW_MONTHS: u32 = 3;

/// Maximum number of installments for a single credit
pub const MAX_INSTALLMENTS: u32 = 48;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    pub zip_code: String,
    pub street: String,
}

/// A registered customer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Customer {
    /// Identifier assigned by the store
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Brazilian tax id, unique across customers
    pub cpf: String,
    /// Unique across customers
    pub email: String,
    pub income: Decimal,
    /// Stored as received.
    pub password: String,
    pub address: Address,
}

impl Customer {
    /// Apply a partial update
    ///
    /// Only names, income and address can change after registration. Everything else, including
    /// the identifier, is carried over from `self`.
    pub fn merge(self, patch: CustomerPatch) -> Self {
        Self {
            first_name: patch.first_name,
            last_name: patch.last_name,
            income: patch.income,
            address: Address {
                zip_code: patch.zip_code,
                street: patch.street,
            },
            ..self
        }
    }
}

/// Customer data before the store assigns an identifier
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub cpf: String,
    pub email: String,
    pub income: Decimal,
    pub password: String,
    pub address: Address,
}

impl NewCustomer {
    pub fn into_customer(self, id: i64) -> Customer {
        Customer {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            cpf: self.cpf,
            email: self.email,
            income: self.income,
            password: self.password,
            address: self.address,
        }
    }
}

/// Whitelisted fields for [`Customer::merge`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomerPatch {
    pub first_name: String,
    pub last_name: String,
    pub income: Decimal,
    pub zip_code: String,
    pub street: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    InProgress,
    Approved,
    Reject,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::InProgress => "IN_PROGRESS",
            Status::Approved => "APPROVED",
            Status::Reject => "REJECT",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "IN_PROGRESS" => Some(Status::InProgress),
            "APPROVED" => Some(Status::Approved),
            "REJECT" => Some(Status::Reject),
            _ => None,
        }
    }
}

/// A credit as persisted, with its owner resolved
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credit {
    pub id: i64,
    /// External lookup key
    ///
    /// The numeric `id` never leaves the service; clients only ever see this code.
    pub credit_code: Uuid,
    pub credit_value: Decimal,
    pub day_first_installment: NaiveDate,
    pub number_of_installments: u32,
    pub status: Status,
    pub customer: Customer,
}

/// Credit request before the store persists it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCredit {
    /// Pre-assigned code
    ///
    /// The store generates one when this is `None`.
    pub credit_code: Option<Uuid>,
    pub credit_value: Decimal,
    pub day_first_installment: NaiveDate,
    pub number_of_installments: u32,
    pub status: Status,
    /// Declared owner, resolved before saving
    pub customer_id: i64,
}

impl NewCredit {
    pub fn new(
        customer_id: i64,
        credit_value: Decimal,
        day_first_installment: NaiveDate,
        number_of_installments: u32,
    ) -> Self {
        Self {
            credit_code: None,
            credit_value,
            day_first_installment,
            number_of_installments,
            status: Status::default(),
            customer_id,
        }
    }

    /// First data rule the credit breaks, if any
    ///
    /// The value must be positive and the installments between 1 and [`MAX_INSTALLMENTS`].
    pub fn terms_violation(&self) -> Option<String> {
        if self.credit_value <= Decimal::ZERO {
            return Some(format!("credit value {} must be positive", self.credit_value));
        }
        if !(1..=MAX_INSTALLMENTS).contains(&self.number_of_installments) {
            return Some(format!(
                "number of installments {} must be between 1 and {MAX_INSTALLMENTS}",
                self.number_of_installments
            ));
        }
        None
    }

    pub fn into_credit(self, id: i64, credit_code: Uuid, customer: Customer) -> Credit {
        Credit {
            id,
            credit_code,
            credit_value: self.credit_value,
            day_first_installment: self.day_first_installment,
            number_of_installments: self.number_of_installments,
            status: self.status,
            customer,
        }
    }
}

/// First day on which a first installment is no longer accepted
///
/// Month arithmetic clamps to the end of the target month, so November 30th yields the last day
/// of February.
pub fn first_installment_deadline(today: NaiveDate) -> NaiveDate {
    today
        .checked_add_months(Months::new(FIRST_INSTALLMENT_WINDOW_MONTHS))
        .unwrap_or(NaiveDate::MAX)
}

pub fn is_within_installment_window(day_first_installment: NaiveDate, today: NaiveDate) -> bool {
    day_first_installment < first_installment_deadline(today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use rust_decimal_macros::dec;
    use speculoos::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[fixture]
    fn customer() -> Customer {
        Customer {
            id: 7,
            first_name: "Lucas".to_string(),
            last_name: "Santos".to_string(),
            cpf: "578.821.400-90".to_string(),
            email: "lucas@test.com".to_string(),
            income: dec!(10000.0),
            password: "12345".to_string(),
            address: Address {
                zip_code: "12345".to_string(),
                street: "Rua do Lucas".to_string(),
            },
        }
    }

    #[rstest]
    fn test_merge_only_touches_whitelisted_fields(customer: Customer) {
        // GIVEN an existing customer and a patch
        let patch = CustomerPatch {
            first_name: "Lucas".to_string(),
            last_name: "Ferreira".to_string(),
            income: dec!(5000000.0),
            zip_code: "00000".to_string(),
            street: "Rua Ferreira".to_string(),
        };

        // WHEN merging
        let merged = customer.clone().merge(patch);

        // THEN names, income and address change; identity and credentials do not
        assert_that!(merged.id).is_equal_to(customer.id);
        assert_that!(merged.cpf).is_equal_to(customer.cpf);
        assert_that!(merged.email).is_equal_to(customer.email);
        assert_that!(merged.password).is_equal_to(customer.password);
        assert_that!(merged.last_name.as_str()).is_equal_to("Ferreira");
        assert_that!(merged.income).is_equal_to(dec!(5000000.0));
        assert_that!(merged.address).is_equal_to(Address {
            zip_code: "00000".to_string(),
            street: "Rua Ferreira".to_string(),
        });
    }

    #[rstest]
    #[case(dec!(10000.0), 4, true)]
    #[case(dec!(0.01), 1, true)]
    #[case(dec!(10), 48, true)]
    #[case(dec!(0), 4, false)]
    #[case(dec!(-5), 4, false)]
    #[case(dec!(10), 0, false)]
    #[case(dec!(10), 49, false)]
    fn test_terms_violation(
        #[case] credit_value: Decimal,
        #[case] number_of_installments: u32,
        #[case] valid: bool,
    ) {
        let credit = NewCredit::new(1, credit_value, date(2024, 1, 15), number_of_installments);

        assert_that!(credit.terms_violation().is_none()).is_equal_to(valid);
    }

    #[rstest]
    #[case(date(2024, 1, 15), date(2024, 4, 15))]
    #[case(date(2023, 11, 30), date(2024, 2, 29))]
    #[case(date(2024, 11, 30), date(2025, 2, 28))]
    #[case(date(2024, 10, 31), date(2025, 1, 31))]
    fn test_first_installment_deadline(#[case] today: NaiveDate, #[case] expected: NaiveDate) {
        assert_that!(first_installment_deadline(today)).is_equal_to(expected);
    }

    #[rstest]
    #[case(date(2024, 1, 15), true)]
    #[case(date(2024, 4, 14), true)]
    #[case(date(2024, 4, 15), false)]
    #[case(date(2024, 5, 15), false)]
    fn test_installment_window(#[case] day_first_installment: NaiveDate, #[case] expected: bool) {
        let today = date(2024, 1, 15);

        assert_that!(is_within_installment_window(day_first_installment, today))
            .is_equal_to(expected);
    }

    #[rstest]
    #[case(Status::InProgress)]
    #[case(Status::Approved)]
    #[case(Status::Reject)]
    fn test_status_str(#[case] status: Status) {
        assert_that!(Status::parse(status.as_str())).is_some().is_equal_to(status);
    }

    #[test]
    fn test_status_default() {
        assert_that!(Status::default()).is_equal_to(Status::InProgress);
    }
}
