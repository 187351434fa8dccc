//! Field-level input checks, run before any command

use std::collections::BTreeMap;

use serde::Serialize;
use validator::ValidateEmail;

/// Field name to error message
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        // Keep the first failure for a field.
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }

    /// `Ok` when no error was recorded
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn require_non_empty(&mut self, field: &str, value: &str) -> bool {
        if value.is_empty() {
            self.add(field, format!("{field} cannot be empty"));
            return false;
        }
        true
    }
}

pub fn is_valid_email(value: &str) -> bool {
    value.validate_email()
}

/// Brazilian CPF check
///
/// Accepts the punctuated (`578.821.400-90`) and bare (`57882140090`) forms. The last two digits
/// are mod-11 check digits over the preceding ones; sequences of a single repeated digit pass the
/// arithmetic but are not valid numbers.
pub fn is_valid_cpf(value: &str) -> bool {
    if !has_cpf_shape(value) {
        return false;
    }
    let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    let check_digit = |len: usize| {
        let sum: u32 = digits[..len]
            .iter()
            .zip((2..=len as u32 + 1).rev())
            .map(|(digit, weight)| digit * weight)
            .sum();
        (sum * 10) % 11 % 10
    };

    check_digit(9) == digits[9] && check_digit(10) == digits[10]
}

/// `###.###.###-##` or eleven bare digits
fn has_cpf_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    match bytes.len() {
        11 => bytes.iter().all(u8::is_ascii_digit),
        14 => bytes.iter().enumerate().all(|(i, b)| match i {
            3 | 7 => *b == b'.',
            11 => *b == b'-',
            _ => b.is_ascii_digit(),
        }),
        _ => false,
    }
}
