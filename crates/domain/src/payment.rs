//! Card payment details and their validation.
//!
//! The same rules run in the client before anything is sent and in the
//! reconciler when details are present on a request.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::order::PaymentMethod;

/// Card details as typed by the customer.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PaymentDetails {
    pub cardholder_name: String,
    pub card_number: String,
    /// `MM/YY`.
    pub expiration_date: String,
    pub cvv: String,
    pub billing_zip: String,
}

// Keeps card numbers and CVVs out of logs.
impl std::fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentDetails")
            .field("cardholder_name", &self.cardholder_name)
            .field("card_number", &format_args!("****{}", self.last4()))
            .field("expiration_date", &self.expiration_date)
            .field("cvv", &"***")
            .field("billing_zip", &self.billing_zip)
            .finish()
    }
}

impl PaymentDetails {
    fn digits(&self) -> String {
        self.card_number
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }

    /// Last four digits of the card number, or fewer if it is shorter.
    pub fn last4(&self) -> String {
        let digits: Vec<char> = self.digits().chars().collect();
        let start = digits.len().saturating_sub(4);
        digits[start..].iter().collect()
    }
}

const MISSING_DETAILS: &str =
    "Please complete all required payment information before placing your order.";

fn all_digits(s: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parses `MM/YY` into `(year, month)`.
fn parse_expiration(s: &str) -> Option<(i32, u32)> {
    let (mm, yy) = s.trim().split_once('/')?;
    if mm.len() != 2 || yy.len() != 2 || !all_digits(mm, 2, 2) || !all_digits(yy, 2, 2) {
        return None;
    }
    let month: u32 = mm.parse().ok()?;
    let year: i32 = yy.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((2000 + year, month))
}

/// Checks card details. The first failing rule wins.
///
/// A card expiring in the current month is still accepted.
pub fn validate_card(details: &PaymentDetails, today: NaiveDate) -> Result<(), ValidationError> {
    if details.cardholder_name.trim().chars().count() < 2 {
        return Err(ValidationError::new("Please enter cardholder name"));
    }

    if !all_digits(&details.digits(), 13, 19) {
        return Err(ValidationError::new(
            "Please enter a valid card number (13-19 digits)",
        ));
    }

    let Some(expiry) = parse_expiration(&details.expiration_date) else {
        return Err(ValidationError::new(
            "Please enter a valid expiration date (MM/YY)",
        ));
    };

    if !all_digits(details.cvv.trim(), 3, 4) {
        return Err(ValidationError::new("Please enter a valid CVV (3-4 digits)"));
    }

    if !all_digits(details.billing_zip.trim(), 5, 10) {
        return Err(ValidationError::new("Please enter a valid billing ZIP code"));
    }

    if expiry < (today.year(), today.month()) {
        return Err(ValidationError::new(
            "Card expiration date cannot be in the past",
        ));
    }

    Ok(())
}

/// Validates the payment section of a checkout.
///
/// Non-card methods need no details. Card methods require them.
pub fn validate_payment(
    method: PaymentMethod,
    details: Option<&PaymentDetails>,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    if !method.is_card() {
        return Ok(());
    }
    match details {
        Some(details) => validate_card(details, today),
        None => Err(ValidationError::new(MISSING_DETAILS)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn card() -> PaymentDetails {
        PaymentDetails {
            cardholder_name: "John Doe".to_string(),
            card_number: "4111 1111 1111 1111".to_string(),
            expiration_date: "12/27".to_string(),
            cvv: "123".to_string(),
            billing_zip: "97201".to_string(),
        }
    }

    fn message(details: &PaymentDetails) -> String {
        validate_card(details, today()).unwrap_err().to_string()
    }

    #[test]
    fn valid_card_passes() {
        assert!(validate_card(&card(), today()).is_ok());
    }

    #[test]
    fn expired_card_is_rejected() {
        let details = PaymentDetails {
            expiration_date: "01/24".to_string(),
            ..card()
        };
        assert_eq!(message(&details), "Card expiration date cannot be in the past");
    }

    #[test]
    fn current_month_is_accepted() {
        let details = PaymentDetails {
            expiration_date: "06/25".to_string(),
            ..card()
        };
        assert!(validate_card(&details, today()).is_ok());

        let last_month = PaymentDetails {
            expiration_date: "05/25".to_string(),
            ..card()
        };
        assert!(validate_card(&last_month, today()).is_err());
    }

    #[test]
    fn rules_are_checked_in_order() {
        let details = PaymentDetails {
            cardholder_name: "J".to_string(),
            card_number: "123".to_string(),
            ..card()
        };
        assert_eq!(message(&details), "Please enter cardholder name");

        let details = PaymentDetails {
            card_number: "4111-1111-1111-1111".to_string(),
            ..card()
        };
        assert_eq!(
            message(&details),
            "Please enter a valid card number (13-19 digits)"
        );

        let details = PaymentDetails {
            expiration_date: "13/27".to_string(),
            ..card()
        };
        assert_eq!(
            message(&details),
            "Please enter a valid expiration date (MM/YY)"
        );

        let details = PaymentDetails {
            cvv: "12".to_string(),
            ..card()
        };
        assert_eq!(message(&details), "Please enter a valid CVV (3-4 digits)");

        let details = PaymentDetails {
            billing_zip: "123".to_string(),
            ..card()
        };
        assert_eq!(message(&details), "Please enter a valid billing ZIP code");
    }

    #[test]
    fn malformed_expiration_shapes() {
        for bad in ["1/27", "12/2027", "ab/cd", "1227", "00/27"] {
            assert!(parse_expiration(bad).is_none(), "{bad}");
        }
        assert_eq!(parse_expiration("03/29"), Some((2029, 3)));
    }

    #[test]
    fn card_method_requires_details() {
        let err = validate_payment(PaymentMethod::CreditCard, None, today()).unwrap_err();
        assert_eq!(err.message(), MISSING_DETAILS);
        assert!(validate_payment(PaymentMethod::Paypal, None, today()).is_ok());
        assert!(validate_payment(PaymentMethod::DebitCard, Some(&card()), today()).is_ok());
    }

    #[test]
    fn debug_redacts_card() {
        let debug = format!("{:?}", card());
        assert!(!debug.contains("4111 1111 1111 1111"));
        assert!(!debug.contains("\"123\""));
        assert!(debug.contains("****1111"));
        assert_eq!(card().last4(), "1111");
    }
}
