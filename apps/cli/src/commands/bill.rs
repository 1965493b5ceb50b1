//! # Bill Commands
//!
//! ```text
//! rewardcart bill validate --amount 1499.50 --date 2024-06-15 --merchant "Big Bazaar"
//!                          [--bill-number INV-2024-001] [--notes "..."] [--cashback-bps 500]
//! ```
//!
//! All five fields are validated in one pass; the report lists every error.

use chrono::NaiveDate;
use serde::Serialize;

use rewardcart_core::validation::{validate_bill_form, validate_cashback_rate_bps};
use rewardcart_core::{BillFormData, BillFormValidation, CashbackRate, Money};

use crate::error::CliResult;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillReport {
    #[serde(flatten)]
    pub validation: BillFormValidation,

    /// Present when the form is valid and a rate was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cashback: Option<Money>,
}

pub fn validate(
    form: BillFormData,
    cashback_bps: Option<u32>,
    today: NaiveDate,
) -> CliResult<BillReport> {
    let rate = cashback_bps
        .map(validate_cashback_rate_bps)
        .transpose()?
        .map(CashbackRate::from_bps);

    let validation = validate_bill_form(&form, today);
    let estimated_cashback = rate
        .filter(|_| validation.is_valid)
        .and_then(|r| validation.estimated_cashback(r));

    Ok(BillReport {
        validation,
        estimated_cashback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewardcart_core::BillField;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 20).unwrap()
    }

    fn form(amount: &str, date: &str) -> BillFormData {
        BillFormData {
            amount: amount.into(),
            date: date.into(),
            merchant: "Big Bazaar".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_bill_with_cashback() {
        let report = validate(form("1499.50", "2024-06-15"), Some(500), today()).unwrap();

        assert!(report.validation.is_valid);
        assert_eq!(report.estimated_cashback, Some(Money::from_cents(7498)));
    }

    #[test]
    fn test_invalid_bill_has_no_estimate() {
        let report = validate(form("0.5", "2024-06-21"), Some(500), today()).unwrap();

        assert!(!report.validation.is_valid);
        assert!(report.validation.errors.get(BillField::Amount).is_some());
        assert!(report.validation.errors.get(BillField::Date).is_some());
        assert!(report.estimated_cashback.is_none());
    }

    #[test]
    fn test_rejects_out_of_range_rate() {
        assert!(validate(form("100", "2024-06-15"), Some(10_001), today()).is_err());
    }
}
