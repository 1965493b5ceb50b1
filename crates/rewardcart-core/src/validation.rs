//! # Validation Module
//!
//! Field-level and whole-form validation for RewardCart inputs.
//!
//! ## Validation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Bill Upload Form                                   │
//! │                                                                         │
//! │  raw text ──► trim ──► required? ──► parse ──► range/length ──► value  │
//! │                           │            │             │                  │
//! │                           ▼            ▼             ▼                  │
//! │                     ValidationError (Display = inline field message)   │
//! │                                                                         │
//! │  validate_bill_form runs ALL five field validators and collects        │
//! │  every error, so the user sees every problem at once.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function here is pure. The current date is passed in, never read.
//!
//! ## Usage
//! ```rust
//! use rewardcart_core::validation::{validate_amount, validate_bill_number};
//!
//! assert_eq!(validate_amount("1000").unwrap().cents(), 100_000);
//! assert!(validate_amount("0.5").is_err());
//! assert_eq!(validate_bill_number("").unwrap(), None);
//! ```

use chrono::{DateTime, NaiveDate};

use crate::error::ValidationError;
use crate::money::{Money, ParseMoneyError};
use crate::types::{BillField, BillFormData, BillFormErrors, BillFormValidation, BillFormValues};
use crate::{MAX_BILL_AGE_DAYS, MAX_BILL_AMOUNT_CENTS, MAX_ITEM_QUANTITY, MIN_BILL_AMOUNT_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MERCHANT_MIN_CHARS: usize = 2;
const MERCHANT_MAX_CHARS: usize = 100;
const BILL_NUMBER_MIN_CHARS: usize = 3;
const BILL_NUMBER_MAX_CHARS: usize = 50;
const NOTES_MAX_CHARS: usize = 500;
const PRODUCT_ID_MAX_CHARS: usize = 64;
const COUPON_MIN_CHARS: usize = 3;
const COUPON_MAX_CHARS: usize = 20;
const SEARCH_QUERY_MAX_CHARS: usize = 100;

fn required(field: BillField) -> ValidationError {
    ValidationError::Required {
        field: field.label().to_string(),
    }
}

// =============================================================================
// Bill Form Field Validators
// =============================================================================

/// Validates the bill amount typed by the user.
///
/// ## Rules
/// - Required
/// - Plain decimal number, at most 2 decimal places
/// - Between 1.00 and 1,000,000.00 inclusive
///
/// ## Example
/// ```rust
/// use rewardcart_core::validation::validate_amount;
///
/// assert_eq!(validate_amount("1000").unwrap().to_string(), "1000.00");
/// assert!(validate_amount("1000000.01").is_err());
/// assert!(validate_amount("12.345").is_err());
/// ```
pub fn validate_amount(raw: &str) -> ValidationResult<Money> {
    let field = BillField::Amount.label().to_string();

    let amount = Money::parse_decimal(raw).map_err(|err| match err {
        ParseMoneyError::Empty => ValidationError::Required {
            field: field.clone(),
        },
        ParseMoneyError::NotANumber => ValidationError::NotANumber {
            field: field.clone(),
        },
        ParseMoneyError::TooManyDecimals { max } => ValidationError::TooManyDecimals {
            field: field.clone(),
            max,
        },
        ParseMoneyError::Overflow => ValidationError::AboveMaximum {
            field: field.clone(),
            max: Money::from_cents(MAX_BILL_AMOUNT_CENTS),
        },
    })?;

    check_amount_range(amount, field)
}

/// Validates an amount that arrived as a number rather than text.
///
/// The value goes through its shortest decimal rendering, so `12.5` is
/// treated exactly like the text `"12.5"`.
pub fn validate_amount_value(value: f64) -> ValidationResult<Money> {
    if !value.is_finite() {
        return Err(ValidationError::NotANumber {
            field: BillField::Amount.label().to_string(),
        });
    }
    validate_amount(&value.to_string())
}

fn check_amount_range(amount: Money, field: String) -> ValidationResult<Money> {
    if amount.cents() < MIN_BILL_AMOUNT_CENTS {
        return Err(ValidationError::BelowMinimum {
            field,
            min: Money::from_cents(MIN_BILL_AMOUNT_CENTS),
        });
    }

    if amount.cents() > MAX_BILL_AMOUNT_CENTS {
        return Err(ValidationError::AboveMaximum {
            field,
            max: Money::from_cents(MAX_BILL_AMOUNT_CENTS),
        });
    }

    Ok(amount)
}

/// Validates the bill date against `today`.
///
/// ## Rules
/// - Required
/// - Not after `today`
/// - At most 30 days before `today` (day 30 itself is accepted)
pub fn validate_bill_date(date: Option<NaiveDate>, today: NaiveDate) -> ValidationResult<NaiveDate> {
    let field = BillField::Date.label().to_string();
    let date = date.ok_or_else(|| required(BillField::Date))?;

    if date > today {
        return Err(ValidationError::FutureDate { field });
    }

    if (today - date).num_days() > MAX_BILL_AGE_DAYS {
        return Err(ValidationError::TooOld {
            field,
            max_days: MAX_BILL_AGE_DAYS,
        });
    }

    Ok(date)
}

/// Parses and validates a bill date given as text.
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp. A timestamp is reduced
/// to its calendar date in its own offset, dropping the time of day.
///
/// ```rust
/// use chrono::NaiveDate;
/// use rewardcart_core::validation::validate_bill_date_str;
///
/// let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
/// assert!(validate_bill_date_str("2024-06-15T23:59:00+05:30", today).is_ok());
/// assert!(validate_bill_date_str("15/06/2024", today).is_err());
/// ```
pub fn validate_bill_date_str(raw: &str, today: NaiveDate) -> ValidationResult<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(required(BillField::Date));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: BillField::Date.label().to_string(),
            reason: "must be a date like 2024-06-15".to_string(),
        })?;

    validate_bill_date(Some(date), today)
}

/// Validates the merchant name.
///
/// ## Rules
/// - Required
/// - 2 to 100 characters after trimming
///
/// ## Returns
/// The trimmed name.
pub fn validate_merchant(raw: &str) -> ValidationResult<String> {
    let field = BillField::Merchant.label().to_string();
    let merchant = raw.trim();

    if merchant.is_empty() {
        return Err(required(BillField::Merchant));
    }

    let chars = merchant.chars().count();
    if chars < MERCHANT_MIN_CHARS {
        return Err(ValidationError::TooShort {
            field,
            min: MERCHANT_MIN_CHARS,
        });
    }
    if chars > MERCHANT_MAX_CHARS {
        return Err(ValidationError::TooLong {
            field,
            max: MERCHANT_MAX_CHARS,
        });
    }

    Ok(merchant.to_string())
}

/// Validates the optional bill number.
///
/// ## Rules
/// - Empty is valid and yields `None`
/// - 3 to 50 characters
/// - Letters, digits, `-`, `_` and `/` only
///
/// ## Example
/// ```rust
/// use rewardcart_core::validation::validate_bill_number;
///
/// assert_eq!(validate_bill_number("INV-2024-001").unwrap().as_deref(), Some("INV-2024-001"));
/// assert!(validate_bill_number("AB").is_err());
/// assert!(validate_bill_number("INV #1").is_err());
/// ```
pub fn validate_bill_number(raw: &str) -> ValidationResult<Option<String>> {
    let field = BillField::BillNumber.label().to_string();
    let number = raw.trim();

    if number.is_empty() {
        return Ok(None);
    }

    let chars = number.chars().count();
    if chars < BILL_NUMBER_MIN_CHARS {
        return Err(ValidationError::TooShort {
            field,
            min: BILL_NUMBER_MIN_CHARS,
        });
    }
    if chars > BILL_NUMBER_MAX_CHARS {
        return Err(ValidationError::TooLong {
            field,
            max: BILL_NUMBER_MAX_CHARS,
        });
    }

    if !number
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '/'))
    {
        return Err(ValidationError::InvalidFormat {
            field,
            reason: "must contain only letters, numbers, hyphens, underscores and slashes"
                .to_string(),
        });
    }

    Ok(Some(number.to_string()))
}

/// Validates the optional free-text notes (at most 500 characters).
pub fn validate_notes(raw: &str) -> ValidationResult<Option<String>> {
    let notes = raw.trim();

    if notes.is_empty() {
        return Ok(None);
    }

    if notes.chars().count() > NOTES_MAX_CHARS {
        return Err(ValidationError::TooLong {
            field: BillField::Notes.label().to_string(),
            max: NOTES_MAX_CHARS,
        });
    }

    Ok(Some(notes.to_string()))
}

// =============================================================================
// Whole-Form Validation
// =============================================================================

/// Validates every field of the bill form.
///
/// Never stops at the first problem: each field is checked independently,
/// failures land in `errors` and successes in `values`.
///
/// ```text
///   amount ──► validate_amount ───────┐
///   date ────► validate_bill_date_str ┤
///   merchant ► validate_merchant ─────┼──► BillFormValidation
///   bill_no ─► validate_bill_number ──┤      { is_valid, errors, values }
///   notes ───► validate_notes ────────┘
/// ```
pub fn validate_bill_form(form: &BillFormData, today: NaiveDate) -> BillFormValidation {
    let mut errors = BillFormErrors::default();
    let mut values = BillFormValues::default();

    match validate_amount(&form.amount) {
        Ok(amount) => values.amount = Some(amount),
        Err(err) => errors.set(BillField::Amount, err.to_string()),
    }

    match validate_bill_date_str(&form.date, today) {
        Ok(date) => values.date = Some(date),
        Err(err) => errors.set(BillField::Date, err.to_string()),
    }

    match validate_merchant(&form.merchant) {
        Ok(merchant) => values.merchant = Some(merchant),
        Err(err) => errors.set(BillField::Merchant, err.to_string()),
    }

    match validate_bill_number(&form.bill_number) {
        Ok(number) => values.bill_number = number,
        Err(err) => errors.set(BillField::BillNumber, err.to_string()),
    }

    match validate_notes(&form.notes) {
        Ok(notes) => values.notes = notes,
        Err(err) => errors.set(BillField::Notes, err.to_string()),
    }

    BillFormValidation {
        is_valid: errors.is_empty(),
        errors,
        values,
    }
}

// =============================================================================
// Cart & Search Validators
// =============================================================================

/// Validates a cart quantity (1 to 999).
pub fn validate_quantity(qty: i64) -> ValidationResult<i64> {
    if !(1..=MAX_ITEM_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "Quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(qty)
}

fn validate_identifier(raw: &str, field: &str) -> ValidationResult<String> {
    let id = raw.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.chars().count() > PRODUCT_ID_MAX_CHARS {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: PRODUCT_ID_MAX_CHARS,
        });
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(id.to_string())
}

/// Validates a product identifier. It ends up in a URL path, so only
/// URL-safe characters are allowed.
pub fn validate_product_id(raw: &str) -> ValidationResult<String> {
    validate_identifier(raw, "Product")
}

pub fn validate_variant_id(raw: &str) -> ValidationResult<String> {
    validate_identifier(raw, "Variant")
}

/// Validates a coupon code.
///
/// ## Rules
/// - 3 to 20 ASCII letters or digits
///
/// ## Returns
/// The code, upper-cased.
pub fn validate_coupon_code(raw: &str) -> ValidationResult<String> {
    let field = "Coupon code".to_string();
    let code = raw.trim();

    if code.is_empty() {
        return Err(ValidationError::Required { field });
    }

    let chars = code.chars().count();
    if chars < COUPON_MIN_CHARS {
        return Err(ValidationError::TooShort {
            field,
            min: COUPON_MIN_CHARS,
        });
    }
    if chars > COUPON_MAX_CHARS {
        return Err(ValidationError::TooLong {
            field,
            max: COUPON_MAX_CHARS,
        });
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field,
            reason: "must contain only letters and numbers".to_string(),
        });
    }

    Ok(code.to_ascii_uppercase())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (clears results)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > SEARCH_QUERY_MAX_CHARS {
        return Err(ValidationError::TooLong {
            field: "Search query".to_string(),
            max: SEARCH_QUERY_MAX_CHARS,
        });
    }

    Ok(query.to_string())
}

/// Validates a cashback rate in basis points (0% to 100%).
pub fn validate_cashback_rate_bps(bps: u32) -> ValidationResult<u32> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "Cashback rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(bps)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn valid_form() -> BillFormData {
        BillFormData {
            amount: "1299.50".into(),
            date: "2024-06-14".into(),
            merchant: "Fresh Mart".into(),
            bill_number: "INV-2024-001".into(),
            notes: "Weekly groceries".into(),
        }
    }

    #[test]
    fn test_validate_amount_bounds() {
        assert_eq!(validate_amount("1000").unwrap(), Money::from_cents(100_000));
        assert_eq!(validate_amount("1").unwrap(), Money::from_cents(100));
        assert_eq!(
            validate_amount("1000000").unwrap(),
            Money::from_cents(100_000_000)
        );

        assert_eq!(
            validate_amount("0.5").unwrap_err().to_string(),
            "Amount must be at least 1.00"
        );
        assert_eq!(
            validate_amount("1000000.01").unwrap_err().to_string(),
            "Amount cannot exceed 1000000.00"
        );
        assert!(matches!(
            validate_amount("-20"),
            Err(ValidationError::BelowMinimum { .. })
        ));
    }

    #[test]
    fn test_validate_amount_format() {
        assert_eq!(
            validate_amount("").unwrap_err().to_string(),
            "Amount is required"
        );
        assert_eq!(
            validate_amount("12abc").unwrap_err().to_string(),
            "Amount must be a valid number"
        );
        assert_eq!(
            validate_amount("12.345").unwrap_err().to_string(),
            "Amount can have at most 2 decimal places"
        );
        assert!(matches!(
            validate_amount("123456789012345678901234"),
            Err(ValidationError::AboveMaximum { .. })
        ));
    }

    #[test]
    fn test_validate_amount_value() {
        assert_eq!(validate_amount_value(12.5).unwrap().cents(), 1250);
        assert_eq!(validate_amount_value(1000.0).unwrap().cents(), 100_000);
        assert!(validate_amount_value(f64::NAN).is_err());
        assert!(validate_amount_value(f64::INFINITY).is_err());
        assert!(validate_amount_value(10.123).is_err());
    }

    #[test]
    fn test_validate_bill_date_window() {
        let today = today();
        assert_eq!(validate_bill_date(Some(today), today).unwrap(), today);

        let tomorrow = today.succ_opt().unwrap();
        assert_eq!(
            validate_bill_date(Some(tomorrow), today)
                .unwrap_err()
                .to_string(),
            "Bill date cannot be in the future"
        );

        let thirty = today - chrono::Duration::days(30);
        assert!(validate_bill_date(Some(thirty), today).is_ok());

        let thirty_one = today - chrono::Duration::days(31);
        assert_eq!(
            validate_bill_date(Some(thirty_one), today)
                .unwrap_err()
                .to_string(),
            "Bill date cannot be older than 30 days"
        );

        assert!(matches!(
            validate_bill_date(None, today),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_bill_date_str_formats() {
        let today = today();
        assert_eq!(
            validate_bill_date_str(" 2024-06-10 ", today).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
        );
        assert_eq!(
            validate_bill_date_str("2024-06-10T18:30:00Z", today).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
        );
        assert!(matches!(
            validate_bill_date_str("yesterday", today),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            validate_bill_date_str("", today),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_merchant() {
        assert_eq!(validate_merchant("  Fresh Mart ").unwrap(), "Fresh Mart");
        assert!(matches!(
            validate_merchant("A"),
            Err(ValidationError::TooShort { min: 2, .. })
        ));
        assert!(validate_merchant(&"M".repeat(100)).is_ok());
        assert!(validate_merchant(&"M".repeat(101)).is_err());
        // Lengths count characters, not bytes
        assert!(validate_merchant("मॉल").is_ok());
        assert_eq!(
            validate_merchant("   ").unwrap_err().to_string(),
            "Merchant name is required"
        );
    }

    #[test]
    fn test_validate_bill_number() {
        assert_eq!(validate_bill_number("").unwrap(), None);
        assert_eq!(validate_bill_number("   ").unwrap(), None);
        assert_eq!(
            validate_bill_number("INV-2024-001").unwrap().as_deref(),
            Some("INV-2024-001")
        );
        assert!(validate_bill_number("A/B_C").is_ok());
        assert!(matches!(
            validate_bill_number("AB"),
            Err(ValidationError::TooShort { .. })
        ));
        assert!(matches!(
            validate_bill_number(&"9".repeat(51)),
            Err(ValidationError::TooLong { .. })
        ));
        assert!(matches!(
            validate_bill_number("INV#2024"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_validate_notes() {
        assert_eq!(validate_notes("").unwrap(), None);
        assert_eq!(validate_notes(" ok ").unwrap().as_deref(), Some("ok"));
        assert!(validate_notes(&"n".repeat(500)).is_ok());
        assert!(validate_notes(&"n".repeat(501)).is_err());
    }

    #[test]
    fn test_validate_bill_form_valid() {
        let result = validate_bill_form(&valid_form(), today());
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert_eq!(result.values.amount, Some(Money::from_cents(129_950)));
        assert_eq!(result.values.merchant.as_deref(), Some("Fresh Mart"));
        assert_eq!(result.values.notes.as_deref(), Some("Weekly groceries"));
    }

    #[test]
    fn test_validate_bill_form_reports_all_errors() {
        let form = BillFormData {
            amount: "0.10".into(),
            date: "2024-07-01".into(),
            ..valid_form()
        };
        let result = validate_bill_form(&form, today());

        assert!(!result.is_valid);
        assert_eq!(result.errors.count(), 2);
        assert_eq!(
            result.errors.amount.as_deref(),
            Some("Amount must be at least 1.00")
        );
        assert_eq!(
            result.errors.date.as_deref(),
            Some("Bill date cannot be in the future")
        );
        // Fields that passed still carry their values
        assert_eq!(result.values.merchant.as_deref(), Some("Fresh Mart"));
        assert!(result.values.amount.is_none());
    }

    #[test]
    fn test_validate_bill_form_empty() {
        let result = validate_bill_form(&BillFormData::default(), today());
        assert!(!result.is_valid);
        assert_eq!(result.errors.count(), 3);
        assert!(result.errors.bill_number.is_none());
        assert!(result.errors.notes.is_none());
    }

    #[test]
    fn test_validators_are_idempotent() {
        let form = BillFormData {
            amount: "abc".into(),
            ..valid_form()
        };
        assert_eq!(
            validate_bill_form(&form, today()),
            validate_bill_form(&form, today())
        );
        assert_eq!(validate_amount("99.9"), validate_amount("99.9"));
    }

    #[test]
    fn test_cart_validators() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(1000).is_err());

        assert_eq!(validate_product_id(" sku_42 ").unwrap(), "sku_42");
        assert!(validate_product_id("a/b").is_err());
        assert!(validate_product_id("").is_err());

        assert_eq!(validate_coupon_code("save10").unwrap(), "SAVE10");
        assert!(validate_coupon_code("AB").is_err());
        assert!(validate_coupon_code("SAVE-10").is_err());
    }

    #[test]
    fn test_search_and_rate() {
        assert_eq!(validate_search_query("  rice ").unwrap(), "rice");
        assert!(validate_search_query(&"q".repeat(101)).is_err());
        assert!(validate_cashback_rate_bps(10000).is_ok());
        assert!(validate_cashback_rate_bps(10001).is_err());
    }
}
