//! # Domain Types
//!
//! Core domain types used throughout RewardCart.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  BillFormData   │   │  CartOperation  │   │ QueuedOperation │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  amount (text)  │   │  AddItem        │   │  seq (FIFO)     │       │
//! │  │  date (text)    │──►│  UpdateQuantity │──►│  id (UUID)      │       │
//! │  │  merchant       │   │  RemoveItem     │   │  payload (JSON) │       │
//! │  │  bill_number    │   │  ApplyCoupon    │   │  status         │       │
//! │  │  notes          │   │  RemoveCoupon   │   │  attempts       │       │
//! │  └─────────────────┘   │  ClearCart      │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ BillFormValid.  │   │   QueueStatus   │   │ CartSyncState   │       │
//! │  │  is_valid       │   │  Pending        │   │  is_syncing     │       │
//! │  │  errors         │   │  Failed         │   │  pending / fail │       │
//! │  │  values         │   │  Synced         │   │  is_online      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Form inputs stay as raw text until validation turns them into typed values.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{CashbackRate, Money};
use crate::validation;

// =============================================================================
// Bill Form
// =============================================================================

/// Raw bill upload form, exactly as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillFormData {
    pub amount: String,
    pub date: String,
    pub merchant: String,
    #[serde(default)]
    pub bill_number: String,
    #[serde(default)]
    pub notes: String,
}

/// The fields of the bill form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum BillField {
    Amount,
    Date,
    Merchant,
    BillNumber,
    Notes,
}

impl BillField {
    /// Label used in validation messages.
    pub const fn label(&self) -> &'static str {
        match self {
            BillField::Amount => "Amount",
            BillField::Date => "Bill date",
            BillField::Merchant => "Merchant name",
            BillField::BillNumber => "Bill number",
            BillField::Notes => "Notes",
        }
    }

    pub const ALL: [BillField; 5] = [
        BillField::Amount,
        BillField::Date,
        BillField::Merchant,
        BillField::BillNumber,
        BillField::Notes,
    ];
}

/// Outcome of validating a single field, shaped for the UI boundary.
///
/// Internally validators return `Result<T, ValidationError>`; this is the
/// serialized `{ isValid, error, value }` form of the same thing.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation<T> {
    pub is_valid: bool,
    pub error: Option<String>,
    pub value: Option<T>,
}

impl<T> From<Result<T, ValidationError>> for FieldValidation<T> {
    fn from(result: Result<T, ValidationError>) -> Self {
        match result {
            Ok(value) => FieldValidation {
                is_valid: true,
                error: None,
                value: Some(value),
            },
            Err(err) => FieldValidation {
                is_valid: false,
                error: Some(err.to_string()),
                value: None,
            },
        }
    }
}

/// Per-field error messages. `None` means the field passed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillFormErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BillFormErrors {
    pub fn get(&self, field: BillField) -> Option<&str> {
        match field {
            BillField::Amount => self.amount.as_deref(),
            BillField::Date => self.date.as_deref(),
            BillField::Merchant => self.merchant.as_deref(),
            BillField::BillNumber => self.bill_number.as_deref(),
            BillField::Notes => self.notes.as_deref(),
        }
    }

    pub fn set(&mut self, field: BillField, message: String) {
        let slot = match field {
            BillField::Amount => &mut self.amount,
            BillField::Date => &mut self.date,
            BillField::Merchant => &mut self.merchant,
            BillField::BillNumber => &mut self.bill_number,
            BillField::Notes => &mut self.notes,
        };
        *slot = Some(message);
    }

    pub fn is_empty(&self) -> bool {
        BillField::ALL.iter().all(|f| self.get(*f).is_none())
    }

    /// Number of fields with an error.
    pub fn count(&self) -> usize {
        BillField::ALL.iter().filter(|f| self.get(**f).is_some()).count()
    }
}

/// Normalized values of every field that passed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillFormValues {
    pub amount: Option<Money>,
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
    pub merchant: Option<String>,
    pub bill_number: Option<String>,
    pub notes: Option<String>,
}

/// Result of validating the whole bill form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillFormValidation {
    pub is_valid: bool,
    pub errors: BillFormErrors,
    pub values: BillFormValues,
}

impl BillFormValidation {
    /// Estimated cashback for a valid amount at the given rate.
    pub fn estimated_cashback(&self, rate: CashbackRate) -> Option<Money> {
        self.values.amount.map(|amount| amount.cashback(rate))
    }
}

// =============================================================================
// Cart Operations
// =============================================================================

/// A cart mutation that can be applied locally and replayed on the server.
///
/// Stored in the offline queue as internally tagged JSON:
/// `{"type":"add_item","product_id":"p-1","quantity":2,"variant_id":null}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartOperation {
    AddItem {
        product_id: String,
        quantity: i64,
        #[serde(default)]
        variant_id: Option<String>,
    },
    UpdateQuantity {
        product_id: String,
        quantity: i64,
    },
    RemoveItem {
        product_id: String,
    },
    ApplyCoupon {
        code: String,
    },
    RemoveCoupon,
    ClearCart,
}

impl CartOperation {
    pub fn kind(&self) -> CartOperationKind {
        match self {
            CartOperation::AddItem { .. } => CartOperationKind::AddItem,
            CartOperation::UpdateQuantity { .. } => CartOperationKind::UpdateQuantity,
            CartOperation::RemoveItem { .. } => CartOperationKind::RemoveItem,
            CartOperation::ApplyCoupon { .. } => CartOperationKind::ApplyCoupon,
            CartOperation::RemoveCoupon => CartOperationKind::RemoveCoupon,
            CartOperation::ClearCart => CartOperationKind::ClearCart,
        }
    }

    /// Checks the operation's fields and returns it with trimmed ids and
    /// an upper-cased coupon code, the form that gets queued and replayed.
    pub fn normalized(self) -> Result<CartOperation, ValidationError> {
        Ok(match self {
            CartOperation::AddItem {
                product_id,
                quantity,
                variant_id,
            } => CartOperation::AddItem {
                product_id: validation::validate_product_id(&product_id)?,
                quantity: validation::validate_quantity(quantity)?,
                variant_id: variant_id
                    .as_deref()
                    .map(validation::validate_variant_id)
                    .transpose()?,
            },
            CartOperation::UpdateQuantity {
                product_id,
                quantity,
            } => CartOperation::UpdateQuantity {
                product_id: validation::validate_product_id(&product_id)?,
                quantity: validation::validate_quantity(quantity)?,
            },
            CartOperation::RemoveItem { product_id } => CartOperation::RemoveItem {
                product_id: validation::validate_product_id(&product_id)?,
            },
            CartOperation::ApplyCoupon { code } => CartOperation::ApplyCoupon {
                code: validation::validate_coupon_code(&code)?,
            },
            op @ (CartOperation::RemoveCoupon | CartOperation::ClearCart) => op,
        })
    }

    /// Serializes the operation for the queue's payload column.
    pub fn to_payload(&self) -> CoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_payload(payload: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Short human-readable description for logs and CLI output.
    pub fn describe(&self) -> String {
        match self {
            CartOperation::AddItem {
                product_id,
                quantity,
                variant_id: Some(variant),
            } => format!("add {quantity} x {product_id} ({variant})"),
            CartOperation::AddItem {
                product_id,
                quantity,
                variant_id: None,
            } => format!("add {quantity} x {product_id}"),
            CartOperation::UpdateQuantity {
                product_id,
                quantity,
            } => format!("set {product_id} to {quantity}"),
            CartOperation::RemoveItem { product_id } => format!("remove {product_id}"),
            CartOperation::ApplyCoupon { code } => format!("apply coupon {code}"),
            CartOperation::RemoveCoupon => "remove coupon".to_string(),
            CartOperation::ClearCart => "clear cart".to_string(),
        }
    }
}

/// Discriminant of [`CartOperation`], stored in its own column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CartOperationKind {
    AddItem,
    UpdateQuantity,
    RemoveItem,
    ApplyCoupon,
    RemoveCoupon,
    ClearCart,
}

impl CartOperationKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CartOperationKind::AddItem => "add_item",
            CartOperationKind::UpdateQuantity => "update_quantity",
            CartOperationKind::RemoveItem => "remove_item",
            CartOperationKind::ApplyCoupon => "apply_coupon",
            CartOperationKind::RemoveCoupon => "remove_coupon",
            CartOperationKind::ClearCart => "clear_cart",
        }
    }
}

// =============================================================================
// Offline Queue
// =============================================================================

/// Lifecycle of a queued cart operation.
///
/// ```text
///   enqueue ──► Pending ──success──► Synced
///                 │  ▲
///   attempts hit  │  │ reset_failed (retry)
///   limit / 4xx   ▼  │
///                Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Pending,
    Failed,
    Synced,
}

/// One row of the offline queue.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct QueuedOperation {
    /// Insertion order; replay follows it strictly.
    pub seq: i64,

    /// Unique identifier (UUID v4).
    pub id: String,

    pub kind: CartOperationKind,

    /// JSON of the [`CartOperation`].
    pub payload: String,

    pub status: QueueStatus,

    /// Failed delivery attempts so far.
    pub attempts: i64,

    pub last_error: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub attempted_at: Option<DateTime<Utc>>,

    #[ts(as = "Option<String>")]
    pub synced_at: Option<DateTime<Utc>>,
}

impl QueuedOperation {
    /// Decodes the stored payload.
    pub fn operation(&self) -> CoreResult<CartOperation> {
        let op = CartOperation::from_payload(&self.payload)?;
        if op.kind() != self.kind {
            return Err(CoreError::InvalidPayload(format!(
                "payload is {} but row kind is {}",
                op.kind().as_str(),
                self.kind.as_str()
            )));
        }
        Ok(op)
    }
}

// =============================================================================
// Sync Status
// =============================================================================

/// Observable state of the cart sync controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartSyncState {
    pub is_syncing: bool,
    pub sync_error: Option<String>,
    pub pending_operations: i64,
    pub failed_operations: i64,
    pub is_online: bool,
    #[ts(as = "Option<String>")]
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// Coarse status for badges and indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatusLabel {
    Syncing,
    Offline,
    Error,
    Pending,
    Synced,
}

impl SyncStatusLabel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SyncStatusLabel::Syncing => "syncing",
            SyncStatusLabel::Offline => "offline",
            SyncStatusLabel::Error => "error",
            SyncStatusLabel::Pending => "pending",
            SyncStatusLabel::Synced => "synced",
        }
    }
}

impl CartSyncState {
    /// First matching label wins: syncing, offline, error, pending, synced.
    pub fn status_label(&self) -> SyncStatusLabel {
        if self.is_syncing {
            SyncStatusLabel::Syncing
        } else if !self.is_online {
            SyncStatusLabel::Offline
        } else if self.sync_error.is_some() || self.failed_operations > 0 {
            SyncStatusLabel::Error
        } else if self.pending_operations > 0 {
            SyncStatusLabel::Pending
        } else {
            SyncStatusLabel::Synced
        }
    }

    pub fn status_message(&self) -> String {
        match self.status_label() {
            SyncStatusLabel::Syncing => "Syncing cart...".to_string(),
            SyncStatusLabel::Offline if self.pending_operations > 0 => format!(
                "Offline - {} will sync when you're back online",
                changes(self.pending_operations)
            ),
            SyncStatusLabel::Offline => "Offline".to_string(),
            SyncStatusLabel::Error => match &self.sync_error {
                Some(err) => err.clone(),
                None => format!("{} failed to sync", changes(self.failed_operations)),
            },
            SyncStatusLabel::Pending => {
                format!("{} waiting to sync", changes(self.pending_operations))
            }
            SyncStatusLabel::Synced => "All changes synced".to_string(),
        }
    }
}

fn changes(n: i64) -> String {
    if n == 1 {
        "1 change".to_string()
    } else {
        format!("{n} changes")
    }
}

// =============================================================================
// Search
// =============================================================================

/// A product returned by search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductHit {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    pub price: Money,
    pub cashback_rate: CashbackRate,
    pub image_url: Option<String>,
}

impl ProductHit {
    pub fn estimated_cashback(&self) -> Money {
        self.price.cashback(self.cashback_rate)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_operation_wire_format() {
        let op = CartOperation::AddItem {
            product_id: "p-1".to_string(),
            quantity: 2,
            variant_id: None,
        };
        let json = op.to_payload().unwrap();
        assert!(json.contains("\"type\":\"add_item\""));
        assert!(json.contains("\"product_id\":\"p-1\""));

        let unit = CartOperation::ClearCart.to_payload().unwrap();
        assert_eq!(unit, r#"{"type":"clear_cart"}"#);
    }

    #[test]
    fn test_payload_without_optional_variant() {
        let op = CartOperation::from_payload(
            r#"{"type":"add_item","product_id":"p-9","quantity":1}"#,
        )
        .unwrap();
        assert_eq!(op.kind(), CartOperationKind::AddItem);
        assert_eq!(op.describe(), "add 1 x p-9");
    }

    #[test]
    fn test_garbage_payload_is_invalid() {
        let err = CartOperation::from_payload("{not json").unwrap_err();
        assert!(matches!(err, CoreError::InvalidPayload(_)));
    }

    #[test]
    fn test_cart_operation_normalized() {
        assert!(CartOperation::UpdateQuantity {
            product_id: "p-1".into(),
            quantity: 0,
        }
        .normalized()
        .is_err());
        assert!(CartOperation::ApplyCoupon { code: "x".into() }
            .normalized()
            .is_err());
        assert_eq!(
            CartOperation::ApplyCoupon {
                code: " save10 ".into()
            }
            .normalized()
            .unwrap(),
            CartOperation::ApplyCoupon {
                code: "SAVE10".into()
            }
        );
        assert_eq!(
            CartOperation::AddItem {
                product_id: " p-1 ".into(),
                quantity: 2,
                variant_id: Some(" v-red ".into()),
            }
            .normalized()
            .unwrap(),
            CartOperation::AddItem {
                product_id: "p-1".into(),
                quantity: 2,
                variant_id: Some("v-red".into()),
            }
        );
        assert_eq!(
            CartOperation::ClearCart.normalized().unwrap(),
            CartOperation::ClearCart
        );
    }

    #[test]
    fn test_queued_operation_kind_mismatch() {
        let row = QueuedOperation {
            seq: 1,
            id: "a".into(),
            kind: CartOperationKind::ClearCart,
            payload: r#"{"type":"remove_coupon"}"#.into(),
            status: QueueStatus::Pending,
            attempts: 0,
            last_error: None,
            created_at: Utc::now(),
            attempted_at: None,
            synced_at: None,
        };
        assert!(row.operation().is_err());
    }

    #[test]
    fn test_form_errors_accessors() {
        let mut errors = BillFormErrors::default();
        assert!(errors.is_empty());
        errors.set(BillField::Date, "Bill date is required".into());
        assert_eq!(errors.get(BillField::Date), Some("Bill date is required"));
        assert_eq!(errors.count(), 1);
    }

    #[test]
    fn test_field_validation_from_result() {
        let ok: FieldValidation<i64> = Ok(5).into();
        assert!(ok.is_valid);
        assert_eq!(ok.value, Some(5));

        let err: FieldValidation<i64> = Err(ValidationError::Required {
            field: "Amount".into(),
        })
        .into();
        assert!(!err.is_valid);
        assert_eq!(err.error.as_deref(), Some("Amount is required"));
    }

    #[test]
    fn test_sync_status_label_priority() {
        let mut state = CartSyncState {
            is_online: true,
            ..Default::default()
        };
        assert_eq!(state.status_label(), SyncStatusLabel::Synced);
        assert_eq!(state.status_message(), "All changes synced");

        state.pending_operations = 3;
        assert_eq!(state.status_label(), SyncStatusLabel::Pending);
        assert_eq!(state.status_message(), "3 changes waiting to sync");

        state.sync_error = Some("Failed to sync 1 operations".into());
        assert_eq!(state.status_label(), SyncStatusLabel::Error);

        state.is_online = false;
        state.pending_operations = 2;
        assert_eq!(state.status_label(), SyncStatusLabel::Offline);
        assert_eq!(
            state.status_message(),
            "Offline - 2 changes will sync when you're back online"
        );

        state.is_syncing = true;
        assert_eq!(state.status_label(), SyncStatusLabel::Syncing);
    }

    #[test]
    fn test_product_cashback() {
        let hit = ProductHit {
            id: "p".into(),
            name: "Rice 5kg".into(),
            brand: None,
            price: Money::from_cents(45000),
            cashback_rate: CashbackRate::from_bps(500),
            image_url: None,
        };
        assert_eq!(hit.estimated_cashback().cents(), 2250);
    }
}
