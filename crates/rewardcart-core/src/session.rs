//! # Session State
//!
//! Everything the app knows about the signed-in shopper, as one immutable
//! value plus a pure reducer.
//!
//! ## State Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SessionState                                                           │
//! │  ├── auth:    Option<AuthSession>   user_id, token, expires_at          │
//! │  ├── profile: Option<UserProfile>   name, tier, wallet, lifetime       │
//! │  └── region:  Region                code, currency                      │
//! │                                                                         │
//! │  reduce(&state, action) ──► new state   (input never mutated)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store that owns the current snapshot lives in `rewardcart-sync`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// State
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user_id: String,
    /// Bearer token sent with every API request.
    pub token: String,
    #[ts(as = "Option<String>")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Loyalty tiers, lowest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyTier {
    #[default]
    Bronze,
    Silver,
    Gold,
    Platinum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub tier: LoyaltyTier,
    #[serde(default)]
    pub wallet_balance: Money,
    #[serde(default)]
    pub lifetime_cashback: Money,
}

/// Partial profile edit. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tier: Option<LoyaltyTier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub code: String,
    pub currency_code: String,
    pub currency_symbol: String,
}

impl Default for Region {
    fn default() -> Self {
        Region {
            code: "IN".to_string(),
            currency_code: "INR".to_string(),
            currency_symbol: "₹".to_string(),
        }
    }
}

impl Region {
    /// Renders an amount with this region's currency symbol.
    pub fn format(&self, amount: Money) -> String {
        if amount.is_negative() {
            format!("-{}{}", self.currency_symbol, Money::from_cents(-amount.cents()))
        } else {
            format!("{}{}", self.currency_symbol, amount)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub auth: Option<AuthSession>,
    pub profile: Option<UserProfile>,
    pub region: Region,
}

impl SessionState {
    pub fn is_signed_in(&self) -> bool {
        self.auth.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.auth.as_ref().map(|a| a.token.as_str())
    }

    pub fn wallet_balance(&self) -> Money {
        self.profile
            .as_ref()
            .map(|p| p.wallet_balance)
            .unwrap_or_default()
    }
}

// =============================================================================
// Actions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionAction {
    SignedIn { auth: AuthSession },
    SignedOut,
    ProfileLoaded { profile: UserProfile },
    ProfileUpdated { update: ProfileUpdate },
    /// Cashback approved for a bill or order.
    CashbackCredited { amount: Money },
    /// Wallet balance spent at checkout.
    WalletDebited { amount: Money },
    RegionChanged { region: Region },
    TokenRefreshed {
        token: String,
        #[ts(as = "Option<String>")]
        expires_at: Option<DateTime<Utc>>,
    },
}

// =============================================================================
// Reducer
// =============================================================================

/// Applies an action, returning the next state.
///
/// Actions that make no sense in the current state (a profile edit while
/// signed out, a token refresh with no session) leave the state unchanged.
/// A wallet debit larger than the balance, or a credit that would overflow
/// the wallet, is an error; see [`try_reduce`].
pub fn reduce(state: &SessionState, action: SessionAction) -> SessionState {
    try_reduce(state, action).unwrap_or_else(|_| state.clone())
}

/// Like [`reduce`], but reports rejected wallet updates.
pub fn try_reduce(state: &SessionState, action: SessionAction) -> CoreResult<SessionState> {
    let mut next = state.clone();

    match action {
        SessionAction::SignedIn { auth } => {
            // A different user must not inherit the previous profile.
            let same_user = state
                .auth
                .as_ref()
                .is_some_and(|current| current.user_id == auth.user_id);
            if !same_user {
                next.profile = None;
            }
            next.auth = Some(auth);
        }
        SessionAction::SignedOut => {
            next.auth = None;
            next.profile = None;
        }
        SessionAction::ProfileLoaded { profile } => {
            if next.auth.is_some() {
                next.profile = Some(profile);
            }
        }
        SessionAction::ProfileUpdated { update } => {
            if let Some(profile) = next.profile.as_mut() {
                if let Some(name) = update.name {
                    profile.name = name;
                }
                if let Some(email) = update.email {
                    profile.email = Some(email);
                }
                if let Some(phone) = update.phone {
                    profile.phone = Some(phone);
                }
                if let Some(tier) = update.tier {
                    profile.tier = tier;
                }
            }
        }
        SessionAction::CashbackCredited { amount } => {
            if let Some(profile) = next.profile.as_mut() {
                if amount.is_positive() {
                    profile.wallet_balance = profile
                        .wallet_balance
                        .checked_add(amount)
                        .ok_or(CoreError::AmountOverflow(amount))?;
                    profile.lifetime_cashback = profile
                        .lifetime_cashback
                        .checked_add(amount)
                        .ok_or(CoreError::AmountOverflow(amount))?;
                }
            }
        }
        SessionAction::WalletDebited { amount } => {
            if let Some(profile) = next.profile.as_mut() {
                if amount > profile.wallet_balance {
                    return Err(CoreError::InsufficientBalance {
                        available: profile.wallet_balance,
                        requested: amount,
                    });
                }
                if amount.is_positive() {
                    profile.wallet_balance = profile
                        .wallet_balance
                        .checked_sub(amount)
                        .ok_or(CoreError::AmountOverflow(amount))?;
                }
            }
        }
        SessionAction::RegionChanged { region } => {
            next.region = region;
        }
        SessionAction::TokenRefreshed { token, expires_at } => {
            if let Some(auth) = next.auth.as_mut() {
                auth.token = token;
                auth.expires_at = expires_at;
            }
        }
    }

    Ok(next)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(user: &str) -> AuthSession {
        AuthSession {
            user_id: user.to_string(),
            token: format!("tok-{user}"),
            expires_at: None,
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            name: "Asha".to_string(),
            email: Some("asha@example.com".to_string()),
            phone: None,
            tier: LoyaltyTier::Silver,
            wallet_balance: Money::from_cents(5000),
            lifetime_cashback: Money::from_cents(12000),
        }
    }

    fn signed_in() -> SessionState {
        let state = reduce(&SessionState::default(), SessionAction::SignedIn { auth: auth("u1") });
        reduce(&state, SessionAction::ProfileLoaded { profile: profile() })
    }

    #[test]
    fn test_sign_out_clears_auth_and_profile() {
        let state = signed_in();
        assert!(state.is_signed_in());

        let out = reduce(&state, SessionAction::SignedOut);
        assert!(out.auth.is_none());
        assert!(out.profile.is_none());
        assert_eq!(out.region, state.region);
    }

    #[test]
    fn test_reduce_does_not_mutate_input() {
        let state = signed_in();
        let before = state.clone();
        let _ = reduce(&state, SessionAction::SignedOut);
        assert_eq!(state, before);
    }

    #[test]
    fn test_cashback_credit() {
        let state = reduce(
            &signed_in(),
            SessionAction::CashbackCredited {
                amount: Money::from_cents(250),
            },
        );
        let profile = state.profile.unwrap();
        assert_eq!(profile.wallet_balance.cents(), 5250);
        assert_eq!(profile.lifetime_cashback.cents(), 12250);
    }

    #[test]
    fn test_wallet_debit() {
        let state = signed_in();
        let next = try_reduce(
            &state,
            SessionAction::WalletDebited {
                amount: Money::from_cents(2000),
            },
        )
        .unwrap();
        assert_eq!(next.wallet_balance().cents(), 3000);
        // Lifetime cashback is unaffected by spending
        assert_eq!(next.profile.unwrap().lifetime_cashback.cents(), 12000);

        let err = try_reduce(
            &state,
            SessionAction::WalletDebited {
                amount: Money::from_cents(9000),
            },
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InsufficientBalance { .. }));

        // reduce() keeps the old state on rejection
        let same = reduce(
            &state,
            SessionAction::WalletDebited {
                amount: Money::from_cents(9000),
            },
        );
        assert_eq!(same, state);
    }

    #[test]
    fn test_cashback_credit_overflow_is_rejected() {
        let state = signed_in();
        let credit = SessionAction::CashbackCredited {
            amount: Money::from_cents(i64::MAX),
        };

        let err = try_reduce(&state, credit.clone()).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow(_)));

        // reduce() keeps the old state
        assert_eq!(reduce(&state, credit), state);
    }

    #[test]
    fn test_profile_requires_session() {
        let state = reduce(
            &SessionState::default(),
            SessionAction::ProfileLoaded { profile: profile() },
        );
        assert!(state.profile.is_none());
    }

    #[test]
    fn test_switching_user_drops_profile() {
        let state = reduce(&signed_in(), SessionAction::SignedIn { auth: auth("u2") });
        assert_eq!(state.token(), Some("tok-u2"));
        assert!(state.profile.is_none());

        let refreshed = reduce(&signed_in(), SessionAction::SignedIn { auth: auth("u1") });
        assert!(refreshed.profile.is_some());
    }

    #[test]
    fn test_profile_update_and_token_refresh() {
        let state = reduce(
            &signed_in(),
            SessionAction::ProfileUpdated {
                update: ProfileUpdate {
                    phone: Some("+91 98765 43210".to_string()),
                    tier: Some(LoyaltyTier::Gold),
                    ..Default::default()
                },
            },
        );
        let profile = state.profile.clone().unwrap();
        assert_eq!(profile.name, "Asha");
        assert_eq!(profile.tier, LoyaltyTier::Gold);

        let state = reduce(
            &state,
            SessionAction::TokenRefreshed {
                token: "fresh".to_string(),
                expires_at: None,
            },
        );
        assert_eq!(state.token(), Some("fresh"));
    }

    #[test]
    fn test_region_format() {
        let region = Region::default();
        assert_eq!(region.format(Money::from_cents(129950)), "₹1299.50");
        assert_eq!(region.format(Money::from_cents(-50)), "-₹0.50");
    }

    #[test]
    fn test_token_expiry() {
        let now = Utc::now();
        let mut session = auth("u1");
        assert!(!session.is_expired(now));
        session.expires_at = Some(now - chrono::Duration::minutes(1));
        assert!(session.is_expired(now));
    }
}
