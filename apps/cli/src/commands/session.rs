//! # Session Command
//!
//! Prints the session snapshot. The token itself is never printed.

use chrono::{DateTime, Utc};
use serde::Serialize;

use rewardcart_core::session::{Region, SessionState, UserProfile};

use crate::error::CliResult;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub signed_in: bool,
    pub user_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub expired: bool,
    pub profile: Option<UserProfile>,
    pub region: Region,
    pub wallet_balance: String,
}

impl SessionDto {
    pub fn from_state(state: &SessionState, now: DateTime<Utc>) -> Self {
        SessionDto {
            signed_in: state.is_signed_in(),
            user_id: state.auth.as_ref().map(|a| a.user_id.clone()),
            expires_at: state.auth.as_ref().and_then(|a| a.expires_at),
            expired: state.auth.as_ref().is_some_and(|a| a.is_expired(now)),
            profile: state.profile.clone(),
            region: state.region.clone(),
            wallet_balance: state.region.format(state.wallet_balance()),
        }
    }
}

pub fn run(state: &AppState) -> CliResult<SessionDto> {
    Ok(SessionDto::from_state(&state.session.snapshot(), Utc::now()))
}
