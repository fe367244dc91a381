//! Account Resolver
//!
//! Finds the brokerage account the engine trades in.

use crate::application::ports::{BrokerError, BrokerPort};

/// Resolve the first account number.
///
/// The user profile is consulted first; when it fails or lists no accounts
/// the accounts endpoint is used instead.
pub async fn resolve_account<B: BrokerPort + ?Sized>(broker: &B) -> Result<String, BrokerError> {
    match broker.get_profile_accounts().await {
        Ok(accounts) => {
            if let Some(account) = accounts.into_iter().next() {
                return Ok(account.account_number);
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Profile lookup failed, falling back to accounts listing");
        }
    }

    broker
        .list_accounts()
        .await?
        .into_iter()
        .next()
        .map(|a| a.account_number)
        .ok_or_else(|| BrokerError::Unknown {
            message: "No brokerage account found".to_string(),
        })
}
