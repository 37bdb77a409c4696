//! Append-only ledger of token-affecting events.
//!
//! The original design stored the balance as a mutable counter on the user
//! row; here every debit, refund, and admin grant is an immutable event and
//! the balance is a recomputable projection. Checked debits happen in a
//! single store call, so two concurrent applies cannot both pass a balance
//! check before either spends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::UserId;

/// What a ledger event does to the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenEntry {
    /// Consume one token.
    Debit,
    /// Return one token.
    Credit,
    /// Replace the balance outright (admin plan activation).
    Set(u32),
}

/// Why a ledger event was appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenReason {
    JobApplication,
    ApplicantAccepted,
    AcceptanceReverted,
    PlanActivation,
}

/// One immutable row in a user's token history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEvent {
    pub user: UserId,
    pub entry: TokenEntry,
    pub reason: TokenReason,
    pub at: DateTime<Utc>,
}

impl TokenEvent {
    pub fn new(user: UserId, entry: TokenEntry, reason: TokenReason) -> Self {
        Self {
            user,
            entry,
            reason,
            at: Utc::now(),
        }
    }
}

/// Fold a user's event history into their current balance. `Set` replaces the
/// running total; credits and debits saturate rather than wrap.
pub fn project_balance<'a, I>(events: I) -> u32
where
    I: IntoIterator<Item = &'a TokenEvent>,
{
    events.into_iter().fold(0u32, |balance, event| match event.entry {
        TokenEntry::Debit => balance.saturating_sub(1),
        TokenEntry::Credit => balance.saturating_add(1),
        TokenEntry::Set(count) => count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(entry: TokenEntry) -> TokenEvent {
        TokenEvent::new(UserId(7), entry, TokenReason::PlanActivation)
    }

    #[test]
    fn set_replaces_the_running_balance() {
        let events = [
            event(TokenEntry::Credit),
            event(TokenEntry::Credit),
            event(TokenEntry::Set(15)),
            event(TokenEntry::Debit),
        ];
        assert_eq!(project_balance(&events), 14);
    }

    #[test]
    fn debits_saturate_at_zero() {
        let events = [event(TokenEntry::Debit), event(TokenEntry::Credit)];
        assert_eq!(project_balance(&events), 1);
    }

    #[test]
    fn empty_history_projects_to_zero() {
        assert_eq!(project_balance(&[]), 0);
    }
}
