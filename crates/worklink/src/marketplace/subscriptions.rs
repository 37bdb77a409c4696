//! Subscription requests and admin review.
//!
//! Per user the request lifecycle is `pending -> active -> inactive`,
//! re-entrant through a fresh request. At most one request is active at a
//! time; activating a token plan writes the granted balance into the ledger.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::domain::{
    PlanId, SubscriptionPlan, SubscriptionPlanRecord, SubscriptionRequest, SubscriptionStatus,
    UserAccount, UserId, UserView,
};
use super::repository::{MarketStore, RepositoryError};
use super::tokens::{TokenEntry, TokenEvent, TokenReason};

const DEFAULT_TOKEN_GRANT: u32 = 20;

/// Error raised by subscription operations.
#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error("unknown subscription plan")]
    UnknownPlan,
    #[error("user subscription not found")]
    SubscriptionNotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Request joined with its catalog plan.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub request: SubscriptionRequest,
    pub plan: SubscriptionPlanRecord,
}

/// Admin-facing row: request, plan, requester, and their current balance.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionReviewRow {
    #[serde(flatten)]
    pub request: SubscriptionRequest,
    pub plan: SubscriptionPlanRecord,
    pub user: UserView,
    pub user_token: u32,
}

/// Result of a user's plan request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestOutcome {
    #[serde(flatten)]
    pub request: SubscriptionRequest,
    /// False when an existing pending request was re-pointed at the new plan.
    #[serde(skip_serializing)]
    pub created: bool,
}

/// Admin decision payload.
#[derive(Debug, Clone)]
pub struct SubscriptionReview {
    pub user: UserId,
    pub plan: PlanId,
    pub status: SubscriptionStatus,
    pub token_count: Option<u32>,
}

/// Result of an admin review.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    #[serde(flatten)]
    pub request: SubscriptionRequest,
    /// Balance after a token-plan activation; absent otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_token: Option<u32>,
}

/// Service over the subscription ledger and plan catalog.
pub struct SubscriptionService<S> {
    store: Arc<S>,
}

impl<S> SubscriptionService<S>
where
    S: MarketStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn plans(&self) -> Result<Vec<SubscriptionPlanRecord>, SubscriptionError> {
        Ok(self.store.plans()?)
    }

    /// Request a plan. An active request is deactivated, a pending request is
    /// re-pointed at the new plan in place, otherwise a new pending request
    /// is created.
    pub fn request(
        &self,
        user: &UserAccount,
        plan_id: PlanId,
    ) -> Result<RequestOutcome, SubscriptionError> {
        self.store
            .plan(plan_id)?
            .ok_or(SubscriptionError::UnknownPlan)?;

        if let Some(active) = self
            .store
            .subscription_with_status(user.id, SubscriptionStatus::Active)?
        {
            self.store
                .update_subscription(active.id, active.plan, SubscriptionStatus::Inactive)?;
        }

        if let Some(pending) = self
            .store
            .subscription_with_status(user.id, SubscriptionStatus::Pending)?
        {
            let updated = self.store.update_subscription(
                pending.id,
                plan_id,
                SubscriptionStatus::Pending,
            )?;
            return Ok(RequestOutcome {
                request: updated,
                created: false,
            });
        }

        let request = self.store.insert_subscription(user.id, plan_id)?;
        info!(user = %user.id, plan = %plan_id, "subscription requested");
        Ok(RequestOutcome {
            request,
            created: true,
        })
    }

    /// The user's most recent request with its plan details.
    pub fn current(
        &self,
        user: &UserAccount,
    ) -> Result<Option<SubscriptionView>, SubscriptionError> {
        let Some(request) = self.store.latest_subscription(user.id)? else {
            return Ok(None);
        };
        Ok(Some(self.view_of(request)?))
    }

    pub fn history(&self, user: &UserAccount) -> Result<Vec<SubscriptionView>, SubscriptionError> {
        self.store
            .subscriptions_for_user(user.id)?
            .into_iter()
            .map(|request| self.view_of(request))
            .collect()
    }

    /// Every request with requester details, for the admin review screen.
    pub fn review_queue(&self) -> Result<Vec<SubscriptionReviewRow>, SubscriptionError> {
        let mut rows = Vec::new();
        for request in self.store.all_subscriptions()? {
            let Some(plan) = self.store.plan(request.plan)? else {
                continue;
            };
            let Some(account) = self.store.user(request.user)? else {
                continue;
            };
            let user_token = self.store.token_balance(request.user)?;
            rows.push(SubscriptionReviewRow {
                request,
                plan,
                user: UserView::from(&account),
                user_token,
            });
        }
        Ok(rows)
    }

    /// Admin decision on a user's latest request. Activation enforces the
    /// single-active invariant and, for the token plan, sets the granted
    /// balance in the ledger; the unlimited plan never touches the ledger.
    pub fn review(&self, decision: SubscriptionReview) -> Result<ReviewOutcome, SubscriptionError> {
        let plan = self
            .store
            .plan(decision.plan)?
            .ok_or(SubscriptionError::UnknownPlan)?;
        let latest = self
            .store
            .latest_subscription(decision.user)?
            .ok_or(SubscriptionError::SubscriptionNotFound)?;

        if decision.status == SubscriptionStatus::Active {
            if let Some(active) = self
                .store
                .subscription_with_status(decision.user, SubscriptionStatus::Active)?
            {
                if active.id != latest.id {
                    self.store.update_subscription(
                        active.id,
                        active.plan,
                        SubscriptionStatus::Inactive,
                    )?;
                }
            }
        }

        let request =
            self.store
                .update_subscription(latest.id, decision.plan, decision.status)?;

        let user_token = if decision.status == SubscriptionStatus::Active
            && plan.plan == SubscriptionPlan::TwentyToken
        {
            let granted = decision.token_count.unwrap_or(DEFAULT_TOKEN_GRANT);
            let balance = self.store.append_token_event(TokenEvent::new(
                decision.user,
                TokenEntry::Set(granted),
                TokenReason::PlanActivation,
            ))?;
            info!(user = %decision.user, granted, "token plan activated");
            Some(balance)
        } else {
            None
        };

        Ok(ReviewOutcome {
            request,
            user_token,
        })
    }

    fn view_of(
        &self,
        request: SubscriptionRequest,
    ) -> Result<SubscriptionView, SubscriptionError> {
        let plan = self
            .store
            .plan(request.plan)?
            .ok_or(SubscriptionError::UnknownPlan)?;
        Ok(SubscriptionView { request, plan })
    }
}
