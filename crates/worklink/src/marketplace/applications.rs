//! Application lifecycle and the token/status consistency rules.
//!
//! Applying consumes a ledger token unless the applicant holds an active
//! unlimited plan; employer status changes reconcile the ledger through the
//! transition table in `domain`; withdrawals soft-delete the row so a
//! re-apply restores it instead of inserting a duplicate.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::domain::{
    ApplicationId, ApplicationStatus, JobApplication, JobId, JobLifecycle, JobPosting, Role,
    SubscriptionPlan, SubscriptionStatus, TokenEffect, UserAccount, UserId, UserView,
};
use super::repository::{ApplicationFilter, JobFilter, MarketStore, RepositoryError};
use super::tokens::{TokenEntry, TokenEvent, TokenReason};

/// Error raised by application operations.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("job not found")]
    JobNotFound,
    #[error("this job is already ended")]
    JobEnded,
    #[error("no tokens left to apply for jobs; subscribe to get more")]
    InsufficientTokens,
    #[error("already applied for this job")]
    DuplicateApplication,
    #[error("application not found")]
    ApplicationNotFound,
    #[error("only applications still in applied status can be withdrawn")]
    NotWithdrawable,
    #[error("you do not own the job for this application")]
    NotJobOwner,
    #[error("cannot move application from {0} to {1}")]
    InvalidTransition(ApplicationStatus, ApplicationStatus),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result of a successful apply call.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyOutcome {
    #[serde(flatten)]
    pub application: JobApplication,
    /// True when a withdrawn application was restored instead of a new row
    /// being inserted.
    pub restored: bool,
    /// Balance after the debit; absent for unlimited-plan holders and for
    /// restores, which never debit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_remaining: Option<u32>,
}

/// Application row joined with its job and applicant for listings.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub user_id: UserId,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<JobPosting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant: Option<UserView>,
}

/// Service enforcing the application-side consistency rules.
pub struct ApplicationService<S> {
    store: Arc<S>,
}

impl<S> ApplicationService<S>
where
    S: MarketStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Apply to an active job, restoring a withdrawn row when one exists.
    ///
    /// The ledger debit happens before the insert; a conflicting insert
    /// compensates the debit so no partial effect survives an error.
    pub fn apply(
        &self,
        applicant: &UserAccount,
        job_id: JobId,
    ) -> Result<ApplyOutcome, ApplicationError> {
        let job = self
            .store
            .job(job_id)?
            .ok_or(ApplicationError::JobNotFound)?;
        if job.lifecycle == JobLifecycle::Ended {
            return Err(ApplicationError::JobEnded);
        }

        if let Some(existing) = self
            .store
            .application_for_pair(job_id, applicant.id, true)?
        {
            if existing.is_deleted() {
                let restored = self.store.restore_application(existing.id)?;
                info!(user = %applicant.id, job = %job_id, "application restored");
                return Ok(ApplyOutcome {
                    application: restored,
                    restored: true,
                    tokens_remaining: None,
                });
            }
            return Err(ApplicationError::DuplicateApplication);
        }

        let tokens_remaining = if self.has_active_unlimited_plan(applicant.id)? {
            None
        } else {
            let balance = self
                .store
                .try_debit_token(applicant.id, TokenReason::JobApplication)?
                .ok_or(ApplicationError::InsufficientTokens)?;
            Some(balance)
        };

        let application = match self.store.insert_application(job_id, applicant.id) {
            Ok(application) => application,
            Err(err) => {
                if tokens_remaining.is_some() {
                    self.store.append_token_event(TokenEvent::new(
                        applicant.id,
                        TokenEntry::Credit,
                        TokenReason::JobApplication,
                    ))?;
                }
                return Err(match err {
                    RepositoryError::Conflict => ApplicationError::DuplicateApplication,
                    other => other.into(),
                });
            }
        };

        info!(user = %applicant.id, job = %job_id, "application created");
        Ok(ApplyOutcome {
            application,
            restored: false,
            tokens_remaining,
        })
    }

    /// Withdraw an `Applied` application. No token refund: together with the
    /// debit-free restore path this keeps cancel/re-apply idempotent.
    pub fn cancel(
        &self,
        applicant: &UserAccount,
        job_id: JobId,
    ) -> Result<(), ApplicationError> {
        self.store
            .job(job_id)?
            .ok_or(ApplicationError::JobNotFound)?;

        let application = self
            .store
            .application_for_pair(job_id, applicant.id, false)?
            .ok_or(ApplicationError::ApplicationNotFound)?;
        if application.status != ApplicationStatus::Applied {
            return Err(ApplicationError::NotWithdrawable);
        }

        self.store.soft_delete_application(application.id)?;
        info!(user = %applicant.id, job = %job_id, "application withdrawn");
        Ok(())
    }

    /// Employer-driven status write with ledger reconciliation.
    ///
    /// Refunds and debits are applied before the status write so an
    /// insufficient balance aborts the transition with nothing changed.
    pub fn update_status(
        &self,
        employer: &UserAccount,
        application_id: ApplicationId,
        new_status: ApplicationStatus,
    ) -> Result<JobApplication, ApplicationError> {
        let application = self
            .store
            .application(application_id)?
            .ok_or(ApplicationError::ApplicationNotFound)?;
        let job = self
            .store
            .job(application.job)?
            .ok_or(ApplicationError::JobNotFound)?;
        if job.employer != employer.id {
            return Err(ApplicationError::NotJobOwner);
        }

        let old_status = application.status;
        if !ApplicationStatus::employer_can_set(old_status, new_status) {
            return Err(ApplicationError::InvalidTransition(old_status, new_status));
        }

        match TokenEffect::for_transition(old_status, new_status) {
            TokenEffect::Refund => {
                self.store.append_token_event(TokenEvent::new(
                    application.user,
                    TokenEntry::Credit,
                    TokenReason::AcceptanceReverted,
                ))?;
            }
            TokenEffect::Debit => {
                self.store
                    .try_debit_token(application.user, TokenReason::ApplicantAccepted)?
                    .ok_or(ApplicationError::InsufficientTokens)?;
            }
            TokenEffect::None => {}
        }

        let updated = self.store.set_application_status(application_id, new_status)?;
        info!(
            application = %application_id,
            from = %old_status,
            to = %new_status,
            "application status updated"
        );
        Ok(updated)
    }

    /// Role-scoped application listing: employees see their own rows,
    /// employers the rows on their jobs, admins everything.
    pub fn roster(&self, viewer: &UserAccount) -> Result<Vec<ApplicationView>, ApplicationError> {
        let rows = match viewer.role {
            Role::Employee => self.store.applications(&ApplicationFilter {
                user: Some(viewer.id),
                ..ApplicationFilter::default()
            })?,
            Role::Employer => {
                let own_jobs = self.store.jobs(&JobFilter {
                    employer: Some(viewer.id),
                    ..JobFilter::default()
                })?;
                let mut rows = Vec::new();
                for job in own_jobs {
                    rows.extend(self.store.applications(&ApplicationFilter {
                        job: Some(job.id),
                        ..ApplicationFilter::default()
                    })?);
                }
                rows
            }
            Role::Admin => self.store.applications(&ApplicationFilter::default())?,
        };

        rows.into_iter().map(|row| self.view_of(row)).collect()
    }

    fn view_of(&self, row: JobApplication) -> Result<ApplicationView, ApplicationError> {
        let job = self.store.job(row.job)?;
        let applicant = self.store.user(row.user)?.as_ref().map(UserView::from);
        Ok(ApplicationView {
            id: row.id,
            job_id: row.job,
            user_id: row.user,
            status: row.status,
            applied_at: row.created_at,
            job,
            applicant,
        })
    }

    fn has_active_unlimited_plan(&self, user: UserId) -> Result<bool, RepositoryError> {
        let Some(active) = self
            .store
            .subscription_with_status(user, SubscriptionStatus::Active)?
        else {
            return Ok(false);
        };
        Ok(self
            .store
            .plan(active.plan)?
            .is_some_and(|plan| plan.plan == SubscriptionPlan::UnlimitedToken))
    }
}
