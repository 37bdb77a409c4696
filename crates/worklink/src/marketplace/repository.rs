//! Storage abstractions so the services can be exercised in isolation.
//!
//! Each ledger gets its own trait; `MarketStore` bundles them for services
//! that span ledgers. The contract places the two race-prone writes — the
//! checked token debit and the unique-per-pair application insert — inside
//! single store calls, so a backing implementation can make them atomic.

use super::domain::{
    ApplicationId, ApplicationStatus, EmployeeRating, JobApplication, JobId, JobLifecycle,
    JobPosting, JobUpdate, NewJob, NewUser, PlanId, RatingId, RatingScore, Role,
    SubscriptionId, SubscriptionPlanRecord, SubscriptionRequest, SubscriptionStatus,
    UserAccount, UserId,
};
use super::tokens::{TokenEvent, TokenReason};

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Identity store. Accounts are soft-deleted, never removed.
pub trait UserRepository: Send + Sync {
    /// Insert a new account; `Conflict` when the username is taken.
    fn insert_user(&self, user: NewUser) -> Result<UserAccount, RepositoryError>;
    fn user(&self, id: UserId) -> Result<Option<UserAccount>, RepositoryError>;
    fn user_by_username(&self, username: &str) -> Result<Option<UserAccount>, RepositoryError>;
    fn update_user(&self, account: UserAccount) -> Result<UserAccount, RepositoryError>;
    fn soft_delete_user(&self, id: UserId) -> Result<(), RepositoryError>;
    fn users_by_role(&self, role: Role) -> Result<Vec<UserAccount>, RepositoryError>;
}

/// Listing filter for job postings.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub employer: Option<UserId>,
    pub lifecycle: Option<JobLifecycle>,
    pub search: Option<String>,
}

/// Job store.
pub trait JobRepository: Send + Sync {
    fn insert_job(&self, employer: UserId, job: NewJob) -> Result<JobPosting, RepositoryError>;
    fn job(&self, id: JobId) -> Result<Option<JobPosting>, RepositoryError>;
    fn update_job(&self, id: JobId, update: JobUpdate) -> Result<JobPosting, RepositoryError>;
    fn soft_delete_job(&self, id: JobId) -> Result<(), RepositoryError>;
    fn jobs(&self, filter: &JobFilter) -> Result<Vec<JobPosting>, RepositoryError>;
    /// One-way lifecycle write. Returns the lifecycle *before* the call so
    /// the caller can tell a first end from a repeat.
    fn end_job(&self, id: JobId) -> Result<JobLifecycle, RepositoryError>;
}

/// Listing filter for applications. Matches live rows only.
#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub job: Option<JobId>,
    pub user: Option<UserId>,
    pub status: Option<ApplicationStatus>,
}

/// Application ledger. At most one live row per (job, user) pair.
pub trait ApplicationRepository: Send + Sync {
    /// Insert a fresh `Applied` row; `Conflict` when a live row for the pair
    /// already exists.
    fn insert_application(
        &self,
        job: JobId,
        user: UserId,
    ) -> Result<JobApplication, RepositoryError>;
    fn application(&self, id: ApplicationId) -> Result<Option<JobApplication>, RepositoryError>;
    fn application_for_pair(
        &self,
        job: JobId,
        user: UserId,
        include_deleted: bool,
    ) -> Result<Option<JobApplication>, RepositoryError>;
    fn set_application_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<JobApplication, RepositoryError>;
    fn soft_delete_application(&self, id: ApplicationId) -> Result<(), RepositoryError>;
    /// Clear the soft-delete flag and reset the row to `Applied`.
    fn restore_application(&self, id: ApplicationId) -> Result<JobApplication, RepositoryError>;
    fn applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<JobApplication>, RepositoryError>;
    /// Bulk cascade for job endings: flip every live `Applied` row on the job
    /// to `Done`, returning how many rows moved.
    fn mark_applied_done(&self, job: JobId) -> Result<usize, RepositoryError>;
}

/// Subscription ledger plus the plan catalog it references.
pub trait SubscriptionRepository: Send + Sync {
    fn plans(&self) -> Result<Vec<SubscriptionPlanRecord>, RepositoryError>;
    fn plan(&self, id: PlanId) -> Result<Option<SubscriptionPlanRecord>, RepositoryError>;
    /// Insert a new `Pending` request.
    fn insert_subscription(
        &self,
        user: UserId,
        plan: PlanId,
    ) -> Result<SubscriptionRequest, RepositoryError>;
    /// The user's newest request in the given status, if any.
    fn subscription_with_status(
        &self,
        user: UserId,
        status: SubscriptionStatus,
    ) -> Result<Option<SubscriptionRequest>, RepositoryError>;
    fn latest_subscription(
        &self,
        user: UserId,
    ) -> Result<Option<SubscriptionRequest>, RepositoryError>;
    fn update_subscription(
        &self,
        id: SubscriptionId,
        plan: PlanId,
        status: SubscriptionStatus,
    ) -> Result<SubscriptionRequest, RepositoryError>;
    /// Newest first.
    fn subscriptions_for_user(
        &self,
        user: UserId,
    ) -> Result<Vec<SubscriptionRequest>, RepositoryError>;
    fn all_subscriptions(&self) -> Result<Vec<SubscriptionRequest>, RepositoryError>;
}

/// Rating ledger. At most one row per (job, user) pair.
pub trait RatingRepository: Send + Sync {
    fn insert_rating(
        &self,
        job: JobId,
        user: UserId,
        rating: RatingScore,
    ) -> Result<EmployeeRating, RepositoryError>;
    fn rating_for_pair(
        &self,
        job: JobId,
        user: UserId,
    ) -> Result<Option<EmployeeRating>, RepositoryError>;
    fn update_rating(
        &self,
        id: RatingId,
        rating: RatingScore,
    ) -> Result<EmployeeRating, RepositoryError>;
    fn delete_rating(&self, id: RatingId) -> Result<(), RepositoryError>;
    fn ratings_for_user(&self, user: UserId) -> Result<Vec<EmployeeRating>, RepositoryError>;
}

/// Append-only token event log with a checked debit.
pub trait TokenLedger: Send + Sync {
    /// Append an event and return the resulting balance.
    fn append_token_event(&self, event: TokenEvent) -> Result<u32, RepositoryError>;
    /// Check-and-debit in one call: `None` when the balance is already zero,
    /// otherwise the balance after the debit.
    fn try_debit_token(
        &self,
        user: UserId,
        reason: TokenReason,
    ) -> Result<Option<u32>, RepositoryError>;
    fn token_balance(&self, user: UserId) -> Result<u32, RepositoryError>;
    fn token_events(&self, user: UserId) -> Result<Vec<TokenEvent>, RepositoryError>;
}

/// Everything the marketplace services need from one backing store.
pub trait MarketStore:
    UserRepository
    + JobRepository
    + ApplicationRepository
    + SubscriptionRepository
    + RatingRepository
    + TokenLedger
{
}

impl<T> MarketStore for T where
    T: UserRepository
        + JobRepository
        + ApplicationRepository
        + SubscriptionRepository
        + RatingRepository
        + TokenLedger
{
}
