//! The marketplace: identity, jobs, applications, subscriptions, ratings,
//! and the token/status consistency rules that tie them together.
//!
//! Each subsystem is a small service over the shared repository traits; the
//! router at the bottom of the stack is the only place HTTP concerns appear.

pub mod applications;
pub mod domain;
pub mod identity;
pub mod jobs;
pub mod memory;
pub mod ratings;
pub mod repository;
pub mod router;
pub mod subscriptions;
pub mod tokens;

#[cfg(test)]
mod tests;

pub use applications::{ApplicationError, ApplicationService, ApplicationView, ApplyOutcome};
pub use domain::{
    ApplicationId, ApplicationStatus, Capability, EmployeeRating, JobApplication, JobId,
    JobLifecycle, JobPosting, JobUpdate, NewJob, PlanId, RatingId, RatingScore, Role,
    SubscriptionId, SubscriptionPlan, SubscriptionPlanRecord, SubscriptionRequest,
    SubscriptionStatus, TokenEffect, UserAccount, UserId, UserView,
};
pub use identity::{IdentityError, IdentityService, NewUserRequest, UserUpdateRequest};
pub use jobs::{EndJobOutcome, JobError, JobService};
pub use memory::MemoryStore;
pub use ratings::{RatingError, RatingService};
pub use repository::{
    ApplicationFilter, ApplicationRepository, JobFilter, JobRepository, MarketStore,
    RatingRepository, RepositoryError, SubscriptionRepository, TokenLedger, UserRepository,
};
pub use router::{marketplace_router, ApiError, MarketplaceApi};
pub use subscriptions::{
    SubscriptionError, SubscriptionReview, SubscriptionService, SubscriptionView,
};
pub use tokens::{project_balance, TokenEntry, TokenEvent, TokenReason};
