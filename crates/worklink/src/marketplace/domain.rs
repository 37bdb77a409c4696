use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for user accounts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UserId(pub u64);

/// Identifier wrapper for job postings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct JobId(pub u64);

/// Identifier wrapper for job applications.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ApplicationId(pub u64);

/// Identifier wrapper for catalog plans.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PlanId(pub u64);

/// Identifier wrapper for subscription requests.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SubscriptionId(pub u64);

/// Identifier wrapper for employee ratings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RatingId(pub u64);

macro_rules! display_id {
    ($($id:ident),+) => {
        $(impl fmt::Display for $id {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        })+
    };
}

display_id!(UserId, JobId, ApplicationId, PlanId, SubscriptionId, RatingId);

/// Closed set of account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Employer,
    Employee,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employer => "employer",
            Role::Employee => "employee",
        }
    }

    /// The single role-to-permission mapping. Handlers gate on a declared
    /// capability instead of comparing role strings.
    pub const fn allows(self, capability: Capability) -> bool {
        use Capability::*;
        match self {
            Role::Admin => matches!(capability, ManageUsers | ApproveSubscriptions | ViewAllJobs),
            Role::Employer => {
                matches!(capability, PostJobs | ManageOwnJobs | ReviewApplicants | RateWorkers)
            }
            Role::Employee => matches!(capability, ApplyToJobs | RequestSubscription),
        }
    }
}

/// Operations a role may be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    PostJobs,
    ManageOwnJobs,
    ReviewApplicants,
    RateWorkers,
    ApplyToJobs,
    RequestSubscription,
    ManageUsers,
    ApproveSubscriptions,
    ViewAllJobs,
}

/// A job posting's lifecycle. `Active -> Ended` happens exactly once and
/// never reverses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobLifecycle {
    Active,
    Ended,
}

impl JobLifecycle {
    pub const fn label(self) -> &'static str {
        match self {
            JobLifecycle::Active => "active",
            JobLifecycle::Ended => "ended",
        }
    }
}

/// Application status tracked throughout the hiring workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Accepted,
    Rejected,
    Done,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Done => "done",
        }
    }

    /// Transition table for employer-driven status writes. `Done` is terminal
    /// and only reachable through the end-of-job cascade; writing the current
    /// status again is not a transition.
    pub fn employer_can_set(from: Self, to: Self) -> bool {
        from != Self::Done && to != Self::Done && from != to
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for JobLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ledger consequence of an application status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenEffect {
    None,
    Debit,
    Refund,
}

impl TokenEffect {
    /// Accepting a worker consumes one of their tokens; walking an acceptance
    /// back returns it. Every other transition leaves the ledger untouched.
    pub fn for_transition(old: ApplicationStatus, new: ApplicationStatus) -> Self {
        use ApplicationStatus::*;
        match (old, new) {
            (Accepted, Rejected | Applied) => TokenEffect::Refund,
            (Rejected | Applied, Accepted) => TokenEffect::Debit,
            _ => TokenEffect::None,
        }
    }
}

/// Catalog plan kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionPlan {
    #[serde(rename = "20_token")]
    TwentyToken,
    #[serde(rename = "unlimited_token")]
    UnlimitedToken,
}

impl SubscriptionPlan {
    pub const fn label(self) -> &'static str {
        match self {
            SubscriptionPlan::TwentyToken => "20_token",
            SubscriptionPlan::UnlimitedToken => "unlimited_token",
        }
    }
}

/// Lifecycle of a user's subscription request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Pending,
    Active,
    Inactive,
}

impl SubscriptionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "pending",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Inactive => "inactive",
        }
    }
}

/// A stored user account. The token balance is *not* a field here: it is a
/// projection of the token ledger (see `tokens`).
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    pub id: UserId,
    pub role: Role,
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub birth_date: NaiveDate,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub gender: String,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl UserAccount {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Insert payload for user accounts; the store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub role: Role,
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub birth_date: NaiveDate,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub gender: String,
    pub profile_picture: Option<String>,
}

/// Sanitized user representation for API responses. Never carries the
/// credential hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub role: Role,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub birth_date: NaiveDate,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub gender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&UserAccount> for UserView {
    fn from(account: &UserAccount) -> Self {
        Self {
            id: account.id,
            role: account.role,
            username: account.username.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            middle_name: account.middle_name.clone(),
            birth_date: account.birth_date,
            phone: account.phone.clone(),
            address: account.address.clone(),
            city: account.city.clone(),
            gender: account.gender.clone(),
            profile_picture: account.profile_picture.clone(),
            created_at: account.created_at,
        }
    }
}

/// A stored job posting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobPosting {
    pub id: JobId,
    pub employer: UserId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary: String,
    pub company: String,
    pub contact: String,
    pub max_applicants: u32,
    pub duration: NaiveDate,
    pub lifecycle: JobLifecycle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Insert payload for job postings. Lifecycle always starts `Active`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary: String,
    pub company: String,
    pub contact: String,
    #[serde(default = "default_max_applicants")]
    pub max_applicants: u32,
    pub duration: NaiveDate,
}

fn default_max_applicants() -> u32 {
    20
}

/// Mutable posting attributes. The lifecycle is deliberately absent: it only
/// moves through the end-job operation.
#[derive(Debug, Clone, Deserialize)]
pub struct JobUpdate {
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary: String,
    pub company: String,
    pub contact: String,
    pub duration: NaiveDate,
}

/// One application row per (job, user) pair. Soft-deleted on withdrawal and
/// restorable on re-apply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobApplication {
    pub id: ApplicationId,
    pub job: JobId,
    pub user: UserId,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl JobApplication {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A catalog entry users can subscribe to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionPlanRecord {
    pub id: PlanId,
    pub plan: SubscriptionPlan,
    pub description: Vec<String>,
    pub price: String,
}

/// A user's request for (or hold of) a catalog plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionRequest {
    pub id: SubscriptionId,
    pub user: UserId,
    pub plan: PlanId,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Integer rating constrained to 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RatingScore(u8);

impl RatingScore {
    pub fn new(value: u8) -> Result<Self, InvalidRatingScore> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidRatingScore(value))
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for RatingScore {
    type Error = InvalidRatingScore;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RatingScore> for u8 {
    fn from(score: RatingScore) -> Self {
        score.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating must be between 1 and 5, got {0}")]
pub struct InvalidRatingScore(pub u8);

/// One rating per (job, user) for a completed hire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeRating {
    pub id: RatingId,
    pub job: JobId,
    pub user: UserId,
    pub rating: RatingScore,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
