//! Accounts: registration, credential checks, profile views, and the admin
//! user-management surface.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{hash_password, verify_password, AuthError};

use super::domain::{
    ApplicationId, ApplicationStatus, JobId, JobLifecycle, NewUser, RatingId, RatingScore,
    Role, UserAccount, UserId, UserView,
};
use super::repository::{ApplicationFilter, JobFilter, MarketStore, RepositoryError};

/// Error raised by identity operations.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("username is already taken")]
    UsernameTaken,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("user not found")]
    UserNotFound,
    #[error("accounts cannot self-register as {0}")]
    RoleNotRegisterable(Role),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Registration / admin-create payload. The password arrives raw and is
/// hashed before it reaches the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUserRequest {
    pub role: Role,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub birth_date: NaiveDate,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub gender: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// Admin update payload; a missing password leaves the hash untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct UserUpdateRequest {
    pub role: Role,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub birth_date: NaiveDate,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub gender: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// Per-status application tally on the "me" view.
#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub total: usize,
}

/// The authenticated user's dashboard payload.
#[derive(Debug, Clone, Serialize)]
pub struct MeView {
    pub user: UserView,
    pub token_balance: u32,
    pub jobs: Vec<StatusCount>,
    pub total_jobs: usize,
    pub rating: f64,
}

/// One row of a user's application history.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationHistoryEntry {
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
    pub applied_date: DateTime<Utc>,
    pub job_id: JobId,
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub life_cycle: JobLifecycle,
    pub job_posted_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employer_full_name: Option<String>,
}

/// One row of a user's received ratings.
#[derive(Debug, Clone, Serialize)]
pub struct RatingHistoryEntry {
    pub rating_id: RatingId,
    pub rating: RatingScore,
    pub rating_date: DateTime<Utc>,
    pub job_id: JobId,
    pub job_title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employer_full_name: Option<String>,
}

/// Aggregates on the profile page.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileStats {
    pub total_applications: usize,
    pub pending_applications: usize,
    pub accepted_applications: usize,
    pub rejected_applications: usize,
    pub total_ratings: usize,
    pub average_rating: f64,
    pub completed_jobs: usize,
}

/// Full profile: account, history, ratings, and aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub user: UserView,
    pub application_history: Vec<ApplicationHistoryEntry>,
    pub ratings: Vec<RatingHistoryEntry>,
    pub stats: ProfileStats,
}

/// Admin landing payload: accounts by role plus platform totals.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOverview {
    pub admin: Vec<UserView>,
    pub users: Vec<UserView>,
    pub employers: Vec<UserView>,
    pub total_users: usize,
    pub total_employers: usize,
    pub total_jobs: usize,
    pub total_applications: usize,
}

/// Service over the identity store.
pub struct IdentityService<S> {
    store: Arc<S>,
}

impl<S> IdentityService<S>
where
    S: MarketStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Self-registration: employees and employers only.
    pub fn register(&self, request: NewUserRequest) -> Result<UserView, IdentityError> {
        if request.role == Role::Admin {
            return Err(IdentityError::RoleNotRegisterable(request.role));
        }
        self.create(request)
    }

    /// Admin-side creation: any role.
    pub fn create(&self, request: NewUserRequest) -> Result<UserView, IdentityError> {
        let password_hash = hash_password(&request.password)?;
        let account = self
            .store
            .insert_user(NewUser {
                role: request.role,
                username: request.username,
                password_hash,
                first_name: request.first_name,
                last_name: request.last_name,
                middle_name: request.middle_name,
                birth_date: request.birth_date,
                phone: request.phone,
                address: request.address,
                city: request.city,
                gender: request.gender,
                profile_picture: request.profile_picture,
            })
            .map_err(|err| match err {
                RepositoryError::Conflict => IdentityError::UsernameTaken,
                other => IdentityError::Repository(other),
            })?;
        info!(user = %account.id, role = %account.role, "account created");
        Ok(UserView::from(&account))
    }

    pub fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserAccount, IdentityError> {
        let account = self
            .store
            .user_by_username(username)?
            .ok_or(IdentityError::InvalidCredentials)?;
        // An unparsable stored hash denies login instead of leaking an
        // internal error to the login form.
        let verified = verify_password(password, &account.password_hash).unwrap_or(false);
        if !verified {
            return Err(IdentityError::InvalidCredentials);
        }
        Ok(account)
    }

    /// Resolve a live account by id, as the auth boundary does per request.
    pub fn load(&self, id: UserId) -> Result<Option<UserAccount>, IdentityError> {
        Ok(self.store.user(id)?)
    }

    pub fn me(&self, account: &UserAccount) -> Result<MeView, IdentityError> {
        let rows = self.store.applications(&ApplicationFilter {
            user: Some(account.id),
            ..ApplicationFilter::default()
        })?;

        let mut jobs = Vec::new();
        for status in [
            ApplicationStatus::Applied,
            ApplicationStatus::Accepted,
            ApplicationStatus::Rejected,
            ApplicationStatus::Done,
        ] {
            let total = rows.iter().filter(|row| row.status == status).count();
            if total > 0 {
                jobs.push(StatusCount { status, total });
            }
        }

        let ratings = self.store.ratings_for_user(account.id)?;

        Ok(MeView {
            user: UserView::from(account),
            token_balance: self.store.token_balance(account.id)?,
            total_jobs: rows.len(),
            jobs,
            rating: average_rating(&ratings),
        })
    }

    /// Profile page for any account, with history, ratings, and aggregates.
    pub fn profile(&self, user_id: UserId) -> Result<ProfileView, IdentityError> {
        let account = self.store.user(user_id)?.ok_or(IdentityError::UserNotFound)?;

        let mut rows = self.store.applications(&ApplicationFilter {
            user: Some(user_id),
            ..ApplicationFilter::default()
        })?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut application_history = Vec::with_capacity(rows.len());
        let mut completed_jobs = 0;
        for row in &rows {
            let Some(job) = self.store.job(row.job)? else {
                continue;
            };
            if row.status == ApplicationStatus::Accepted && job.lifecycle == JobLifecycle::Ended
            {
                completed_jobs += 1;
            }
            let employer_full_name = self
                .store
                .user(job.employer)?
                .map(|employer| employer.full_name());
            application_history.push(ApplicationHistoryEntry {
                application_id: row.id,
                status: row.status,
                applied_date: row.created_at,
                job_id: job.id,
                job_title: job.title,
                company: job.company,
                location: job.location,
                salary: job.salary,
                life_cycle: job.lifecycle,
                job_posted_date: job.created_at,
                employer_full_name,
            });
        }

        let rating_rows = self.store.ratings_for_user(user_id)?;
        let mut ratings = Vec::with_capacity(rating_rows.len());
        for row in &rating_rows {
            let Some(job) = self.store.job(row.job)? else {
                continue;
            };
            let employer_full_name = self
                .store
                .user(job.employer)?
                .map(|employer| employer.full_name());
            ratings.push(RatingHistoryEntry {
                rating_id: row.id,
                rating: row.rating,
                rating_date: row.created_at,
                job_id: job.id,
                job_title: job.title,
                company: job.company,
                employer_full_name,
            });
        }

        let count_status = |status: ApplicationStatus| {
            rows.iter().filter(|row| row.status == status).count()
        };
        let stats = ProfileStats {
            total_applications: rows.len(),
            pending_applications: count_status(ApplicationStatus::Applied),
            accepted_applications: count_status(ApplicationStatus::Accepted),
            rejected_applications: count_status(ApplicationStatus::Rejected),
            total_ratings: rating_rows.len(),
            average_rating: average_rating(&rating_rows),
            completed_jobs,
        };

        Ok(ProfileView {
            user: UserView::from(&account),
            application_history,
            ratings,
            stats,
        })
    }

    pub fn admin_overview(&self) -> Result<AdminOverview, IdentityError> {
        let admin = self.views_by_role(Role::Admin)?;
        let users = self.views_by_role(Role::Employee)?;
        let employers = self.views_by_role(Role::Employer)?;
        let total_jobs = self.store.jobs(&JobFilter::default())?.len();
        let total_applications = self
            .store
            .applications(&ApplicationFilter::default())?
            .len();

        Ok(AdminOverview {
            total_users: users.len(),
            total_employers: employers.len(),
            admin,
            users,
            employers,
            total_jobs,
            total_applications,
        })
    }

    pub fn show(&self, id: UserId) -> Result<UserView, IdentityError> {
        let account = self.store.user(id)?.ok_or(IdentityError::UserNotFound)?;
        Ok(UserView::from(&account))
    }

    pub fn admin_update(
        &self,
        id: UserId,
        request: UserUpdateRequest,
    ) -> Result<UserView, IdentityError> {
        let mut account = self.store.user(id)?.ok_or(IdentityError::UserNotFound)?;

        if account.username != request.username {
            let taken = self
                .store
                .user_by_username(&request.username)?
                .is_some_and(|other| other.id != id);
            if taken {
                return Err(IdentityError::UsernameTaken);
            }
        }

        account.role = request.role;
        account.username = request.username;
        account.first_name = request.first_name;
        account.last_name = request.last_name;
        account.middle_name = request.middle_name;
        account.birth_date = request.birth_date;
        account.phone = request.phone;
        account.address = request.address;
        account.city = request.city;
        account.gender = request.gender;
        account.profile_picture = request.profile_picture;
        if let Some(password) = request.password.as_deref() {
            account.password_hash = hash_password(password)?;
        }

        let updated = self.store.update_user(account)?;
        info!(user = %id, "account updated by admin");
        Ok(UserView::from(&updated))
    }

    pub fn admin_delete(&self, id: UserId) -> Result<(), IdentityError> {
        self.store.soft_delete_user(id).map_err(|err| match err {
            RepositoryError::NotFound => IdentityError::UserNotFound,
            other => IdentityError::Repository(other),
        })?;
        info!(user = %id, "account soft deleted by admin");
        Ok(())
    }

    fn views_by_role(&self, role: Role) -> Result<Vec<UserView>, IdentityError> {
        Ok(self
            .store
            .users_by_role(role)?
            .iter()
            .map(UserView::from)
            .collect())
    }
}

fn average_rating(rows: &[super::domain::EmployeeRating]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let sum: u32 = rows.iter().map(|row| u32::from(row.rating.value())).sum();
    f64::from(sum) / rows.len() as f64
}
