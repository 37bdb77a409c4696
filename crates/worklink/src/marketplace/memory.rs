//! In-memory backing store.
//!
//! A single mutex over all tables, so every trait call is atomic with respect
//! to every other. The service crate and the integration tests share this
//! implementation instead of maintaining copies.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use super::domain::{
    ApplicationId, ApplicationStatus, EmployeeRating, JobApplication, JobId, JobLifecycle,
    JobPosting, JobUpdate, NewJob, NewUser, PlanId, RatingId, RatingScore, Role,
    SubscriptionId, SubscriptionPlan, SubscriptionPlanRecord, SubscriptionRequest,
    SubscriptionStatus, UserAccount, UserId,
};
use super::repository::{
    ApplicationFilter, ApplicationRepository, JobFilter, JobRepository, RatingRepository,
    RepositoryError, SubscriptionRepository, TokenLedger, UserRepository,
};
use super::tokens::{project_balance, TokenEntry, TokenEvent, TokenReason};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<u64, UserAccount>,
    jobs: BTreeMap<u64, JobPosting>,
    applications: BTreeMap<u64, JobApplication>,
    plans: Vec<SubscriptionPlanRecord>,
    subscriptions: BTreeMap<u64, SubscriptionRequest>,
    ratings: BTreeMap<u64, EmployeeRating>,
    token_events: Vec<TokenEvent>,
    next_id: u64,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn balance_of(&self, user: UserId) -> u32 {
        project_balance(self.token_events.iter().filter(|event| event.user == user))
    }
}

/// Shared in-memory store seeded with the standard plan catalog.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let store = Self::default();
        {
            let mut tables = store.lock();
            let twenty_id = tables.next_id();
            let unlimited_id = tables.next_id();
            tables.plans = vec![
                SubscriptionPlanRecord {
                    id: PlanId(twenty_id),
                    plan: SubscriptionPlan::TwentyToken,
                    description: vec![
                        "Accept up to 3 jobs each month".to_string(),
                        "Ideal for part-time earners or those exploring opportunities"
                            .to_string(),
                    ],
                    price: "250".to_string(),
                },
                SubscriptionPlanRecord {
                    id: PlanId(unlimited_id),
                    plan: SubscriptionPlan::UnlimitedToken,
                    description: vec![
                        "Accept as many jobs as you want with no monthly limits".to_string(),
                        "Perfect for full-time freelancers or highly active users".to_string(),
                    ],
                    price: "500".to_string(),
                },
            ];
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("store mutex poisoned")
    }
}

impl UserRepository for MemoryStore {
    fn insert_user(&self, user: NewUser) -> Result<UserAccount, RepositoryError> {
        let mut tables = self.lock();
        let taken = tables
            .users
            .values()
            .any(|existing| existing.deleted_at.is_none() && existing.username == user.username);
        if taken {
            return Err(RepositoryError::Conflict);
        }

        let now = Utc::now();
        let id = tables.next_id();
        let account = UserAccount {
            id: UserId(id),
            role: user.role,
            username: user.username,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            middle_name: user.middle_name,
            birth_date: user.birth_date,
            phone: user.phone,
            address: user.address,
            city: user.city,
            gender: user.gender,
            profile_picture: user.profile_picture,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.users.insert(id, account.clone());
        Ok(account)
    }

    fn user(&self, id: UserId) -> Result<Option<UserAccount>, RepositoryError> {
        let tables = self.lock();
        Ok(tables
            .users
            .get(&id.0)
            .filter(|account| account.deleted_at.is_none())
            .cloned())
    }

    fn user_by_username(&self, username: &str) -> Result<Option<UserAccount>, RepositoryError> {
        let tables = self.lock();
        Ok(tables
            .users
            .values()
            .find(|account| account.deleted_at.is_none() && account.username == username)
            .cloned())
    }

    fn update_user(&self, account: UserAccount) -> Result<UserAccount, RepositoryError> {
        let mut tables = self.lock();
        if !tables.users.contains_key(&account.id.0) {
            return Err(RepositoryError::NotFound);
        }
        let mut account = account;
        account.updated_at = Utc::now();
        tables.users.insert(account.id.0, account.clone());
        Ok(account)
    }

    fn soft_delete_user(&self, id: UserId) -> Result<(), RepositoryError> {
        let mut tables = self.lock();
        let account = tables.users.get_mut(&id.0).ok_or(RepositoryError::NotFound)?;
        if account.deleted_at.is_some() {
            return Err(RepositoryError::NotFound);
        }
        account.deleted_at = Some(Utc::now());
        Ok(())
    }

    fn users_by_role(&self, role: Role) -> Result<Vec<UserAccount>, RepositoryError> {
        let tables = self.lock();
        Ok(tables
            .users
            .values()
            .filter(|account| account.deleted_at.is_none() && account.role == role)
            .cloned()
            .collect())
    }
}

impl JobRepository for MemoryStore {
    fn insert_job(&self, employer: UserId, job: NewJob) -> Result<JobPosting, RepositoryError> {
        let mut tables = self.lock();
        let now = Utc::now();
        let id = tables.next_id();
        let posting = JobPosting {
            id: JobId(id),
            employer,
            title: job.title,
            description: job.description,
            location: job.location,
            salary: job.salary,
            company: job.company,
            contact: job.contact,
            max_applicants: job.max_applicants,
            duration: job.duration,
            lifecycle: JobLifecycle::Active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.jobs.insert(id, posting.clone());
        Ok(posting)
    }

    fn job(&self, id: JobId) -> Result<Option<JobPosting>, RepositoryError> {
        let tables = self.lock();
        Ok(tables
            .jobs
            .get(&id.0)
            .filter(|posting| posting.deleted_at.is_none())
            .cloned())
    }

    fn update_job(&self, id: JobId, update: JobUpdate) -> Result<JobPosting, RepositoryError> {
        let mut tables = self.lock();
        let posting = tables.jobs.get_mut(&id.0).ok_or(RepositoryError::NotFound)?;
        if posting.deleted_at.is_some() {
            return Err(RepositoryError::NotFound);
        }
        posting.title = update.title;
        posting.description = update.description;
        posting.location = update.location;
        posting.salary = update.salary;
        posting.company = update.company;
        posting.contact = update.contact;
        posting.duration = update.duration;
        posting.updated_at = Utc::now();
        Ok(posting.clone())
    }

    fn soft_delete_job(&self, id: JobId) -> Result<(), RepositoryError> {
        let mut tables = self.lock();
        let posting = tables.jobs.get_mut(&id.0).ok_or(RepositoryError::NotFound)?;
        if posting.deleted_at.is_some() {
            return Err(RepositoryError::NotFound);
        }
        posting.deleted_at = Some(Utc::now());
        Ok(())
    }

    fn jobs(&self, filter: &JobFilter) -> Result<Vec<JobPosting>, RepositoryError> {
        let tables = self.lock();
        let needle = filter.search.as_deref().map(str::to_lowercase);
        Ok(tables
            .jobs
            .values()
            .filter(|posting| posting.deleted_at.is_none())
            .filter(|posting| filter.employer.map_or(true, |owner| posting.employer == owner))
            .filter(|posting| {
                filter
                    .lifecycle
                    .map_or(true, |lifecycle| posting.lifecycle == lifecycle)
            })
            .filter(|posting| {
                needle.as_deref().map_or(true, |needle| {
                    posting.title.to_lowercase().contains(needle)
                        || posting.description.to_lowercase().contains(needle)
                        || posting.company.to_lowercase().contains(needle)
                        || posting.location.to_lowercase().contains(needle)
                })
            })
            .cloned()
            .collect())
    }

    fn end_job(&self, id: JobId) -> Result<JobLifecycle, RepositoryError> {
        let mut tables = self.lock();
        let posting = tables.jobs.get_mut(&id.0).ok_or(RepositoryError::NotFound)?;
        if posting.deleted_at.is_some() {
            return Err(RepositoryError::NotFound);
        }
        let prior = posting.lifecycle;
        if prior == JobLifecycle::Active {
            posting.lifecycle = JobLifecycle::Ended;
            posting.updated_at = Utc::now();
        }
        Ok(prior)
    }
}

impl ApplicationRepository for MemoryStore {
    fn insert_application(
        &self,
        job: JobId,
        user: UserId,
    ) -> Result<JobApplication, RepositoryError> {
        let mut tables = self.lock();
        let duplicate = tables
            .applications
            .values()
            .any(|row| row.deleted_at.is_none() && row.job == job && row.user == user);
        if duplicate {
            return Err(RepositoryError::Conflict);
        }

        let now = Utc::now();
        let id = tables.next_id();
        let application = JobApplication {
            id: ApplicationId(id),
            job,
            user,
            status: ApplicationStatus::Applied,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.applications.insert(id, application.clone());
        Ok(application)
    }

    fn application(&self, id: ApplicationId) -> Result<Option<JobApplication>, RepositoryError> {
        let tables = self.lock();
        Ok(tables
            .applications
            .get(&id.0)
            .filter(|row| row.deleted_at.is_none())
            .cloned())
    }

    fn application_for_pair(
        &self,
        job: JobId,
        user: UserId,
        include_deleted: bool,
    ) -> Result<Option<JobApplication>, RepositoryError> {
        let tables = self.lock();
        Ok(tables
            .applications
            .values()
            .filter(|row| row.job == job && row.user == user)
            .filter(|row| include_deleted || row.deleted_at.is_none())
            .max_by_key(|row| row.id)
            .cloned())
    }

    fn set_application_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<JobApplication, RepositoryError> {
        let mut tables = self.lock();
        let row = tables
            .applications
            .get_mut(&id.0)
            .filter(|row| row.deleted_at.is_none())
            .ok_or(RepositoryError::NotFound)?;
        row.status = status;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    fn soft_delete_application(&self, id: ApplicationId) -> Result<(), RepositoryError> {
        let mut tables = self.lock();
        let row = tables
            .applications
            .get_mut(&id.0)
            .filter(|row| row.deleted_at.is_none())
            .ok_or(RepositoryError::NotFound)?;
        row.deleted_at = Some(Utc::now());
        Ok(())
    }

    fn restore_application(&self, id: ApplicationId) -> Result<JobApplication, RepositoryError> {
        let mut tables = self.lock();
        let row = tables
            .applications
            .get_mut(&id.0)
            .ok_or(RepositoryError::NotFound)?;
        row.deleted_at = None;
        row.status = ApplicationStatus::Applied;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    fn applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<JobApplication>, RepositoryError> {
        let tables = self.lock();
        Ok(tables
            .applications
            .values()
            .filter(|row| row.deleted_at.is_none())
            .filter(|row| filter.job.map_or(true, |job| row.job == job))
            .filter(|row| filter.user.map_or(true, |user| row.user == user))
            .filter(|row| filter.status.map_or(true, |status| row.status == status))
            .cloned()
            .collect())
    }

    fn mark_applied_done(&self, job: JobId) -> Result<usize, RepositoryError> {
        let mut tables = self.lock();
        let now = Utc::now();
        let mut moved = 0;
        for row in tables.applications.values_mut() {
            if row.deleted_at.is_none()
                && row.job == job
                && row.status == ApplicationStatus::Applied
            {
                row.status = ApplicationStatus::Done;
                row.updated_at = now;
                moved += 1;
            }
        }
        Ok(moved)
    }
}

impl SubscriptionRepository for MemoryStore {
    fn plans(&self) -> Result<Vec<SubscriptionPlanRecord>, RepositoryError> {
        Ok(self.lock().plans.clone())
    }

    fn plan(&self, id: PlanId) -> Result<Option<SubscriptionPlanRecord>, RepositoryError> {
        let tables = self.lock();
        Ok(tables.plans.iter().find(|plan| plan.id == id).cloned())
    }

    fn insert_subscription(
        &self,
        user: UserId,
        plan: PlanId,
    ) -> Result<SubscriptionRequest, RepositoryError> {
        let mut tables = self.lock();
        let now = Utc::now();
        let id = tables.next_id();
        let request = SubscriptionRequest {
            id: SubscriptionId(id),
            user,
            plan,
            status: SubscriptionStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        tables.subscriptions.insert(id, request.clone());
        Ok(request)
    }

    fn subscription_with_status(
        &self,
        user: UserId,
        status: SubscriptionStatus,
    ) -> Result<Option<SubscriptionRequest>, RepositoryError> {
        let tables = self.lock();
        Ok(tables
            .subscriptions
            .values()
            .filter(|request| request.user == user && request.status == status)
            .max_by_key(|request| request.id)
            .cloned())
    }

    fn latest_subscription(
        &self,
        user: UserId,
    ) -> Result<Option<SubscriptionRequest>, RepositoryError> {
        let tables = self.lock();
        Ok(tables
            .subscriptions
            .values()
            .filter(|request| request.user == user)
            .max_by_key(|request| request.id)
            .cloned())
    }

    fn update_subscription(
        &self,
        id: SubscriptionId,
        plan: PlanId,
        status: SubscriptionStatus,
    ) -> Result<SubscriptionRequest, RepositoryError> {
        let mut tables = self.lock();
        let request = tables
            .subscriptions
            .get_mut(&id.0)
            .ok_or(RepositoryError::NotFound)?;
        request.plan = plan;
        request.status = status;
        request.updated_at = Utc::now();
        Ok(request.clone())
    }

    fn subscriptions_for_user(
        &self,
        user: UserId,
    ) -> Result<Vec<SubscriptionRequest>, RepositoryError> {
        let tables = self.lock();
        let mut requests: Vec<_> = tables
            .subscriptions
            .values()
            .filter(|request| request.user == user)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(requests)
    }

    fn all_subscriptions(&self) -> Result<Vec<SubscriptionRequest>, RepositoryError> {
        let tables = self.lock();
        let mut requests: Vec<_> = tables.subscriptions.values().cloned().collect();
        requests.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(requests)
    }
}

impl RatingRepository for MemoryStore {
    fn insert_rating(
        &self,
        job: JobId,
        user: UserId,
        rating: RatingScore,
    ) -> Result<EmployeeRating, RepositoryError> {
        let mut tables = self.lock();
        let exists = tables
            .ratings
            .values()
            .any(|row| row.job == job && row.user == user);
        if exists {
            return Err(RepositoryError::Conflict);
        }

        let now = Utc::now();
        let id = tables.next_id();
        let row = EmployeeRating {
            id: RatingId(id),
            job,
            user,
            rating,
            created_at: now,
            updated_at: now,
        };
        tables.ratings.insert(id, row.clone());
        Ok(row)
    }

    fn rating_for_pair(
        &self,
        job: JobId,
        user: UserId,
    ) -> Result<Option<EmployeeRating>, RepositoryError> {
        let tables = self.lock();
        Ok(tables
            .ratings
            .values()
            .find(|row| row.job == job && row.user == user)
            .cloned())
    }

    fn update_rating(
        &self,
        id: RatingId,
        rating: RatingScore,
    ) -> Result<EmployeeRating, RepositoryError> {
        let mut tables = self.lock();
        let row = tables.ratings.get_mut(&id.0).ok_or(RepositoryError::NotFound)?;
        row.rating = rating;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    fn delete_rating(&self, id: RatingId) -> Result<(), RepositoryError> {
        let mut tables = self.lock();
        tables
            .ratings
            .remove(&id.0)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn ratings_for_user(&self, user: UserId) -> Result<Vec<EmployeeRating>, RepositoryError> {
        let tables = self.lock();
        let mut rows: Vec<_> = tables
            .ratings
            .values()
            .filter(|row| row.user == user)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }
}

impl TokenLedger for MemoryStore {
    fn append_token_event(&self, event: TokenEvent) -> Result<u32, RepositoryError> {
        let mut tables = self.lock();
        let user = event.user;
        tables.token_events.push(event);
        Ok(tables.balance_of(user))
    }

    fn try_debit_token(
        &self,
        user: UserId,
        reason: TokenReason,
    ) -> Result<Option<u32>, RepositoryError> {
        let mut tables = self.lock();
        if tables.balance_of(user) == 0 {
            return Ok(None);
        }
        tables
            .token_events
            .push(TokenEvent::new(user, TokenEntry::Debit, reason));
        Ok(Some(tables.balance_of(user)))
    }

    fn token_balance(&self, user: UserId) -> Result<u32, RepositoryError> {
        Ok(self.lock().balance_of(user))
    }

    fn token_events(&self, user: UserId) -> Result<Vec<TokenEvent>, RepositoryError> {
        let tables = self.lock();
        Ok(tables
            .token_events
            .iter()
            .filter(|event| event.user == user)
            .cloned()
            .collect())
    }
}
