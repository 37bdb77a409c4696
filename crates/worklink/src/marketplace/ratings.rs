//! Ratings for completed hires.
//!
//! A rating exists per (job, user) pair, can only be created once the job has
//! ended, and only for a worker whose application was accepted. Updates and
//! deletes require ownership and an existing row, nothing more.

use std::sync::Arc;

use tracing::info;

use super::domain::{
    ApplicationStatus, EmployeeRating, JobId, JobLifecycle, JobPosting, RatingScore,
    UserAccount, UserId,
};
use super::repository::{MarketStore, RepositoryError};

/// Error raised by rating operations.
#[derive(Debug, thiserror::Error)]
pub enum RatingError {
    #[error("job not found")]
    JobNotFound,
    #[error("you do not own this job")]
    NotJobOwner,
    #[error("job is not ended yet")]
    JobNotEnded,
    #[error("user was not hired for this job")]
    NotHired,
    #[error("rating already exists for this user; use update instead")]
    RatingAlreadyExists,
    #[error("rating not found")]
    RatingNotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Service over the rating ledger.
pub struct RatingService<S> {
    store: Arc<S>,
}

impl<S> RatingService<S>
where
    S: MarketStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The rating for (job, user), if one exists. Absence is not an error:
    /// the owner asks before deciding between create and update.
    pub fn get(
        &self,
        employer: &UserAccount,
        job_id: JobId,
        user_id: UserId,
    ) -> Result<Option<EmployeeRating>, RatingError> {
        self.owned_job(employer, job_id)?;
        Ok(self.store.rating_for_pair(job_id, user_id)?)
    }

    /// Create a rating for a completed hire.
    pub fn rate(
        &self,
        employer: &UserAccount,
        job_id: JobId,
        user_id: UserId,
        score: RatingScore,
    ) -> Result<EmployeeRating, RatingError> {
        let job = self.owned_job(employer, job_id)?;
        if job.lifecycle != JobLifecycle::Ended {
            return Err(RatingError::JobNotEnded);
        }

        let hired = self
            .store
            .application_for_pair(job_id, user_id, false)?
            .is_some_and(|row| row.status == ApplicationStatus::Accepted);
        if !hired {
            return Err(RatingError::NotHired);
        }

        if self.store.rating_for_pair(job_id, user_id)?.is_some() {
            return Err(RatingError::RatingAlreadyExists);
        }

        let rating = self.store.insert_rating(job_id, user_id, score)?;
        info!(job = %job_id, user = %user_id, score = score.value(), "rating created");
        Ok(rating)
    }

    pub fn update(
        &self,
        employer: &UserAccount,
        job_id: JobId,
        user_id: UserId,
        score: RatingScore,
    ) -> Result<EmployeeRating, RatingError> {
        self.owned_job(employer, job_id)?;
        let existing = self
            .store
            .rating_for_pair(job_id, user_id)?
            .ok_or(RatingError::RatingNotFound)?;
        Ok(self.store.update_rating(existing.id, score)?)
    }

    pub fn delete(
        &self,
        employer: &UserAccount,
        job_id: JobId,
        user_id: UserId,
    ) -> Result<(), RatingError> {
        self.owned_job(employer, job_id)?;
        let existing = self
            .store
            .rating_for_pair(job_id, user_id)?
            .ok_or(RatingError::RatingNotFound)?;
        self.store.delete_rating(existing.id)?;
        info!(job = %job_id, user = %user_id, "rating deleted");
        Ok(())
    }

    fn owned_job(&self, employer: &UserAccount, job_id: JobId) -> Result<JobPosting, RatingError> {
        let job = self.store.job(job_id)?.ok_or(RatingError::JobNotFound)?;
        if job.employer != employer.id {
            return Err(RatingError::NotJobOwner);
        }
        Ok(job)
    }
}
