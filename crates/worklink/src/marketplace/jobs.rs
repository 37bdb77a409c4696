//! Job postings: CRUD, role-scoped listings, employer history, and the
//! end-of-job cascade that closes out pending applications.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use super::domain::{
    ApplicationStatus, JobApplication, JobId, JobLifecycle, JobPosting, JobUpdate, NewJob,
    Role, UserAccount, UserView,
};
use super::repository::{ApplicationFilter, JobFilter, MarketStore, RepositoryError};

/// Error raised by job operations.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("job not found")]
    JobNotFound,
    #[error("you do not own this job")]
    NotJobOwner,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Posting joined with its applicant count for listings.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    #[serde(flatten)]
    pub job: JobPosting,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicants_count: Option<usize>,
}

/// A single applicant row on a job's detail page.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicantEntry {
    pub application_id: super::domain::ApplicationId,
    pub status: ApplicationStatus,
    pub application_date: chrono::DateTime<chrono::Utc>,
    pub user: UserView,
}

/// Full detail view: the posting, the caller's own application, and (for the
/// owner or an admin) the applicant roster.
#[derive(Debug, Clone, Serialize)]
pub struct JobDetails {
    #[serde(flatten)]
    pub job: JobPosting,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employer_full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_application: Option<JobApplication>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_users: Option<Vec<ApplicantEntry>>,
}

/// One row of the employer's job history page.
#[derive(Debug, Clone, Serialize)]
pub struct JobHistoryEntry {
    pub id: JobId,
    pub title: String,
    pub location: String,
    pub salary: String,
    pub status: JobLifecycle,
    pub posted_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_date: Option<NaiveDate>,
    pub total_applicants: usize,
    pub hired: usize,
}

/// Result of an end-job call.
#[derive(Debug, Clone, Serialize)]
pub struct EndJobOutcome {
    #[serde(flatten)]
    pub job: JobPosting,
    /// How many `Applied` rows the cascade moved to `Done`. Zero on a repeat
    /// call: the cascade runs only on the first transition.
    pub applications_closed: usize,
    pub already_ended: bool,
}

/// Service over the job store.
pub struct JobService<S> {
    store: Arc<S>,
}

impl<S> JobService<S>
where
    S: MarketStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create(
        &self,
        employer: &UserAccount,
        job: NewJob,
    ) -> Result<JobPosting, JobError> {
        let posting = self.store.insert_job(employer.id, job)?;
        info!(job = %posting.id, employer = %employer.id, "job posted");
        Ok(posting)
    }

    /// Role-scoped listing: employees browse active postings, employers see
    /// their own postings with applicant counts, admins see everything.
    pub fn list(
        &self,
        viewer: &UserAccount,
        search: Option<String>,
    ) -> Result<Vec<JobSummary>, JobError> {
        let filter = match viewer.role {
            Role::Employee => JobFilter {
                lifecycle: Some(JobLifecycle::Active),
                search,
                ..JobFilter::default()
            },
            Role::Employer => JobFilter {
                employer: Some(viewer.id),
                search,
                ..JobFilter::default()
            },
            Role::Admin => JobFilter {
                search,
                ..JobFilter::default()
            },
        };
        let with_counts = viewer.role != Role::Employee;

        let jobs = self.store.jobs(&filter)?;
        jobs.into_iter()
            .map(|job| {
                let applicants_count = if with_counts {
                    Some(self.applicant_count(job.id)?)
                } else {
                    None
                };
                Ok(JobSummary {
                    job,
                    applicants_count,
                })
            })
            .collect()
    }

    /// Detail view. Employers can only open their own postings; the applicant
    /// roster is shown to the owner and to admins.
    pub fn show(&self, viewer: &UserAccount, job_id: JobId) -> Result<JobDetails, JobError> {
        let job = self.store.job(job_id)?.ok_or(JobError::JobNotFound)?;
        if viewer.role == Role::Employer && job.employer != viewer.id {
            return Err(JobError::JobNotFound);
        }

        let employer_full_name = self
            .store
            .user(job.employer)?
            .map(|account| account.full_name());
        let user_application = self
            .store
            .application_for_pair(job_id, viewer.id, false)?;

        let applied_users = if viewer.role == Role::Admin || job.employer == viewer.id {
            let rows = self.store.applications(&ApplicationFilter {
                job: Some(job_id),
                ..ApplicationFilter::default()
            })?;
            let mut entries = Vec::with_capacity(rows.len());
            for row in rows {
                if let Some(account) = self.store.user(row.user)? {
                    entries.push(ApplicantEntry {
                        application_id: row.id,
                        status: row.status,
                        application_date: row.created_at,
                        user: UserView::from(&account),
                    });
                }
            }
            Some(entries)
        } else {
            None
        };

        Ok(JobDetails {
            job,
            employer_full_name,
            user_application,
            applied_users,
        })
    }

    pub fn update(
        &self,
        employer: &UserAccount,
        job_id: JobId,
        update: JobUpdate,
    ) -> Result<JobPosting, JobError> {
        self.owned_job(employer, job_id)?;
        Ok(self.store.update_job(job_id, update)?)
    }

    pub fn delete(&self, employer: &UserAccount, job_id: JobId) -> Result<(), JobError> {
        self.owned_job(employer, job_id)?;
        self.store.soft_delete_job(job_id)?;
        info!(job = %job_id, "job deleted");
        Ok(())
    }

    /// End a job (one-way) and close out pending applications. A repeat call
    /// reports `already_ended` and leaves every application untouched.
    pub fn end(&self, employer: &UserAccount, job_id: JobId) -> Result<EndJobOutcome, JobError> {
        self.owned_job(employer, job_id)?;

        let prior = self.store.end_job(job_id)?;
        let applications_closed = if prior == JobLifecycle::Active {
            self.store.mark_applied_done(job_id)?
        } else {
            0
        };
        let job = self.store.job(job_id)?.ok_or(JobError::JobNotFound)?;

        info!(job = %job_id, closed = applications_closed, "job ended");
        Ok(EndJobOutcome {
            job,
            applications_closed,
            already_ended: prior == JobLifecycle::Ended,
        })
    }

    pub fn history(&self, employer: &UserAccount) -> Result<Vec<JobHistoryEntry>, JobError> {
        let jobs = self.store.jobs(&JobFilter {
            employer: Some(employer.id),
            ..JobFilter::default()
        })?;

        jobs.into_iter()
            .map(|job| {
                let rows = self.store.applications(&ApplicationFilter {
                    job: Some(job.id),
                    ..ApplicationFilter::default()
                })?;
                let hired = rows
                    .iter()
                    .filter(|row| row.status == ApplicationStatus::Accepted)
                    .count();
                Ok(JobHistoryEntry {
                    id: job.id,
                    title: job.title,
                    location: job.location,
                    salary: job.salary,
                    status: job.lifecycle,
                    posted_date: job.created_at.date_naive(),
                    ended_date: (job.lifecycle == JobLifecycle::Ended)
                        .then(|| job.updated_at.date_naive()),
                    total_applicants: rows.len(),
                    hired,
                })
            })
            .collect()
    }

    fn applicant_count(&self, job_id: JobId) -> Result<usize, RepositoryError> {
        Ok(self
            .store
            .applications(&ApplicationFilter {
                job: Some(job_id),
                ..ApplicationFilter::default()
            })?
            .len())
    }

    fn owned_job(&self, employer: &UserAccount, job_id: JobId) -> Result<JobPosting, JobError> {
        let job = self.store.job(job_id)?.ok_or(JobError::JobNotFound)?;
        if job.employer != employer.id {
            return Err(JobError::NotJobOwner);
        }
        Ok(job)
    }
}
