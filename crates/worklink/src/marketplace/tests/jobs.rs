use super::common::*;
use crate::marketplace::domain::{ApplicationStatus, JobLifecycle};
use crate::marketplace::jobs::JobError;

#[test]
fn ending_a_job_moves_only_applied_rows_to_done() {
    let h = harness();
    let boss = employer(&h.store, "boss");
    let job = h.jobs.create(&boss, sample_job()).expect("job posts");

    let mut applications = Vec::new();
    for name in ["ana", "ben", "cruz"] {
        let worker = employee(&h.store, name);
        grant_tokens(&h.store, worker.id, 3);
        applications.push(h.applications.apply(&worker, job.id).expect("apply").application);
    }
    h.applications
        .update_status(&boss, applications[1].id, ApplicationStatus::Accepted)
        .expect("accept");
    h.applications
        .update_status(&boss, applications[2].id, ApplicationStatus::Rejected)
        .expect("reject");

    let outcome = h.jobs.end(&boss, job.id).expect("job ends");

    assert_eq!(outcome.job.lifecycle, JobLifecycle::Ended);
    assert!(!outcome.already_ended);
    assert_eq!(outcome.applications_closed, 1);

    let roster = h.applications.roster(&boss).expect("roster loads");
    let status_of = |id| {
        roster
            .iter()
            .find(|row| row.id == id)
            .expect("row present")
            .status
    };
    assert_eq!(status_of(applications[0].id), ApplicationStatus::Done);
    assert_eq!(status_of(applications[1].id), ApplicationStatus::Accepted);
    assert_eq!(status_of(applications[2].id), ApplicationStatus::Rejected);
}

#[test]
fn ending_twice_is_one_way_and_skips_the_cascade() {
    let h = harness();
    let boss = employer(&h.store, "boss");
    let worker = employee(&h.store, "worker");
    grant_tokens(&h.store, worker.id, 3);
    let job = h.jobs.create(&boss, sample_job()).expect("job posts");
    h.applications.apply(&worker, job.id).expect("apply");

    let first = h.jobs.end(&boss, job.id).expect("first end");
    assert_eq!(first.applications_closed, 1);

    let second = h.jobs.end(&boss, job.id).expect("second end");
    assert!(second.already_ended);
    assert_eq!(second.job.lifecycle, JobLifecycle::Ended);
    assert_eq!(second.applications_closed, 0);
}

#[test]
fn ending_requires_ownership() {
    let h = harness();
    let boss = employer(&h.store, "boss");
    let rival = employer(&h.store, "rival");
    let job = h.jobs.create(&boss, sample_job()).expect("job posts");

    let err = h.jobs.end(&rival, job.id).expect_err("rival cannot end");
    assert!(matches!(err, JobError::NotJobOwner));
    assert_eq!(
        h.jobs.show(&boss, job.id).expect("show").job.lifecycle,
        JobLifecycle::Active
    );
}

#[test]
fn listings_are_role_scoped() {
    let h = harness();
    let boss = employer(&h.store, "boss");
    let rival = employer(&h.store, "rival");
    let worker = employee(&h.store, "worker");
    let overseer = admin(&h.store, "overseer");
    grant_tokens(&h.store, worker.id, 3);

    let open = h.jobs.create(&boss, sample_job()).expect("job posts");
    let closed = h.jobs.create(&rival, sample_job()).expect("job posts");
    h.jobs.end(&rival, closed.id).expect("job ends");
    h.applications.apply(&worker, open.id).expect("apply");

    // Employees browse active postings only, without counts.
    let seen = h.jobs.list(&worker, None).expect("employee list");
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].job.id, open.id);
    assert!(seen[0].applicants_count.is_none());

    // Employers see their own postings with counts.
    let own = h.jobs.list(&boss, None).expect("employer list");
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].applicants_count, Some(1));

    // Admins see everything.
    let all = h.jobs.list(&overseer, None).expect("admin list");
    assert_eq!(all.len(), 2);
}

#[test]
fn search_filters_across_text_fields() {
    let h = harness();
    let boss = employer(&h.store, "boss");
    h.jobs.create(&boss, sample_job()).expect("job posts");
    let mut other = sample_job();
    other.title = "Line cook".to_string();
    other.company = "Bayside Diner".to_string();
    h.jobs.create(&boss, other).expect("job posts");

    let hits = h.jobs.list(&boss, Some("bayside".to_string())).expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].job.title, "Line cook");
}

#[test]
fn history_reports_applicant_and_hired_counts() {
    let h = harness();
    let boss = employer(&h.store, "boss");
    let job = h.jobs.create(&boss, sample_job()).expect("job posts");
    let ana = employee(&h.store, "ana");
    let ben = employee(&h.store, "ben");
    grant_tokens(&h.store, ana.id, 3);
    grant_tokens(&h.store, ben.id, 3);
    let hired = h.applications.apply(&ana, job.id).expect("apply").application;
    h.applications.apply(&ben, job.id).expect("apply");
    h.applications
        .update_status(&boss, hired.id, ApplicationStatus::Accepted)
        .expect("accept");
    h.jobs.end(&boss, job.id).expect("job ends");

    let history = h.jobs.history(&boss).expect("history loads");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].total_applicants, 2);
    assert_eq!(history[0].hired, 1);
    assert_eq!(history[0].status, JobLifecycle::Ended);
    assert!(history[0].ended_date.is_some());
}

#[test]
fn detail_view_scopes_the_applicant_roster() {
    let h = harness();
    let boss = employer(&h.store, "boss");
    let rival = employer(&h.store, "rival");
    let worker = employee(&h.store, "worker");
    grant_tokens(&h.store, worker.id, 3);
    let job = h.jobs.create(&boss, sample_job()).expect("job posts");
    h.applications.apply(&worker, job.id).expect("apply");

    let owner_view = h.jobs.show(&boss, job.id).expect("owner show");
    assert_eq!(owner_view.applied_users.as_ref().map(Vec::len), Some(1));

    let applicant_view = h.jobs.show(&worker, job.id).expect("applicant show");
    assert!(applicant_view.applied_users.is_none());
    assert!(applicant_view.user_application.is_some());

    // Employers cannot open postings they do not own.
    let err = h.jobs.show(&rival, job.id).expect_err("rival show fails");
    assert!(matches!(err, JobError::JobNotFound));
}
