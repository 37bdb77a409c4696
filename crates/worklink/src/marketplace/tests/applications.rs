use super::common::*;
use crate::marketplace::applications::ApplicationError;
use crate::marketplace::domain::{ApplicationStatus, SubscriptionPlan};

#[test]
fn applying_debits_exactly_one_token() {
    let h = harness();
    let boss = employer(&h.store, "boss");
    let worker = employee(&h.store, "worker");
    grant_tokens(&h.store, worker.id, 3);
    let job = h.jobs.create(&boss, sample_job()).expect("job posts");

    let outcome = h.applications.apply(&worker, job.id).expect("apply succeeds");

    assert_eq!(outcome.application.status, ApplicationStatus::Applied);
    assert!(!outcome.restored);
    assert_eq!(outcome.tokens_remaining, Some(2));
    assert_eq!(balance(&h.store, worker.id), 2);
}

#[test]
fn applying_with_zero_balance_fails_without_side_effects() {
    let h = harness();
    let boss = employer(&h.store, "boss");
    let worker = employee(&h.store, "worker");
    let job = h.jobs.create(&boss, sample_job()).expect("job posts");

    let err = h.applications.apply(&worker, job.id).expect_err("apply fails");
    assert!(matches!(err, ApplicationError::InsufficientTokens));

    let roster = h.applications.roster(&worker).expect("roster loads");
    assert!(roster.is_empty());
    assert_eq!(balance(&h.store, worker.id), 0);
}

#[test]
fn unlimited_plan_bypasses_the_balance_check() {
    let h = harness();
    let boss = employer(&h.store, "boss");
    let worker = employee(&h.store, "worker");
    activate_plan(&h, &worker, SubscriptionPlan::UnlimitedToken, None);
    assert_eq!(balance(&h.store, worker.id), 0);
    let job = h.jobs.create(&boss, sample_job()).expect("job posts");

    let outcome = h.applications.apply(&worker, job.id).expect("apply succeeds");

    assert!(outcome.tokens_remaining.is_none());
    assert_eq!(balance(&h.store, worker.id), 0);
}

#[test]
fn duplicate_application_is_rejected() {
    let h = harness();
    let boss = employer(&h.store, "boss");
    let worker = employee(&h.store, "worker");
    grant_tokens(&h.store, worker.id, 5);
    let job = h.jobs.create(&boss, sample_job()).expect("job posts");

    h.applications.apply(&worker, job.id).expect("first apply");
    let err = h.applications.apply(&worker, job.id).expect_err("second apply fails");
    assert!(matches!(err, ApplicationError::DuplicateApplication));
    assert_eq!(balance(&h.store, worker.id), 4);
}

#[test]
fn cancel_then_reapply_restores_the_withdrawn_row() {
    let h = harness();
    let boss = employer(&h.store, "boss");
    let worker = employee(&h.store, "worker");
    grant_tokens(&h.store, worker.id, 3);
    let job = h.jobs.create(&boss, sample_job()).expect("job posts");

    let first = h.applications.apply(&worker, job.id).expect("apply succeeds");
    assert_eq!(balance(&h.store, worker.id), 2);

    h.applications.cancel(&worker, job.id).expect("cancel succeeds");
    // No refund on withdrawal.
    assert_eq!(balance(&h.store, worker.id), 2);

    let second = h.applications.apply(&worker, job.id).expect("re-apply succeeds");
    assert!(second.restored);
    assert_eq!(second.application.id, first.application.id);
    assert_eq!(second.application.status, ApplicationStatus::Applied);
    // The restore path never debits either, so the pair is idempotent.
    assert_eq!(balance(&h.store, worker.id), 2);
}

#[test]
fn only_applied_rows_can_be_withdrawn() {
    let h = harness();
    let boss = employer(&h.store, "boss");
    let worker = employee(&h.store, "worker");
    grant_tokens(&h.store, worker.id, 3);
    let job = h.jobs.create(&boss, sample_job()).expect("job posts");
    let outcome = h.applications.apply(&worker, job.id).expect("apply succeeds");

    h.applications
        .update_status(&boss, outcome.application.id, ApplicationStatus::Accepted)
        .expect("accept succeeds");

    let err = h.applications.cancel(&worker, job.id).expect_err("cancel fails");
    assert!(matches!(err, ApplicationError::NotWithdrawable));
}

#[test]
fn accept_then_reject_returns_the_token() {
    let h = harness();
    let boss = employer(&h.store, "boss");
    let worker = employee(&h.store, "worker");
    grant_tokens(&h.store, worker.id, 5);
    let job = h.jobs.create(&boss, sample_job()).expect("job posts");

    let outcome = h.applications.apply(&worker, job.id).expect("apply succeeds");
    assert_eq!(balance(&h.store, worker.id), 4);

    h.applications
        .update_status(&boss, outcome.application.id, ApplicationStatus::Accepted)
        .expect("accept succeeds");
    assert_eq!(balance(&h.store, worker.id), 3);

    let rejected = h
        .applications
        .update_status(&boss, outcome.application.id, ApplicationStatus::Rejected)
        .expect("reject succeeds");
    assert_eq!(rejected.status, ApplicationStatus::Rejected);
    assert_eq!(balance(&h.store, worker.id), 4);
}

#[test]
fn accepting_with_an_empty_balance_fails_and_changes_nothing() {
    let h = harness();
    let boss = employer(&h.store, "boss");
    let worker = employee(&h.store, "worker");
    grant_tokens(&h.store, worker.id, 1);
    let job = h.jobs.create(&boss, sample_job()).expect("job posts");

    let outcome = h.applications.apply(&worker, job.id).expect("apply succeeds");
    assert_eq!(balance(&h.store, worker.id), 0);

    let err = h
        .applications
        .update_status(&boss, outcome.application.id, ApplicationStatus::Accepted)
        .expect_err("accept fails");
    assert!(matches!(err, ApplicationError::InsufficientTokens));

    let roster = h.applications.roster(&worker).expect("roster loads");
    assert_eq!(roster[0].status, ApplicationStatus::Applied);
    assert_eq!(balance(&h.store, worker.id), 0);
}

#[test]
fn transitions_outside_the_table_are_rejected() {
    let h = harness();
    let boss = employer(&h.store, "boss");
    let worker = employee(&h.store, "worker");
    grant_tokens(&h.store, worker.id, 3);
    let job = h.jobs.create(&boss, sample_job()).expect("job posts");
    let outcome = h.applications.apply(&worker, job.id).expect("apply succeeds");

    // Writing the current status again is not a transition.
    let err = h
        .applications
        .update_status(&boss, outcome.application.id, ApplicationStatus::Applied)
        .expect_err("no-op write rejected");
    assert!(matches!(err, ApplicationError::InvalidTransition(_, _)));

    // `Done` rows are terminal: end the job, then try to reopen the row.
    h.jobs.end(&boss, job.id).expect("job ends");
    let err = h
        .applications
        .update_status(&boss, outcome.application.id, ApplicationStatus::Accepted)
        .expect_err("done row is immutable");
    assert!(matches!(err, ApplicationError::InvalidTransition(_, _)));
    assert_eq!(balance(&h.store, worker.id), 2);
}

#[test]
fn only_the_job_owner_may_review_applications() {
    let h = harness();
    let boss = employer(&h.store, "boss");
    let rival = employer(&h.store, "rival");
    let worker = employee(&h.store, "worker");
    grant_tokens(&h.store, worker.id, 3);
    let job = h.jobs.create(&boss, sample_job()).expect("job posts");
    let outcome = h.applications.apply(&worker, job.id).expect("apply succeeds");

    let err = h
        .applications
        .update_status(&rival, outcome.application.id, ApplicationStatus::Accepted)
        .expect_err("rival cannot review");
    assert!(matches!(err, ApplicationError::NotJobOwner));
}

#[test]
fn applying_to_missing_or_ended_jobs_fails() {
    let h = harness();
    let boss = employer(&h.store, "boss");
    let worker = employee(&h.store, "worker");
    grant_tokens(&h.store, worker.id, 3);

    let err = h
        .applications
        .apply(&worker, crate::marketplace::domain::JobId(9999))
        .expect_err("missing job");
    assert!(matches!(err, ApplicationError::JobNotFound));

    let job = h.jobs.create(&boss, sample_job()).expect("job posts");
    h.jobs.end(&boss, job.id).expect("job ends");
    let err = h.applications.apply(&worker, job.id).expect_err("ended job");
    assert!(matches!(err, ApplicationError::JobEnded));
    assert_eq!(balance(&h.store, worker.id), 3);
}
