use chrono::NaiveDate;

use super::common::*;
use crate::marketplace::domain::{ApplicationStatus, RatingScore, Role};
use crate::marketplace::identity::{IdentityError, NewUserRequest};

fn registration(role: Role, username: &str) -> NewUserRequest {
    NewUserRequest {
        role,
        username: username.to_string(),
        password: "correct-horse-battery".to_string(),
        first_name: "Liza".to_string(),
        last_name: "Reyes".to_string(),
        middle_name: None,
        birth_date: NaiveDate::from_ymd_opt(1996, 1, 20).expect("valid date"),
        phone: "555-0101".to_string(),
        address: "8 Pier Rd".to_string(),
        city: "Cebu".to_string(),
        gender: "female".to_string(),
        profile_picture: None,
    }
}

#[test]
fn registration_hashes_the_password_and_verifies_credentials() {
    let h = harness();
    h.identity
        .register(registration(Role::Employee, "liza"))
        .expect("registration succeeds");

    let account = h
        .identity
        .verify_credentials("liza", "correct-horse-battery")
        .expect("credentials verify");
    assert_eq!(account.role, Role::Employee);
    assert_ne!(account.password_hash, "correct-horse-battery");

    let err = h
        .identity
        .verify_credentials("liza", "wrong-password")
        .expect_err("bad password rejected");
    assert!(matches!(err, IdentityError::InvalidCredentials));
}

#[test]
fn admins_cannot_self_register_and_usernames_are_unique() {
    let h = harness();
    let err = h
        .identity
        .register(registration(Role::Admin, "root"))
        .expect_err("admin self-registration rejected");
    assert!(matches!(err, IdentityError::RoleNotRegisterable(Role::Admin)));

    h.identity
        .register(registration(Role::Employee, "liza"))
        .expect("first registration succeeds");
    let err = h
        .identity
        .register(registration(Role::Employer, "liza"))
        .expect_err("duplicate username rejected");
    assert!(matches!(err, IdentityError::UsernameTaken));
}

#[test]
fn me_reports_balance_counts_and_average_rating() {
    let h = harness();
    let boss = employer(&h.store, "boss");
    let worker = employee(&h.store, "worker");
    grant_tokens(&h.store, worker.id, 5);

    let job = h.jobs.create(&boss, sample_job()).expect("job posts");
    let application = h.applications.apply(&worker, job.id).expect("apply").application;
    h.applications
        .update_status(&boss, application.id, ApplicationStatus::Accepted)
        .expect("accept");
    h.jobs.end(&boss, job.id).expect("job ends");
    h.ratings
        .rate(&boss, job.id, worker.id, RatingScore::new(4).expect("valid"))
        .expect("rating creates");

    let me = h.identity.me(&worker).expect("me loads");
    assert_eq!(me.token_balance, 3);
    assert_eq!(me.total_jobs, 1);
    assert_eq!(me.jobs.len(), 1);
    assert_eq!(me.jobs[0].status, ApplicationStatus::Accepted);
    assert!((me.rating - 4.0).abs() < f64::EPSILON);
}

#[test]
fn profile_aggregates_history_and_completed_jobs() {
    let h = harness();
    let boss = employer(&h.store, "boss");
    let worker = employee(&h.store, "worker");
    grant_tokens(&h.store, worker.id, 5);

    let hired_job = h.jobs.create(&boss, sample_job()).expect("job posts");
    let open_job = h.jobs.create(&boss, sample_job()).expect("job posts");
    let hired = h.applications.apply(&worker, hired_job.id).expect("apply").application;
    h.applications.apply(&worker, open_job.id).expect("apply");
    h.applications
        .update_status(&boss, hired.id, ApplicationStatus::Accepted)
        .expect("accept");
    h.jobs.end(&boss, hired_job.id).expect("job ends");

    let profile = h.identity.profile(worker.id).expect("profile loads");
    assert_eq!(profile.application_history.len(), 2);
    assert_eq!(profile.stats.total_applications, 2);
    assert_eq!(profile.stats.accepted_applications, 1);
    assert_eq!(profile.stats.pending_applications, 1);
    assert_eq!(profile.stats.completed_jobs, 1);
}

#[test]
fn soft_deleted_users_disappear_from_lookups() {
    let h = harness();
    let worker = employee(&h.store, "worker");

    h.identity.admin_delete(worker.id).expect("delete succeeds");

    assert!(h.identity.load(worker.id).expect("load").is_none());
    let err = h.identity.admin_delete(worker.id).expect_err("second delete fails");
    assert!(matches!(err, IdentityError::UserNotFound));
}

#[test]
fn admin_overview_tallies_roles_and_platform_totals() {
    let h = harness();
    admin(&h.store, "root");
    let boss = employer(&h.store, "boss");
    let worker = employee(&h.store, "worker");
    grant_tokens(&h.store, worker.id, 3);
    let job = h.jobs.create(&boss, sample_job()).expect("job posts");
    h.applications.apply(&worker, job.id).expect("apply");

    let overview = h.identity.admin_overview().expect("overview loads");
    assert_eq!(overview.admin.len(), 1);
    assert_eq!(overview.total_users, 1);
    assert_eq!(overview.total_employers, 1);
    assert_eq!(overview.total_jobs, 1);
    assert_eq!(overview.total_applications, 1);
}
