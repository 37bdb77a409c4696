use std::sync::Arc;

use chrono::NaiveDate;

use crate::marketplace::applications::ApplicationService;
use crate::marketplace::domain::{
    NewJob, NewUser, PlanId, Role, SubscriptionPlan, SubscriptionStatus, UserAccount, UserId,
};
use crate::marketplace::identity::IdentityService;
use crate::marketplace::jobs::JobService;
use crate::marketplace::memory::MemoryStore;
use crate::marketplace::ratings::RatingService;
use crate::marketplace::repository::{SubscriptionRepository, TokenLedger, UserRepository};
use crate::marketplace::subscriptions::{SubscriptionReview, SubscriptionService};
use crate::marketplace::tokens::{TokenEntry, TokenEvent, TokenReason};

pub(super) struct Harness {
    pub(super) store: Arc<MemoryStore>,
    pub(super) identity: IdentityService<MemoryStore>,
    pub(super) jobs: JobService<MemoryStore>,
    pub(super) applications: ApplicationService<MemoryStore>,
    pub(super) ratings: RatingService<MemoryStore>,
    pub(super) subscriptions: SubscriptionService<MemoryStore>,
}

pub(super) fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    Harness {
        identity: IdentityService::new(store.clone()),
        jobs: JobService::new(store.clone()),
        applications: ApplicationService::new(store.clone()),
        ratings: RatingService::new(store.clone()),
        subscriptions: SubscriptionService::new(store.clone()),
        store,
    }
}

fn new_user(role: Role, username: &str) -> NewUser {
    NewUser {
        role,
        username: username.to_string(),
        // Not a real hash; credential checks go through the identity tests.
        password_hash: "x".to_string(),
        first_name: "Test".to_string(),
        last_name: username.to_string(),
        middle_name: None,
        birth_date: NaiveDate::from_ymd_opt(1990, 6, 15).expect("valid date"),
        phone: "555-0100".to_string(),
        address: "1 Main St".to_string(),
        city: "Davao".to_string(),
        gender: "other".to_string(),
        profile_picture: None,
    }
}

pub(super) fn employee(store: &MemoryStore, username: &str) -> UserAccount {
    store
        .insert_user(new_user(Role::Employee, username))
        .expect("employee inserts")
}

pub(super) fn employer(store: &MemoryStore, username: &str) -> UserAccount {
    store
        .insert_user(new_user(Role::Employer, username))
        .expect("employer inserts")
}

pub(super) fn admin(store: &MemoryStore, username: &str) -> UserAccount {
    store
        .insert_user(new_user(Role::Admin, username))
        .expect("admin inserts")
}

pub(super) fn grant_tokens(store: &MemoryStore, user: UserId, count: u32) {
    store
        .append_token_event(TokenEvent::new(
            user,
            TokenEntry::Set(count),
            TokenReason::PlanActivation,
        ))
        .expect("token grant appends");
}

pub(super) fn balance(store: &MemoryStore, user: UserId) -> u32 {
    store.token_balance(user).expect("balance projects")
}

pub(super) fn sample_job() -> NewJob {
    NewJob {
        title: "Warehouse picker".to_string(),
        description: "Seasonal picking and packing".to_string(),
        location: "Davao".to_string(),
        salary: "600/day".to_string(),
        company: "Harbor Logistics".to_string(),
        contact: "hr@harborlogistics.example".to_string(),
        max_applicants: 20,
        duration: NaiveDate::from_ymd_opt(2026, 9, 30).expect("valid date"),
    }
}

pub(super) fn plan_id(store: &MemoryStore, plan: SubscriptionPlan) -> PlanId {
    store
        .plans()
        .expect("catalog loads")
        .into_iter()
        .find(|record| record.plan == plan)
        .expect("plan seeded")
        .id
}

/// Run the full subscribe-and-approve flow so `user` holds an active plan.
pub(super) fn activate_plan(
    harness: &Harness,
    user: &UserAccount,
    plan: SubscriptionPlan,
    token_count: Option<u32>,
) {
    let plan_id = plan_id(&harness.store, plan);
    harness
        .subscriptions
        .request(user, plan_id)
        .expect("plan request succeeds");
    harness
        .subscriptions
        .review(SubscriptionReview {
            user: user.id,
            plan: plan_id,
            status: SubscriptionStatus::Active,
            token_count,
        })
        .expect("plan activation succeeds");
}
