use super::common::*;
use crate::marketplace::domain::{SubscriptionPlan, SubscriptionStatus, UserId};
use crate::marketplace::subscriptions::{SubscriptionError, SubscriptionReview};

#[test]
fn requesting_a_plan_creates_a_pending_row() {
    let h = harness();
    let worker = employee(&h.store, "worker");
    let plan = plan_id(&h.store, SubscriptionPlan::TwentyToken);

    let outcome = h.subscriptions.request(&worker, plan).expect("request succeeds");

    assert!(outcome.created);
    assert_eq!(outcome.request.status, SubscriptionStatus::Pending);
    assert_eq!(outcome.request.plan, plan);
}

#[test]
fn requesting_over_a_pending_row_updates_it_in_place() {
    let h = harness();
    let worker = employee(&h.store, "worker");
    let twenty = plan_id(&h.store, SubscriptionPlan::TwentyToken);
    let unlimited = plan_id(&h.store, SubscriptionPlan::UnlimitedToken);

    let first = h.subscriptions.request(&worker, twenty).expect("first request");
    let second = h.subscriptions.request(&worker, unlimited).expect("second request");

    assert!(!second.created);
    assert_eq!(second.request.id, first.request.id);
    assert_eq!(second.request.plan, unlimited);
    assert_eq!(h.subscriptions.history(&worker).expect("history").len(), 1);
}

#[test]
fn requesting_over_an_active_plan_deactivates_it() {
    let h = harness();
    let worker = employee(&h.store, "worker");
    let twenty = plan_id(&h.store, SubscriptionPlan::TwentyToken);
    let unlimited = plan_id(&h.store, SubscriptionPlan::UnlimitedToken);
    activate_plan(&h, &worker, SubscriptionPlan::TwentyToken, None);

    let outcome = h.subscriptions.request(&worker, unlimited).expect("request succeeds");

    assert!(outcome.created);
    assert_eq!(outcome.request.status, SubscriptionStatus::Pending);

    let history = h.subscriptions.history(&worker).expect("history");
    assert_eq!(history.len(), 2);
    let prior = history
        .iter()
        .find(|view| view.request.plan == twenty)
        .expect("prior request present");
    assert_eq!(prior.request.status, SubscriptionStatus::Inactive);
}

#[test]
fn activating_the_token_plan_sets_the_granted_balance() {
    let h = harness();
    let worker = employee(&h.store, "worker");
    grant_tokens(&h.store, worker.id, 3);
    let twenty = plan_id(&h.store, SubscriptionPlan::TwentyToken);
    h.subscriptions.request(&worker, twenty).expect("request");

    let outcome = h
        .subscriptions
        .review(SubscriptionReview {
            user: worker.id,
            plan: twenty,
            status: SubscriptionStatus::Active,
            token_count: Some(15),
        })
        .expect("review succeeds");

    assert_eq!(outcome.request.status, SubscriptionStatus::Active);
    assert_eq!(outcome.user_token, Some(15));
    assert_eq!(balance(&h.store, worker.id), 15);
}

#[test]
fn activation_defaults_to_twenty_tokens() {
    let h = harness();
    let worker = employee(&h.store, "worker");
    activate_plan(&h, &worker, SubscriptionPlan::TwentyToken, None);
    assert_eq!(balance(&h.store, worker.id), 20);
}

#[test]
fn unlimited_activation_never_touches_the_ledger() {
    let h = harness();
    let worker = employee(&h.store, "worker");
    grant_tokens(&h.store, worker.id, 7);
    activate_plan(&h, &worker, SubscriptionPlan::UnlimitedToken, Some(99));
    assert_eq!(balance(&h.store, worker.id), 7);
}

#[test]
fn activating_a_new_request_deactivates_the_prior_active_one() {
    let h = harness();
    let worker = employee(&h.store, "worker");
    let twenty = plan_id(&h.store, SubscriptionPlan::TwentyToken);
    activate_plan(&h, &worker, SubscriptionPlan::TwentyToken, Some(15));

    // A fresh request goes pending, then the admin activates it.
    let unlimited = plan_id(&h.store, SubscriptionPlan::UnlimitedToken);
    h.subscriptions.request(&worker, unlimited).expect("request");
    h.subscriptions
        .review(SubscriptionReview {
            user: worker.id,
            plan: unlimited,
            status: SubscriptionStatus::Active,
            token_count: None,
        })
        .expect("activation succeeds");

    let history = h.subscriptions.history(&worker).expect("history");
    let active: Vec<_> = history
        .iter()
        .filter(|view| view.request.status == SubscriptionStatus::Active)
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].request.plan, unlimited);
    assert!(history
        .iter()
        .any(|view| view.request.plan == twenty
            && view.request.status == SubscriptionStatus::Inactive));
    // The earlier token grant survives the plan switch.
    assert_eq!(balance(&h.store, worker.id), 15);
}

#[test]
fn review_without_any_request_is_not_found() {
    let h = harness();
    let twenty = plan_id(&h.store, SubscriptionPlan::TwentyToken);
    let err = h
        .subscriptions
        .review(SubscriptionReview {
            user: UserId(4242),
            plan: twenty,
            status: SubscriptionStatus::Active,
            token_count: None,
        })
        .expect_err("review fails");
    assert!(matches!(err, SubscriptionError::SubscriptionNotFound));
}

#[test]
fn review_queue_includes_requester_and_balance() {
    let h = harness();
    let worker = employee(&h.store, "worker");
    grant_tokens(&h.store, worker.id, 4);
    let twenty = plan_id(&h.store, SubscriptionPlan::TwentyToken);
    h.subscriptions.request(&worker, twenty).expect("request");

    let queue = h.subscriptions.review_queue().expect("queue loads");
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].user.id, worker.id);
    assert_eq!(queue[0].user_token, 4);
    assert_eq!(queue[0].plan.plan, SubscriptionPlan::TwentyToken);
}
