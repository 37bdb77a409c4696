use chrono::NaiveDate;
use clap::Args;
use std::sync::Arc;
use worklink::error::AppError;
use worklink::marketplace::applications::ApplicationService;
use worklink::marketplace::domain::{ApplicationStatus, NewJob, RatingScore, Role, SubscriptionPlan, SubscriptionStatus};
use worklink::marketplace::identity::{IdentityService, NewUserRequest};
use worklink::marketplace::jobs::JobService;
use worklink::marketplace::ratings::RatingService;
use worklink::marketplace::repository::{SubscriptionRepository, TokenLedger};
use worklink::marketplace::subscriptions::{SubscriptionReview, SubscriptionService};
use worklink::marketplace::MemoryStore;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Token count the demo admin grants when approving the plan.
    #[arg(long, default_value_t = 5)]
    pub(crate) token_grant: u32,
    /// Skip the rating portion of the demo.
    #[arg(long)]
    pub(crate) skip_rating: bool,
}

fn registration(role: Role, username: &str, first: &str, last: &str) -> NewUserRequest {
    NewUserRequest {
        role,
        username: username.to_string(),
        password: format!("{username}-demo-password"),
        first_name: first.to_string(),
        last_name: last.to_string(),
        middle_name: None,
        birth_date: NaiveDate::from_ymd_opt(1995, 5, 5).unwrap_or_default(),
        phone: "555-0199".to_string(),
        address: "12 Demo Ave".to_string(),
        city: "Quezon City".to_string(),
        gender: "other".to_string(),
        profile_picture: None,
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        token_grant,
        skip_rating,
    } = args;

    let store = Arc::new(MemoryStore::new());
    let identity = IdentityService::new(store.clone());
    let jobs = JobService::new(store.clone());
    let applications = ApplicationService::new(store.clone());
    let ratings = RatingService::new(store.clone());
    let subscriptions = SubscriptionService::new(store.clone());

    println!("Worklink marketplace demo");

    identity
        .create(registration(Role::Admin, "admin", "Ada", "Santos"))
        .map_err(AppError::demo)?;
    identity
        .create(registration(Role::Employer, "employer", "Elias", "Cruz"))
        .map_err(AppError::demo)?;
    identity
        .create(registration(Role::Employee, "employee", "Mira", "Lopez"))
        .map_err(AppError::demo)?;
    let employer = identity
        .verify_credentials("employer", "employer-demo-password")
        .map_err(AppError::demo)?;
    let employee = identity
        .verify_credentials("employee", "employee-demo-password")
        .map_err(AppError::demo)?;
    println!("- registered admin, employer Elias, employee Mira");

    let job = jobs
        .create(
            &employer,
            NewJob {
                title: "Stockroom assistant".to_string(),
                description: "Receiving and shelving weekend deliveries".to_string(),
                location: "Quezon City".to_string(),
                salary: "580/day".to_string(),
                company: "Northgate Retail".to_string(),
                contact: "jobs@northgate.example".to_string(),
                max_applicants: 10,
                duration: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap_or_default(),
            },
        )
        .map_err(AppError::demo)?;
    println!("- employer posted job #{} ({})", job.id, job.title);

    let plan = store
        .plans()
        .map_err(AppError::demo)?
        .into_iter()
        .find(|plan| plan.plan == SubscriptionPlan::TwentyToken)
        .ok_or_else(|| AppError::demo(worklink::marketplace::SubscriptionError::UnknownPlan))?;
    subscriptions
        .request(&employee, plan.id)
        .map_err(AppError::demo)?;
    let review = subscriptions
        .review(SubscriptionReview {
            user: employee.id,
            plan: plan.id,
            status: SubscriptionStatus::Active,
            token_count: Some(token_grant),
        })
        .map_err(AppError::demo)?;
    println!(
        "- employee subscribed to {} and the admin granted {} tokens",
        plan.plan,
        review.user_token.unwrap_or_default()
    );

    let applied = applications
        .apply(&employee, job.id)
        .map_err(AppError::demo)?;
    println!(
        "- employee applied; {} token(s) remaining",
        applied.tokens_remaining.unwrap_or_default()
    );

    applications
        .update_status(&employer, applied.application.id, ApplicationStatus::Accepted)
        .map_err(AppError::demo)?;
    let after_accept = store.token_balance(employee.id).map_err(AppError::demo)?;
    println!("- employer accepted the application; balance is now {after_accept}");

    let ended = jobs.end(&employer, job.id).map_err(AppError::demo)?;
    println!(
        "- employer ended the job; {} pending application(s) closed",
        ended.applications_closed
    );

    if !skip_rating {
        let score = RatingScore::new(5).map_err(AppError::demo)?;
        let rating = ratings
            .rate(&employer, job.id, employee.id, score)
            .map_err(AppError::demo)?;
        println!("- employer rated Mira {}/5", rating.rating.value());
    }

    let profile = identity.profile(employee.id).map_err(AppError::demo)?;
    println!(
        "- final snapshot: {} application(s), {} completed job(s), average rating {:.1}, {} token(s) left",
        profile.stats.total_applications,
        profile.stats.completed_jobs,
        profile.stats.average_rating,
        store.token_balance(employee.id).map_err(AppError::demo)?
    );

    Ok(())
}
