//! HTTP surface for the marketplace.
//!
//! Handlers authenticate the bearer token, gate on a declared capability,
//! and delegate to the services. Every error funnels through `ApiError`, so
//! failure bodies always share the `{"success": false, "message"}` shape and
//! success bodies the `{"success": true, "data"}` shape.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::{AuthCodec, AuthError};

use super::applications::{ApplicationError, ApplicationService};
use super::domain::{
    ApplicationId, ApplicationStatus, Capability, JobId, JobUpdate, NewJob, PlanId,
    RatingScore, SubscriptionStatus, UserAccount, UserId,
};
use super::identity::{IdentityError, IdentityService, NewUserRequest, UserUpdateRequest};
use super::jobs::{JobError, JobService};
use super::ratings::{RatingError, RatingService};
use super::repository::{MarketStore, RepositoryError};
use super::subscriptions::{SubscriptionError, SubscriptionReview, SubscriptionService};

/// HTTP-facing error: a status code plus a human-readable message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "success": false, "message": self.message }));
        (self.status, body).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ApiError::not_found(err.to_string()),
            RepositoryError::Conflict => ApiError::new(StatusCode::CONFLICT, err.to_string()),
            RepositoryError::Unavailable(_) => ApiError::internal(err.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired | AuthError::Token(_) => {
                ApiError::unauthorized(err.to_string())
            }
            AuthError::Hash(_) => ApiError::internal(err.to_string()),
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::JobNotFound | ApplicationError::ApplicationNotFound => {
                ApiError::not_found(err.to_string())
            }
            ApplicationError::NotJobOwner => ApiError::forbidden(err.to_string()),
            ApplicationError::JobEnded
            | ApplicationError::InsufficientTokens
            | ApplicationError::DuplicateApplication
            | ApplicationError::NotWithdrawable
            | ApplicationError::InvalidTransition(_, _) => {
                ApiError::bad_request(err.to_string())
            }
            ApplicationError::Repository(inner) => inner.into(),
        }
    }
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::JobNotFound => ApiError::not_found(err.to_string()),
            JobError::NotJobOwner => ApiError::forbidden(err.to_string()),
            JobError::Repository(inner) => inner.into(),
        }
    }
}

impl From<RatingError> for ApiError {
    fn from(err: RatingError) -> Self {
        match err {
            RatingError::JobNotFound | RatingError::RatingNotFound => {
                ApiError::not_found(err.to_string())
            }
            RatingError::NotJobOwner => ApiError::forbidden(err.to_string()),
            RatingError::JobNotEnded | RatingError::NotHired | RatingError::RatingAlreadyExists => {
                ApiError::bad_request(err.to_string())
            }
            RatingError::Repository(inner) => inner.into(),
        }
    }
}

impl From<SubscriptionError> for ApiError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::UnknownPlan => ApiError::unprocessable(err.to_string()),
            SubscriptionError::SubscriptionNotFound => ApiError::not_found(err.to_string()),
            SubscriptionError::Repository(inner) => inner.into(),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::UsernameTaken | IdentityError::RoleNotRegisterable(_) => {
                ApiError::unprocessable(err.to_string())
            }
            IdentityError::InvalidCredentials => ApiError::unauthorized(err.to_string()),
            IdentityError::UserNotFound => ApiError::not_found(err.to_string()),
            IdentityError::Auth(inner) => inner.into(),
            IdentityError::Repository(inner) => inner.into(),
        }
    }
}

/// Shared state behind the router: the token codec plus one service per
/// subsystem, all over the same store.
pub struct MarketplaceApi<S> {
    auth: AuthCodec,
    pub identity: IdentityService<S>,
    pub jobs: JobService<S>,
    pub applications: ApplicationService<S>,
    pub ratings: RatingService<S>,
    pub subscriptions: SubscriptionService<S>,
}

impl<S> MarketplaceApi<S>
where
    S: MarketStore + 'static,
{
    pub fn new(store: Arc<S>, auth: AuthCodec) -> Self {
        Self {
            auth,
            identity: IdentityService::new(store.clone()),
            jobs: JobService::new(store.clone()),
            applications: ApplicationService::new(store.clone()),
            ratings: RatingService::new(store.clone()),
            subscriptions: SubscriptionService::new(store),
        }
    }

    /// Resolve the bearer token to a live account.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<UserAccount, ApiError> {
        let token = bearer_token(headers)
            .ok_or_else(|| ApiError::unauthorized("User not found or token invalid"))?;
        let claims = self.auth.verify(token)?;
        self.identity
            .load(claims.user_id())?
            .ok_or_else(|| ApiError::unauthorized("User not found or token invalid"))
    }

    /// Authenticate and gate on the operation's declared capability.
    fn require(
        &self,
        headers: &HeaderMap,
        capability: Capability,
    ) -> Result<UserAccount, ApiError> {
        let account = self.authenticate(headers)?;
        if !account.role.allows(capability) {
            return Err(ApiError::forbidden(
                "You are not authorized to perform this action",
            ));
        }
        Ok(account)
    }

    pub fn issue_token(&self, account: &UserAccount) -> Result<crate::auth::IssuedToken, ApiError> {
        Ok(self.auth.issue(account)?)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
}

fn success(status: StatusCode, data: impl Serialize) -> Response {
    (status, Json(json!({ "success": true, "data": data }))).into_response()
}

fn success_with_message(status: StatusCode, message: &str, data: impl Serialize) -> Response {
    let body = Json(json!({ "success": true, "message": message, "data": data }));
    (status, body).into_response()
}

/// Router builder exposing the whole marketplace surface.
pub fn marketplace_router<S>(api: Arc<MarketplaceApi<S>>) -> Router
where
    S: MarketStore + 'static,
{
    Router::new()
        .route("/api/v1/auth/register", post(register::<S>))
        .route("/api/v1/auth/login", post(login::<S>))
        .route("/api/v1/auth/me", get(me::<S>))
        .route("/api/v1/jobs", get(jobs_index::<S>).post(jobs_create::<S>))
        .route("/api/v1/jobs/history", get(jobs_history::<S>))
        .route("/api/v1/jobs/user-applied", get(applications_index::<S>))
        .route(
            "/api/v1/jobs/user-applied/rate/:job_id/:user_id",
            get(rating_show::<S>)
                .post(rating_create::<S>)
                .put(rating_update::<S>)
                .delete(rating_delete::<S>),
        )
        .route(
            "/api/v1/jobs/user-applied/:application_id",
            post(application_update::<S>),
        )
        .route("/api/v1/jobs/user-profile/:user_id", get(user_profile::<S>))
        .route(
            "/api/v1/jobs/:id",
            get(jobs_show::<S>).put(jobs_update::<S>).delete(jobs_delete::<S>),
        )
        .route("/api/v1/jobs/:id/end", post(jobs_end::<S>))
        .route("/api/v1/jobs/:id/apply", post(jobs_apply::<S>))
        .route("/api/v1/jobs/:id/cancel-apply", post(jobs_cancel_apply::<S>))
        .route("/api/v1/subscription", get(subscription_current::<S>))
        .route("/api/v1/subscription/plans", get(subscription_plans::<S>))
        .route("/api/v1/subscription/history", get(subscription_history::<S>))
        .route(
            "/api/v1/subscription/apply/:plan_id",
            post(subscription_apply::<S>),
        )
        .route(
            "/api/v1/admin/users",
            get(admin_overview::<S>).post(admin_create_user::<S>),
        )
        .route(
            "/api/v1/admin/users/:id",
            get(admin_show_user::<S>)
                .put(admin_update_user::<S>)
                .delete(admin_delete_user::<S>),
        )
        .route("/api/v1/admin/subscriptions", get(admin_subscriptions::<S>))
        .route(
            "/api/v1/admin/update-user-subscription",
            post(admin_review_subscription::<S>),
        )
        .with_state(api)
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: String,
}

#[derive(Debug, Deserialize)]
struct RatingBody {
    rating: u8,
}

#[derive(Debug, Deserialize)]
struct ReviewSubscriptionBody {
    user_id: u64,
    plan_id: u64,
    status: String,
    #[serde(default)]
    token_count: Option<u32>,
}

fn parse_reviewable_status(raw: &str) -> Result<ApplicationStatus, ApiError> {
    match raw {
        "applied" => Ok(ApplicationStatus::Applied),
        "accepted" => Ok(ApplicationStatus::Accepted),
        "rejected" => Ok(ApplicationStatus::Rejected),
        _ => Err(ApiError::unprocessable(
            "status must be one of: applied, accepted, rejected",
        )),
    }
}

fn parse_subscription_status(raw: &str) -> Result<SubscriptionStatus, ApiError> {
    match raw {
        "pending" => Ok(SubscriptionStatus::Pending),
        "active" => Ok(SubscriptionStatus::Active),
        "inactive" => Ok(SubscriptionStatus::Inactive),
        _ => Err(ApiError::unprocessable(
            "status must be one of: pending, active, inactive",
        )),
    }
}

fn parse_score(raw: u8) -> Result<RatingScore, ApiError> {
    RatingScore::new(raw).map_err(|err| ApiError::unprocessable(err.to_string()))
}

async fn register<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    Json(request): Json<NewUserRequest>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    let view = api.identity.register(request)?;
    Ok(success_with_message(
        StatusCode::CREATED,
        "User registered successfully",
        view.username,
    ))
}

async fn login<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    let account = api
        .identity
        .verify_credentials(&request.username, &request.password)?;
    let issued = api.issue_token(&account)?;
    let body = Json(json!({
        "success": true,
        "message": "User logged in successfully",
        "data": account.username,
        "token": issued.token,
        "token_type": issued.token_type,
        "expires_in": issued.expires_in,
    }));
    Ok((StatusCode::OK, body).into_response())
}

async fn me<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    let account = api.authenticate(&headers)?;
    Ok(success(StatusCode::OK, api.identity.me(&account)?))
}

async fn jobs_index<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    let account = api.authenticate(&headers)?;
    Ok(success(StatusCode::OK, api.jobs.list(&account, query.search)?))
}

async fn jobs_create<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
    Json(job): Json<NewJob>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    let account = api.require(&headers, Capability::PostJobs)?;
    Ok(success(StatusCode::CREATED, api.jobs.create(&account, job)?))
}

async fn jobs_show<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    let account = api.authenticate(&headers)?;
    Ok(success(StatusCode::OK, api.jobs.show(&account, JobId(id))?))
}

async fn jobs_update<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(update): Json<JobUpdate>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    let account = api.require(&headers, Capability::ManageOwnJobs)?;
    Ok(success(
        StatusCode::OK,
        api.jobs.update(&account, JobId(id), update)?,
    ))
}

async fn jobs_delete<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    let account = api.require(&headers, Capability::ManageOwnJobs)?;
    api.jobs.delete(&account, JobId(id))?;
    let body = Json(json!({ "success": true, "message": "Job deleted successfully" }));
    Ok((StatusCode::OK, body).into_response())
}

async fn jobs_end<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    let account = api.require(&headers, Capability::ManageOwnJobs)?;
    let outcome = api.jobs.end(&account, JobId(id))?;
    Ok(success_with_message(
        StatusCode::OK,
        "Job ended successfully",
        outcome,
    ))
}

async fn jobs_apply<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    let account = api.require(&headers, Capability::ApplyToJobs)?;
    let outcome = api.applications.apply(&account, JobId(id))?;
    let message = if outcome.restored {
        "Job application restored and re-applied successfully"
    } else {
        "Job applied successfully"
    };
    Ok(success_with_message(StatusCode::OK, message, outcome))
}

async fn jobs_cancel_apply<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    let account = api.require(&headers, Capability::ApplyToJobs)?;
    api.applications.cancel(&account, JobId(id))?;
    let body = Json(json!({
        "success": true,
        "message": "Job application cancelled successfully",
    }));
    Ok((StatusCode::OK, body).into_response())
}

async fn jobs_history<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    let account = api.require(&headers, Capability::ManageOwnJobs)?;
    Ok(success(StatusCode::OK, api.jobs.history(&account)?))
}

async fn applications_index<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    let account = api.authenticate(&headers)?;
    Ok(success(StatusCode::OK, api.applications.roster(&account)?))
}

async fn application_update<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
    Path(application_id): Path<u64>,
    Json(body): Json<StatusBody>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    let account = api.require(&headers, Capability::ReviewApplicants)?;
    let status = parse_reviewable_status(&body.status)?;
    let updated =
        api.applications
            .update_status(&account, ApplicationId(application_id), status)?;
    Ok(success_with_message(
        StatusCode::OK,
        "Application status updated successfully",
        updated,
    ))
}

async fn user_profile<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
    Path(user_id): Path<u64>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    api.authenticate(&headers)?;
    Ok(success(StatusCode::OK, api.identity.profile(UserId(user_id))?))
}

async fn rating_show<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
    Path((job_id, user_id)): Path<(u64, u64)>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    let account = api.require(&headers, Capability::RateWorkers)?;
    let rating = api.ratings.get(&account, JobId(job_id), UserId(user_id))?;
    let message = if rating.is_some() {
        "Rating found"
    } else {
        "No rating found"
    };
    Ok(success_with_message(StatusCode::OK, message, rating))
}

async fn rating_create<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
    Path((job_id, user_id)): Path<(u64, u64)>,
    Json(body): Json<RatingBody>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    let account = api.require(&headers, Capability::RateWorkers)?;
    let score = parse_score(body.rating)?;
    let rating = api
        .ratings
        .rate(&account, JobId(job_id), UserId(user_id), score)?;
    Ok(success_with_message(
        StatusCode::CREATED,
        "Rating added successfully",
        rating,
    ))
}

async fn rating_update<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
    Path((job_id, user_id)): Path<(u64, u64)>,
    Json(body): Json<RatingBody>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    let account = api.require(&headers, Capability::RateWorkers)?;
    let score = parse_score(body.rating)?;
    let rating = api
        .ratings
        .update(&account, JobId(job_id), UserId(user_id), score)?;
    Ok(success_with_message(
        StatusCode::OK,
        "Rating updated successfully",
        rating,
    ))
}

async fn rating_delete<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
    Path((job_id, user_id)): Path<(u64, u64)>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    let account = api.require(&headers, Capability::RateWorkers)?;
    api.ratings.delete(&account, JobId(job_id), UserId(user_id))?;
    let body = Json(json!({ "success": true, "message": "Rating deleted successfully" }));
    Ok((StatusCode::OK, body).into_response())
}

async fn subscription_plans<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    api.authenticate(&headers)?;
    Ok(success(StatusCode::OK, api.subscriptions.plans()?))
}

async fn subscription_current<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    let account = api.authenticate(&headers)?;
    Ok(success(StatusCode::OK, api.subscriptions.current(&account)?))
}

async fn subscription_history<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    let account = api.authenticate(&headers)?;
    Ok(success(StatusCode::OK, api.subscriptions.history(&account)?))
}

async fn subscription_apply<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
    Path(plan_id): Path<u64>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    let account = api.require(&headers, Capability::RequestSubscription)?;
    let outcome = api.subscriptions.request(&account, PlanId(plan_id))?;
    let (status, message) = if outcome.created {
        (
            StatusCode::CREATED,
            "Subscription applied successfully. Waiting for admin approval.",
        )
    } else {
        (StatusCode::OK, "Subscription application updated successfully.")
    };
    Ok(success_with_message(status, message, outcome))
}

async fn admin_overview<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    api.require(&headers, Capability::ManageUsers)?;
    Ok(success(StatusCode::OK, api.identity.admin_overview()?))
}

async fn admin_create_user<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
    Json(request): Json<NewUserRequest>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    api.require(&headers, Capability::ManageUsers)?;
    Ok(success_with_message(
        StatusCode::CREATED,
        "Admin successfully created a user",
        api.identity.create(request)?,
    ))
}

async fn admin_show_user<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    api.require(&headers, Capability::ManageUsers)?;
    Ok(success(StatusCode::OK, api.identity.show(UserId(id))?))
}

async fn admin_update_user<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(request): Json<UserUpdateRequest>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    api.require(&headers, Capability::ManageUsers)?;
    Ok(success_with_message(
        StatusCode::OK,
        "Admin successfully updated user details",
        api.identity.admin_update(UserId(id), request)?,
    ))
}

async fn admin_delete_user<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    api.require(&headers, Capability::ManageUsers)?;
    api.identity.admin_delete(UserId(id))?;
    let body = Json(json!({
        "success": true,
        "message": "Admin successfully soft deleted user",
    }));
    Ok((StatusCode::OK, body).into_response())
}

async fn admin_subscriptions<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    api.require(&headers, Capability::ApproveSubscriptions)?;
    Ok(success(StatusCode::OK, api.subscriptions.review_queue()?))
}

async fn admin_review_subscription<S>(
    State(api): State<Arc<MarketplaceApi<S>>>,
    headers: HeaderMap,
    Json(body): Json<ReviewSubscriptionBody>,
) -> Result<Response, ApiError>
where
    S: MarketStore + 'static,
{
    api.require(&headers, Capability::ApproveSubscriptions)?;
    let status = parse_subscription_status(&body.status)?;
    let outcome = api.subscriptions.review(SubscriptionReview {
        user: UserId(body.user_id),
        plan: PlanId(body.plan_id),
        status,
        token_count: body.token_count,
    })?;
    Ok(success(StatusCode::OK, outcome))
}
