use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::{AuthLayer, AuthenticatedUser};
use crate::models::{
    LeaderboardQuery, LeaderboardResponse, ListVocabulariesQuery, SaveVocabularyRequest,
    UpdateVocabularyRequest, UserProfile, VocabularyModel,
};
use crate::pronunciation::{self, PronunciationRequest, PronunciationScore};
use crate::quiz::QuizRequest;
use crate::services::admin_service::{
    ListUsersQuery, ListUsersResponse, UpdateUserRequest, WeeklyResetResponse,
};
use crate::services::dictionary_service::DictionaryEntry;
use crate::services::health_service::HealthStatus;
use crate::services::profile_service::{
    AwardXpRequest, AwardXpResponse, ProfileResponse, UpdateProfileRequest,
};
use crate::services::quiz_service::QuizResponse;
use crate::services::{
    AdminService, DictionaryService, HealthService, LeaderboardService, ProfileService,
    QuizService, VocabularyService,
};

/// JSON body extractor whose rejections use the `{ "error": ... }` shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<ProfileService>,
    pub vocabularies: Arc<VocabularyService>,
    pub leaderboard: Arc<LeaderboardService>,
    pub admin: Arc<AdminService>,
    pub quiz: Arc<QuizService>,
    pub dictionary: Arc<DictionaryService>,
    pub health: Arc<HealthService>,
}

pub fn create_router(state: AppState, pool: PgPool, jwt_secret: String) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    Router::new()
        .route("/health", get(health))
        .route(
            "/api/user-profile",
            get(get_profile).post(award_xp).patch(update_profile),
        )
        .route("/api/vocabularies", get(list_vocabularies).post(save_vocabulary))
        .route("/api/vocabularies/{id}", patch(update_vocabulary))
        .route("/api/generate-quiz", post(generate_quiz))
        .route("/api/leaderboard", get(leaderboard))
        .route("/api/admin/users", get(list_users).patch(update_user))
        .route("/api/admin/weekly-reset", post(weekly_reset))
        .route("/api/dictionary/{word}", get(lookup_word))
        .route("/api/pronunciation/score", post(score_pronunciation))
        .with_state(state)
        .layer(AuthLayer::new(pool, jwt_secret))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.health.check().await)
}

async fn get_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<ProfileResponse>> {
    Ok(Json(state.profiles.get_profile(user.user_id).await?))
}

async fn award_xp(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(req): ApiJson<AwardXpRequest>,
) -> AppResult<Json<AwardXpResponse>> {
    Ok(Json(state.profiles.award_xp(user.user_id, req).await?))
}

async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> AppResult<Json<ProfileResponse>> {
    Ok(Json(state.profiles.update_profile(user.user_id, req).await?))
}

async fn list_vocabularies(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiQuery(query): ApiQuery<ListVocabulariesQuery>,
) -> AppResult<Json<Vec<VocabularyModel>>> {
    Ok(Json(state.vocabularies.list(user.user_id, query).await?))
}

async fn save_vocabulary(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(req): ApiJson<SaveVocabularyRequest>,
) -> AppResult<(http::StatusCode, Json<VocabularyModel>)> {
    let model = state.vocabularies.save(user.user_id, req).await?;
    Ok((http::StatusCode::CREATED, Json(model)))
}

async fn update_vocabulary(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateVocabularyRequest>,
) -> AppResult<Json<VocabularyModel>> {
    Ok(Json(
        state.vocabularies.update_status(user.user_id, id, req).await?,
    ))
}

async fn generate_quiz(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(req): ApiJson<QuizRequest>,
) -> AppResult<Json<QuizResponse>> {
    Ok(Json(state.quiz.generate(user.user_id, req).await?))
}

async fn leaderboard(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiQuery(query): ApiQuery<LeaderboardQuery>,
) -> AppResult<Json<LeaderboardResponse>> {
    Ok(Json(state.leaderboard.leaderboard(user.user_id, query).await?))
}

async fn list_users(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiQuery(query): ApiQuery<ListUsersQuery>,
) -> AppResult<Json<ListUsersResponse>> {
    Ok(Json(state.admin.list_users(&user, query).await?))
}

async fn update_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(state.admin.update_user(&user, req).await?))
}

async fn weekly_reset(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<WeeklyResetResponse>> {
    Ok(Json(state.admin.weekly_reset(&user).await?))
}

async fn lookup_word(
    State(state): State<AppState>,
    ApiPath(word): ApiPath<String>,
) -> AppResult<Json<DictionaryEntry>> {
    Ok(Json(state.dictionary.lookup(&word).await?))
}

async fn score_pronunciation(
    ApiJson(req): ApiJson<PronunciationRequest>,
) -> AppResult<Json<PronunciationScore>> {
    req.validate()?;
    Ok(Json(pronunciation::score(&req.expected, &req.transcript)))
}
