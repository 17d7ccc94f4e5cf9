use crate::application::social::{
    ServiceDependencies, end_follow as execute_end_follow, get_feed as query_get_feed,
    is_following as query_is_following, list_users as query_list_users,
    posts_by_author as query_posts_by_author, publish_post as execute_publish_post,
    register_user as execute_register_user, retract_post as execute_retract_post,
    start_follow as execute_start_follow,
};
use crate::domain::commands;
use crate::domain::value_objects::{PostId, UserId};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    error::ApiError,
    types::{
        EndFollowRequest, FollowCreatedResponse, IsFollowingQuery, IsFollowingResponse,
        PostCreatedResponse, PostResponse, PublishPostRequest, RegisterUserRequest,
        RetractPostRequest, StartFollowRequest, UserCreatedResponse, UserResponse,
    },
};

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// コマンドエンドポイント（Write操作）
// ============================================================================

/// POST /users - ユーザーを登録
///
/// 強制されるビジネスルール:
/// - ユーザー名が3〜20文字の `[A-Za-z0-9_]` であること
/// - ユーザー名が未使用であること
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserCreatedResponse>), ApiError> {
    let cmd = req.to_command();

    let user_id = execute_register_user(&state.service_deps, cmd).await?;

    let response = UserCreatedResponse {
        user_id: user_id.value(),
        username: req.username,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /posts - 投稿を公開
///
/// 強制されるビジネスルール:
/// - 作者が登録済みであること
/// - 本文が空でなく280文字以内であること
pub async fn publish_post(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PublishPostRequest>,
) -> Result<(StatusCode, Json<PostCreatedResponse>), ApiError> {
    let cmd = req.to_command();

    let post_id = execute_publish_post(&state.service_deps, cmd).await?;

    let response = PostCreatedResponse {
        post_id: post_id.value(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /posts/:id/retract - 投稿を撤回
///
/// 強制されるビジネスルール:
/// - 投稿が存在すること
/// - 呼び出し元が作者本人であること
/// - 未撤回であること
pub async fn retract_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<Uuid>,
    Json(req): Json<RetractPostRequest>,
) -> Result<StatusCode, ApiError> {
    let cmd = commands::RetractPost {
        post_id: PostId::from_uuid(post_id),
        caller_id: UserId::from_uuid(req.caller_id),
        deadline: None,
    };

    execute_retract_post(&state.service_deps, cmd).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /follows - フォローを開始
///
/// 強制されるビジネスルール:
/// - 双方のユーザーが存在すること
/// - 自分自身へのフォローでないこと
/// - 既にフォローしていないこと
pub async fn start_follow(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartFollowRequest>,
) -> Result<(StatusCode, Json<FollowCreatedResponse>), ApiError> {
    let cmd = req.to_command();

    let relationship_id = execute_start_follow(&state.service_deps, cmd).await?;

    let response = FollowCreatedResponse {
        relationship_id: relationship_id.value(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// DELETE /follows - フォローを終了
///
/// 強制されるビジネスルール:
/// - 双方のユーザーが存在すること
/// - 現在フォローしていること
pub async fn end_follow(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EndFollowRequest>,
) -> Result<StatusCode, ApiError> {
    let cmd = req.to_command();

    execute_end_follow(&state.service_deps, cmd).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// クエリエンドポイント（Read操作）
// ============================================================================

/// GET /users - 全ユーザーの一覧
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let profiles = query_list_users(&state.service_deps).await?;

    Ok(Json(profiles.into_iter().map(UserResponse::from).collect()))
}

/// GET /users/:id/feed - ホームフィード（新しい順、撤回済みは含まない）
pub async fn get_feed(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let feed = query_get_feed(&state.service_deps, UserId::from_uuid(user_id)).await?;

    Ok(Json(feed.into_iter().map(PostResponse::from).collect()))
}

/// GET /users/:id/posts - 作者の投稿一覧（新しい順）
pub async fn posts_by_author(
    State(state): State<Arc<AppState>>,
    Path(author_id): Path<Uuid>,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let posts = query_posts_by_author(&state.service_deps, UserId::from_uuid(author_id)).await?;

    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

/// GET /follows - フォローしているか確認
pub async fn is_following(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IsFollowingQuery>,
) -> Result<Json<IsFollowingResponse>, ApiError> {
    let following = query_is_following(
        &state.service_deps,
        UserId::from_uuid(query.follower_id),
        UserId::from_uuid(query.followee_id),
    )
    .await?;

    Ok(Json(IsFollowingResponse { following }))
}
