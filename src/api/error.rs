use crate::application::social::SocialApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(SocialApplicationError);

impl From<SocialApplicationError> for ApiError {
    fn from(err: SocialApplicationError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self.0 {
            // 404 Not Found - リクエストされたリソースが存在しない
            SocialApplicationError::UserNotFound => {
                (StatusCode::NOT_FOUND, "USER_NOT_FOUND", "User not found".to_string())
            }
            SocialApplicationError::PostNotFound => {
                (StatusCode::NOT_FOUND, "POST_NOT_FOUND", "Post not found".to_string())
            }
            SocialApplicationError::RelationshipNotFound => (
                StatusCode::NOT_FOUND,
                "RELATIONSHIP_NOT_FOUND",
                "Follow relationship not found".to_string(),
            ),

            // 409 Conflict - 競合。呼び出し元は状態を読み直して再試行できる
            SocialApplicationError::UsernameTaken => (
                StatusCode::CONFLICT,
                "USERNAME_TAKEN",
                "Username is already taken".to_string(),
            ),
            SocialApplicationError::AlreadyFollowing => (
                StatusCode::CONFLICT,
                "ALREADY_FOLLOWING",
                "Already following this user".to_string(),
            ),
            SocialApplicationError::NotFollowing => (
                StatusCode::CONFLICT,
                "NOT_FOLLOWING",
                "Not following this user".to_string(),
            ),
            SocialApplicationError::AlreadyRetracted => (
                StatusCode::CONFLICT,
                "ALREADY_RETRACTED",
                "Post is already retracted".to_string(),
            ),
            SocialApplicationError::VersionConflict => (
                StatusCode::CONFLICT,
                "VERSION_CONFLICT",
                "Version conflict, refresh and retry".to_string(),
            ),

            // 403 Forbidden - 権限なし
            SocialApplicationError::Unauthorized => (
                StatusCode::FORBIDDEN,
                "UNAUTHORIZED",
                "Caller is not allowed to perform this operation".to_string(),
            ),

            // 422 Unprocessable Entity - バリデーション違反
            SocialApplicationError::InvalidUsername(ref e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_USERNAME",
                format!("Invalid username: {:?}", e),
            ),
            SocialApplicationError::InvalidBody(ref e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_BODY",
                format!("Invalid post body: {:?}", e),
            ),
            SocialApplicationError::SelfFollow => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "SELF_FOLLOW",
                "Users cannot follow themselves".to_string(),
            ),

            // 408 Request Timeout - コマンド期限超過
            SocialApplicationError::Deadline => (
                StatusCode::REQUEST_TIMEOUT,
                "DEADLINE",
                "Command deadline exceeded".to_string(),
            ),

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            SocialApplicationError::EventStoreError(ref e) => {
                tracing::error!("Event store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EVENT_STORE_ERROR",
                    "Failed to store event".to_string(),
                )
            }
            SocialApplicationError::ReadStoreError(ref e) => {
                tracing::error!("Read store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "READ_STORE_ERROR",
                    "Failed to access read store".to_string(),
                )
            }
            SocialApplicationError::ProjectionFailed(ref e) => {
                tracing::error!("Projection failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PROJECTION_FAILED",
                    "Failed to project event".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
