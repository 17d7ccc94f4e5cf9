use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::commands;
use crate::domain::value_objects::UserId;
use crate::ports::read_store::{PostView, UserProfile};

// ============================================================================
// Command operations (POST/DELETE) - Request/Response types
// ============================================================================

/// ユーザー登録リクエスト
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegisterUserRequest {
    pub username: String,
}

impl RegisterUserRequest {
    /// ドメインコマンドへ変換
    pub fn to_command(&self) -> commands::RegisterUser {
        commands::RegisterUser {
            username: self.username.clone(),
            deadline: None,
        }
    }
}

/// ユーザー登録成功レスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreatedResponse {
    pub user_id: Uuid,
    pub username: String,
}

/// 投稿公開リクエスト
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublishPostRequest {
    pub author_id: Uuid,
    pub body: String,
}

impl PublishPostRequest {
    /// ドメインコマンドへ変換
    pub fn to_command(&self) -> commands::PublishPost {
        commands::PublishPost {
            author_id: UserId::from_uuid(self.author_id),
            body: self.body.clone(),
            deadline: None,
        }
    }
}

/// 投稿公開成功レスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCreatedResponse {
    pub post_id: Uuid,
}

/// 投稿撤回リクエスト
///
/// 呼び出し元はユーザーIDを自己申告する（認証はこのコアの対象外）。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetractPostRequest {
    pub caller_id: Uuid,
}

/// フォロー開始リクエスト
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StartFollowRequest {
    pub follower_id: Uuid,
    pub followee_id: Uuid,
}

impl StartFollowRequest {
    /// ドメインコマンドへ変換
    pub fn to_command(&self) -> commands::StartFollow {
        commands::StartFollow {
            follower_id: UserId::from_uuid(self.follower_id),
            followee_id: UserId::from_uuid(self.followee_id),
            deadline: None,
        }
    }
}

/// フォロー開始成功レスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowCreatedResponse {
    pub relationship_id: Uuid,
}

/// フォロー終了リクエスト
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndFollowRequest {
    pub follower_id: Uuid,
    pub followee_id: Uuid,
}

impl EndFollowRequest {
    /// ドメインコマンドへ変換
    pub fn to_command(&self) -> commands::EndFollow {
        commands::EndFollow {
            follower_id: UserId::from_uuid(self.follower_id),
            followee_id: UserId::from_uuid(self.followee_id),
            deadline: None,
        }
    }
}

// ============================================================================
// Query operations (GET) - Request/Response types
// ============================================================================

/// フォロー確認のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct IsFollowingQuery {
    pub follower_id: Uuid,
    pub followee_id: Uuid,
}

/// フォロー確認レスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsFollowingResponse {
    pub following: bool,
}

/// ユーザープロフィールレスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub username: String,
}

impl From<UserProfile> for UserResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            user_id: profile.user_id.value(),
            username: profile.username.as_str().to_string(),
        }
    }
}

/// 投稿レスポンス（フィードと作者別一覧で共用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    pub body: String,
    pub published_at: DateTime<Utc>,
}

impl From<PostView> for PostResponse {
    fn from(view: PostView) -> Self {
        Self {
            post_id: view.post_id.value(),
            author_id: view.author_id.value(),
            author_username: view.author_username.as_str().to_string(),
            body: view.body,
            published_at: view.published_at,
        }
    }
}

// ============================================================================
// Common types
// ============================================================================

/// エラーレスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
