use std::fmt;

use crate::domain::value_objects::{PostBodyError, UsernameError};
use crate::ports::event_store::EventStoreError;

use super::projector::ProjectionError;

/// ソーシャルコンテキストのアプリケーション層エラー
///
/// 集約はバリデーション・競合エラーを通知し、ハンドラーはそれを
/// この型へ1対1で写像する。エラー経路では可観測シグナルの発行以外の
/// 副作用を残さない。
#[derive(Debug)]
#[allow(dead_code)]
pub enum SocialApplicationError {
    /// ユーザー名が形式要件を満たさない
    InvalidUsername(UsernameError),
    /// 投稿本文が形式要件を満たさない
    InvalidBody(PostBodyError),
    /// 自分自身へのフォロー
    SelfFollow,
    /// ユーザーが存在しない
    UserNotFound,
    /// 投稿が存在しない
    PostNotFound,
    /// フォロー関係が存在しない（索引はあるがログに実体がない）
    RelationshipNotFound,
    /// ユーザー名が既に使用されている
    UsernameTaken,
    /// 既にフォローしている
    AlreadyFollowing,
    /// フォローしていない
    NotFollowing,
    /// 投稿は既に撤回されている
    AlreadyRetracted,
    /// 呼び出し元にこの操作の権限がない
    Unauthorized,
    /// 楽観的ロックの競合。呼び出し元は状態を読み直して再試行できる
    VersionConflict,
    /// コマンドの期限超過（追記前）
    Deadline,
    /// イベントログへの追記失敗（追記成功前であれば再試行可能）
    EventStoreError(EventStoreError),
    /// Read Storeの入出力エラー
    ReadStoreError(Box<dyn std::error::Error + Send + Sync>),
    /// 追記済みイベントのプロジェクション失敗。該当プロジェクターに
    /// とって致命的であり、復旧はログからのリプレイで行う
    ProjectionFailed(ProjectionError),
}

impl fmt::Display for SocialApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUsername(e) => write!(f, "Invalid username: {:?}", e),
            Self::InvalidBody(e) => write!(f, "Invalid post body: {:?}", e),
            Self::SelfFollow => write!(f, "Users cannot follow themselves"),
            Self::UserNotFound => write!(f, "User not found"),
            Self::PostNotFound => write!(f, "Post not found"),
            Self::RelationshipNotFound => write!(f, "Follow relationship not found"),
            Self::UsernameTaken => write!(f, "Username is already taken"),
            Self::AlreadyFollowing => write!(f, "Already following this user"),
            Self::NotFollowing => write!(f, "Not following this user"),
            Self::AlreadyRetracted => write!(f, "Post is already retracted"),
            Self::Unauthorized => write!(f, "Caller is not allowed to perform this operation"),
            Self::VersionConflict => write!(f, "Version conflict, refresh and retry"),
            Self::Deadline => write!(f, "Command deadline exceeded"),
            Self::EventStoreError(e) => write!(f, "Event store error: {}", e),
            Self::ReadStoreError(e) => write!(f, "Read store error: {}", e),
            Self::ProjectionFailed(e) => write!(f, "Projection failed: {}", e),
        }
    }
}

impl std::error::Error for SocialApplicationError {}

impl From<EventStoreError> for SocialApplicationError {
    fn from(err: EventStoreError) -> Self {
        match err {
            EventStoreError::VersionConflict { .. } => Self::VersionConflict,
            other => Self::EventStoreError(other),
        }
    }
}

impl From<ProjectionError> for SocialApplicationError {
    fn from(err: ProjectionError) -> Self {
        Self::ProjectionFailed(err)
    }
}

/// アプリケーション層の Result型
#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, SocialApplicationError>;
