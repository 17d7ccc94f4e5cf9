use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PostId, UserId};

/// コマンド：ユーザーを登録する
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterUser {
    pub username: String,
    /// 期限を過ぎたコマンドは追記前に `Deadline` で失敗する
    pub deadline: Option<DateTime<Utc>>,
}

/// コマンド：投稿を公開する
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishPost {
    pub author_id: UserId,
    pub body: String,
    pub deadline: Option<DateTime<Utc>>,
}

/// コマンド：投稿を撤回する
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetractPost {
    pub post_id: PostId,
    /// 呼び出し元が主張するユーザーID（作者本人のみ撤回可能）
    pub caller_id: UserId,
    pub deadline: Option<DateTime<Utc>>,
}

/// コマンド：フォローを開始する
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartFollow {
    pub follower_id: UserId,
    pub followee_id: UserId,
    pub deadline: Option<DateTime<Utc>>,
}

/// コマンド：フォローを終了する
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndFollow {
    pub follower_id: UserId,
    pub followee_id: UserId,
    pub deadline: Option<DateTime<Utc>>,
}
