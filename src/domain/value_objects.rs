#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ユーザーID - ユーザー集約の集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

/// 投稿ID - 投稿集約の集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PostId(Uuid);

impl PostId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for PostId {
    fn default() -> Self {
        Self::new()
    }
}

/// フォロー関係ID - フォロー関係集約の集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipId(Uuid);

impl RelationshipId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for RelationshipId {
    fn default() -> Self {
        Self::new()
    }
}

/// イベントID - ログ内の各イベントを一意に識別する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

/// ユーザー名のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// 長さが3〜20文字の範囲外
    LengthOutOfRange,
    /// 許可されていない文字（`[A-Za-z0-9_]` のみ有効）
    ForbiddenCharacter,
}

/// ユーザー名の最小文字数
pub const USERNAME_MIN_LEN: usize = 3;
/// ユーザー名の最大文字数
pub const USERNAME_MAX_LEN: usize = 20;

/// ユーザー名
///
/// 不変条件：
/// - 3〜20文字
/// - 文字は `[A-Za-z0-9_]` のみ
/// - システム全体で一意（一意性はコマンド層がRead Storeに対して検査する）
///
/// 等値性はバイト単位の完全一致。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    /// バリデーション付きで作成する
    pub fn new(raw: &str) -> Result<Self, UsernameError> {
        if raw.len() < USERNAME_MIN_LEN || raw.len() > USERNAME_MAX_LEN {
            return Err(UsernameError::LengthOutOfRange);
        }
        if !raw.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
            return Err(UsernameError::ForbiddenCharacter);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Username::new(&value)
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 投稿本文のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostBodyError {
    /// 空白のみ・空文字
    Empty,
    /// 280文字を超えている
    TooLong,
}

/// 投稿本文の最大文字数
pub const POST_BODY_MAX_LEN: usize = 280;

/// 投稿本文
///
/// 不変条件：
/// - 空白をトリムした後に空でないこと
/// - 280文字以内
///
/// 本文はトリムせず、入力のまま保存される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostBody(String);

impl PostBody {
    /// バリデーション付きで作成する
    pub fn new(raw: &str) -> Result<Self, PostBodyError> {
        if raw.trim().is_empty() {
            return Err(PostBodyError::Empty);
        }
        if raw.chars().count() > POST_BODY_MAX_LEN {
            return Err(PostBodyError::TooLong);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PostBody {
    type Error = PostBodyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PostBody::new(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ID value objects のテスト
    #[test]
    fn test_user_id_creation() {
        let id1 = UserId::new();
        let id2 = UserId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_user_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = UserId::from_uuid(uuid);
        assert_eq!(id.value(), uuid);
    }

    #[test]
    fn test_post_id_creation() {
        let id1 = PostId::new();
        let id2 = PostId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_relationship_id_creation() {
        let id1 = RelationshipId::new();
        let id2 = RelationshipId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_event_id_creation() {
        let id1 = EventId::new();
        let id2 = EventId::new();
        assert_ne!(id1, id2);
    }

    // TDD: Username のテスト
    #[test]
    fn test_username_valid() {
        let name = Username::new("alice_01");
        assert!(name.is_ok());
        assert_eq!(name.unwrap().as_str(), "alice_01");
    }

    #[test]
    fn test_username_minimum_length() {
        assert!(Username::new("abc").is_ok());
        assert_eq!(
            Username::new("ab").unwrap_err(),
            UsernameError::LengthOutOfRange
        );
    }

    #[test]
    fn test_username_maximum_length() {
        let max = "a".repeat(20);
        assert!(Username::new(&max).is_ok());

        let too_long = "a".repeat(21);
        assert_eq!(
            Username::new(&too_long).unwrap_err(),
            UsernameError::LengthOutOfRange
        );
    }

    #[test]
    fn test_username_empty() {
        assert_eq!(
            Username::new("").unwrap_err(),
            UsernameError::LengthOutOfRange
        );
    }

    #[test]
    fn test_username_forbidden_characters() {
        assert_eq!(
            Username::new("ali ce").unwrap_err(),
            UsernameError::ForbiddenCharacter
        );
        assert_eq!(
            Username::new("ali-ce").unwrap_err(),
            UsernameError::ForbiddenCharacter
        );
        assert_eq!(
            Username::new("アリス123").unwrap_err(),
            UsernameError::ForbiddenCharacter
        );
    }

    #[test]
    fn test_username_equality_is_byte_exact() {
        // 大文字小文字は区別される
        assert_ne!(
            Username::new("Alice").unwrap(),
            Username::new("alice").unwrap()
        );
    }

    #[test]
    fn test_username_try_from() {
        let name = Username::try_from("bob_99".to_string());
        assert!(name.is_ok());

        let err = Username::try_from("x".to_string());
        assert!(err.is_err());
    }

    // TDD: PostBody のテスト
    #[test]
    fn test_post_body_valid() {
        let body = PostBody::new("hello world");
        assert!(body.is_ok());
        assert_eq!(body.unwrap().as_str(), "hello world");
    }

    #[test]
    fn test_post_body_stored_verbatim() {
        // トリム後に空でなければ、前後の空白ごと保存される
        let body = PostBody::new("  hello  ").unwrap();
        assert_eq!(body.as_str(), "  hello  ");
    }

    #[test]
    fn test_post_body_empty() {
        assert_eq!(PostBody::new("").unwrap_err(), PostBodyError::Empty);
        assert_eq!(PostBody::new("   \n\t ").unwrap_err(), PostBodyError::Empty);
    }

    #[test]
    fn test_post_body_maximum_length() {
        let max = "x".repeat(280);
        assert!(PostBody::new(&max).is_ok());

        let too_long = "x".repeat(281);
        assert_eq!(PostBody::new(&too_long).unwrap_err(), PostBodyError::TooLong);
    }

    #[test]
    fn test_post_body_length_counts_characters() {
        // マルチバイト文字も1文字として数える
        let body = "あ".repeat(280);
        assert!(PostBody::new(&body).is_ok());

        let too_long = "あ".repeat(281);
        assert!(PostBody::new(&too_long).is_err());
    }
}
