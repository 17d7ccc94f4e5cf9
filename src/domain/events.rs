use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EventId, PostBody, PostId, UserId, Username};

/// イベント：ユーザーが登録された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegistered {
    pub username: Username,
}

/// イベント：投稿が公開された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPublished {
    pub author_id: UserId,
    pub body: PostBody,
    pub published_at: DateTime<Utc>,
}

/// イベント：投稿が撤回された
///
/// 本体は空。撤回時刻はエンベロープの `occurred_at` が示す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRetracted {}

/// イベント：フォローが開始された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowStarted {
    pub follower_id: UserId,
    pub followee_id: UserId,
}

/// イベント：フォローが終了した
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowEnded {
    pub follower_id: UserId,
    pub followee_id: UserId,
}

/// ドメインイベント統合型
///
/// 閉じた直和型。プロジェクターはタグでディスパッチする。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainEvent {
    UserRegistered(UserRegistered),
    PostPublished(PostPublished),
    PostRetracted(PostRetracted),
    FollowStarted(FollowStarted),
    FollowEnded(FollowEnded),
}

impl DomainEvent {
    /// イベント種別の判別子を取得する
    pub fn kind(&self) -> EventKind {
        match self {
            DomainEvent::UserRegistered(_) => EventKind::UserRegistered,
            DomainEvent::PostPublished(_) => EventKind::PostPublished,
            DomainEvent::PostRetracted(_) => EventKind::PostRetracted,
            DomainEvent::FollowStarted(_) => EventKind::FollowStarted,
            DomainEvent::FollowEnded(_) => EventKind::FollowEnded,
        }
    }
}

/// イベント種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    UserRegistered,
    PostPublished,
    PostRetracted,
    FollowStarted,
    FollowEnded,
}

impl EventKind {
    /// 永続化用の判別子（固定値、変更不可）
    pub fn code(&self) -> u8 {
        match self {
            EventKind::UserRegistered => 1,
            EventKind::PostPublished => 2,
            EventKind::PostRetracted => 3,
            EventKind::FollowStarted => 4,
            EventKind::FollowEnded => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(EventKind::UserRegistered),
            2 => Some(EventKind::PostPublished),
            3 => Some(EventKind::PostRetracted),
            4 => Some(EventKind::FollowStarted),
            5 => Some(EventKind::FollowEnded),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::UserRegistered => "UserRegistered",
            EventKind::PostPublished => "PostPublished",
            EventKind::PostRetracted => "PostRetracted",
            EventKind::FollowStarted => "FollowStarted",
            EventKind::FollowEnded => "FollowEnded",
        }
    }
}

/// イベントエンベロープ
///
/// すべてのイベントに共通するヘッダー：
/// - `event_id` - イベントごとに一意
/// - `aggregate_id` - このイベントが変更する集約
/// - `version` - 集約ごとに1始まりで単調増加（隙間なし）
/// - `occurred_at` - 発行時に付与される実時刻
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: EventId,
    pub aggregate_id: Uuid,
    pub version: u64,
    pub occurred_at: DateTime<Utc>,
    pub payload: DomainEvent,
}

impl EventEnvelope {
    /// 新しいイベントIDを採番してエンベロープを組み立てる
    pub fn new(
        aggregate_id: Uuid,
        version: u64,
        occurred_at: DateTime<Utc>,
        payload: DomainEvent,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            aggregate_id,
            version,
            occurred_at,
            payload,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// 集約IDを投稿IDとして解釈する（投稿イベントのプロジェクション用）
    pub fn post_id(&self) -> PostId {
        PostId::from_uuid(self.aggregate_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_code_roundtrip() {
        for kind in [
            EventKind::UserRegistered,
            EventKind::PostPublished,
            EventKind::PostRetracted,
            EventKind::FollowStarted,
            EventKind::FollowEnded,
        ] {
            assert_eq!(EventKind::from_code(kind.code()), Some(kind));
        }
    }

    #[test]
    fn test_event_kind_unknown_code() {
        assert_eq!(EventKind::from_code(0), None);
        assert_eq!(EventKind::from_code(6), None);
        assert_eq!(EventKind::from_code(255), None);
    }

    #[test]
    fn test_envelope_carries_kind() {
        let user_id = UserId::new();
        let envelope = EventEnvelope::new(
            user_id.value(),
            1,
            Utc::now(),
            DomainEvent::UserRegistered(UserRegistered {
                username: Username::new("alice").unwrap(),
            }),
        );

        assert_eq!(envelope.kind(), EventKind::UserRegistered);
        assert_eq!(envelope.aggregate_id, user_id.value());
        assert_eq!(envelope.version, 1);
    }

    #[test]
    fn test_envelope_event_ids_are_unique() {
        let aggregate_id = Uuid::new_v4();
        let now = Utc::now();
        let e1 = EventEnvelope::new(
            aggregate_id,
            1,
            now,
            DomainEvent::PostRetracted(PostRetracted {}),
        );
        let e2 = EventEnvelope::new(
            aggregate_id,
            2,
            now,
            DomainEvent::PostRetracted(PostRetracted {}),
        );
        assert_ne!(e1.event_id, e2.event_id);
    }
}
