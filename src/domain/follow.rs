#![allow(dead_code)]

use chrono::{DateTime, Utc};

use super::{
    DomainEvent, EndFollowError, EventEnvelope, FollowEnded, FollowStarted, RehydrateError,
    RelationshipId, StartFollowError, UserId,
};

/// フォロー関係集約
///
/// 状態遷移：`Absent → Active → Ended`
///
/// `Absent` はイベントを持たない集約（暗黙状態）。`FollowStarted` で
/// `Active` になり、`FollowEnded` で `Ended` になる。`Ended` の後に
/// 再フォローする場合は、新しい `RelationshipId` を持つ別の集約を
/// 作成する。
#[derive(Debug, Clone)]
pub struct FollowRelationship {
    id: RelationshipId,
    follower_id: UserId,
    followee_id: UserId,
    active: bool,
    version: u64,
    recorded: Vec<EventEnvelope>,
}

impl FollowRelationship {
    /// 決定：フォローを開始する
    ///
    /// 空のストリームからのみ有効。
    ///
    /// # エラー
    /// フォロワーとフォロイーが同一の場合は `SelfFollow`
    pub fn start(
        id: RelationshipId,
        follower_id: UserId,
        followee_id: UserId,
        started_at: DateTime<Utc>,
    ) -> Result<Self, StartFollowError> {
        if follower_id == followee_id {
            return Err(StartFollowError::SelfFollow);
        }

        let envelope = EventEnvelope::new(
            id.value(),
            1,
            started_at,
            DomainEvent::FollowStarted(FollowStarted {
                follower_id,
                followee_id,
            }),
        );

        Ok(Self {
            id,
            follower_id,
            followee_id,
            active: true,
            version: 1,
            recorded: vec![envelope],
        })
    }

    /// 決定：フォローを終了する
    ///
    /// # エラー
    /// 既に終了している場合は `NotActive`
    pub fn end(&mut self, ended_at: DateTime<Utc>) -> Result<(), EndFollowError> {
        if !self.active {
            return Err(EndFollowError::NotActive);
        }

        let envelope = EventEnvelope::new(
            self.id.value(),
            self.version + 1,
            ended_at,
            DomainEvent::FollowEnded(FollowEnded {
                follower_id: self.follower_id,
                followee_id: self.followee_id,
            }),
        );

        // 発行と状態更新は単一ステップ
        self.active = false;
        self.version += 1;
        self.recorded.push(envelope);

        Ok(())
    }

    /// イベント列から現在の状態を復元する
    pub fn rehydrate(events: &[EventEnvelope]) -> Result<Self, RehydrateError> {
        let (first, rest) = events.split_first().ok_or(RehydrateError::EmptyStream)?;

        let started = match &first.payload {
            DomainEvent::FollowStarted(e) => e,
            _ => return Err(RehydrateError::EmptyStream),
        };

        let mut relationship = Self {
            id: RelationshipId::from_uuid(first.aggregate_id),
            follower_id: started.follower_id,
            followee_id: started.followee_id,
            active: true,
            version: first.version,
            recorded: Vec::new(),
        };

        for envelope in rest {
            match &envelope.payload {
                DomainEvent::FollowEnded(_) => {
                    relationship.active = false;
                    relationship.version = envelope.version;
                }
                _ => return Err(RehydrateError::UnexpectedEvent(envelope.kind())),
            }
        }

        Ok(relationship)
    }

    /// 未コミットのイベントを取り出し、バッファを空にする
    pub fn drain(&mut self) -> Vec<EventEnvelope> {
        std::mem::take(&mut self.recorded)
    }

    pub fn id(&self) -> RelationshipId {
        self.id
    }

    pub fn follower_id(&self) -> UserId {
        self.follower_id
    }

    pub fn followee_id(&self) -> UserId {
        self.followee_id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_emits_follow_started() {
        let id = RelationshipId::new();
        let follower = UserId::new();
        let followee = UserId::new();
        let now = Utc::now();

        let mut relationship =
            FollowRelationship::start(id, follower, followee, now).unwrap();

        assert_eq!(relationship.id(), id);
        assert_eq!(relationship.follower_id(), follower);
        assert_eq!(relationship.followee_id(), followee);
        assert!(relationship.is_active());
        assert_eq!(relationship.version(), 1);

        let events = relationship.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].version, 1);
        match &events[0].payload {
            DomainEvent::FollowStarted(e) => {
                assert_eq!(e.follower_id, follower);
                assert_eq!(e.followee_id, followee);
            }
            other => panic!("Expected FollowStarted, got {:?}", other),
        }
    }

    #[test]
    fn test_start_self_follow_fails() {
        let user = UserId::new();
        let result = FollowRelationship::start(RelationshipId::new(), user, user, Utc::now());
        assert_eq!(result.unwrap_err(), StartFollowError::SelfFollow);
    }

    #[test]
    fn test_end_emits_follow_ended() {
        let follower = UserId::new();
        let followee = UserId::new();
        let now = Utc::now();
        let mut relationship =
            FollowRelationship::start(RelationshipId::new(), follower, followee, now).unwrap();
        relationship.drain();

        let ended_at = now + chrono::Duration::hours(1);
        relationship.end(ended_at).unwrap();

        assert!(!relationship.is_active());
        assert_eq!(relationship.version(), 2);

        let events = relationship.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].version, 2);
        assert_eq!(events[0].occurred_at, ended_at);
        match &events[0].payload {
            DomainEvent::FollowEnded(e) => {
                assert_eq!(e.follower_id, follower);
                assert_eq!(e.followee_id, followee);
            }
            other => panic!("Expected FollowEnded, got {:?}", other),
        }
    }

    #[test]
    fn test_end_twice_fails() {
        let now = Utc::now();
        let mut relationship = FollowRelationship::start(
            RelationshipId::new(),
            UserId::new(),
            UserId::new(),
            now,
        )
        .unwrap();
        relationship.end(now).unwrap();

        let result = relationship.end(now);
        assert_eq!(result.unwrap_err(), EndFollowError::NotActive);
        assert_eq!(relationship.version(), 2);
    }

    #[test]
    fn test_rehydrate_active_relationship() {
        let id = RelationshipId::new();
        let follower = UserId::new();
        let followee = UserId::new();
        let now = Utc::now();
        let mut original = FollowRelationship::start(id, follower, followee, now).unwrap();
        let events = original.drain();

        let relationship = FollowRelationship::rehydrate(&events).unwrap();

        assert_eq!(relationship.id(), id);
        assert_eq!(relationship.follower_id(), follower);
        assert_eq!(relationship.followee_id(), followee);
        assert!(relationship.is_active());
    }

    #[test]
    fn test_rehydrate_ended_relationship() {
        let now = Utc::now();
        let mut original = FollowRelationship::start(
            RelationshipId::new(),
            UserId::new(),
            UserId::new(),
            now,
        )
        .unwrap();
        original.end(now).unwrap();
        let events = original.drain();

        let mut relationship = FollowRelationship::rehydrate(&events).unwrap();

        assert!(!relationship.is_active());
        assert_eq!(relationship.version(), 2);
        assert_eq!(relationship.end(now).unwrap_err(), EndFollowError::NotActive);
    }

    #[test]
    fn test_rehydrate_empty_stream() {
        let result = FollowRelationship::rehydrate(&[]);
        assert_eq!(result.unwrap_err(), RehydrateError::EmptyStream);
    }

    #[test]
    fn test_rehydrate_wrong_initial_kind() {
        use crate::domain::PostRetracted;

        let envelope = EventEnvelope::new(
            RelationshipId::new().value(),
            1,
            Utc::now(),
            DomainEvent::PostRetracted(PostRetracted {}),
        );

        let result = FollowRelationship::rehydrate(&[envelope]);
        assert_eq!(result.unwrap_err(), RehydrateError::EmptyStream);
    }
}
