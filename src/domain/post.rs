#![allow(dead_code)]

use chrono::{DateTime, Utc};

use super::{
    DomainEvent, EventEnvelope, PostBody, PostId, PostPublished, PostRetracted, RehydrateError,
    RetractPostError, UserId,
};

/// 投稿集約
///
/// 状態遷移：`Draft → Published → Retracted`
///
/// `Draft` はイベントを持たない集約（暗黙状態）。`PostPublished` が
/// `Draft` からの唯一の遷移、`PostRetracted` が `Published` からの
/// 唯一の遷移で、`Retracted` は終端状態。撤回済み投稿への再撤回は
/// 拒否される。
#[derive(Debug, Clone)]
pub struct Post {
    id: PostId,
    author_id: UserId,
    body: PostBody,
    published_at: DateTime<Utc>,
    retracted: bool,
    version: u64,
    recorded: Vec<EventEnvelope>,
}

impl Post {
    /// 決定：投稿を公開する
    ///
    /// 空のストリームからのみ有効。新しい集約として構築する。
    pub fn publish(
        id: PostId,
        author_id: UserId,
        body: PostBody,
        published_at: DateTime<Utc>,
    ) -> Self {
        let envelope = EventEnvelope::new(
            id.value(),
            1,
            published_at,
            DomainEvent::PostPublished(PostPublished {
                author_id,
                body: body.clone(),
                published_at,
            }),
        );

        Self {
            id,
            author_id,
            body,
            published_at,
            retracted: false,
            version: 1,
            recorded: vec![envelope],
        }
    }

    /// 決定：投稿を撤回する
    ///
    /// # エラー
    /// 既に撤回済みの場合は `AlreadyRetracted`
    pub fn retract(&mut self, retracted_at: DateTime<Utc>) -> Result<(), RetractPostError> {
        if self.retracted {
            return Err(RetractPostError::AlreadyRetracted);
        }

        let envelope = EventEnvelope::new(
            self.id.value(),
            self.version + 1,
            retracted_at,
            DomainEvent::PostRetracted(PostRetracted {}),
        );

        // 発行と状態更新は単一ステップ
        self.retracted = true;
        self.version += 1;
        self.recorded.push(envelope);

        Ok(())
    }

    /// イベント列から現在の状態を復元する
    pub fn rehydrate(events: &[EventEnvelope]) -> Result<Self, RehydrateError> {
        let (first, rest) = events.split_first().ok_or(RehydrateError::EmptyStream)?;

        let published = match &first.payload {
            DomainEvent::PostPublished(e) => e,
            _ => return Err(RehydrateError::EmptyStream),
        };

        let mut post = Self {
            id: PostId::from_uuid(first.aggregate_id),
            author_id: published.author_id,
            body: published.body.clone(),
            published_at: published.published_at,
            retracted: false,
            version: first.version,
            recorded: Vec::new(),
        };

        for envelope in rest {
            match &envelope.payload {
                DomainEvent::PostRetracted(_) => {
                    post.retracted = true;
                    post.version = envelope.version;
                }
                _ => return Err(RehydrateError::UnexpectedEvent(envelope.kind())),
            }
        }

        Ok(post)
    }

    /// 未コミットのイベントを取り出し、バッファを空にする
    pub fn drain(&mut self) -> Vec<EventEnvelope> {
        std::mem::take(&mut self.recorded)
    }

    pub fn id(&self) -> PostId {
        self.id
    }

    pub fn author_id(&self) -> UserId {
        self.author_id
    }

    pub fn body(&self) -> &PostBody {
        &self.body
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    pub fn is_retracted(&self) -> bool {
        self.retracted
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(s: &str) -> PostBody {
        PostBody::new(s).unwrap()
    }

    #[test]
    fn test_publish_emits_post_published() {
        let id = PostId::new();
        let author_id = UserId::new();
        let now = Utc::now();

        let mut post = Post::publish(id, author_id, body("hello"), now);

        assert_eq!(post.id(), id);
        assert_eq!(post.author_id(), author_id);
        assert!(!post.is_retracted());
        assert_eq!(post.version(), 1);

        let events = post.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].version, 1);
        match &events[0].payload {
            DomainEvent::PostPublished(e) => {
                assert_eq!(e.author_id, author_id);
                assert_eq!(e.body.as_str(), "hello");
                assert_eq!(e.published_at, now);
            }
            other => panic!("Expected PostPublished, got {:?}", other),
        }
    }

    #[test]
    fn test_retract_emits_post_retracted() {
        let now = Utc::now();
        let mut post = Post::publish(PostId::new(), UserId::new(), body("hello"), now);
        post.drain();

        let retracted_at = now + chrono::Duration::minutes(5);
        post.retract(retracted_at).unwrap();

        assert!(post.is_retracted());
        assert_eq!(post.version(), 2);

        let events = post.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].version, 2);
        assert_eq!(events[0].occurred_at, retracted_at);
        assert!(matches!(
            events[0].payload,
            DomainEvent::PostRetracted(_)
        ));
    }

    #[test]
    fn test_retract_twice_fails() {
        let now = Utc::now();
        let mut post = Post::publish(PostId::new(), UserId::new(), body("hello"), now);
        post.retract(now).unwrap();

        let result = post.retract(now);
        assert_eq!(result.unwrap_err(), RetractPostError::AlreadyRetracted);

        // 失敗した決定はイベントを発行しない
        assert_eq!(post.drain().len(), 2);
        assert_eq!(post.version(), 2);
    }

    #[test]
    fn test_decision_then_drain_versions_are_dense() {
        let now = Utc::now();
        let mut post = Post::publish(PostId::new(), UserId::new(), body("hi"), now);
        post.retract(now).unwrap();

        let events = post.drain();
        let versions: Vec<u64> = events.iter().map(|e| e.version).collect();
        assert_eq!(versions, vec![1, 2]);
    }

    #[test]
    fn test_rehydrate_published_post() {
        let id = PostId::new();
        let author_id = UserId::new();
        let now = Utc::now();
        let mut original = Post::publish(id, author_id, body("restore me"), now);
        let events = original.drain();

        let post = Post::rehydrate(&events).unwrap();

        assert_eq!(post.id(), id);
        assert_eq!(post.author_id(), author_id);
        assert_eq!(post.body().as_str(), "restore me");
        assert!(!post.is_retracted());
        assert_eq!(post.version(), 1);
    }

    #[test]
    fn test_rehydrate_retracted_post() {
        let now = Utc::now();
        let mut original = Post::publish(PostId::new(), UserId::new(), body("gone"), now);
        original.retract(now).unwrap();
        let events = original.drain();

        let post = Post::rehydrate(&events).unwrap();

        assert!(post.is_retracted());
        assert_eq!(post.version(), 2);

        // 復元後の再撤回も拒否される
        let mut post = post;
        assert_eq!(
            post.retract(now).unwrap_err(),
            RetractPostError::AlreadyRetracted
        );
    }

    #[test]
    fn test_rehydrate_empty_stream() {
        let result = Post::rehydrate(&[]);
        assert_eq!(result.unwrap_err(), RehydrateError::EmptyStream);
    }

    #[test]
    fn test_rehydrate_wrong_initial_kind() {
        let envelope = EventEnvelope::new(
            PostId::new().value(),
            1,
            Utc::now(),
            DomainEvent::PostRetracted(PostRetracted {}),
        );

        let result = Post::rehydrate(&[envelope]);
        assert_eq!(result.unwrap_err(), RehydrateError::EmptyStream);
    }

    #[test]
    fn test_rehydrate_unexpected_mid_stream_event() {
        use crate::domain::{EventKind, UserRegistered, Username};

        let id = PostId::new();
        let now = Utc::now();
        let mut original = Post::publish(id, UserId::new(), body("x y z"), now);
        let mut events = original.drain();
        events.push(EventEnvelope::new(
            id.value(),
            2,
            now,
            DomainEvent::UserRegistered(UserRegistered {
                username: Username::new("nope").unwrap(),
            }),
        ));

        let result = Post::rehydrate(&events);
        assert_eq!(
            result.unwrap_err(),
            RehydrateError::UnexpectedEvent(EventKind::UserRegistered)
        );
    }
}
