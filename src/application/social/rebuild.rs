use futures::StreamExt;

use crate::ports::EventStore;

use super::errors::{Result, SocialApplicationError};
use super::projector::Projector;

/// イベントログ全体のリプレイでRead Storeを再構築する
///
/// 起動時のリカバリに使用する。リプレイは冪等：
/// - `UserRegistered` はupsert
/// - `PostPublished` は投稿を再挿入し、その時点のフォロワー集合へ
///   再ファンアウトする（先行するフォローが順に再生済みなら、これは
///   まさに意図した集合になる）
/// - タイムラインの切り詰めは順序が同じなら決定的
///
/// # 戻り値
/// 成功時はプロジェクションしたイベント数
pub async fn rebuild_read_store(
    event_store: &dyn EventStore,
    projector: &Projector,
) -> Result<usize> {
    let mut stream = event_store.stream_all();
    let mut count = 0usize;

    while let Some(result) = stream.next().await {
        let envelope = result.map_err(SocialApplicationError::from)?;
        projector.project(std::slice::from_ref(&envelope)).await?;
        count += 1;
    }

    if count > 0 {
        tracing::info!(events = count, "read store rebuilt from event log");
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryEventStore, MemoryReadStore};
    use crate::domain::events::{DomainEvent, EventEnvelope, UserRegistered};
    use crate::domain::value_objects::{UserId, Username};
    use crate::ports::{EventStore as _, ReadStore as _, Tunables};
    use chrono::Utc;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_rebuild_empty_log() {
        let event_store = MemoryEventStore::new();
        let read_store = Arc::new(MemoryReadStore::new(Tunables::default()));
        let projector = Projector::new(read_store.clone());

        let count = rebuild_read_store(&event_store, &projector).await.unwrap();

        assert_eq!(count, 0);
        assert!(read_store.list_profiles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rebuild_replays_profiles() {
        let event_store = MemoryEventStore::new();
        let read_store = Arc::new(MemoryReadStore::new(Tunables::default()));
        let projector = Projector::new(read_store.clone());

        let user_id = UserId::new();
        event_store
            .append(
                user_id.value(),
                vec![EventEnvelope::new(
                    user_id.value(),
                    1,
                    Utc::now(),
                    DomainEvent::UserRegistered(UserRegistered {
                        username: Username::new("alice").unwrap(),
                    }),
                )],
            )
            .await
            .unwrap();

        let count = rebuild_read_store(&event_store, &projector).await.unwrap();

        assert_eq!(count, 1);
        let profile = read_store.get_profile(user_id).await.unwrap().unwrap();
        assert_eq!(profile.username.as_str(), "alice");
    }
}
