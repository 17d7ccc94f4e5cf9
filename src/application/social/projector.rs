use std::fmt;
use std::sync::Arc;

use crate::domain::events::{
    DomainEvent, EventEnvelope, FollowEnded, FollowStarted, PostPublished,
};
use crate::domain::value_objects::{PostId, RelationshipId, UserId};
use crate::ports::read_store::{PostView, ReadStore, UserProfile};

/// プロジェクションのエラー
#[derive(Debug)]
pub enum ProjectionError {
    /// `PostPublished` の作者プロフィールが存在しない（ログ破損の兆候）
    MissingAuthor { post_id: PostId, author_id: UserId },
    /// Read Storeの入出力エラー
    ReadStore(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAuthor { post_id, author_id } => write!(
                f,
                "Author profile {} missing while projecting post {}",
                author_id.value(),
                post_id.value()
            ),
            Self::ReadStore(e) => write!(f, "Read store error during projection: {}", e),
        }
    }
}

impl std::error::Error for ProjectionError {}

impl From<Box<dyn std::error::Error + Send + Sync>> for ProjectionError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::ReadStore(err)
    }
}

/// プロジェクター
///
/// 追記されたイベントを追記順に消費し、Read Storeを更新する。
/// 決定的であり、空のRead Storeに対してログ全体をリプレイすると
/// 現在の状態と観測的に等価な状態が再現される。
///
/// プロジェクションは1イベントずつ、グローバルな追記順で適用される。
/// ステップ間の直列化は内部のロックが担う（単一の線形化点）。
///
/// セレブ判定は各イベントのプロジェクション時点で評価され、遡及しない。
/// しきい値を跨いだユーザーの過去の投稿は再配布されない。
pub struct Projector {
    read_store: Arc<dyn ReadStore>,
    step: tokio::sync::Mutex<()>,
}

impl Projector {
    pub fn new(read_store: Arc<dyn ReadStore>) -> Self {
        Self {
            read_store,
            step: tokio::sync::Mutex::new(()),
        }
    }

    /// 新しく追記されたイベント列を順に適用する
    pub async fn project(&self, events: &[EventEnvelope]) -> Result<(), ProjectionError> {
        for envelope in events {
            // 1ステップ=1イベント。先行イベントの効果が確定するまで
            // 次のイベントの適用は始まらない。
            let _guard = self.step.lock().await;
            self.apply(envelope).await?;
        }
        Ok(())
    }

    async fn apply(&self, envelope: &EventEnvelope) -> Result<(), ProjectionError> {
        tracing::debug!(
            kind = envelope.kind().as_str(),
            aggregate_id = %envelope.aggregate_id,
            version = envelope.version,
            "projecting event"
        );

        match &envelope.payload {
            DomainEvent::UserRegistered(e) => {
                self.read_store
                    .save_profile(UserProfile {
                        user_id: UserId::from_uuid(envelope.aggregate_id),
                        username: e.username.clone(),
                    })
                    .await?;
            }
            DomainEvent::PostPublished(e) => {
                self.apply_post_published(envelope.post_id(), e).await?;
            }
            DomainEvent::PostRetracted(_) => {
                self.apply_post_retracted(envelope.post_id()).await?;
            }
            DomainEvent::FollowStarted(e) => {
                self.apply_follow_started(RelationshipId::from_uuid(envelope.aggregate_id), e)
                    .await?;
            }
            DomainEvent::FollowEnded(e) => {
                self.apply_follow_ended(e).await?;
            }
        }

        Ok(())
    }

    /// 投稿公開：投稿ビューを挿入し、作者のセレブ状態に応じて
    /// ファンアウトするか索引に登録する。
    async fn apply_post_published(
        &self,
        post_id: PostId,
        event: &PostPublished,
    ) -> Result<(), ProjectionError> {
        let author = self
            .read_store
            .get_profile(event.author_id)
            .await?
            .ok_or(ProjectionError::MissingAuthor {
                post_id,
                author_id: event.author_id,
            })?;

        self.read_store
            .save_post(PostView {
                post_id,
                author_id: event.author_id,
                author_username: author.username,
                body: event.body.as_str().to_string(),
                published_at: event.published_at,
            })
            .await?;

        if self.read_store.is_celebrity(event.author_id).await? {
            // セレブの投稿はファンアウトせず索引に載せる
            self.read_store
                .mark_celebrity_post(post_id, event.author_id)
                .await?;
        } else {
            for follower_id in self.read_store.incoming(event.author_id).await? {
                self.read_store.push_timeline(follower_id, post_id).await?;
            }
        }

        Ok(())
    }

    /// 投稿撤回：フォロワーのタイムラインまたはセレブ索引から取り除き、
    /// 投稿ビューを削除する。投稿が見つからない場合は何もしない（冪等）。
    async fn apply_post_retracted(&self, post_id: PostId) -> Result<(), ProjectionError> {
        let post = match self.read_store.get_post(post_id).await? {
            Some(post) => post,
            None => return Ok(()),
        };

        let was_celebrity_post = self
            .read_store
            .celebrity_posts_of(&[post.author_id])
            .await?
            .contains(&post_id);

        if was_celebrity_post {
            self.read_store.forget_celebrity_post(post_id).await?;
        } else {
            for follower_id in self.read_store.incoming(post.author_id).await? {
                self.read_store
                    .remove_from_timeline(follower_id, post_id)
                    .await?;
            }
        }

        self.read_store.delete_post(post_id).await?;

        Ok(())
    }

    /// フォロー開始：辺を張り、フォロイーのセレブ状態に応じて
    /// 既存投稿をバックフィルするか索引登録を保証する。
    async fn apply_follow_started(
        &self,
        relationship_id: RelationshipId,
        event: &FollowStarted,
    ) -> Result<(), ProjectionError> {
        self.read_store
            .add_edge(event.follower_id, event.followee_id, relationship_id)
            .await?;

        let posts = self
            .read_store
            .list_posts_by_author(event.followee_id)
            .await?;

        if self.read_store.is_celebrity(event.followee_id).await? {
            // 新フォロワーのタイムラインには積まない。索引への登録のみ
            // 保証する（冪等）。
            for post in posts {
                self.read_store
                    .mark_celebrity_post(post.post_id, event.followee_id)
                    .await?;
            }
        } else {
            // 一覧は新しい順。古い順に積むことでタイムラインの
            // 「新しいものが先頭」を保ち、切り詰めは最新側を残す。
            for post in posts.iter().rev() {
                self.read_store
                    .push_timeline(event.follower_id, post.post_id)
                    .await?;
            }
        }

        Ok(())
    }

    /// フォロー終了：辺を外し、フォロイーが現時点でセレブでなければ
    /// その作者のエントリをタイムラインから一掃する。
    async fn apply_follow_ended(&self, event: &FollowEnded) -> Result<(), ProjectionError> {
        self.read_store
            .remove_edge(event.follower_id, event.followee_id)
            .await?;

        if !self.read_store.is_celebrity(event.followee_id).await? {
            self.read_store
                .remove_author_from_timeline(event.follower_id, event.followee_id)
                .await?;
        }

        Ok(())
    }
}
