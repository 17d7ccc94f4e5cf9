use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::commands::*;
use crate::domain::errors::{EndFollowError, RehydrateError, RetractPostError, StartFollowError};
use crate::domain::events::EventEnvelope;
use crate::domain::follow::FollowRelationship;
use crate::domain::post::Post;
use crate::domain::user::User;
use crate::domain::value_objects::{PostBody, PostId, RelationshipId, UserId, Username};
use crate::ports::{EventStore, ReadStore};

use super::errors::{Result, SocialApplicationError};
use super::projector::Projector;

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義する。振る舞いは持たず、
/// 純粋な関数に依存関係を渡す。イベントログ・Read Store・プロジェクター
/// はプロセス全体で共有され、ここを経由して明示的に注入される。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub event_store: Arc<dyn EventStore>,
    pub read_store: Arc<dyn ReadStore>,
    pub projector: Arc<Projector>,
}

/// コマンドの期限を検査する
///
/// 期限はイベント追記前にのみ効力を持つ。追記後のイベントは権威であり、
/// プロジェクションは中断できない。
fn check_deadline(deadline: Option<DateTime<Utc>>) -> Result<()> {
    if let Some(deadline) = deadline {
        if Utc::now() > deadline {
            return Err(SocialApplicationError::Deadline);
        }
    }
    Ok(())
}

/// ドレイン済みイベントを追記し、その場でプロジェクションする
///
/// コマンドは (a) イベントが追記され、かつ (b) プロジェクションが
/// 完了した時点で完了とみなす。追記パス上でのインライン・
/// プロジェクションにより read-your-writes を保証する。
async fn commit(deps: &ServiceDependencies, events: Vec<EventEnvelope>) -> Result<()> {
    let aggregate_id = match events.first() {
        Some(envelope) => envelope.aggregate_id,
        None => return Ok(()),
    };

    deps.event_store
        .append(aggregate_id, events.clone())
        .await?;

    deps.projector.project(&events).await?;

    Ok(())
}

/// ユーザーを登録する
///
/// ビジネスルール：
/// - ユーザー名が形式要件を満たすこと
/// - ユーザー名がシステム全体で未使用であること
///
/// # 戻り値
/// 成功時は採番されたユーザーID
pub async fn register_user(deps: &ServiceDependencies, cmd: RegisterUser) -> Result<UserId> {
    // 1. 形式バリデーション
    let username =
        Username::new(&cmd.username).map_err(SocialApplicationError::InvalidUsername)?;

    // 2. 一意性の検査（Read Storeに対する横断的前提条件）
    let taken = deps
        .read_store
        .find_profile_by_username(username.as_str())
        .await
        .map_err(SocialApplicationError::ReadStoreError)?;

    if taken.is_some() {
        return Err(SocialApplicationError::UsernameTaken);
    }

    // 3. 集約の決定
    let mut user = User::register(UserId::new(), username, Utc::now());
    let user_id = user.id();

    // 4. 期限検査の後に追記・プロジェクション
    check_deadline(cmd.deadline)?;
    commit(deps, user.drain()).await?;

    Ok(user_id)
}

/// 投稿を公開する
///
/// ビジネスルール：
/// - 作者が登録済みであること
/// - 本文が形式要件を満たすこと
///
/// # 戻り値
/// 成功時は採番された投稿ID
pub async fn publish_post(deps: &ServiceDependencies, cmd: PublishPost) -> Result<PostId> {
    // 1. 作者の存在確認
    let author = deps
        .read_store
        .get_profile(cmd.author_id)
        .await
        .map_err(SocialApplicationError::ReadStoreError)?;

    if author.is_none() {
        return Err(SocialApplicationError::UserNotFound);
    }

    // 2. 本文のバリデーション
    let body = PostBody::new(&cmd.body).map_err(SocialApplicationError::InvalidBody)?;

    // 3. 集約の決定
    let mut post = Post::publish(PostId::new(), cmd.author_id, body, Utc::now());
    let post_id = post.id();

    // 4. 期限検査の後に追記・プロジェクション
    check_deadline(cmd.deadline)?;
    commit(deps, post.drain()).await?;

    Ok(post_id)
}

/// 投稿を撤回する
///
/// ビジネスルール：
/// - 投稿が存在すること
/// - 呼び出し元が作者本人であること
/// - 未撤回であること
pub async fn retract_post(deps: &ServiceDependencies, cmd: RetractPost) -> Result<()> {
    // 1. Read Storeに対する前提条件
    let view = deps
        .read_store
        .get_post(cmd.post_id)
        .await
        .map_err(SocialApplicationError::ReadStoreError)?
        .ok_or(SocialApplicationError::PostNotFound)?;

    if view.author_id != cmd.caller_id {
        return Err(SocialApplicationError::Unauthorized);
    }

    // 2. イベントストアから集約を復元
    if !deps.event_store.exists(cmd.post_id.value()).await? {
        return Err(SocialApplicationError::PostNotFound);
    }

    let events = deps.event_store.load(cmd.post_id.value()).await?;
    let mut post = Post::rehydrate(&events)
        .map_err(|e| rehydrate_error(e, SocialApplicationError::PostNotFound, "post"))?;

    // 3. 集約の決定
    post.retract(Utc::now()).map_err(|e| match e {
        RetractPostError::AlreadyRetracted => SocialApplicationError::AlreadyRetracted,
    })?;

    // 4. 期限検査の後に追記・プロジェクション
    check_deadline(cmd.deadline)?;
    commit(deps, post.drain()).await?;

    Ok(())
}

/// フォローを開始する
///
/// ビジネスルール：
/// - 双方のユーザーが存在すること
/// - 自分自身へのフォローでないこと
/// - 既にフォローしていないこと（順序対ごとに有効な関係は高々1つ）
///
/// # 戻り値
/// 成功時は採番されたフォロー関係ID
pub async fn start_follow(
    deps: &ServiceDependencies,
    cmd: StartFollow,
) -> Result<RelationshipId> {
    // 1. 双方のユーザーの存在確認
    ensure_user_exists(deps, cmd.follower_id).await?;
    ensure_user_exists(deps, cmd.followee_id).await?;

    // 2. 重複フォローの検査
    let following = deps
        .read_store
        .is_following(cmd.follower_id, cmd.followee_id)
        .await
        .map_err(SocialApplicationError::ReadStoreError)?;

    if following {
        return Err(SocialApplicationError::AlreadyFollowing);
    }

    // 3. 集約の決定（自己フォローは集約が拒否する）
    let mut relationship = FollowRelationship::start(
        RelationshipId::new(),
        cmd.follower_id,
        cmd.followee_id,
        Utc::now(),
    )
    .map_err(|e| match e {
        StartFollowError::SelfFollow => SocialApplicationError::SelfFollow,
    })?;
    let relationship_id = relationship.id();

    // 4. 期限検査の後に追記・プロジェクション
    check_deadline(cmd.deadline)?;
    commit(deps, relationship.drain()).await?;

    Ok(relationship_id)
}

/// フォローを終了する
///
/// ビジネスルール：
/// - 双方のユーザーが存在すること
/// - 現在フォローしていること
pub async fn end_follow(deps: &ServiceDependencies, cmd: EndFollow) -> Result<()> {
    // 1. 双方のユーザーの存在確認
    ensure_user_exists(deps, cmd.follower_id).await?;
    ensure_user_exists(deps, cmd.followee_id).await?;

    // 2. 関係索引の逆引き
    let relationship_id = deps
        .read_store
        .relationship_of(cmd.follower_id, cmd.followee_id)
        .await
        .map_err(SocialApplicationError::ReadStoreError)?
        .ok_or(SocialApplicationError::NotFollowing)?;

    // 3. イベントストアから集約を復元
    if !deps.event_store.exists(relationship_id.value()).await? {
        return Err(SocialApplicationError::RelationshipNotFound);
    }

    let events = deps.event_store.load(relationship_id.value()).await?;
    let mut relationship = FollowRelationship::rehydrate(&events).map_err(|e| {
        rehydrate_error(e, SocialApplicationError::RelationshipNotFound, "relationship")
    })?;

    // 4. 集約の決定
    relationship.end(Utc::now()).map_err(|e| match e {
        EndFollowError::NotActive => SocialApplicationError::NotFollowing,
    })?;

    // 5. 期限検査の後に追記・プロジェクション
    check_deadline(cmd.deadline)?;
    commit(deps, relationship.drain()).await?;

    Ok(())
}

async fn ensure_user_exists(deps: &ServiceDependencies, user_id: UserId) -> Result<()> {
    let profile = deps
        .read_store
        .get_profile(user_id)
        .await
        .map_err(SocialApplicationError::ReadStoreError)?;

    if profile.is_none() {
        return Err(SocialApplicationError::UserNotFound);
    }
    Ok(())
}

/// 復元エラーをアプリケーション層のエラーへ写像する
///
/// 空ストリームはRead Storeとログの不一致を意味するため対象ごとの
/// not-foundに、途中の想定外イベントはログ破損として扱う。
fn rehydrate_error(
    err: RehydrateError,
    not_found: SocialApplicationError,
    stream: &str,
) -> SocialApplicationError {
    match err {
        RehydrateError::EmptyStream => not_found,
        RehydrateError::UnexpectedEvent(kind) => SocialApplicationError::EventStoreError(
            crate::ports::EventStoreError::Corrupt(format!(
                "unexpected {} event in {} stream",
                kind.as_str(),
                stream
            )),
        ),
    }
}
