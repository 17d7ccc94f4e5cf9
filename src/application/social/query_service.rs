use std::collections::HashSet;

use crate::domain::value_objects::{PostId, UserId};
use crate::ports::read_store::{PostView, ReadStore as _, UserProfile};

use super::command_service::ServiceDependencies;
use super::errors::{Result, SocialApplicationError};

/// 全ユーザーのプロフィールを取得する
pub async fn list_users(deps: &ServiceDependencies) -> Result<Vec<UserProfile>> {
    deps.read_store
        .list_profiles()
        .await
        .map_err(SocialApplicationError::ReadStoreError)
}

/// ホームフィードを組み立てる
///
/// 実体化済みタイムラインと、フォロー中のセレブの投稿索引をマージする：
/// 1. 実体化済みタイムラインを取得
/// 2. フォロー集合のセレブ投稿を取得
/// 3. 和集合を重複排除し、投稿ストアで解決できるIDのみ残す
///    （撤回済みは解決されない）
/// 4. `published_at` の降順に整列。同時刻は `post_id` で順序を全順序化
pub async fn get_feed(deps: &ServiceDependencies, user_id: UserId) -> Result<Vec<PostView>> {
    let materialized = deps
        .read_store
        .get_timeline(user_id)
        .await
        .map_err(SocialApplicationError::ReadStoreError)?;

    let followees = deps
        .read_store
        .outgoing(user_id)
        .await
        .map_err(SocialApplicationError::ReadStoreError)?;

    let celebrity_posts = deps
        .read_store
        .celebrity_posts_of(&followees)
        .await
        .map_err(SocialApplicationError::ReadStoreError)?;

    let mut seen: HashSet<PostId> = HashSet::new();
    let mut feed: Vec<PostView> = Vec::new();

    for post_id in materialized.into_iter().chain(celebrity_posts) {
        if !seen.insert(post_id) {
            continue;
        }
        if let Some(post) = deps
            .read_store
            .get_post(post_id)
            .await
            .map_err(SocialApplicationError::ReadStoreError)?
        {
            feed.push(post);
        }
    }

    feed.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| a.post_id.value().cmp(&b.post_id.value()))
    });

    Ok(feed)
}

/// 作者の投稿を新しい順に取得する
pub async fn posts_by_author(
    deps: &ServiceDependencies,
    author_id: UserId,
) -> Result<Vec<PostView>> {
    deps.read_store
        .list_posts_by_author(author_id)
        .await
        .map_err(SocialApplicationError::ReadStoreError)
}

/// フォローしているか確認する
pub async fn is_following(
    deps: &ServiceDependencies,
    follower_id: UserId,
    followee_id: UserId,
) -> Result<bool> {
    deps.read_store
        .is_following(follower_id, followee_id)
        .await
        .map_err(SocialApplicationError::ReadStoreError)
}
