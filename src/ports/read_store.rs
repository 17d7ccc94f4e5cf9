use crate::domain::value_objects::{PostId, RelationshipId, UserId, Username};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// セレブ判定のフォロワー数しきい値（デフォルト）
pub const DEFAULT_CELEBRITY_THRESHOLD: usize = 1000;
/// タイムラインの最大保持件数（デフォルト）
pub const DEFAULT_MAX_TIMELINE: usize = 800;

/// Read Storeのチューニング値
///
/// 環境変数 `CELEBRITY_THRESHOLD` / `MAX_TIMELINE` で上書きできる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tunables {
    /// フォロワー数がこの値以上のユーザーはセレブ扱いになる
    pub celebrity_threshold: usize,
    /// タイムラインごとの保持上限（先頭挿入後に切り詰め）
    pub max_timeline: usize,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            celebrity_threshold: DEFAULT_CELEBRITY_THRESHOLD,
            max_timeline: DEFAULT_MAX_TIMELINE,
        }
    }
}

impl Tunables {
    /// 環境変数から読み込む。未設定・解釈不能な値はデフォルトに落ちる。
    pub fn from_env() -> Self {
        fn read(name: &str, default: usize) -> usize {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        Self {
            celebrity_threshold: read("CELEBRITY_THRESHOLD", DEFAULT_CELEBRITY_THRESHOLD),
            max_timeline: read("MAX_TIMELINE", DEFAULT_MAX_TIMELINE),
        }
    }
}

/// ユーザープロフィール（Read Model）
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: UserId,
    pub username: Username,
}

/// 投稿ビュー（Read Model）
///
/// クエリに最適化された非正規化ビュー（CQRSパターン）。
/// 作者名はプロジェクション時に非正規化して保持する。
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostView {
    pub post_id: PostId,
    pub author_id: UserId,
    pub author_username: Username,
    pub body: String,
    pub published_at: DateTime<Utc>,
}

/// Read Storeポート
///
/// プロジェクターが必要とするすべての変更操作と、コマンド・クエリの
/// ハンドラーが必要とするすべての読み取り操作を提供する。保持する
/// 状態はすべてイベントログからのリプレイで再構築できる導出データ。
#[allow(dead_code)]
#[async_trait]
pub trait ReadStore: Send + Sync {
    // ------------------------------------------------------------------
    // プロフィール
    // ------------------------------------------------------------------

    /// プロフィールを挿入または更新する（リプレイ時はupsert）
    async fn save_profile(&self, profile: UserProfile) -> Result<()>;

    async fn get_profile(&self, user_id: UserId) -> Result<Option<UserProfile>>;

    /// ユーザー名の完全一致で検索する（一意性検査に使用）
    async fn find_profile_by_username(&self, username: &str) -> Result<Option<UserProfile>>;

    async fn list_profiles(&self) -> Result<Vec<UserProfile>>;

    // ------------------------------------------------------------------
    // 投稿
    // ------------------------------------------------------------------

    async fn save_post(&self, post: PostView) -> Result<()>;

    async fn get_post(&self, post_id: PostId) -> Result<Option<PostView>>;

    async fn delete_post(&self, post_id: PostId) -> Result<()>;

    /// 作者の投稿を新しい順に返す
    async fn list_posts_by_author(&self, author_id: UserId) -> Result<Vec<PostView>>;

    // ------------------------------------------------------------------
    // フォローグラフ
    //
    // グラフは循環を含みうる。outgoing / incoming の2つの索引が
    // それぞれ独自にストレージを所有し、変更は両方を更新する。
    // ------------------------------------------------------------------

    async fn add_edge(
        &self,
        follower_id: UserId,
        followee_id: UserId,
        relationship_id: RelationshipId,
    ) -> Result<()>;

    async fn remove_edge(&self, follower_id: UserId, followee_id: UserId) -> Result<()>;

    /// フォローしている相手の一覧
    async fn outgoing(&self, user_id: UserId) -> Result<Vec<UserId>>;

    /// フォローされている側から見たフォロワーの一覧
    async fn incoming(&self, user_id: UserId) -> Result<Vec<UserId>>;

    async fn is_following(&self, follower_id: UserId, followee_id: UserId) -> Result<bool>;

    /// アンフォロー時の逆引きに使用する
    async fn relationship_of(
        &self,
        follower_id: UserId,
        followee_id: UserId,
    ) -> Result<Option<RelationshipId>>;

    // ------------------------------------------------------------------
    // タイムライン
    // ------------------------------------------------------------------

    /// 先頭に挿入し、`max_timeline` 件に切り詰める
    async fn push_timeline(&self, owner_id: UserId, post_id: PostId) -> Result<()>;

    async fn remove_from_timeline(&self, owner_id: UserId, post_id: PostId) -> Result<()>;

    /// 指定した作者のエントリをすべて取り除く
    async fn remove_author_from_timeline(&self, owner_id: UserId, author_id: UserId)
        -> Result<()>;

    async fn get_timeline(&self, owner_id: UserId) -> Result<Vec<PostId>>;

    // ------------------------------------------------------------------
    // セレブ
    // ------------------------------------------------------------------

    /// セレブ状態で公開された投稿を索引に登録する（冪等）
    async fn mark_celebrity_post(&self, post_id: PostId, author_id: UserId) -> Result<()>;

    async fn forget_celebrity_post(&self, post_id: PostId) -> Result<()>;

    /// 指定した作者集合のセレブ投稿IDを返す
    async fn celebrity_posts_of(&self, author_ids: &[UserId]) -> Result<Vec<PostId>>;

    /// フォロワー数がしきい値以上か（O(1)）
    async fn is_celebrity(&self, user_id: UserId) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tunables_defaults() {
        let tunables = Tunables::default();
        assert_eq!(tunables.celebrity_threshold, 1000);
        assert_eq!(tunables.max_timeline, 800);
    }
}
