use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, end_follow, get_feed, is_following, list_users, posts_by_author, publish_post,
    register_user, retract_post, start_follow,
};

/// マイクロポスティングの全エンドポイントを持つAPIルーターを作成
///
/// コマンドエンドポイント（Write操作）:
/// - POST /users - ユーザーを登録
/// - POST /posts - 投稿を公開
/// - POST /posts/:id/retract - 投稿を撤回
/// - POST /follows - フォローを開始
/// - DELETE /follows - フォローを終了
///
/// クエリエンドポイント（Read操作）:
/// - GET /users - ユーザー一覧
/// - GET /users/:id/feed - ホームフィード
/// - GET /users/:id/posts - 作者別の投稿一覧
/// - GET /follows - フォロー確認
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // ヘルスチェックエンドポイント
        .route("/health", get(health_check))
        // コマンドエンドポイント（Write操作）
        .route("/users", post(register_user).get(list_users))
        .route("/posts", post(publish_post))
        .route("/posts/:id/retract", post(retract_post))
        .route(
            "/follows",
            post(start_follow).delete(end_follow).get(is_following),
        )
        // クエリエンドポイント（Read操作）
        .route("/users/:id/feed", get(get_feed))
        .route("/users/:id/posts", get(posts_by_author))
        // トレーシングミドルウェアを追加
        .layer(TraceLayer::new_for_http())
        // アプリケーション状態を追加
        .with_state(state)
}

/// ヘルスチェックエンドポイント
async fn health_check() -> &'static str {
    "OK"
}
