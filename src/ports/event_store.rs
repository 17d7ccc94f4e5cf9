use crate::domain::events::EventEnvelope;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt;
use uuid::Uuid;

/// イベントストアのエラー
#[derive(Debug)]
pub enum EventStoreError {
    /// 楽観的ロックの競合。追記しようとしたイベントのバージョンが
    /// 既知の最終バージョン+1と一致しない。
    VersionConflict {
        aggregate_id: Uuid,
        expected: u64,
        found: u64,
    },
    /// ストレージI/Oの失敗（追記成功前であれば再試行可能）
    Storage(Box<dyn std::error::Error + Send + Sync>),
    /// 永続化されたレコードを復号できない（ログ破損）
    Corrupt(String),
}

impl fmt::Display for EventStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VersionConflict {
                aggregate_id,
                expected,
                found,
            } => write!(
                f,
                "Version conflict on aggregate {}: expected {}, found {}",
                aggregate_id, expected, found
            ),
            Self::Storage(e) => write!(f, "Event store storage error: {}", e),
            Self::Corrupt(msg) => write!(f, "Corrupt event record: {}", msg),
        }
    }
}

impl std::error::Error for EventStoreError {}

#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, EventStoreError>;

/// イベントストアポート
///
/// ドメインイベントの永続化と取得を抽象化する。イベントは集約ごとの
/// 追記専用ストリームに保存される不変の事実であり、追記が唯一の変更
/// 操作。権威ある状態はイベントログだけが所有する。
#[allow(dead_code)]
#[async_trait]
pub trait EventStore: Send + Sync {
    /// 集約のイベントを原子的に順序どおり追記する
    ///
    /// 各イベントの `version` は `last_known_version + k`（k番目の要素）
    /// と一致しなければならない。不一致の場合は `VersionConflict` で
    /// 失敗し、ひとつも追記されない。
    async fn append(&self, aggregate_id: Uuid, events: Vec<EventEnvelope>) -> Result<()>;

    /// 集約のすべてのイベントをバージョン順に読み込む
    ///
    /// 集約状態の復元（rehydrate）に使用される。
    async fn load(&self, aggregate_id: Uuid) -> Result<Vec<EventEnvelope>>;

    /// すべての集約のイベントをストリーム配信する
    ///
    /// `occurred_at` の昇順、同時刻は挿入順。Read Storeの再構築
    /// （リプレイ）に使用される。
    fn stream_all(&self) -> BoxStream<'_, Result<EventEnvelope>>;

    /// 集約のストリームが存在するか確認する
    async fn exists(&self, aggregate_id: Uuid) -> Result<bool>;
}
