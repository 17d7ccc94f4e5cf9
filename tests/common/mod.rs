use chirp_ddd::adapters::memory::{MemoryEventStore, MemoryReadStore};
use chirp_ddd::application::social::{Projector, ServiceDependencies};
use chirp_ddd::ports::Tunables;
use std::sync::Arc;

/// インメモリのアダプター一式でサービス依存関係を組み立てる
///
/// 本番と同じ配線（イベントログ → プロジェクター → Read Store）を
/// プロセス内で再現する。
#[allow(dead_code)]
pub fn setup_deps(tunables: Tunables) -> ServiceDependencies {
    let event_store = Arc::new(MemoryEventStore::new());
    let read_store = Arc::new(MemoryReadStore::new(tunables));
    let projector = Arc::new(Projector::new(read_store.clone()));

    ServiceDependencies {
        event_store,
        read_store,
        projector,
    }
}

/// シナリオテスト用の小さなチューニング値
/// （セレブしきい値 3、タイムライン上限 5）
#[allow(dead_code)]
pub fn scenario_deps() -> ServiceDependencies {
    setup_deps(Tunables {
        celebrity_threshold: 3,
        max_timeline: 5,
    })
}

/// 既存のイベントログを共有する新しいRead Store一式を組み立てる
///
/// リプレイ検証で、同じログから再構築した状態を比較するために使う。
#[allow(dead_code)]
pub fn fresh_read_side(deps: &ServiceDependencies, tunables: Tunables) -> ServiceDependencies {
    let read_store = Arc::new(MemoryReadStore::new(tunables));
    let projector = Arc::new(Projector::new(read_store.clone()));

    ServiceDependencies {
        event_store: deps.event_store.clone(),
        read_store,
        projector,
    }
}
