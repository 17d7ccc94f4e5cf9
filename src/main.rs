use chirp_ddd::{
    adapters::memory::{MemoryEventStore, MemoryReadStore},
    adapters::postgres::PostgresEventStore,
    api::{handlers::AppState, router::create_router},
    application::social::{Projector, ServiceDependencies, rebuild_read_store},
    ports::{EventStore, ReadStore, Tunables},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // トレーシングの初期化
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chirp_ddd=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let tunables = Tunables::from_env();
    tracing::info!(
        celebrity_threshold = tunables.celebrity_threshold,
        max_timeline = tunables.max_timeline,
        "tunables loaded"
    );

    // イベントログの選択：DATABASE_URLがあればPostgreSQL、なければインメモリ
    let event_store: Arc<dyn EventStore> = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            tracing::info!("Connecting to database...");

            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await
                .expect("Failed to connect to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("Failed to run migrations");

            Arc::new(PostgresEventStore::new(pool))
        }
        Err(_) => {
            tracing::info!("DATABASE_URL not set, using in-memory event log");
            Arc::new(MemoryEventStore::new())
        }
    };

    // Read Storeはインメモリのプロジェクション。起動時にログ全体の
    // リプレイで再構築する。
    let read_store: Arc<dyn ReadStore> = Arc::new(MemoryReadStore::new(tunables));
    let projector = Arc::new(Projector::new(read_store.clone()));

    rebuild_read_store(event_store.as_ref(), &projector)
        .await
        .expect("Failed to rebuild read store from event log");

    // サービス依存関係の作成
    let service_deps = ServiceDependencies {
        event_store,
        read_store,
        projector,
    };

    // アプリケーション状態の作成
    let app_state = Arc::new(AppState { service_deps });

    // ルーターの作成
    let app = create_router(app_state);

    // サーバー設定
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // サーバー起動
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
