use std::sync::Arc;

use axum::routing::{delete, get, patch, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod channel;
mod config;
mod events;
mod models;
mod routes;
mod services;
mod store;

use channel::memory::BroadcastDeliveryChannel;
use channel::DeliveryChannel;
use config::AppConfig;
use services::NotificationService;
use store::memory::MemoryNotificationStore;

pub struct AppState {
    pub service: NotificationService,
    pub channel: Arc<dyn DeliveryChannel>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let store = Arc::new(MemoryNotificationStore::new());
        let channel: Arc<dyn DeliveryChannel> =
            Arc::new(BroadcastDeliveryChannel::new(config.channel_capacity));
        let service = NotificationService::new(store, channel.clone());
        Self {
            service,
            channel,
            config,
        }
    }
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        // flat surface
        .route(
            "/notifications",
            get(routes::notifications::list_notifications)
                .post(routes::notifications::create_notification),
        )
        .route("/notifications/unread/count", get(routes::notifications::unread_count))
        .route("/notifications/:id/read", put(routes::notifications::mark_read))
        .route("/notifications/:id", delete(routes::notifications::delete_notification))
        // versioned surface
        .route(
            "/api/v2/notifications",
            get(routes::v2::list_notifications).post(routes::v2::create_notification),
        )
        .route("/api/v2/notifications/unread/count", get(routes::v2::unread_count))
        .route(
            "/api/v2/notifications/:id",
            get(routes::v2::get_notification).delete(routes::v2::delete_notification),
        )
        .route("/api/v2/notifications/:id/read", patch(routes::v2::mark_read))
        // live push
        .route("/ws/notifications/:recipient_id", get(routes::ws::subscribe))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    courier_shared::middleware::init_tracing("courier-notification");

    let config = AppConfig::load()?;
    let port = config.port;

    let state = Arc::new(AppState::new(config));

    // Inbound create requests arrive over the channel as well as REST
    let inbound_state = state.clone();
    tokio::spawn(async move {
        events::subscriber::listen_create_requests(inbound_state).await;
        tracing::error!("inbound create subscriber stopped");
    });

    let app = app(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "courier-notification starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
