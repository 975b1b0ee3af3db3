use axum::routing::{delete, get, post, put};
use axum::Router;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod events;
mod models;
mod routes;
mod schema;
mod services;

use config::AppConfig;
use traincast_shared::clients::rabbitmq::RabbitMQClient;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    traincast_shared::middleware::init_tracing("traincast-content");

    let config = AppConfig::load()?;
    let port = config.port;

    // Set JWT_SECRET env var for the auth extractor middleware
    std::env::set_var("JWT_SECRET", &config.jwt_secret);

    let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
    let db = Pool::builder().max_size(10).build(manager)?;

    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;

    let state = Arc::new(AppState { db, config, rabbitmq });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/content",
            get(routes::staff_routes::list_content).post(routes::staff_routes::submit_content),
        )
        .route("/content/unread-count", get(routes::staff_routes::unread_count))
        .route(
            "/content/:id",
            get(routes::staff_routes::get_content).delete(routes::admin_routes::delete_content),
        )
        .route("/content/:id/read", post(routes::staff_routes::mark_read))
        .route("/content/:id/approve", post(routes::admin_routes::approve_content))
        .route("/content/:id/targeting", put(routes::admin_routes::replace_targeting))
        .route("/review-queue", get(routes::admin_routes::review_queue))
        .route("/progress", get(routes::staff_routes::get_progress))
        .route("/memberships", get(routes::staff_routes::my_memberships))
        .route("/users", get(routes::admin_routes::list_users))
        .route("/users/:id", get(routes::admin_routes::get_user))
        .route(
            "/groups",
            get(routes::admin_routes::list_groups).post(routes::admin_routes::create_group),
        )
        .route("/groups/:id/members", post(routes::admin_routes::add_member))
        .route(
            "/groups/:id/members/:user_id",
            delete(routes::admin_routes::remove_member),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "traincast-content starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
