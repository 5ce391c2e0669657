use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use blog_service::middleware::TokenAuthMiddleware;
use blog_service::services::MarkdownRenderer;
use blog_service::{handlers, Config};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::io;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn health_summary(pool: web::Data<PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "blog-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "blog-service"
        })),
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

/// Blog Service
///
/// A backend service for a markdown blog with comments.
///
/// # Routes
///
/// - `/api/v1/posts/*` - Create, read, update, delete posts
/// - `/api/v1/users/{username}/posts` - A user's posts
/// - `/api/v1/comments/*` - Create, read, update, delete comments
/// - `/api/v1/auth/*` - Signup, login, logout, GitHub OAuth
///
/// # Architecture
///
/// - HTTP handlers with request/response conversion
/// - PostgreSQL for persistent storage (migrations run at startup)
/// - Opaque per-user auth tokens resolved by middleware
/// - Markdown rendered and sanitized on every read
#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Initialize database connection pool
    let db_pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Connected to database");

    // Apply pending migrations
    if let Err(e) = sqlx::migrate!().run(&db_pool).await {
        tracing::error!("Database migration failed: {:#}", e);
        eprintln!("ERROR: Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let renderer = web::Data::new(MarkdownRenderer::new());
    let config_data = web::Data::new(config.clone());

    // Shared HTTP client for the GitHub exchange. GitHub's API rejects
    // requests without a User-Agent.
    let http_client = reqwest::Client::builder()
        .user_agent(concat!("blog-service/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("HTTP client init: {e}")))?;
    let http_client = web::Data::new(http_client);

    HttpServer::new(move || {
        // Build CORS configuration
        let mut cors = Cors::default();
        for origin in config.cors.allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(renderer.clone())
            .app_data(config_data.clone())
            .app_data(http_client.clone())
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            // Health check endpoints
            .route("/api/v1/health", web::get().to(health_summary))
            .route("/api/v1/health/live", web::get().to(liveness_check))
            .service(
                web::scope("/api/v1")
                    .wrap(TokenAuthMiddleware)
                    .service(
                        web::scope("/posts")
                            .service(
                                web::resource("")
                                    .route(web::get().to(handlers::list_posts))
                                    .route(web::post().to(handlers::create_post)),
                            )
                            .service(
                                web::resource("/{post_id}")
                                    .route(web::get().to(handlers::get_post))
                                    .route(web::put().to(handlers::update_post))
                                    .route(web::delete().to(handlers::delete_post)),
                            ),
                    )
                    .service(
                        web::resource("/users/{username}/posts")
                            .route(web::get().to(handlers::get_user_posts)),
                    )
                    .service(
                        web::scope("/comments")
                            .service(
                                web::resource("")
                                    .route(web::get().to(handlers::list_comments))
                                    .route(web::post().to(handlers::create_comment)),
                            )
                            .service(
                                web::resource("/{comment_id}")
                                    .route(web::get().to(handlers::get_comment))
                                    .route(web::put().to(handlers::update_comment))
                                    .route(web::delete().to(handlers::delete_comment)),
                            ),
                    )
                    .service(
                        web::scope("/auth")
                            .route("/signup", web::post().to(handlers::signup))
                            .route("/login", web::post().to(handlers::login))
                            .route("/logout", web::post().to(handlers::logout))
                            .route("/user", web::get().to(handlers::current_user))
                            .route("/github/callback", web::post().to(handlers::github_callback)),
                    ),
            )
    })
    .bind(&bind_address)?
    .workers(4)
    .run()
    .await
}
