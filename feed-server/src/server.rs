use crate::application::auth_service::AuthService;
use crate::application::post_service::PostService;
use crate::application::profile_service::ProfileService;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::handlers;
use crate::presentation::middleware::{
    BearerAuthMiddleware, RequestIdMiddleware, TimingMiddleware,
};
use crate::presentation::utils::json_config;
use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Application services shared by every worker.
#[derive(Clone)]
pub struct AppServices {
    pub auth: AuthService,
    pub posts: PostService,
    pub profiles: ProfileService,
}

impl AppServices {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        keys: JwtKeys,
    ) -> Self {
        Self {
            auth: AuthService::new(Arc::clone(&users), keys),
            posts: PostService::new(posts, Arc::clone(&users)),
            profiles: ProfileService::new(users),
        }
    }

    pub fn keys(&self) -> &JwtKeys {
        self.auth.keys()
    }

    /// Registers shared state and the `/api` routes.
    pub fn configure(self) -> impl FnOnce(&mut web::ServiceConfig) {
        move |cfg| {
            cfg.app_data(web::Data::new(self.auth))
                .app_data(web::Data::new(self.posts))
                .app_data(web::Data::new(self.profiles))
                .app_data(json_config())
                .service(
                    web::scope("/api")
                        .route("/health", web::get().to(health))
                        .service(handlers::auth::scope())
                        .service(handlers::post::scope())
                        .service(handlers::user::scope()),
                );
        }
    }
}

/// The application with its full middleware stack, shared by the server and the tests.
pub fn build_app(
    services: AppServices,
    cors: Cors,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(BearerAuthMiddleware::new(services.keys().clone()))
        .wrap(Logger::default())
        .wrap(TimingMiddleware)
        .wrap(RequestIdMiddleware)
        .wrap(
            DefaultHeaders::new()
                .add(("X-Content-Type-Options", "nosniff"))
                .add(("Referrer-Policy", "no-referrer"))
                .add(("Permissions-Policy", "geolocation=()"))
                .add(("Cross-Origin-Opener-Policy", "same-origin")),
        )
        .wrap(cors)
        .configure(services.configure())
}

pub async fn start_rest_server(config: AppConfig, services: AppServices) -> anyhow::Result<()> {
    let bind_address = (config.host.clone(), config.port);

    info!(
        host = %bind_address.0,
        port = bind_address.1,
        "HTTP server starting"
    );

    let cors_origins = config.cors_origins;
    HttpServer::new(move || build_app(services.clone(), build_cors(&cors_origins)))
        .bind(bind_address)?
        .run()
        .await
        .map_err(anyhow::Error::new)?;

    info!("HTTP server stopped");
    Ok(())
}

/// `*` allows any origin; anything else is an exact origin.
pub fn build_cors(origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::AUTHORIZATION,
        ])
        .supports_credentials()
        .max_age(3600);

    for origin in origins {
        cors = if origin == "*" {
            cors.allow_any_origin()
        } else {
            cors.allowed_origin(origin)
        };
    }

    cors
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}
