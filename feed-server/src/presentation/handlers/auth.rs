use crate::application::auth_service::AuthService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::presentation::utils::{AuthenticatedUser, request_id};
use actix_web::{HttpRequest, HttpResponse, Scope, get, post, web};
use tracing::info;

pub fn scope() -> Scope {
    web::scope("/auth")
        .service(register)
        .service(login)
        .service(me)
}

#[post("/register")]
async fn register(
    req: HttpRequest,
    service: web::Data<AuthService>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, DomainError> {
    let RegisterRequest {
        name,
        email,
        password,
        bio,
    } = payload.into_inner();
    let session = service.register(name, email, password, bio).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %session.user.id,
        "user registered"
    );

    Ok(HttpResponse::Ok().json(AuthResponse {
        token: session.token,
        user: session.user,
    }))
}

#[post("/login")]
async fn login(
    req: HttpRequest,
    service: web::Data<AuthService>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, DomainError> {
    if payload.email.trim().is_empty() {
        return Err(DomainError::validation("email", "email is required"));
    }
    if payload.password.is_empty() {
        return Err(DomainError::validation("password", "password is required"));
    }

    let session = service.login(&payload.email, &payload.password).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %session.user.id,
        "user logged in"
    );

    Ok(HttpResponse::Ok().json(AuthResponse {
        token: session.token,
        user: session.user,
    }))
}

#[get("/me")]
async fn me(
    user: AuthenticatedUser,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, DomainError> {
    let user = service.get_user(user.id).await?;
    Ok(HttpResponse::Ok().json(user))
}
