use crate::application::post_service::PostService;
use crate::application::profile_service::ProfileService;
use crate::domain::error::DomainError;
use crate::domain::user::ProfileUpdate;
use crate::presentation::dto::UpdateProfileRequest;
use crate::presentation::utils::{AuthenticatedUser, request_id};
use actix_web::{HttpRequest, HttpResponse, Scope, get, put, web};
use tracing::info;
use uuid::Uuid;

pub fn scope() -> Scope {
    web::scope("/users")
        .service(get_profile)
        .service(update_profile)
        .service(get_user_posts)
}

#[get("/profile/{id}")]
async fn get_profile(
    profiles: web::Data<ProfileService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let user = profiles.get_profile(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[put("/profile")]
async fn update_profile(
    req: HttpRequest,
    user: AuthenticatedUser,
    profiles: web::Data<ProfileService>,
    payload: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, DomainError> {
    let UpdateProfileRequest { name, bio } = payload.into_inner();
    let updated = profiles
        .update_profile(user.id, ProfileUpdate { name, bio })
        .await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        "profile updated"
    );

    Ok(HttpResponse::Ok().json(updated))
}

#[get("/{id}/posts")]
async fn get_user_posts(
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let posts = posts.get_posts_by_author(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts))
}
