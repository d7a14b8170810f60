use crate::application::post_service::PostService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{CommentRequest, CreatePostRequest, MessageResponse};
use crate::presentation::utils::{AuthenticatedUser, request_id};
use actix_web::{HttpRequest, HttpResponse, Scope, delete, get, post, put, web};
use tracing::info;
use uuid::Uuid;

pub fn scope() -> Scope {
    web::scope("/posts")
        .service(get_posts)
        .service(create_post)
        .service(toggle_like)
        .service(add_comment)
        .service(delete_comment)
        .service(get_post)
        .service(delete_post)
}

#[get("")]
async fn get_posts(
    req: HttpRequest,
    posts: web::Data<PostService>,
) -> Result<HttpResponse, DomainError> {
    let posts = posts.get_posts().await?;

    info!(
        request_id = %request_id(&req),
        count = posts.len(),
        "posts retrieved"
    );

    Ok(HttpResponse::Ok().json(posts))
}

#[post("")]
async fn create_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    payload: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, DomainError> {
    let post = posts
        .create_post(user.id, payload.into_inner().content)
        .await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        post_id = %post.id,
        "post created"
    );

    Ok(HttpResponse::Ok().json(post))
}

#[get("/{id}")]
async fn get_post(
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post = posts.get_post(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

#[delete("/{id}")]
async fn delete_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    posts.delete_post(user.id, post_id).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        post_id = %post_id,
        "post deleted"
    );

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "post removed",
    }))
}

#[put("/like/{id}")]
async fn toggle_like(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let likes = posts.toggle_like(user.id, post_id).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        post_id = %post_id,
        liked = likes.contains(&user.id),
        "like toggled"
    );

    Ok(HttpResponse::Ok().json(likes))
}

#[post("/comment/{id}")]
async fn add_comment(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
    payload: web::Json<CommentRequest>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let comments = posts
        .add_comment(user.id, post_id, payload.into_inner().text)
        .await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        post_id = %post_id,
        "comment added"
    );

    Ok(HttpResponse::Ok().json(comments))
}

#[delete("/comment/{id}/{comment_id}")]
async fn delete_comment(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, DomainError> {
    let (post_id, comment_id) = path.into_inner();
    let comments = posts.delete_comment(user.id, post_id, comment_id).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        post_id = %post_id,
        comment_id = %comment_id,
        "comment deleted"
    );

    Ok(HttpResponse::Ok().json(comments))
}
