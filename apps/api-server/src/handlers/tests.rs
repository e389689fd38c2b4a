//! Handler-level tests, run over the in-memory repositories.

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{TimeDelta, Utc};
use uuid::Uuid;

use quill_core::domain::{Category, Comment, Post, User};
use quill_core::ports::{BaseRepository, CommentRepository, PasswordService, TokenService};
use quill_infra::{Argon2PasswordService, JwtConfig, JwtTokenService};
use quill_shared::dto::{
    AuthResponse, CategoryPageResponse, PageResponse, PostDetailResponse, PostFormResponse,
    PostResponse,
};

use super::configure_routes;
use crate::state::AppState;

fn token_service() -> Arc<dyn TokenService> {
    Arc::new(JwtTokenService::new(JwtConfig {
        secret: "handler-test-secret".to_string(),
        expiration_hours: 1,
        issuer: "quill-tests".to_string(),
    }))
}

fn password_service() -> Arc<dyn PasswordService> {
    Arc::new(Argon2PasswordService::new())
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .app_data(web::Data::new(token_service()))
                .app_data(web::Data::new(password_service()))
                .configure(configure_routes),
        )
        .await
    };
}

fn bearer(user: &User) -> (header::HeaderName, String) {
    let token = token_service()
        .generate_token(user.id, &user.username)
        .unwrap();
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

async fn seed_user(state: &AppState, username: &str) -> User {
    let user = User::new(
        username.to_string(),
        format!("{username}@example.com"),
        "unused-hash".to_string(),
    );
    state.users.save(user).await.unwrap()
}

async fn seed_category(state: &AppState, slug: &str, is_published: bool) -> Category {
    let category = Category {
        id: Uuid::new_v4(),
        title: slug.to_string(),
        description: String::new(),
        slug: slug.to_string(),
        is_published,
        created_at: Utc::now(),
    };
    state.categories.save(category).await.unwrap()
}

async fn seed_post(state: &AppState, author: &User, category: &Category) -> Post {
    let post = Post::new(
        author.id,
        category.id,
        None,
        "A post".to_string(),
        "Body".to_string(),
        Utc::now() - TimeDelta::hours(1),
    );
    state.posts.save(post).await.unwrap()
}

async fn seed_comment(state: &AppState, author: &User, post: &Post) -> Comment {
    let comment = Comment::new(author.id, post.id, "First!".to_string());
    state.comments.save(comment).await.unwrap()
}

fn location_of<B>(response: &actix_web::dev::ServiceResponse<B>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

#[actix_web::test]
async fn listing_shows_only_visible_posts() {
    let state = AppState::in_memory();
    let author = seed_user(&state, "ada").await;
    let published = seed_category(&state, "travel", true).await;
    let hidden = seed_category(&state, "drafts", false).await;

    let visible = seed_post(&state, &author, &published).await;

    let mut unpublished = Post::new(
        author.id,
        published.id,
        None,
        "Draft".to_string(),
        "b".to_string(),
        Utc::now() - TimeDelta::hours(1),
    );
    unpublished.is_published = false;
    state.posts.save(unpublished).await.unwrap();

    let scheduled = Post::new(
        author.id,
        published.id,
        None,
        "Scheduled".to_string(),
        "b".to_string(),
        Utc::now() + TimeDelta::hours(1),
    );
    state.posts.save(scheduled).await.unwrap();

    let in_hidden_category = Post::new(
        author.id,
        hidden.id,
        None,
        "Hidden".to_string(),
        "b".to_string(),
        Utc::now() - TimeDelta::hours(1),
    );
    state.posts.save(in_hidden_category).await.unwrap();

    let app = init_app!(state);

    let page: PageResponse<PostResponse> =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(page.total_items, 1);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, visible.id);
}

#[actix_web::test]
async fn hidden_post_detail_is_not_found_even_for_owner() {
    let state = AppState::in_memory();
    let author = seed_user(&state, "ada").await;
    let category = seed_category(&state, "travel", true).await;

    let mut draft = Post::new(
        author.id,
        category.id,
        None,
        "Draft".to_string(),
        "b".to_string(),
        Utc::now() - TimeDelta::hours(1),
    );
    draft.is_published = false;
    let draft = state.posts.save(draft).await.unwrap();

    let app = init_app!(state);

    let request = test::TestRequest::get()
        .uri(&format!("/posts/{}/", draft.id))
        .insert_header(bearer(&author))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn malformed_post_id_is_not_found() {
    let state = AppState::in_memory();
    let app = init_app!(state);

    let request = test::TestRequest::get().uri("/posts/not-a-uuid/").to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn non_owner_post_edit_redirects_without_mutating() {
    let state = AppState::in_memory();
    let ada = seed_user(&state, "ada").await;
    let bob = seed_user(&state, "bob").await;
    let category = seed_category(&state, "travel", true).await;
    let post = seed_post(&state, &ada, &category).await;

    let app = init_app!(state);

    let request = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .insert_header(bearer(&bob))
        .set_json(serde_json::json!({
            "title": "Hijacked",
            "body": "Hijacked",
            "pub_date": Utc::now(),
            "category_id": category.id,
        }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location_of(&response), format!("/posts/{}/", post.id));

    let unchanged = state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(unchanged.title, "A post");
}

#[actix_web::test]
async fn owner_post_edit_saves_and_redirects() {
    let state = AppState::in_memory();
    let ada = seed_user(&state, "ada").await;
    let category = seed_category(&state, "travel", true).await;
    let post = seed_post(&state, &ada, &category).await;

    let app = init_app!(state);

    let request = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .insert_header(bearer(&ada))
        .set_json(serde_json::json!({
            "title": "Updated title",
            "body": "Updated body",
            "pub_date": post.pub_date,
            "category_id": category.id,
        }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location_of(&response), format!("/posts/{}/", post.id));

    let updated = state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(updated.title, "Updated title");
}

#[actix_web::test]
async fn non_owner_comment_edit_is_forbidden() {
    let state = AppState::in_memory();
    let ada = seed_user(&state, "ada").await;
    let bob = seed_user(&state, "bob").await;
    let category = seed_category(&state, "travel", true).await;
    let post = seed_post(&state, &ada, &category).await;
    let comment = seed_comment(&state, &ada, &post).await;

    let app = init_app!(state);

    let request = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit_comment/{}/", post.id, comment.id))
        .insert_header(bearer(&bob))
        .set_json(serde_json::json!({ "body": "Defaced" }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let unchanged = state.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(unchanged.body, "First!");
}

#[actix_web::test]
async fn non_owner_comment_delete_is_forbidden() {
    let state = AppState::in_memory();
    let ada = seed_user(&state, "ada").await;
    let bob = seed_user(&state, "bob").await;
    let category = seed_category(&state, "travel", true).await;
    let post = seed_post(&state, &ada, &category).await;
    let comment = seed_comment(&state, &ada, &post).await;

    let app = init_app!(state);

    let request = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete_comment/{}/", post.id, comment.id))
        .insert_header(bearer(&bob))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(state.comments.find_by_id(comment.id).await.unwrap().is_some());
}

#[actix_web::test]
async fn owner_comment_delete_removes_and_redirects() {
    let state = AppState::in_memory();
    let ada = seed_user(&state, "ada").await;
    let category = seed_category(&state, "travel", true).await;
    let post = seed_post(&state, &ada, &category).await;
    let comment = seed_comment(&state, &ada, &post).await;

    let app = init_app!(state);

    let request = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete_comment/{}/", post.id, comment.id))
        .insert_header(bearer(&ada))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location_of(&response), format!("/posts/{}/", post.id));
    assert!(state.comments.find_by_id(comment.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn owner_comment_edit_redirects_using_path_post_id() {
    let state = AppState::in_memory();
    let ada = seed_user(&state, "ada").await;
    let category = seed_category(&state, "travel", true).await;
    let post = seed_post(&state, &ada, &category).await;
    let comment = seed_comment(&state, &ada, &post).await;

    let app = init_app!(state);

    let request = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit_comment/{}/", post.id, comment.id))
        .insert_header(bearer(&ada))
        .set_json(serde_json::json!({ "body": "Edited" }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location_of(&response), format!("/posts/{}/", post.id));

    let updated = state.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(updated.body, "Edited");
}

#[actix_web::test]
async fn authenticated_valid_comment_is_persisted_and_redirects() {
    let state = AppState::in_memory();
    let ada = seed_user(&state, "ada").await;
    let category = seed_category(&state, "travel", true).await;
    let post = seed_post(&state, &ada, &category).await;

    let app = init_app!(state);

    let request = test::TestRequest::post()
        .uri(&format!("/posts/{}/", post.id))
        .insert_header(bearer(&ada))
        .set_json(serde_json::json!({ "body": "Nice trip" }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location_of(&response), format!("/posts/{}/", post.id));

    let comments = state.comments.list_by_post(post.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].author_id, ada.id);
    assert_eq!(comments[0].post_id, post.id);
    assert_eq!(comments[0].body, "Nice trip");
}

#[actix_web::test]
async fn anonymous_valid_comment_is_silently_dropped() {
    let state = AppState::in_memory();
    let ada = seed_user(&state, "ada").await;
    let category = seed_category(&state, "travel", true).await;
    let post = seed_post(&state, &ada, &category).await;

    let app = init_app!(state);

    let request = test::TestRequest::post()
        .uri(&format!("/posts/{}/", post.id))
        .set_json(serde_json::json!({ "body": "Nice trip" }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);

    let document: PostDetailResponse = test::read_body_json(response).await;
    assert!(document.errors.is_empty());
    assert_eq!(document.form.body, "Nice trip");

    assert!(state.comments.list_by_post(post.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn invalid_comment_rerenders_with_errors() {
    let state = AppState::in_memory();
    let ada = seed_user(&state, "ada").await;
    let category = seed_category(&state, "travel", true).await;
    let post = seed_post(&state, &ada, &category).await;

    let app = init_app!(state);

    let request = test::TestRequest::post()
        .uri(&format!("/posts/{}/", post.id))
        .insert_header(bearer(&ada))
        .set_json(serde_json::json!({ "body": "   " }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);

    let document: PostDetailResponse = test::read_body_json(response).await;
    assert_eq!(document.errors.field("body").len(), 1);

    assert!(state.comments.list_by_post(post.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn pagination_clamps_to_valid_pages() {
    let state = AppState::in_memory();
    let author = seed_user(&state, "ada").await;
    let category = seed_category(&state, "travel", true).await;

    for i in 0..25 {
        let post = Post::new(
            author.id,
            category.id,
            None,
            format!("Post {i}"),
            "b".to_string(),
            Utc::now() - TimeDelta::hours(1),
        );
        state.posts.save(post).await.unwrap();
    }

    let app = init_app!(state);

    let first: PageResponse<PostResponse> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/?page=1").to_request(),
    )
    .await;
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.total_pages, 3);

    let third: PageResponse<PostResponse> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/?page=3").to_request(),
    )
    .await;
    assert_eq!(third.number, 3);
    assert_eq!(third.items.len(), 5);

    let past_the_end: PageResponse<PostResponse> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/?page=4").to_request(),
    )
    .await;
    assert_eq!(past_the_end.number, 3);
    assert_eq!(past_the_end.items.len(), 5);

    let non_numeric: PageResponse<PostResponse> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/?page=abc").to_request(),
    )
    .await;
    assert_eq!(non_numeric.number, 1);
    assert_eq!(non_numeric.items.len(), 10);
}

#[actix_web::test]
async fn unpublished_category_page_is_not_found() {
    let state = AppState::in_memory();
    seed_category(&state, "drafts", false).await;

    let app = init_app!(state);

    let request = test::TestRequest::get().uri("/category/drafts/").to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn category_page_lists_only_that_category() {
    let state = AppState::in_memory();
    let author = seed_user(&state, "ada").await;
    let travel = seed_category(&state, "travel", true).await;
    let cooking = seed_category(&state, "cooking", true).await;

    let in_travel = seed_post(&state, &author, &travel).await;
    seed_post(&state, &author, &cooking).await;

    let app = init_app!(state);

    let document: CategoryPageResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/category/travel/").to_request(),
    )
    .await;

    assert_eq!(document.category.slug, "travel");
    assert_eq!(document.page.items.len(), 1);
    assert_eq!(document.page.items[0].id, in_travel.id);
}

#[actix_web::test]
async fn compose_requires_authentication() {
    let state = AppState::in_memory();
    let app = init_app!(state);

    let request = test::TestRequest::get().uri("/posts/create/").to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn create_post_redirects_to_profile() {
    let state = AppState::in_memory();
    let ada = seed_user(&state, "ada").await;
    let category = seed_category(&state, "travel", true).await;

    let app = init_app!(state);

    let request = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header(bearer(&ada))
        .set_json(serde_json::json!({
            "title": "Fresh post",
            "body": "Body",
            "pub_date": Utc::now() - TimeDelta::hours(1),
            "category_id": category.id,
        }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location_of(&response), "/profile/ada/");

    let listing: PageResponse<PostResponse> =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(listing.total_items, 1);
    assert_eq!(listing.items[0].title, "Fresh post");
}

#[actix_web::test]
async fn invalid_post_form_rerenders_with_field_errors() {
    let state = AppState::in_memory();
    let ada = seed_user(&state, "ada").await;

    let app = init_app!(state);

    let request = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header(bearer(&ada))
        .set_json(serde_json::json!({ "title": "" }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);

    let document: PostFormResponse = test::read_body_json(response).await;
    assert_eq!(document.errors.field("title").len(), 1);
    assert_eq!(document.errors.field("body").len(), 1);
    assert_eq!(document.errors.field("pub_date").len(), 1);
    assert_eq!(document.errors.field("category_id").len(), 1);
}

#[actix_web::test]
async fn register_login_me_roundtrip() {
    let state = AppState::in_memory();
    let app = init_app!(state);

    let request = test::TestRequest::post()
        .uri("/accounts/register")
        .set_json(serde_json::json!({
            "username": "ada",
            "email": "ada@example.com",
            "password": "long-enough-password",
        }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let auth: AuthResponse = test::read_body_json(response).await;
    assert_eq!(auth.token_type, "Bearer");

    let request = test::TestRequest::post()
        .uri("/accounts/login")
        .set_json(serde_json::json!({
            "username": "ada",
            "password": "long-enough-password",
        }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = test::TestRequest::get()
        .uri("/accounts/me")
        .insert_header((
            header::AUTHORIZATION,
            format!("Bearer {}", auth.access_token),
        ))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_web::test]
async fn duplicate_username_conflicts() {
    let state = AppState::in_memory();
    seed_user(&state, "ada").await;

    let app = init_app!(state);

    let request = test::TestRequest::post()
        .uri("/accounts/register")
        .set_json(serde_json::json!({
            "username": "ada",
            "email": "second@example.com",
            "password": "long-enough-password",
        }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}
