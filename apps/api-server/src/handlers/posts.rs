//! Post pages: listings, detail, create and edit.

use actix_web::web;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use quill_core::access;
use quill_core::domain::{Category, Comment, Post, User};
use quill_core::pagination::{PAGE_SIZE, Page, PageRequest};
use quill_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, PostFilter, PostRepository,
    UserRepository,
};
use quill_shared::dto::{
    CategoryPageResponse, CategoryResponse, CommentResponse, LocationResponse, PageResponse,
    PostDetailResponse, PostFormResponse, PostResponse, ProfilePageResponse, UserResponse,
};
use quill_shared::forms::{CommentForm, FormErrors, PostForm};

use super::view::View;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Query string for paginated listings.
#[derive(Debug, serde::Deserialize)]
pub(super) struct PageQuery {
    pub page: Option<String>,
}

/// Treat a malformed id as a lookup miss: the URL names nothing we have.
pub(super) fn parse_id(raw: &str, entity: &'static str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("{entity} not found")))
}

pub(super) fn post_url(post_id: Uuid) -> String {
    format!("/posts/{post_id}/")
}

/// Fetch a post and its category, failing NotFound unless the post passes
/// the visibility rule. Non-visible posts are indistinguishable from absent
/// ones.
pub(super) async fn find_visible_post(
    state: &AppState,
    post_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<(Post, Category)> {
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("post not found".to_string()))?;

    let category = state
        .categories
        .find_by_id(post.category_id)
        .await?
        .ok_or_else(|| AppError::NotFound("post not found".to_string()))?;

    if !access::post_is_visible(&post, &category, now) {
        return Err(AppError::NotFound("post not found".to_string()));
    }

    Ok((post, category))
}

pub(super) fn post_response(post: &Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title.clone(),
        body: post.body.clone(),
        pub_date: post.pub_date,
        author_id: post.author_id,
        category_id: post.category_id,
        location_id: post.location_id,
        created_at: post.created_at,
    }
}

pub(super) fn comment_response(comment: &Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        body: comment.body.clone(),
        author_id: comment.author_id,
        post_id: comment.post_id,
        created_at: comment.created_at,
    }
}

fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        created_at: user.created_at,
    }
}

fn category_response(category: &Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        title: category.title.clone(),
        description: category.description.clone(),
        slug: category.slug.clone(),
    }
}

fn page_response(page: Page<Post>) -> PageResponse<PostResponse> {
    PageResponse {
        has_previous: page.has_previous(),
        has_next: page.has_next(),
        items: page.items.iter().map(post_response).collect(),
        number: page.number,
        size: page.size,
        total_items: page.total_items,
        total_pages: page.total_pages,
    }
}

/// Count, clamp the requested page, then fetch the slice.
async fn page_of_posts(
    state: &AppState,
    filter: &PostFilter,
    raw_page: Option<&str>,
) -> AppResult<PageResponse<PostResponse>> {
    let now = Utc::now();
    let total = state.posts.count_visible(filter, now).await?;
    let request = PageRequest::clamped(raw_page, total, PAGE_SIZE);
    let items = state
        .posts
        .list_visible(filter, now, request.offset(), request.size)
        .await?;

    Ok(page_response(Page::new(items, request, total)))
}

/// GET / - paginated public post listing.
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<View<PageResponse<PostResponse>>> {
    let page = page_of_posts(&state, &PostFilter::default(), query.page.as_deref()).await?;
    Ok(View::Render(page))
}

/// GET /category/{category_slug}/ - posts of one published category.
pub async fn category(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<View<CategoryPageResponse>> {
    let slug = path.into_inner();

    let category = state
        .categories
        .find_published_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("category not found".to_string()))?;

    let filter = PostFilter::in_category(category.slug.clone());
    let page = page_of_posts(&state, &filter, query.page.as_deref()).await?;

    Ok(View::Render(CategoryPageResponse {
        category: category_response(&category),
        page,
    }))
}

/// GET /profile/{username}/ - an author's visible posts.
pub async fn profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<View<ProfilePageResponse>> {
    let username = path.into_inner();

    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    let page = page_of_posts(&state, &PostFilter::by_author(user.id), query.page.as_deref())
        .await?;

    Ok(View::Render(ProfilePageResponse {
        profile: user_response(&user),
        page,
    }))
}

/// Assemble the detail document: resolve the author and optional location,
/// load comments oldest first, carry the comment form state to render.
pub(super) async fn detail_document(
    state: &AppState,
    post: Post,
    category: Category,
    form: CommentForm,
    errors: FormErrors,
) -> AppResult<PostDetailResponse> {
    let author = state
        .users
        .find_by_id(post.author_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    let location = match post.location_id {
        Some(location_id) => state.locations.find_by_id(location_id).await?,
        None => None,
    };

    let comments = state.comments.list_by_post(post.id).await?;

    Ok(PostDetailResponse {
        post: post_response(&post),
        author: user_response(&author),
        category: category_response(&category),
        location: location.map(|location| LocationResponse {
            id: location.id,
            name: location.name,
        }),
        comments: comments.iter().map(comment_response).collect(),
        form,
        errors,
    })
}

/// GET /posts/{post_id}/ - post detail with a blank comment form.
pub async fn detail(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<View<PostDetailResponse>> {
    let post_id = parse_id(&path.into_inner(), "post")?;
    let (post, category) = find_visible_post(&state, post_id, Utc::now()).await?;

    let document = detail_document(
        &state,
        post,
        category,
        CommentForm::default(),
        FormErrors::default(),
    )
    .await?;

    Ok(View::Render(document))
}

/// Reference fields must name existing rows; a miss is a field error on the
/// form, not a lookup failure of the page itself.
async fn check_references(
    state: &AppState,
    form: &PostForm,
    errors: &mut FormErrors,
) -> AppResult<()> {
    if let Some(category_id) = form.category_id {
        if state.categories.find_by_id(category_id).await?.is_none() {
            errors.add("category_id", "Select a valid choice.");
        }
    }

    if let Some(location_id) = form.location_id {
        if state.locations.find_by_id(location_id).await?.is_none() {
            errors.add("location_id", "Select a valid choice.");
        }
    }

    Ok(())
}

/// GET /posts/create/ - blank post form, authenticated.
pub async fn compose(_identity: Identity) -> AppResult<View<PostFormResponse>> {
    Ok(View::Render(PostFormResponse {
        form: PostForm::default(),
        errors: FormErrors::default(),
    }))
}

/// POST /posts/create/ - create a post owned by the requester.
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostForm>,
) -> AppResult<View<PostFormResponse>> {
    let form = body.into_inner();
    let mut errors = form.validate();
    check_references(&state, &form, &mut errors).await?;

    match (form.pub_date, form.category_id) {
        (Some(pub_date), Some(category_id)) if errors.is_empty() => {
            let post = Post::new(
                identity.user_id,
                category_id,
                form.location_id,
                form.title.trim().to_string(),
                form.body.trim().to_string(),
                pub_date,
            );
            state.posts.save(post).await?;

            Ok(View::Redirect(format!("/profile/{}/", identity.username)))
        }
        _ => Ok(View::Render(PostFormResponse { form, errors })),
    }
}

fn prefilled(post: &Post) -> PostForm {
    PostForm {
        title: post.title.clone(),
        body: post.body.clone(),
        pub_date: Some(post.pub_date),
        category_id: Some(post.category_id),
        location_id: post.location_id,
    }
}

/// GET /posts/{post_id}/edit/ - edit form, owner only.
///
/// Lookup is by id alone; the edit page is not visibility-filtered. A
/// non-owner is silently sent to the public detail page instead of
/// receiving an error.
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<View<PostFormResponse>> {
    let post_id = parse_id(&path.into_inner(), "post")?;

    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("post not found".to_string()))?;

    if !access::is_owner(Some(identity.user_id), &post) {
        return Ok(View::Redirect(post_url(post.id)));
    }

    Ok(View::Render(PostFormResponse {
        form: prefilled(&post),
        errors: FormErrors::default(),
    }))
}

/// POST /posts/{post_id}/edit/ - apply an edit, owner only.
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<PostForm>,
) -> AppResult<View<PostFormResponse>> {
    let post_id = parse_id(&path.into_inner(), "post")?;

    let mut post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("post not found".to_string()))?;

    if !access::is_owner(Some(identity.user_id), &post) {
        return Ok(View::Redirect(post_url(post.id)));
    }

    let form = body.into_inner();
    let mut errors = form.validate();
    check_references(&state, &form, &mut errors).await?;

    match (form.pub_date, form.category_id) {
        (Some(pub_date), Some(category_id)) if errors.is_empty() => {
            post.title = form.title.trim().to_string();
            post.body = form.body.trim().to_string();
            post.pub_date = pub_date;
            post.category_id = category_id;
            post.location_id = form.location_id;
            post.updated_at = Utc::now();
            state.posts.save(post).await?;

            Ok(View::Redirect(post_url(post_id)))
        }
        _ => Ok(View::Render(PostFormResponse { form, errors })),
    }
}
