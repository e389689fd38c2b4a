//! Comment handlers: submission under a post, owner-only edit and delete.

use actix_web::web;
use chrono::Utc;

use quill_core::access;
use quill_core::domain::Comment;
use quill_core::ports::BaseRepository;
use quill_shared::dto::{CommentDeleteResponse, CommentFormResponse, PostDetailResponse};
use quill_shared::forms::{CommentForm, FormErrors};

use super::posts::{comment_response, detail_document, find_visible_post, parse_id, post_url};
use super::view::View;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /posts/{post_id}/ - submit a comment on the detail page.
///
/// Persist only when the form is valid AND the requester is authenticated;
/// an anonymous but valid submission falls through to the render below with
/// nothing persisted and no errors reported.
pub async fn submit(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
    body: web::Json<CommentForm>,
) -> AppResult<View<PostDetailResponse>> {
    let post_id = parse_id(&path.into_inner(), "post")?;
    let (post, category) = find_visible_post(&state, post_id, Utc::now()).await?;

    let form = body.into_inner();
    let errors = form.validate();

    if errors.is_empty() {
        if let OptionalIdentity(Some(user)) = &identity {
            let comment = Comment::new(user.user_id, post.id, form.body.trim().to_string());
            state.comments.save(comment).await?;

            return Ok(View::Redirect(post_url(post.id)));
        }
    }

    let document = detail_document(&state, post, category, form, errors).await?;
    Ok(View::Render(document))
}

/// Look up a comment and require ownership. Non-owners get a hard 403 here,
/// unlike the silent redirect posts use.
async fn owned_comment(
    state: &AppState,
    identity: &Identity,
    raw_id: &str,
) -> AppResult<Comment> {
    let comment_id = parse_id(raw_id, "comment")?;

    let comment = state
        .comments
        .find_by_id(comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("comment not found".to_string()))?;

    if !access::is_owner(Some(identity.user_id), &comment) {
        return Err(AppError::Forbidden(
            "You are not allowed to modify this comment.".to_string(),
        ));
    }

    Ok(comment)
}

/// GET /posts/{post_id}/edit_comment/{comment_id}/ - prefilled edit form.
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(String, String)>,
) -> AppResult<View<CommentFormResponse>> {
    let (_, raw_comment_id) = path.into_inner();
    let comment = owned_comment(&state, &identity, &raw_comment_id).await?;

    Ok(View::Render(CommentFormResponse {
        form: CommentForm { body: comment.body },
        errors: FormErrors::default(),
    }))
}

/// POST /posts/{post_id}/edit_comment/{comment_id}/ - apply the edit.
///
/// The comment is found by its own id; the redirect target is built from the
/// path's post id.
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(String, String)>,
    body: web::Json<CommentForm>,
) -> AppResult<View<CommentFormResponse>> {
    let (raw_post_id, raw_comment_id) = path.into_inner();
    let post_id = parse_id(&raw_post_id, "post")?;
    let mut comment = owned_comment(&state, &identity, &raw_comment_id).await?;

    let form = body.into_inner();
    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(View::Render(CommentFormResponse { form, errors }));
    }

    comment.body = form.body.trim().to_string();
    state.comments.save(comment).await?;

    Ok(View::Redirect(post_url(post_id)))
}

/// GET /posts/{post_id}/delete_comment/{comment_id}/ - confirmation page.
pub async fn confirm_delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(String, String)>,
) -> AppResult<View<CommentDeleteResponse>> {
    let (_, raw_comment_id) = path.into_inner();
    let comment = owned_comment(&state, &identity, &raw_comment_id).await?;

    Ok(View::Render(CommentDeleteResponse {
        comment: comment_response(&comment),
    }))
}

/// POST /posts/{post_id}/delete_comment/{comment_id}/ - delete and redirect.
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(String, String)>,
) -> AppResult<View<CommentDeleteResponse>> {
    let (raw_post_id, raw_comment_id) = path.into_inner();
    let post_id = parse_id(&raw_post_id, "post")?;
    let comment = owned_comment(&state, &identity, &raw_comment_id).await?;

    state.comments.delete(comment.id).await?;

    Ok(View::Redirect(post_url(post_id)))
}
