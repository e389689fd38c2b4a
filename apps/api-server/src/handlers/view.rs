//! Tagged handler result: render a document or redirect to another page.

use actix_web::body::BoxBody;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, Responder};
use serde::Serialize;

/// What a page handler produced. Errors travel separately as `AppError`.
#[derive(Debug)]
pub enum View<T> {
    /// Render the document with HTTP 200. Form pages re-render through this
    /// arm on validation failure, carrying the submitted values and their
    /// field errors.
    Render(T),
    /// Send the client to another page (302, classic browser form flow).
    Redirect(String),
}

impl<T: Serialize> Responder for View<T> {
    type Body = BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        match self {
            View::Render(document) => HttpResponse::Ok().json(document),
            View::Redirect(location) => HttpResponse::Found()
                .insert_header((header::LOCATION, location))
                .finish(),
        }
    }
}
