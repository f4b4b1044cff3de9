use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use serde::Serialize;

use crate::forms::users::UserFilterForm;
use crate::models::config::ServerConfig;
use crate::repository::memory::UserDirectory;
use crate::services::ServiceError;
use crate::services::users::{apply_users_filters, clear_users_filters, load_users_page};

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Query string the client should navigate to.
#[derive(Serialize)]
struct QueryBody {
    query: String,
}

fn error_response(err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::Validation(_) | ServiceError::Form(_) | ServiceError::TypeConstraint(_) => {
            HttpResponse::BadRequest().json(ErrorBody {
                error: err.to_string(),
            })
        }
        ServiceError::Fetch(err) => {
            log::error!("Failed to list users: {err}");
            HttpResponse::BadGateway().json(ErrorBody {
                error: err.user_message(),
            })
        }
    }
}

#[get("/v1/users")]
pub async fn list_users(
    req: HttpRequest,
    directory: web::Data<UserDirectory>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    match load_users_page(directory.get_ref(), req.query_string(), server_config.list) {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(err) => error_response(err),
    }
}

#[post("/v1/users/filters")]
pub async fn filter_users(
    req: HttpRequest,
    body: web::Bytes,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let form: UserFilterForm = match serde_html_form::from_bytes(&body) {
        Ok(form) => form,
        Err(err) => {
            log::error!("Failed to parse filter form: {err}");
            return HttpResponse::BadRequest().json(ErrorBody {
                error: format!("Form error: {err}"),
            });
        }
    };

    match apply_users_filters(req.query_string(), &form, server_config.list) {
        Ok(query) => HttpResponse::Ok().json(QueryBody { query }),
        Err(err) => error_response(err),
    }
}

#[post("/v1/users/filters/clear")]
pub async fn clear_user_filters(
    req: HttpRequest,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    match clear_users_filters(req.query_string(), server_config.list) {
        Ok(query) => HttpResponse::Ok().json(QueryBody { query }),
        Err(err) => error_response(err),
    }
}
