// SPDX-License-Identifier: Apache-2.0
use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;
use tracing::{error, warn};

use crate::store::StoreError;

/// Errors a request handler can surface to the client.
///
/// Validation problems on the consent form are not errors here: the form is
/// re-rendered with a notice instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("template '{0}' not found in marketing or cliente")]
    TemplateNotFound(String),
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error("prospect store error: {0}")]
    Store(#[from] StoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::TemplateNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Template(_) | AppError::Store(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::TemplateNotFound(name) => {
                warn!(template = %name, "Preview template not found");
                format!("Template não encontrado: {name}")
            }
            other => {
                error!(error = %other, "Request failed");
                "Erro interno do servidor.".to_owned()
            }
        };

        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(body)
    }
}
