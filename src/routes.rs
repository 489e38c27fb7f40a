// SPDX-License-Identifier: Apache-2.0
use actix_web::http::header::{self, ContentType};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};

use crate::error::AppError;
use crate::firm::FirmConfig;
use crate::preview::{self, EXAMPLE_RECIPIENT};
use crate::prospect::{AREAS, Consent, ProspectRegistry, RegistrationOutcome, UnsubscribeOutcome};
use crate::templates::TemplateEngine;

pub const CONSENT_PATH: &str = "/consentimento";
const FORM_TEMPLATE: &str = "consentimento/formulario.html";

/// Values carried in `?aviso=` after a successful submission
pub const AVISO_REGISTERED: &str = "cadastrado";
pub const AVISO_ALREADY_REGISTERED: &str = "ja-cadastrado";

pub const MSG_REGISTERED: &str = "Obrigado! Seu cadastro foi realizado com sucesso.";
pub const MSG_ALREADY_REGISTERED: &str = "Este e-mail já está cadastrado.";
pub const MSG_EMAIL_MISSING: &str = "E-mail não informado.";
pub const MSG_UNSUBSCRIBED: &str = "<h2>Você foi removido da nossa lista com sucesso.</h2>";
pub const MSG_NOT_SUBSCRIBED: &str = "<h2>E-mail não encontrado ou já descadastrado.</h2>";

/// Shared state injected into every handler
pub struct AppState {
    pub registry: ProspectRegistry,
    pub templates: TemplateEngine,
    pub firm: FirmConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// One-off message shown above the consent form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    /// Maps a redirect's `aviso` value back to its message; unknown values show nothing
    pub fn from_aviso(aviso: &str) -> Option<Self> {
        match aviso {
            AVISO_REGISTERED => Some(Self::new(NoticeLevel::Success, MSG_REGISTERED)),
            AVISO_ALREADY_REGISTERED => Some(Self::new(NoticeLevel::Info, MSG_ALREADY_REGISTERED)),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConsentForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub area: String,
    pub consent: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NoticeQuery {
    pub aviso: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UnsubscribeQuery {
    #[serde(default)]
    pub email: String,
}

/// Registers every route on `cfg`; expects `web::Data<AppState>` on the app
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/health").route(web::get().to(health_check)))
        .service(
            web::resource(CONSENT_PATH)
                .route(web::get().to(consent_form))
                .route(web::post().to(submit_consent)),
        )
        .service(
            web::resource("/unsubscribe")
                .name("unsubscribe")
                .route(web::get().to(unsubscribe)),
        )
        .service(web::resource("/preview/{template_name}").route(web::get().to(preview)));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({"status": "ok"}))
}

async fn index() -> impl Responder {
    HttpResponse::Found()
        .append_header((header::LOCATION, CONSENT_PATH))
        .finish()
}

fn render_form(
    state: &AppState,
    notice: Option<Notice>,
    email: &str,
    area: &str,
) -> Result<HttpResponse, AppError> {
    let html = state.templates.render(
        FORM_TEMPLATE,
        json!({
            "areas": AREAS,
            "notice": notice,
            "email": email,
            "area": area,
            "escritorio": state.firm.escritorio,
        }),
    )?;
    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(html))
}

/// GET /consentimento
async fn consent_form(
    state: web::Data<AppState>,
    query: web::Query<NoticeQuery>,
) -> Result<HttpResponse, AppError> {
    let notice = query.aviso.as_deref().and_then(Notice::from_aviso);
    render_form(&state, notice, "", "")
}

/// POST /consentimento
#[instrument(skip(state, form), fields(email = %form.email, area = %form.area))]
async fn submit_consent(
    state: web::Data<AppState>,
    form: web::Form<ConsentForm>,
) -> Result<HttpResponse, AppError> {
    let consented = form.consent.as_deref() == Some("on");

    let consent = match Consent::validate(&form.email, &form.area, consented) {
        Ok(consent) => consent,
        Err(e) => {
            info!(reason = ?e, "Consent form rejected");
            let notice = Notice::new(NoticeLevel::Error, e.to_string());
            return render_form(&state, Some(notice), form.email.trim(), &form.area);
        }
    };

    let aviso = match state.registry.register(&consent)? {
        RegistrationOutcome::Registered => AVISO_REGISTERED,
        RegistrationOutcome::AlreadyRegistered => AVISO_ALREADY_REGISTERED,
    };

    Ok(HttpResponse::SeeOther()
        .append_header((header::LOCATION, format!("{CONSENT_PATH}?aviso={aviso}")))
        .finish())
}

/// GET /unsubscribe?email=
///
/// Unknown and already inactive emails get the same answer.
#[instrument(skip(state, query), fields(email = %query.email))]
async fn unsubscribe(
    state: web::Data<AppState>,
    query: web::Query<UnsubscribeQuery>,
) -> Result<HttpResponse, AppError> {
    if query.email.trim().is_empty() {
        return Err(AppError::BadRequest(MSG_EMAIL_MISSING.to_owned()));
    }

    let body = match state.registry.unsubscribe(&query.email)? {
        UnsubscribeOutcome::Removed => MSG_UNSUBSCRIBED,
        UnsubscribeOutcome::NotFound | UnsubscribeOutcome::AlreadyInactive => MSG_NOT_SUBSCRIBED,
    };

    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(body))
}

/// GET /preview/{template_name}
#[instrument(skip(state, req))]
async fn preview(
    state: web::Data<AppState>,
    req: HttpRequest,
    template_name: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let name = template_name.into_inner();

    let mut unsubscribe_url = req
        .url_for_static("unsubscribe")
        .map_err(|e| AppError::Internal(format!("cannot build unsubscribe link: {e}")))?;
    unsubscribe_url
        .query_pairs_mut()
        .append_pair("email", EXAMPLE_RECIPIENT);

    let context = preview::build_context(
        &state.firm,
        &name,
        unsubscribe_url.as_str(),
        Local::now().naive_local(),
    );
    let html = preview::render(&state.templates, &name, &context)?;

    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(html))
}
