// SPDX-License-Identifier: Apache-2.0
use std::fs;
use std::path::Path;
use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use prospecta::firm::FirmConfig;
use prospecta::memory_store::MemoryProspectStore;
use prospecta::prospect::ProspectRegistry;
use prospecta::routes::{self, AppState, MSG_NOT_SUBSCRIBED, MSG_UNSUBSCRIBED};
use prospecta::templates::TemplateEngine;
use tempfile::TempDir;

const TEMPLATES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");

fn state(store: &MemoryProspectStore, templates_dir: &Path) -> web::Data<AppState> {
    web::Data::new(AppState {
        registry: ProspectRegistry::new(Arc::new(store.clone())),
        templates: TemplateEngine::from_dir(templates_dir),
        firm: FirmConfig::placeholder(),
    })
}

fn body_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn consent_form(email: &str, area: &str, consent: bool) -> Vec<(&'static str, String)> {
    let mut form = vec![("email", email.to_owned()), ("area", area.to_owned())];
    if consent {
        form.push(("consent", "on".to_owned()));
    }
    form
}

#[actix_web::test]
async fn test_index_redirects_to_consent_form() {
    let store = MemoryProspectStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state(&store, Path::new(TEMPLATES_DIR)))
            .configure(routes::configure),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/consentimento");
}

#[actix_web::test]
async fn test_consent_form_lists_areas() {
    let store = MemoryProspectStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state(&store, Path::new(TEMPLATES_DIR)))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/consentimento").to_request();
    let body = body_text(&test::call_and_read_body(&app, req).await);

    assert!(body.contains("Direito Civil"));
    assert!(body.contains("LGPD e Proteção de Dados"));
    assert!(!body.contains("class=\"notice"));
}

#[actix_web::test]
async fn test_consent_then_unsubscribe() {
    let store = MemoryProspectStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state(&store, Path::new(TEMPLATES_DIR)))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/consentimento")
        .set_form(consent_form("a@b.com", "Direito Civil", true))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "/consentimento?aviso=cadastrado"
    );
    let prospects = store.snapshot();
    assert_eq!(prospects.len(), 1);
    assert_eq!(prospects[0].email, "a@b.com");
    assert_eq!(prospects[0].area_interesse, "Direito Civil");
    assert!(prospects[0].ativo);

    let req = test::TestRequest::get()
        .uri("/unsubscribe?email=a@b.com")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(&test::read_body(resp).await), MSG_UNSUBSCRIBED);

    let prospects = store.snapshot();
    assert!(!prospects[0].ativo);
    assert!(prospects[0].data_descadastro.is_some());

    // Second unsubscribe answers like an unknown address
    let req = test::TestRequest::get()
        .uri("/unsubscribe?email=a@b.com")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(&test::read_body(resp).await), MSG_NOT_SUBSCRIBED);
}

#[actix_web::test]
async fn test_duplicate_consent_shows_info_notice() {
    let store = MemoryProspectStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state(&store, Path::new(TEMPLATES_DIR)))
            .configure(routes::configure),
    )
    .await;

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/consentimento")
            .set_form(consent_form("Maria@Exemplo.com", "Direito de Família", true))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::post()
        .uri("/consentimento")
        .set_form(consent_form("maria@exemplo.com", "Direito Civil", true))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "/consentimento?aviso=ja-cadastrado"
    );
    assert_eq!(store.snapshot().len(), 1);

    let req = test::TestRequest::get()
        .uri("/consentimento?aviso=ja-cadastrado")
        .to_request();
    let body = body_text(&test::call_and_read_body(&app, req).await);
    assert!(body.contains("notice-info"));
    assert!(body.contains("Este e-mail já está cadastrado."));
}

#[actix_web::test]
async fn test_invalid_email_rerenders_form() {
    let store = MemoryProspectStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state(&store, Path::new(TEMPLATES_DIR)))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/consentimento")
        .set_form(consent_form("sem-arroba.com", "Direito Civil", true))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(&test::read_body(resp).await);
    assert!(body.contains("notice-error"));
    assert!(body.contains("Por favor, informe um e-mail válido."));
    assert!(body.contains("Direito Tributário"));
    assert!(store.snapshot().is_empty());
}

#[actix_web::test]
async fn test_missing_consent_rerenders_form() {
    let store = MemoryProspectStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state(&store, Path::new(TEMPLATES_DIR)))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/consentimento")
        .set_form(consent_form("a@b.com", "Direito Civil", false))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(&test::read_body(resp).await);
    assert!(body.contains("É necessário aceitar o tratamento de dados."));
    assert!(store.snapshot().is_empty());
}

#[actix_web::test]
async fn test_unsubscribe_requires_email() {
    let store = MemoryProspectStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state(&store, Path::new(TEMPLATES_DIR)))
            .configure(routes::configure),
    )
    .await;

    for uri in ["/unsubscribe", "/unsubscribe?email=", "/unsubscribe?email=%20%20"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body_text(&test::read_body(resp).await), "E-mail não informado.");
    }
}

#[actix_web::test]
async fn test_unsubscribe_unknown_email() {
    let store = MemoryProspectStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state(&store, Path::new(TEMPLATES_DIR)))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/unsubscribe?email=nunca@visto.com")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(&test::read_body(resp).await), MSG_NOT_SUBSCRIBED);
}

#[actix_web::test]
async fn test_preview_newsletter_from_marketing_set() {
    let store = MemoryProspectStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state(&store, Path::new(TEMPLATES_DIR)))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/preview/newsletter").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(&test::read_body(resp).await);
    assert!(body.contains("Cancelar inscrição"));
    assert!(body.contains("unsubscribe?email=exemplo%40dominio.com"));
    assert!(body.contains("lgpd-2024"));
}

#[actix_web::test]
async fn test_preview_falls_back_to_client_set() {
    let store = MemoryProspectStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state(&store, Path::new(TEMPLATES_DIR)))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/preview/atualizacao_processo")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(&test::read_body(resp).await);
    assert!(body.contains("0001234-56.2023.8.19.0001"));
    assert!(body.contains("Carlos Souza"));
}

#[actix_web::test]
async fn test_preview_unknown_template() {
    let store = MemoryProspectStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state(&store, Path::new(TEMPLATES_DIR)))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/preview/inexistente").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_broken_marketing_template_is_not_masked() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("marketing")).unwrap();
    fs::create_dir_all(dir.path().join("cliente")).unwrap();
    fs::write(dir.path().join("marketing/aviso.html"), "{% if %}quebrado").unwrap();
    fs::write(dir.path().join("cliente/aviso.html"), "<p>{{ cliente.nome }}</p>").unwrap();

    let store = MemoryProspectStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state(&store, dir.path()))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/preview/aviso").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn test_health_check() {
    let store = MemoryProspectStore::new();
    let app = test::init_service(
        App::new()
            .app_data(state(&store, Path::new(TEMPLATES_DIR)))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
}
