// SPDX-License-Identifier: Apache-2.0
use chrono::NaiveDateTime;
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::firm::FirmConfig;
use crate::templates::TemplateEngine;

/// Template sets, in lookup order
pub const MARKETING_SET: &str = "marketing";
pub const CLIENT_SET: &str = "cliente";

/// Recipient used for the example unsubscribe link
pub const EXAMPLE_RECIPIENT: &str = "exemplo@dominio.com";

/// Preview names with extra example fields
pub const NEWSLETTER: &str = "newsletter";

/// Builds the example context for a preview.
///
/// Every preview gets the firm identity plus a fixed example client and
/// lawsuit. The newsletter is addressed to a prospect and also carries the
/// fields its body and unsubscribe footer need.
pub fn build_context(
    firm: &FirmConfig,
    template_name: &str,
    unsubscribe_url: &str,
    now: NaiveDateTime,
) -> Value {
    let timestamp = now.format("%Y-%m-%dT%H:%M:%S").to_string();
    let mut context = json!({
        "advogado": firm.advogado,
        "escritorio": firm.escritorio,
        "now": timestamp,
        "cliente": {"nome": "Carlos Souza"},
        "processo": {
            "numero": "0001234-56.2023.8.19.0001",
            "ultima_atualizacao": "Decisão publicada no DJE.",
        },
        "data_atualizacao": timestamp,
        "destinatario": {"tipo": "cliente"},
    });

    if template_name == NEWSLETTER {
        let site = firm.escritorio.site.trim_end_matches('/');
        let extra = json!({
            "area_interesse": "LGPD",
            "lei": {"numero": "14.432/2022"},
            "artigo": {"url": format!("{site}/artigos/lgpd-2024")},
            "destinatario": {"tipo": "prospect"},
            "unsubscribe_url": unsubscribe_url,
        });
        if let (Value::Object(base), Value::Object(extra)) = (&mut context, extra) {
            base.extend(extra);
        }
    }

    context
}

/// Template names are a single path segment of letters, digits, `_` and `-`
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Finds which set holds `name`: marketing first, then client.
///
/// Only a missing template moves the lookup on. A template that exists but
/// fails to parse stops here with its own error.
pub fn resolve(engine: &TemplateEngine, name: &str) -> Result<String, AppError> {
    if !is_valid_name(name) {
        return Err(AppError::TemplateNotFound(name.to_owned()));
    }

    for set in [MARKETING_SET, CLIENT_SET] {
        let path = format!("{set}/{name}.html");
        if engine.has_template(&path)? {
            return Ok(path);
        }
    }

    Err(AppError::TemplateNotFound(name.to_owned()))
}

/// Resolves and renders a preview
#[instrument(skip(engine, context))]
pub fn render(engine: &TemplateEngine, name: &str, context: &Value) -> Result<String, AppError> {
    let path = resolve(engine, name)?;
    info!(template = %path, "Rendering preview");
    Ok(engine.render(&path, context)?)
}
