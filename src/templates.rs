// SPDX-License-Identifier: Apache-2.0
use std::path::Path;

use chrono::NaiveDateTime;
use minijinja::{Environment, Error, ErrorKind, path_loader};
use serde::Serialize;
use tracing::{debug, instrument};

/// Jinja templates loaded lazily from a directory on disk
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(dir.as_ref().to_path_buf()));
        env.add_filter("data_br", data_br);
        env.add_filter("data_hora_br", data_hora_br);
        Self { env }
    }

    /// True when `name` loads. Syntax errors in an existing template are returned, not hidden.
    pub fn has_template(&self, name: &str) -> Result<bool, Error> {
        match self.env.get_template(name) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::TemplateNotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, ctx))]
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, Error> {
        let html = self.env.get_template(name)?.render(ctx)?;
        debug!(bytes = html.len(), "Rendered template");
        Ok(html)
    }
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, Error> {
    value.parse::<NaiveDateTime>().map_err(|e| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("not an ISO timestamp: {value} ({e})"),
        )
    })
}

/// `2024-03-01T10:00:00` -> `01/03/2024`
fn data_br(value: &str) -> Result<String, Error> {
    Ok(parse_timestamp(value)?.format("%d/%m/%Y").to_string())
}

/// `2024-03-01T10:00:00` -> `01/03/2024 10:00`
fn data_hora_br(value: &str) -> Result<String, Error> {
    Ok(parse_timestamp(value)?.format("%d/%m/%Y %H:%M").to_string())
}
