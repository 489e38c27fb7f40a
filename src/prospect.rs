// SPDX-License-Identifier: Apache-2.0
use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::store::{ProspectStore, StoreError};

/// Practice areas offered on the consent form, in display order
pub const AREAS: [&str; 6] = [
    "Direito Civil",
    "Direito Empresarial",
    "Direito do Trabalho",
    "Direito de Família",
    "Direito Tributário",
    "LGPD e Proteção de Dados",
];

/// A prospect's email, trimmed and lower-cased.
///
/// The check is deliberately loose: non-empty and containing `@`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProspectEmail(String);

impl ProspectEmail {
    /// Normalises without validating
    pub fn normalize(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let email = Self::normalize(raw);
        if email.is_empty() || !email.contains('@') {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for ProspectEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProspectEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reasons a consent submission is rejected before touching the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Por favor, informe um e-mail válido.")]
    InvalidEmail,
    #[error("É necessário aceitar o tratamento de dados.")]
    ConsentMissing,
}

/// One stored prospect; field names match the on-disk JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prospect {
    pub email: String,
    pub area_interesse: String,
    pub data_consentimento: NaiveDateTime,
    pub ativo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_descadastro: Option<NaiveDateTime>,
}

impl Prospect {
    pub fn new(email: &ProspectEmail, area: &str, consented_at: NaiveDateTime) -> Self {
        Self {
            email: email.as_ref().to_owned(),
            area_interesse: area.to_owned(),
            data_consentimento: consented_at,
            ativo: true,
            data_descadastro: None,
        }
    }
}

/// A validated consent form submission
#[derive(Debug, Clone)]
pub struct Consent {
    pub email: ProspectEmail,
    pub area: String,
}

impl Consent {
    /// Checks the email first, then the consent box
    pub fn validate(email: &str, area: &str, consented: bool) -> Result<Self, ValidationError> {
        let email = ProspectEmail::parse(email)?;
        if !consented {
            return Err(ValidationError::ConsentMissing);
        }
        Ok(Self {
            email,
            area: area.to_owned(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered,
    AlreadyRegistered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsubscribeOutcome {
    Removed,
    NotFound,
    AlreadyInactive,
}

/// Registration and unsubscribe over a `ProspectStore`.
///
/// Every load-modify-save runs under one writer lock, so concurrent requests
/// in this process never lose each other's updates. Separate processes sharing
/// the same file still can.
#[derive(Clone)]
pub struct ProspectRegistry {
    store: Arc<dyn ProspectStore>,
    writer: Arc<Mutex<()>>,
}

impl ProspectRegistry {
    pub fn new(store: Arc<dyn ProspectStore>) -> Self {
        Self {
            store,
            writer: Arc::new(Mutex::new(())),
        }
    }

    pub fn register(&self, consent: &Consent) -> Result<RegistrationOutcome, StoreError> {
        self.register_at(consent, Local::now().naive_local())
    }

    /// Appends a record unless one with the same email already exists, active or not
    #[instrument(skip(self, consent), fields(email = %consent.email, area = %consent.area))]
    pub fn register_at(
        &self,
        consent: &Consent,
        now: NaiveDateTime,
    ) -> Result<RegistrationOutcome, StoreError> {
        let _guard = self.writer.lock().map_err(|_| StoreError::Poisoned)?;

        let mut prospects = self.store.load()?;
        if prospects.iter().any(|p| p.email == consent.email.as_ref()) {
            info!("Email already registered");
            return Ok(RegistrationOutcome::AlreadyRegistered);
        }

        prospects.push(Prospect::new(&consent.email, &consent.area, now));
        self.store.save(&prospects)?;
        info!(total = prospects.len(), "Prospect registered");
        Ok(RegistrationOutcome::Registered)
    }

    pub fn unsubscribe(&self, email: &str) -> Result<UnsubscribeOutcome, StoreError> {
        self.unsubscribe_at(email, Local::now().naive_local())
    }

    /// Deactivates the active record for `email`, stamping the unsubscribe time
    #[instrument(skip(self))]
    pub fn unsubscribe_at(
        &self,
        email: &str,
        now: NaiveDateTime,
    ) -> Result<UnsubscribeOutcome, StoreError> {
        let email = ProspectEmail::normalize(email);
        let _guard = self.writer.lock().map_err(|_| StoreError::Poisoned)?;

        let mut prospects = self.store.load()?;
        let Some(idx) = prospects.iter().position(|p| p.email == email && p.ativo) else {
            let outcome = if prospects.iter().any(|p| p.email == email) {
                UnsubscribeOutcome::AlreadyInactive
            } else {
                UnsubscribeOutcome::NotFound
            };
            info!(?outcome, "Nothing to unsubscribe");
            return Ok(outcome);
        };

        let prospect = &mut prospects[idx];
        prospect.ativo = false;
        prospect.data_descadastro = Some(now);
        self.store.save(&prospects)?;
        info!("Prospect unsubscribed");
        Ok(UnsubscribeOutcome::Removed)
    }
}
