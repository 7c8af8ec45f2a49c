//! Session store: the local authentication stand-in.
//!
//! ARCHITECTURE
//! ============
//! Registered users, the session marker and the remembered email live in
//! [`Storage`] under `users`, `token` and `email`. The in-memory [`Session`]
//! is only a cache of the marker; [`SessionStore::check_auth`] re-derives it
//! from storage, so a logout written by another process is seen on the next
//! check.
//!
//! The credential carried by the session is the user's TMDB API key: the
//! password doubles as the key, and catalog requests receive it explicitly
//! through [`SessionStore::credential`].
//!
//! TRADE-OFFS
//! ==========
//! None of this is real authentication. Passwords are stored in clear and
//! [`SessionHandle`] is a base64 of email and issue time that nothing ever
//! verifies. Registration is check-then-append over shared storage, so two
//! processes registering at once can drop one of the records.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::api::{Credential, CredentialValidator};
use crate::router::{HOME_PATH, SIGN_IN_PATH};
use crate::storage::{self, EMAIL_KEY, Storage, StorageError, TOKEN_KEY, USERS_KEY};
use crate::ui::{Notice, UiEffects};

const MSG_LOGIN_OK: &str = "로그인 성공!";
const MSG_LOGIN_FAILED: &str = "이메일 또는 비밀번호가 올바르지 않습니다.";
const MSG_LOGIN_ERROR: &str = "로그인에 실패했습니다.";
const MSG_REGISTER_OK: &str = "회원가입 성공!";
const MSG_REGISTER_DUPLICATE: &str = "이미 존재하는 이메일입니다.";
const MSG_REGISTER_REJECTED: &str = "유효하지 않은 API 키입니다.";
const MSG_REGISTER_FAILED: &str = "회원가입에 실패했습니다.";
const MSG_LOGOUT_OK: &str = "로그아웃되었습니다.";
const MSG_LOGOUT_FAILED: &str = "로그아웃에 실패했습니다.";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("email already registered: {email}")]
    DuplicateRegistration { email: String },
    #[error("malformed persisted state under `{key}`: {message}")]
    MalformedPersistedState { key: String, message: String },
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for SessionError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Malformed { key, message } => Self::MalformedPersistedState { key, message },
            StorageError::Corrupt { path, message } => {
                Self::MalformedPersistedState { key: path.display().to_string(), message }
            }
            other => Self::Storage(other),
        }
    }
}

/// Registered account as persisted under `users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: String,
    pub password: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Opaque session marker. Not a security credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionHandle(String);

impl SessionHandle {
    /// `base64("{email}:{unix_millis}")`.
    #[must_use]
    pub fn issue(email: &str, issued_at: OffsetDateTime) -> Self {
        let millis = issued_at.unix_timestamp_nanos() / 1_000_000;
        Self(STANDARD.encode(format!("{email}:{millis}")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Persisted form of an active session, stored under `token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionMarker {
    handle: SessionHandle,
    email: String,
    credential: Credential,
}

/// In-memory view of the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub authenticated: bool,
    pub email: Option<String>,
    pub handle: Option<SessionHandle>,
    pub credential: Option<Credential>,
}

impl Session {
    fn from_marker(marker: SessionMarker) -> Self {
        Self {
            authenticated: true,
            email: Some(marker.email),
            handle: Some(marker.handle),
            credential: Some(marker.credential),
        }
    }
}

pub struct SessionStore {
    storage: Arc<dyn Storage>,
    effects: Arc<dyn UiEffects>,
    validator: Option<Arc<dyn CredentialValidator>>,
    clock: fn() -> OffsetDateTime,
    session: Session,
}

impl SessionStore {
    /// Create an unauthenticated store. Call [`check_auth`](Self::check_auth)
    /// to rehydrate from storage.
    pub fn new(storage: Arc<dyn Storage>, effects: Arc<dyn UiEffects>) -> Self {
        Self { storage, effects, validator: None, clock: OffsetDateTime::now_utc, session: Session::default() }
    }

    /// Probe candidate credentials with `validator` before registering them.
    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn CredentialValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> OffsetDateTime) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.authenticated
    }

    /// Credential of the current session; `None` when logged out.
    #[must_use]
    pub fn credential(&self) -> Option<&Credential> {
        self.session.credential.as_ref()
    }

    /// Email saved by a `remember` login, used to prefill sign-in.
    #[must_use]
    pub fn remembered_email(&self) -> Option<String> {
        self.storage.get_item(EMAIL_KEY).ok().flatten()
    }

    /// Re-derive the session from the persisted marker.
    ///
    /// An unreadable or malformed marker counts as logged out.
    pub fn check_auth(&mut self) -> bool {
        self.session = match storage::load_json::<SessionMarker>(self.storage.as_ref(), TOKEN_KEY) {
            Ok(Some(marker)) => Session::from_marker(marker),
            Ok(None) => Session::default(),
            Err(e) => {
                tracing::warn!(error = %SessionError::from(e), "ignoring unreadable session marker");
                Session::default()
            }
        };
        self.session.authenticated
    }

    /// Sign in against the registered users. Navigates home on success.
    pub fn login(&mut self, email: &str, password: &str, remember: bool) -> bool {
        match self.try_login(email, password, remember) {
            Ok(()) => {
                tracing::info!(%email, remember, "signed in");
                self.effects
                    .notify(Notice::Success(MSG_LOGIN_OK.to_owned()));
                self.effects.navigate(HOME_PATH);
                true
            }
            Err(e) => {
                tracing::warn!(%email, error = %e, "sign-in failed");
                let message = match e {
                    SessionError::InvalidCredentials => MSG_LOGIN_FAILED,
                    _ => MSG_LOGIN_ERROR,
                };
                self.effects.notify(Notice::Error(message.to_owned()));
                false
            }
        }
    }

    /// Append a new user record unless the email is taken.
    pub async fn register(&self, email: &str, password: &str) -> bool {
        match self.try_register(email, password).await {
            Ok(()) => {
                tracing::info!(%email, "registered");
                self.effects
                    .notify(Notice::Success(MSG_REGISTER_OK.to_owned()));
                true
            }
            Err(e) => {
                tracing::warn!(%email, error = %e, "registration failed");
                let message = match e {
                    SessionError::DuplicateRegistration { .. } => MSG_REGISTER_DUPLICATE,
                    SessionError::InvalidCredentials => MSG_REGISTER_REJECTED,
                    SessionError::MalformedPersistedState { .. } | SessionError::Storage(_) => MSG_REGISTER_FAILED,
                };
                self.effects.notify(Notice::Error(message.to_owned()));
                false
            }
        }
    }

    /// Drop the session marker and remembered email, then go to sign-in.
    pub fn logout(&mut self) {
        let mut cleared = true;
        for key in [TOKEN_KEY, EMAIL_KEY] {
            if let Err(e) = self.storage.remove_item(key) {
                tracing::warn!(%key, error = %e, "failed to clear session key");
                cleared = false;
            }
        }
        self.session = Session::default();
        tracing::info!("signed out");

        let notice = if cleared {
            Notice::Success(MSG_LOGOUT_OK.to_owned())
        } else {
            Notice::Error(MSG_LOGOUT_FAILED.to_owned())
        };
        self.effects.notify(notice);
        self.effects.navigate(SIGN_IN_PATH);
    }

    fn load_users(&self) -> Result<Vec<UserRecord>, SessionError> {
        Ok(storage::load_json::<Vec<UserRecord>>(self.storage.as_ref(), USERS_KEY)?.unwrap_or_default())
    }

    fn try_login(&mut self, email: &str, password: &str, remember: bool) -> Result<(), SessionError> {
        let users = self.load_users()?;
        let user = users
            .iter()
            .find(|u| u.email == email)
            .ok_or(SessionError::InvalidCredentials)?;
        if user.password != password {
            return Err(SessionError::InvalidCredentials);
        }

        let marker = SessionMarker {
            handle: SessionHandle::issue(email, (self.clock)()),
            email: email.to_owned(),
            credential: Credential::new(password),
        };
        // The marker goes last: a failed write before it leaves no session behind.
        if remember {
            self.storage.set_item(EMAIL_KEY, email)?;
        }
        storage::save_json(self.storage.as_ref(), TOKEN_KEY, &marker)?;

        self.session = Session::from_marker(marker);
        Ok(())
    }

    async fn try_register(&self, email: &str, password: &str) -> Result<(), SessionError> {
        let mut users = self.load_users()?;
        if users.iter().any(|u| u.email == email) {
            return Err(SessionError::DuplicateRegistration { email: email.to_owned() });
        }

        if let Some(validator) = &self.validator {
            if !validator.validate_credential(password).await {
                return Err(SessionError::InvalidCredentials);
            }
        }

        let now = (self.clock)();
        let created_at = now
            .format(&Rfc3339)
            .unwrap_or_else(|_| now.unix_timestamp().to_string());
        users.push(UserRecord { email: email.to_owned(), password: password.to_owned(), created_at });
        storage::save_json(self.storage.as_ref(), USERS_KEY, &users)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
