//! Registration, login and session-backed current-user resolution.
//!
//! Handlers never touch the raw actix session: they receive a
//! [`SessionContext`] to persist or clear the user id, and one of the guard
//! extractors to resolve the caller.

use actix_session::{Session, SessionExt};
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::SqliteConnection;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use serde::Deserialize;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::User;
use crate::{password, query};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Form body shared by `/register` and `/login`.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Username with surrounding whitespace removed; this is the form that
    /// is stored and looked up.
    fn username(&self) -> Result<&str, AppError> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(AppError::InvalidRequest(
                "username must not be empty".to_owned(),
            ));
        }
        if self.password.is_empty() {
            return Err(AppError::InvalidRequest(
                "password must not be empty".to_owned(),
            ));
        }
        Ok(username)
    }
}

/// Create a user with a hashed password. Fails if the username is taken.
pub fn register(credentials: &Credentials, conn: &mut SqliteConnection) -> Result<User, AppError> {
    let username = credentials.username()?;
    if query::find_user_by_username(username, conn)?.is_some() {
        return Err(AppError::DuplicateUsername);
    }

    let password_hash = password::hash(&credentials.password);
    query::insert_user(username, &password_hash, conn).map_err(|err| match err {
        // lost a race with a concurrent registration
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            AppError::DuplicateUsername
        }
        other => other.into(),
    })
}

/// Look up the user and check the password. Unknown users and wrong
/// passwords are indistinguishable to the caller, in result and in cost.
pub fn login(credentials: &Credentials, conn: &mut SqliteConnection) -> Result<User, AppError> {
    let username = credentials.username()?;
    match query::find_user_by_username(username, conn)? {
        Some(user) if password::verify(&credentials.password, &user.password_hash) => Ok(user),
        Some(_) => Err(AppError::InvalidCredentials),
        None => {
            password::verify_missing(&credentials.password);
            Err(AppError::InvalidCredentials)
        }
    }
}

/// Thin wrapper over the actix session exposing user-id operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the authenticated user id, rotating the session cookie.
    pub fn persist_user(&self, user_id: i32) -> Result<(), AppError> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id)
            .map_err(|err| AppError::Session(format!("failed to persist session: {err}")))
    }

    pub fn user_id(&self) -> Option<i32> {
        match self.0.get::<i32>(USER_ID_KEY) {
            Ok(id) => id,
            Err(err) => {
                log::warn!("invalid user id in session cookie: {err}");
                None
            }
        }
    }

    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(SessionContext::new(req.get_session())))
    }
}

async fn resolve_user(
    session: SessionContext,
    pool: Option<web::Data<DbPool>>,
) -> Result<Option<User>, AppError> {
    let Some(user_id) = session.user_id() else {
        return Ok(None);
    };
    let pool = pool.ok_or_else(|| AppError::Session("database pool not configured".to_owned()))?;

    let user = web::block(move || {
        let mut conn = pool.get()?;
        Ok::<_, AppError>(query::find_user(user_id, &mut conn)?)
    })
    .await??;

    if user.is_none() {
        log::warn!("session refers to missing user {user_id}, clearing it");
        session.clear();
    }
    Ok(user)
}

fn user_future(req: &HttpRequest) -> LocalBoxFuture<'static, Result<Option<User>, AppError>> {
    let session = SessionContext::new(req.get_session());
    let pool = req.app_data::<web::Data<DbPool>>().cloned();
    Box::pin(resolve_user(session, pool))
}

/// Authenticated caller of a JSON endpoint; rejects with `401` otherwise.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let fut = user_future(req);
        Box::pin(async move { fut.await?.map(CurrentUser).ok_or(AppError::Unauthenticated) })
    }
}

/// Authenticated caller of an HTML page; redirects to `/login` otherwise.
#[derive(Debug, Clone)]
pub struct PageUser(pub User);

impl FromRequest for PageUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let fut = user_future(req);
        Box::pin(async move { fut.await?.map(PageUser).ok_or(AppError::LoginRequired) })
    }
}

/// Caller that may or may not be logged in.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn id(&self) -> Option<i32> {
        self.0.as_ref().map(|user| user.id)
    }
}

impl FromRequest for MaybeUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let fut = user_future(req);
        Box::pin(async move { fut.await.map(MaybeUser) })
    }
}
