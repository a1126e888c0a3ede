//! SmartDine: mood-based food recommendations with user accounts and
//! favorites, served over actix-web on top of a SQLite store.

use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::Key;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod favorites;
pub mod keywords;
pub mod models;
pub mod pages;
mod query;
pub mod routes;
pub mod schema;
pub mod search;
pub mod seed;

mod password;

pub const SESSION_COOKIE: &str = "smartdine_session";

pub fn session_middleware(key: Key, secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(secure)
        .build()
}
