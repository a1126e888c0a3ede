use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

pub type DbPoolError = diesel::r2d2::PoolError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("username already exists")]
    DuplicateUsername,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("login required")]
    Unauthenticated,

    /// Unauthenticated request for an HTML page; answered with a redirect.
    #[error("login required")]
    LoginRequired,

    #[error("food {0} not found")]
    FoodNotFound(i32),

    #[error("No foods found")]
    NoFoodsAvailable,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] DbPoolError),

    #[error("session error: {0}")]
    Session(String),

    #[error("blocking task failed: {0}")]
    Blocking(#[from] actix_web::error::BlockingError),
}

impl AppError {
    /// Stable, machine-readable identifier sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::DuplicateUsername => "duplicate_username",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::Unauthenticated | AppError::LoginRequired => "unauthenticated",
            AppError::FoodNotFound(_) => "not_found",
            AppError::NoFoodsAvailable => "no_foods_available",
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Session(_)
            | AppError::Blocking(_) => "internal_error",
        }
    }

    fn is_internal(&self) -> bool {
        self.code() == "internal_error"
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    code: &'a str,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DuplicateUsername => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::LoginRequired => StatusCode::FOUND,
            AppError::FoodNotFound(_) | AppError::NoFoodsAvailable => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::LoginRequired = self {
            return HttpResponse::Found()
                .insert_header((header::LOCATION, "/login"))
                .finish();
        }

        let error = if self.is_internal() {
            // details stay in the log, not in the response
            log::error!("request failed: {self}");
            "Internal server error".to_owned()
        } else {
            self.to_string()
        };
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error,
            code: self.code(),
        })
    }
}
