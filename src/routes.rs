use actix_web::http::header;
use actix_web::{get, post, web, HttpResponse};
use diesel::SqliteConnection;
use serde::Deserialize;

use crate::auth::{self, Credentials, CurrentUser, MaybeUser, PageUser, SessionContext};
use crate::db::DbPool;
use crate::error::AppError;
use crate::models::{FoodView, ToggleResponse};
use crate::{favorites, pages, query, search};

/// Run blocking diesel work on the thread pool with one pooled connection.
async fn run<F, T>(pool: web::Data<DbPool>, f: F) -> Result<T, AppError>
where
    F: FnOnce(&mut SqliteConnection) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    web::block(move || {
        let mut conn = pool.get()?;
        f(&mut conn)
    })
    .await?
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

#[get("/")]
async fn landing(user: MaybeUser) -> HttpResponse {
    if user.0.is_some() {
        return redirect("/discover");
    }
    html(pages::landing())
}

#[get("/register")]
async fn register_page() -> HttpResponse {
    html(pages::register())
}

#[post("/register")]
async fn register(
    pool: web::Data<DbPool>,
    session: SessionContext,
    form: web::Form<Credentials>,
) -> Result<HttpResponse, AppError> {
    let credentials = form.into_inner();
    let user = run(pool, move |conn| auth::register(&credentials, conn)).await?;
    log::info!("registered user {} ({})", user.username, user.id);
    session.persist_user(user.id)?;
    Ok(redirect("/discover"))
}

#[get("/login")]
async fn login_page() -> HttpResponse {
    html(pages::login())
}

#[post("/login")]
async fn login(
    pool: web::Data<DbPool>,
    session: SessionContext,
    form: web::Form<Credentials>,
) -> Result<HttpResponse, AppError> {
    let credentials = form.into_inner();
    let username = credentials.username.clone();
    let user = run(pool, move |conn| auth::login(&credentials, conn))
        .await
        .inspect_err(|err| {
            if let AppError::InvalidCredentials = err {
                log::warn!("failed login for {username:?}");
            }
        })?;
    session.persist_user(user.id)?;
    Ok(redirect("/discover"))
}

#[get("/logout")]
async fn logout(user: PageUser, session: SessionContext) -> HttpResponse {
    log::info!("user {} logged out", user.0.id);
    session.clear();
    redirect("/")
}

#[get("/discover")]
async fn discover(user: PageUser) -> HttpResponse {
    html(pages::discover(&user.0.username))
}

#[get("/api/moods")]
async fn moods(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let names = run(pool, |conn| Ok(query::mood_names(conn)?)).await?;
    Ok(HttpResponse::Ok().json(names))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub mood: Option<String>,
}

#[get("/api/search")]
async fn search_foods(
    pool: web::Data<DbPool>,
    user: MaybeUser,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse, AppError> {
    let mood = params.into_inner().mood;
    let user_id = user.id();
    let foods: Vec<FoodView> =
        run(pool, move |conn| Ok(search::search(mood.as_deref(), user_id, conn)?)).await?;
    Ok(HttpResponse::Ok().json(foods))
}

#[post("/api/favorite/{food_id}")]
async fn toggle_favorite(
    pool: web::Data<DbPool>,
    user: CurrentUser,
    food_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.0.id;
    let food_id = food_id.into_inner();
    let action = run(pool, move |conn| favorites::toggle(user_id, food_id, conn)).await?;
    Ok(HttpResponse::Ok().json(ToggleResponse {
        status: "success",
        action,
    }))
}

#[get("/api/favorites")]
async fn list_favorites(
    pool: web::Data<DbPool>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let user_id = user.0.id;
    let foods = run(pool, move |conn| favorites::list(user_id, conn)).await?;
    Ok(HttpResponse::Ok().json(foods))
}

#[get("/order/{food_id}")]
async fn order(
    pool: web::Data<DbPool>,
    _user: PageUser,
    food_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let food_id = food_id.into_inner();
    let food = run(pool, move |conn| {
        query::find_food(food_id, conn)?.ok_or(AppError::FoodNotFound(food_id))
    })
    .await?;
    Ok(html(pages::order_confirmation(&food)))
}

#[get("/api/surprise")]
async fn surprise(pool: web::Data<DbPool>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    let user_id = user.0.id;
    let food = run(pool, move |conn| favorites::surprise(Some(user_id), conn)).await?;
    Ok(HttpResponse::Ok().json(food))
}

/// Register every route plus extractor error handlers that turn malformed
/// input into `400` JSON errors.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::FormConfig::default()
            .error_handler(|err, _req| AppError::InvalidRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::InvalidRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::InvalidRequest(err.to_string()).into()),
    )
    .service(landing)
    .service(register_page)
    .service(register)
    .service(login_page)
    .service(login)
    .service(logout)
    .service(discover)
    .service(moods)
    .service(search_foods)
    .service(toggle_favorite)
    .service(list_favorites)
    .service(order)
    .service(surprise);
}
