use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use rstest::{fixture, rstest};
use serde_json::Value;

use smartdine::db::{self, DbPool};
use smartdine::seed::{self, SeedData};
use smartdine::{routes, session_middleware, SESSION_COOKIE};

const MENU: &str = r#"{
    "moods": { "thatmood": ["sweet", "light"], "hungry": ["filling"] },
    "foods": [
        { "name": "F1", "keywords": ["sweet", "spicy"], "moods": ["thatmood"] },
        { "name": "F2", "keywords": ["sweet", "light"], "moods": ["thatmood"] },
        { "name": "F3", "keywords": ["salty"] }
    ]
}"#;

const NO_FOODS: &str = r#"{ "moods": { "calm": ["tea"] }, "foods": [] }"#;

fn pool_with(document: &str) -> DbPool {
    let pool = db::init_pool(":memory:", 1).expect("pool");
    let mut conn = pool.get().expect("connection");
    db::run_migrations(&mut conn).expect("migrations");
    let data = SeedData::from_json(document).expect("seed document");
    seed::import(&data, &mut conn).expect("seed import");
    pool
}

#[fixture]
fn menu() -> DbPool {
    pool_with(MENU)
}

async fn app(
    pool: DbPool,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(pool))
            .wrap(session_middleware(Key::generate(), false))
            .configure(routes::configure),
    )
    .await
}

fn session_cookie(res: &ServiceResponse) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .expect("session cookie set")
        .into_owned()
}

fn location(res: &ServiceResponse) -> &str {
    res.headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .expect("ascii location")
}

async fn json_body(res: ServiceResponse) -> Value {
    let bytes = test::read_body(res).await;
    serde_json::from_slice(&bytes).expect("json body")
}

fn names(body: &Value) -> Vec<&str> {
    body.as_array()
        .expect("array")
        .iter()
        .map(|food| food["name"].as_str().expect("name"))
        .collect()
}

async fn sign_up<S>(app: &S, username: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/register")
        .set_form([("username", username), ("password", "secret")])
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/discover");
    session_cookie(&res)
}

#[rstest]
#[actix_web::test]
async fn registration_authenticates_and_rejects_duplicates(menu: DbPool) {
    let app = app(menu).await;
    let cookie = sign_up(&app, "ada").await;

    let req = test::TestRequest::get()
        .uri("/discover")
        .cookie(cookie)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/register")
        .set_form([("username", "ada"), ("password", "other")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(res).await["code"], "duplicate_username");
}

#[rstest]
#[actix_web::test]
async fn login_checks_credentials(menu: DbPool) {
    let app = app(menu).await;
    sign_up(&app, "ada").await;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("username", "ada"), ("password", "wrong")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(res).await["code"], "invalid_credentials");

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("username", "ada"), ("password", "secret")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/discover");
}

#[rstest]
#[actix_web::test]
async fn missing_form_fields_are_bad_requests(menu: DbPool) {
    let app = app(menu).await;
    let req = test::TestRequest::post()
        .uri("/register")
        .set_form([("username", "ada")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await["code"], "invalid_request");
}

#[rstest]
#[case("/discover")]
#[case("/logout")]
#[case("/order/1")]
#[actix_web::test]
async fn pages_redirect_anonymous_users_to_login(menu: DbPool, #[case] uri: &str) {
    let app = app(menu).await;
    let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/login");
}

#[rstest]
#[case("/api/favorites")]
#[case("/api/surprise")]
#[actix_web::test]
async fn api_rejects_anonymous_users(menu: DbPool, #[case] uri: &str) {
    let app = app(menu).await;
    let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(res).await["code"], "unauthenticated");
}

#[rstest]
#[actix_web::test]
async fn landing_redirects_signed_in_users(menu: DbPool) {
    let app = app(menu).await;
    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);

    let cookie = sign_up(&app, "ada").await;
    let req = test::TestRequest::get().uri("/").cookie(cookie).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/discover");
}

#[rstest]
#[actix_web::test]
async fn logout_clears_the_session(menu: DbPool) {
    let app = app(menu).await;
    let cookie = sign_up(&app, "ada").await;

    let req = test::TestRequest::get()
        .uri("/logout")
        .cookie(cookie)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/");
    assert!(session_cookie(&res).value().is_empty());
}

#[rstest]
#[actix_web::test]
async fn lists_mood_names(menu: DbPool) {
    let app = app(menu).await;
    let req = test::TestRequest::get().uri("/api/moods").to_request();
    let body: Vec<String> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, vec!["thatmood", "hungry"]);
}

#[rstest]
#[case("/api/search?mood=thatmood")]
#[case("/api/search?mood=ThatMood")]
#[actix_web::test]
async fn search_ranks_by_keyword_overlap(menu: DbPool, #[case] uri: &str) {
    let app = app(menu).await;
    let req = test::TestRequest::get().uri(uri).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(names(&body), vec!["F2", "F1"]);
    assert_eq!(body[0]["keywords"], serde_json::json!(["sweet", "light"]));
    assert_eq!(body[0]["isFavorite"], false);
}

#[rstest]
#[case("/api/search")]
#[case("/api/search?mood=")]
#[case("/api/search?mood=nosuchmood")]
#[actix_web::test]
async fn search_without_known_mood_returns_storage_order(menu: DbPool, #[case] uri: &str) {
    let app = app(menu).await;
    let req = test::TestRequest::get().uri(uri).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(names(&body), vec!["F1", "F2", "F3"]);
}

#[rstest]
#[actix_web::test]
async fn toggling_a_favorite_twice_restores_the_set(menu: DbPool) {
    let app = app(menu).await;
    let cookie = sign_up(&app, "ada").await;

    let toggle = || {
        test::TestRequest::post()
            .uri("/api/favorite/2")
            .cookie(cookie.clone())
            .to_request()
    };
    let favorites = || {
        test::TestRequest::get()
            .uri("/api/favorites")
            .cookie(cookie.clone())
            .to_request()
    };

    let body: Value = test::call_and_read_body_json(&app, toggle()).await;
    assert_eq!(body, serde_json::json!({"status": "success", "action": "added"}));

    let body: Value = test::call_and_read_body_json(&app, favorites()).await;
    assert_eq!(names(&body), vec!["F2"]);
    assert_eq!(body[0]["isFavorite"], true);

    let req = test::TestRequest::get()
        .uri("/api/search?mood=thatmood")
        .cookie(cookie.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body[0]["isFavorite"], true);
    assert_eq!(body[1]["isFavorite"], false);

    let body: Value = test::call_and_read_body_json(&app, toggle()).await;
    assert_eq!(body["action"], "removed");

    let body: Value = test::call_and_read_body_json(&app, favorites()).await;
    assert_eq!(body, serde_json::json!([]));
}

#[rstest]
#[actix_web::test]
async fn unknown_food_is_not_found(menu: DbPool) {
    let app = app(menu).await;
    let cookie = sign_up(&app, "ada").await;

    let req = test::TestRequest::post()
        .uri("/api/favorite/999")
        .cookie(cookie.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(res).await["code"], "not_found");

    let req = test::TestRequest::get()
        .uri("/api/favorite/999")
        .cookie(cookie.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/order/999")
        .cookie(cookie)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn order_page_names_the_food(menu: DbPool) {
    let app = app(menu).await;
    let cookie = sign_up(&app, "ada").await;

    let req = test::TestRequest::get()
        .uri("/order/3")
        .cookie(cookie)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = test::read_body(res).await;
    assert!(String::from_utf8_lossy(&body).contains("<strong>F3</strong>"));
}

#[rstest]
#[actix_web::test]
async fn surprise_picks_an_existing_food(menu: DbPool) {
    let app = app(menu).await;
    let cookie = sign_up(&app, "ada").await;

    let req = test::TestRequest::get()
        .uri("/api/surprise")
        .cookie(cookie)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(["F1", "F2", "F3"].contains(&body["name"].as_str().expect("name")));
    assert_eq!(body["isFavorite"], false);
}

#[actix_web::test]
async fn surprise_without_foods_is_not_found() {
    let app = app(pool_with(NO_FOODS)).await;
    let cookie = sign_up(&app, "ada").await;

    let req = test::TestRequest::get()
        .uri("/api/surprise")
        .cookie(cookie)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = json_body(res).await;
    assert_eq!(body["error"], "No foods found");
    assert_eq!(body["code"], "no_foods_available");
}
