//! HTTP API tests against the router, without a listening socket

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use booking::server::create_router;

use super::fixtures::{app_state, days_ago, days_from_now};

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_form(router: &Router, uri: &str, form: String) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();
    send(router, request).await
}

async fn create_pilates(router: &Router) -> String {
    let uri = format!(
        "/api/classes?name=pilates&start={}&end={}&capacity=10",
        days_from_now(0),
        days_from_now(19)
    );
    let (status, body) = get(router, &uri).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let router = create_router(app_state());
    let (status, body) = get(&router, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["courses"]["total"], 0);
}

#[tokio::test]
async fn test_create_course_title_cases_name() {
    let router = create_router(app_state());
    let id = create_pilates(&router).await;

    let (status, body) = get(&router, &format!("/api/courses/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Pilates");
    assert_eq!(body["data"]["num_classes"], 20);
}

#[tokio::test]
async fn test_create_course_via_form_post() {
    let router = create_router(app_state());
    let form = format!(
        "name=karate+for+kids&start={}&end={}&capacity=4",
        days_from_now(1),
        days_from_now(2)
    );

    let (status, body) = post_form(&router, "/api/classes", form).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "course created");
    assert_eq!(body["data"]["name"], "Karate For Kids");
}

#[tokio::test]
async fn test_create_course_rejections() {
    let router = create_router(app_state());

    let (status, body) = get(
        &router,
        "/api/classes?start=2030-01-01&end=2030-01-02&capacity=1",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name value not provided");

    let (status, body) = get(
        &router,
        "/api/classes?name=x&start=soon&end=2030-01-02&capacity=1",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "start value 'soon' could not be parsed to date");

    let (status, body) = get(
        &router,
        "/api/classes?name=x&start=2030-01-05&end=2030-01-02&capacity=1",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "invalid course parameters: start date (2030-01-05) after end date (2030-01-02)"
    );

    let (status, _) = get(
        &router,
        "/api/classes?name=x&start=2030-01-01&end=2030-01-02&capacity=0",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_overlong_course_rejected() {
    let router = create_router(app_state());

    // `%2B` is a literal `+`, chrono accepts signed years beyond 9999
    let uri = format!(
        "/api/classes?name=forever&start={}&end=%2B200000-12-31&capacity=1",
        days_from_now(0)
    );
    let (status, body) = get(&router, &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("invalid course parameters: course spans"), "{error}");
    assert!(error.ends_with("at most 3660 allowed"), "{error}");

    let (_, body) = get(&router, "/api/health").await;
    assert_eq!(body["data"]["courses"]["total"], 0);
}

#[tokio::test]
async fn test_historic_course() {
    let router = create_router(app_state());
    let base = format!(
        "/api/classes?name=yoga&start={}&end={}&capacity=3",
        days_ago(10),
        days_ago(5)
    );

    let (status, body) = get(&router, &base).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid course parameters: course is in the past");

    let (status, _) = get(&router, &format!("{base}&historic=true")).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = get(&router, "/api/courses?view=past").await;
    assert_eq!(body["data"]["courses"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_course() {
    let router = create_router(app_state());
    create_pilates(&router).await;

    let uri = format!(
        "/api/classes?name=Pilates&start={}&end={}&capacity=5",
        days_from_now(0),
        days_from_now(19)
    );
    let (status, body) = get(&router, &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "a course 'Pilates' with the same dates has already been added"
    );
}

#[tokio::test]
async fn test_book_class() {
    let router = create_router(app_state());
    let id = create_pilates(&router).await;
    let date = days_from_now(1);

    let form = format!("name=Arnold&date={date}&id={id}");
    let (status, body) = post_form(&router, "/api/bookings", form.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        format!(
            "Congratulations, Arnold! You are now registered for the Pilates class on {}.",
            date.format("%A, %-d. %B %Y")
        )
    );
    assert_eq!(body["data"]["attendees"], 1);

    let (status, body) = post_form(&router, "/api/bookings", form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "you are already attending this class");
}

#[tokio::test]
async fn test_book_class_rejections() {
    let router = create_router(app_state());
    let id = create_pilates(&router).await;

    let (status, body) = get(&router, &format!("/api/bookings?name=Arnold&id={id}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "date value not provided");

    let uri = format!("/api/bookings?name=Arnold&id=missing&date={}", days_from_now(1));
    let (status, body) = get(&router, &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "course with id missing does not exist");

    let uri = format!("/api/bookings?name=Arnold&id={id}&date={}", days_from_now(25));
    let (status, body) = get(&router, &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "the chosen date is not within the timeframe of the course"
    );

    let uri = format!(
        "/api/bookings?name=Arnold&id={id}&date={}&timeout=later",
        days_from_now(1)
    );
    let (status, _) = get(&router, &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_course_lookup() {
    let router = create_router(app_state());

    let (status, body) = get(&router, "/api/courses/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = get(&router, "/api/courses?view=someday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    create_pilates(&router).await;
    let (status, body) = get(&router, "/api/courses").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["view"], "all");
    assert_eq!(body["data"]["courses"][0]["name"], "Pilates");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let _ = booking::metrics::init_metrics();
    let router = create_router(app_state());
    create_pilates(&router).await;

    let response = router
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("booking_courses_created_total"));
}
