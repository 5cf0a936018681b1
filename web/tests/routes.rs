//! Lifecycle state machines served through axum.

#![allow(clippy::unwrap_used)]

use axum::{
    Router,
    body::Body,
    extract::State,
    routing::get,
};
use http::header::{CONTENT_TYPE, ETAG, HOST, IF_MATCH, IF_NONE_MATCH, LOCATION};
use http::{Request, StatusCode};
use resourceful_core::state::{ConditionalPutState, GetCollectionState, GetState, PostState};
use resourceful_core::{HAL_MEDIA_TYPE, HalConfig, ResourceStateMachine};
use resourceful_testing::fixtures::Book;
use resourceful_testing::{InMemoryRepository, Operation, init_tracing};
use resourceful_web::{HalRequest, HalResponse, ResourceState, WebResult, trace_layer};
use serde_json::{Value, json};
use tower::ServiceExt;

type Books = InMemoryRepository<Book>;
type AppState = ResourceState<Books>;

async fn show(State(state): State<AppState>, request: HalRequest) -> WebResult<HalResponse> {
    let response = ResourceStateMachine::new(GetState::new(&*state.store), &request, &state.config)
        .build()
        .await?;
    Ok(response.into())
}

async fn list(State(state): State<AppState>, request: HalRequest) -> WebResult<HalResponse> {
    let response = ResourceStateMachine::new(GetCollectionState::new(&*state.store), &request, &state.config)
        .build()
        .await?;
    Ok(response.into())
}

async fn create(State(state): State<AppState>, request: HalRequest) -> WebResult<HalResponse> {
    let response = ResourceStateMachine::new(PostState::new(&*state.store), &request, &state.config)
        .build()
        .await?;
    Ok(response.into())
}

async fn replace(State(state): State<AppState>, request: HalRequest) -> WebResult<HalResponse> {
    let response = ResourceStateMachine::new(ConditionalPutState::new(&*state.store), &request, &state.config)
        .build()
        .await?;
    Ok(response.into())
}

fn app(books: Books) -> Router {
    init_tracing();
    Router::new()
        .route("/books", get(list).post(create))
        .route("/books/:id", get(show).put(replace))
        .layer(trace_layer())
        .with_state(ResourceState::new(HalConfig::default(), books))
}

fn shelf() -> Books {
    let books = InMemoryRepository::new().with_id_assigner(|book: &mut Book, id| book.id = format!("b{id}"));
    books.insert(Book::new("1", "Dune"));
    books.insert(Book::new("2", "Emma"));
    books
}

fn get_request(uri: &str) -> http::request::Builder {
    Request::builder().uri(uri).header(HOST, "books.test")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn get_serves_a_hal_document_with_validators() {
    let response = app(shelf())
        .oneshot(get_request("/books/1").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], HAL_MEDIA_TYPE);
    assert!(response.headers().contains_key(ETAG));
    let body = json_body(response).await;
    assert_eq!(body["title"], "Dune");
    assert_eq!(body["_links"]["self"]["href"], "http://books.test/books/1");
}

#[tokio::test]
async fn revalidation_with_the_served_tag_is_not_modified() {
    let books = shelf();
    let first = app(books.clone())
        .oneshot(get_request("/books/1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let tag = first.headers()[ETAG].clone();

    let second = app(books)
        .oneshot(get_request("/books/1").header(IF_NONE_MATCH, tag).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
    let bytes = axum::body::to_bytes(second.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn missing_books_render_the_error_body() {
    let response = app(shelf())
        .oneshot(get_request("/books/404").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response).await,
        json!({
            "status": 404,
            "error": "Not Found",
            "message": "The requested resource could not be found.",
        })
    );
}

#[tokio::test]
async fn collections_link_their_pages() {
    let response = app(shelf())
        .oneshot(get_request("/books?size=1").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["totalCount"], 2);
    assert_eq!(body["_links"]["self"]["href"], "http://books.test/books?size=1&offset=0");
    assert_eq!(body["_links"]["next"]["href"], "http://books.test/books?size=1&offset=1");
}

#[tokio::test]
async fn post_answers_created_with_location() {
    let books = shelf();
    let request = get_request("/books")
        .method("POST")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"title":"Persuasion"}"#))
        .unwrap();

    let response = app(books.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers()[LOCATION], "http://books.test/books/b1");
    assert_eq!(books.get("b1").unwrap().title, "Persuasion");
}

#[tokio::test]
async fn stale_conditional_put_is_rejected() {
    let books = shelf();
    let request = get_request("/books/1")
        .method("PUT")
        .header(IF_MATCH, "\"stale\"")
        .body(Body::from(r#"{"id":"1","title":"Dune Messiah"}"#))
        .unwrap();

    let response = app(books.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    assert_eq!(json_body(response).await["status"], 412);
    assert_eq!(books.calls(Operation::Update), 0);
}

#[tokio::test]
async fn store_failures_are_opaque() {
    let books = shelf();
    books.fail(Operation::Load);

    let response = app(books)
        .oneshot(get_request("/books/1").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["message"], "An unexpected error occurred.");
}
