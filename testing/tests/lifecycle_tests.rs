//! End-to-end lifecycle tests against the in-memory repository.

#![allow(clippy::unwrap_used)]

use http::header::{ETAG, IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_UNMODIFIED_SINCE, LOCATION};
use http::{HeaderValue, Method, StatusCode};
use proptest::prelude::*;
use resourceful_core::etag::{entity_tag, http_date};
use resourceful_core::hal::{Embedded, Links};
use resourceful_core::state::{
    ConditionalDeleteState, ConditionalPutState, DeleteState, GetCollectionState, GetState, Hooks,
    PostState, PutState, ResourceStateMachine,
};
use resourceful_core::{CollectionResult, HalConfig, ResourceError};
use resourceful_testing::fixtures::Book;
use resourceful_testing::{FixedClock, InMemoryRepository, Operation, init_tracing, request};
use serde_json::json;

fn shelf() -> InMemoryRepository<Book> {
    init_tracing();
    let books = InMemoryRepository::new().with_id_assigner(|book: &mut Book, id| book.id = format!("b{id}"));
    books.insert(Book::new("1", "Dune").by("7", "Frank Herbert"));
    books.insert(Book::new("2", "Emma").by("8", "Jane Austen"));
    books
}

fn href(links: Option<&Links>) -> String {
    links.and_then(Links::as_link).unwrap().href.clone()
}

#[tokio::test]
async fn conditional_put_with_current_timestamp_persists() {
    let books = shelf();
    let config = HalConfig::default();
    let clock = FixedClock::at_millis(60_000);
    let request = request(Method::PUT, "/books/1")
        .with_param("id", "1")
        .with_header(IF_UNMODIFIED_SINCE, HeaderValue::from_str(&http_date(1000).unwrap()).unwrap())
        .with_body(json!({ "id": "1", "title": "Dune Messiah" }));

    let response = ResourceStateMachine::new(ConditionalPutState::new(&books), &request, &config)
        .with_clock(&clock)
        .build()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(books.calls(Operation::Update), 1);
    let stored = books.get("1").unwrap();
    assert_eq!(stored.title, "Dune Messiah");
    assert_eq!(stored.modified_at, 60_000);
}

#[tokio::test]
async fn conditional_put_with_stale_timestamp_never_writes() {
    let books = shelf();
    let config = HalConfig::default();
    let request = request(Method::PUT, "/books/1")
        .with_param("id", "1")
        .with_header(IF_UNMODIFIED_SINCE, HeaderValue::from_str(&http_date(0).unwrap()).unwrap())
        .with_body(json!({ "id": "1", "title": "Dune Messiah" }));

    let result = ResourceStateMachine::new(ConditionalPutState::new(&books), &request, &config)
        .build()
        .await;

    assert_eq!(result, Err(ResourceError::PreconditionFailed));
    assert_eq!(books.calls(Operation::Load), 1);
    assert_eq!(books.calls(Operation::Update), 0);
    assert_eq!(books.get("1").unwrap().title, "Dune");
}

#[tokio::test]
async fn get_with_matching_entity_tag_loads_but_sends_nothing() {
    let books = shelf();
    let config = HalConfig::default();
    let tag = entity_tag(&books.get("1").unwrap()).unwrap();
    let request = request(Method::GET, "/books/1")
        .with_param("id", "1")
        .with_header(IF_NONE_MATCH, HeaderValue::from_str(&tag).unwrap());

    let hooks = Hooks::new().define_links(|builder| builder.with_link("never", "/never"));
    let response = ResourceStateMachine::new(GetState::new(&books), &request, &config)
        .with_hooks(hooks)
        .build()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    assert!(response.body().is_none());
    assert_eq!(response.header(&ETAG), Some(tag.as_str()));
    assert_eq!(books.calls(Operation::Load), 1);
}

#[tokio::test]
async fn get_with_matching_modified_since_is_not_modified() {
    let books = shelf();
    let config = HalConfig::default();
    let request = request(Method::GET, "/books/2")
        .with_param("id", "2")
        .with_header(IF_MODIFIED_SINCE, HeaderValue::from_str(&http_date(1000).unwrap()).unwrap());

    let response = ResourceStateMachine::new(GetState::new(&books), &request, &config)
        .build()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
}

#[tokio::test]
async fn get_embeds_the_author_with_hypertext_cache() {
    let books = shelf();
    let config = HalConfig::default();
    let request = request(Method::GET, "/books/1").with_param("id", "1");

    let hooks = Hooks::new().define_embedded(|builder| {
        let book: &Book = builder.model();
        match &book.author {
            Some(author) => builder.with_absolute_embedded_object(
                "author",
                &format!("/authors/{}", author.id),
                author,
                |author| author.with_properties(),
            ),
            None => builder,
        }
    });
    let response = ResourceStateMachine::new(GetState::new(&books), &request, &config)
        .with_hooks(hooks)
        .build()
        .await
        .unwrap();

    let body = response.body().unwrap();
    assert_eq!(body.property("title"), Some(&json!("Dune")));
    assert!(!body.has_property("author"));
    assert_eq!(href(body.link("author")), "http://localhost/authors/7");
    let author = body.embedded_entry("author").and_then(Embedded::as_object).unwrap();
    assert_eq!(author.property("name"), Some(&json!("Frank Herbert")));
}

#[tokio::test]
async fn hypertext_cache_can_be_disabled() {
    let books = shelf();
    let config = HalConfig::default().with_hypertext_cache_pattern(false);
    let request = request(Method::GET, "/books/1").with_param("id", "1");

    let hooks = Hooks::new().define_embedded(|builder| {
        let book: &Book = builder.model();
        builder.with_embedded_object("book", "/books/1", book, |embedded| embedded)
    });
    let response = ResourceStateMachine::new(GetState::new(&books), &request, &config)
        .with_hooks(hooks)
        .build()
        .await
        .unwrap();

    let body = response.body().unwrap();
    assert!(body.embedded_entry("book").is_some());
    assert!(body.link("book").is_none());
}

#[tokio::test]
async fn collection_embeds_the_window() {
    let books = shelf();
    for id in 3..=12 {
        books.insert(Book::new(id.to_string(), format!("Volume {id}")));
    }
    let config = HalConfig::default().with_default_page_size(5);
    let request = request(Method::GET, "/books?offset=5&size=5")
        .with_query("offset", "5")
        .with_query("size", "5");

    let hooks = Hooks::<CollectionResult<Book>>::new().define_embedded(|builder| {
        let results = &builder.model().results;
        builder.with_embedded_array("books", results, "/books/{id}", |items| items.with_properties())
    });
    let response = ResourceStateMachine::new(GetCollectionState::new(&books), &request, &config)
        .with_hooks(hooks)
        .build()
        .await
        .unwrap();

    let body = response.body().unwrap();
    assert_eq!(body.property("totalCount"), Some(&json!(12)));
    assert_eq!(href(body.link("next")), "http://localhost/books?offset=10&size=5");
    assert_eq!(href(body.link("prev")), "http://localhost/books?offset=0&size=5");
    assert!(body.link("first").is_none());
    assert!(body.link("last").is_none());

    let items = body.embedded_entry("books").and_then(Embedded::as_array).unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(items[0].self_link().unwrap().href, "http://localhost/books/6");
    assert_eq!(items[0].property("title"), Some(&json!("Volume 6")));
}

#[tokio::test]
async fn collection_rejects_non_numeric_windows() {
    let books = shelf();
    let config = HalConfig::default();
    let request = request(Method::GET, "/books?size=ten").with_query("size", "ten");

    let result = ResourceStateMachine::new(GetCollectionState::new(&books), &request, &config)
        .build()
        .await;

    assert!(matches!(result, Err(ResourceError::Validation(_))));
    assert_eq!(books.calls(Operation::LoadPage), 0);
}

#[tokio::test]
async fn post_creates_with_location() {
    let books = shelf();
    let config = HalConfig::default();
    let clock = FixedClock::at_millis(42_000);
    let request = request(Method::POST, "/books").with_body(json!({ "title": "Persuasion", "tags": ["classic"] }));

    let response = ResourceStateMachine::new(PostState::new(&books), &request, &config)
        .with_clock(&clock)
        .build()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.header(&LOCATION), Some("http://localhost/books/b1"));
    let body = response.body().unwrap();
    assert_eq!(body.property("tags"), Some(&json!(["classic"])));
    let created = books.get("b1").unwrap();
    assert_eq!(created.created_at, 42_000);
    assert_eq!(created.modified_at, 42_000);
}

#[tokio::test]
async fn save_failures_are_internal_and_hide_details() {
    let books = shelf();
    books.fail(Operation::Save);
    let config = HalConfig::default();
    let request = request(Method::POST, "/books").with_body(json!({ "title": "Persuasion" }));

    let error = ResourceStateMachine::new(PostState::new(&books), &request, &config)
        .build()
        .await
        .unwrap_err();

    assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error.message(), "An unexpected error occurred.");
}

#[tokio::test]
async fn update_failures_name_the_state_and_leave_the_model() {
    let books = shelf();
    books.fail(Operation::Update);
    let config = HalConfig::default();
    let body = json!({ "id": "1", "title": "Dune Messiah" });

    let replace = request(Method::PUT, "/books/1").with_param("id", "1").with_body(body.clone());
    let result = ResourceStateMachine::new(PutState::new(&books), &replace, &config)
        .build()
        .await;
    assert_eq!(
        result,
        Err(ResourceError::Internal {
            state: "PutState",
            operation: "update"
        })
    );

    let tag = entity_tag(&books.get("1").unwrap()).unwrap();
    let conditional = request(Method::PUT, "/books/1")
        .with_param("id", "1")
        .with_header(IF_MATCH, HeaderValue::from_str(&tag).unwrap())
        .with_body(body);
    let result = ResourceStateMachine::new(ConditionalPutState::new(&books), &conditional, &config)
        .build()
        .await;
    assert_eq!(
        result,
        Err(ResourceError::Internal {
            state: "ConditionalPutState",
            operation: "update"
        })
    );

    assert_eq!(books.calls(Operation::Update), 2);
    assert_eq!(books.get("1").unwrap().title, "Dune");
}

#[tokio::test]
async fn delete_failures_name_the_state_and_keep_the_model() {
    let books = shelf();
    books.fail(Operation::Delete);
    let config = HalConfig::default();

    let unconditional = request(Method::DELETE, "/books/1").with_param("id", "1");
    let result = ResourceStateMachine::new(DeleteState::new(&books), &unconditional, &config)
        .build()
        .await;
    assert_eq!(
        result,
        Err(ResourceError::Internal {
            state: "DeleteState",
            operation: "delete"
        })
    );

    let tag = entity_tag(&books.get("1").unwrap()).unwrap();
    let conditional = request(Method::DELETE, "/books/1")
        .with_param("id", "1")
        .with_header(IF_MATCH, HeaderValue::from_str(&tag).unwrap());
    let result = ResourceStateMachine::new(ConditionalDeleteState::new(&books), &conditional, &config)
        .build()
        .await;
    assert_eq!(
        result,
        Err(ResourceError::Internal {
            state: "ConditionalDeleteState",
            operation: "delete"
        })
    );

    assert_eq!(books.calls(Operation::Delete), 2);
    assert!(books.get("1").is_some());
}

#[tokio::test]
async fn collection_load_failures_are_internal() {
    let books = shelf();
    books.fail(Operation::LoadPage);
    let config = HalConfig::default();
    let request = request(Method::GET, "/books");

    let result = ResourceStateMachine::new(GetCollectionState::new(&books), &request, &config)
        .build()
        .await;

    assert_eq!(
        result,
        Err(ResourceError::Internal {
            state: "GetCollectionState",
            operation: "load_collection"
        })
    );
    assert_eq!(books.calls(Operation::LoadPage), 1);
}

#[tokio::test]
async fn put_replaces_without_loading() {
    let books = shelf();
    let config = HalConfig::default();
    let request = request(Method::PUT, "/books/2")
        .with_param("id", "2")
        .with_body(json!({ "id": "2", "title": "Emma (annotated)" }));

    let response = ResourceStateMachine::new(PutState::new(&books), &request, &config)
        .build()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(books.calls(Operation::Load), 0);
    assert_eq!(books.get("2").unwrap().title, "Emma (annotated)");
}

#[tokio::test]
async fn delete_and_conditional_delete() {
    let books = shelf();
    let config = HalConfig::default();

    let unconditional = request(Method::DELETE, "/books/2").with_param("id", "2");
    let response = ResourceStateMachine::new(DeleteState::new(&books), &unconditional, &config)
        .build()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(books.get("2").is_none());

    let missing = request(Method::DELETE, "/books/2")
        .with_param("id", "2")
        .with_header(IF_MATCH, HeaderValue::from_static("\"any\""));
    let result = ResourceStateMachine::new(ConditionalDeleteState::new(&books), &missing, &config)
        .build()
        .await;
    assert_eq!(result, Err(ResourceError::NotFound));

    let tag = entity_tag(&books.get("1").unwrap()).unwrap();
    let current = request(Method::DELETE, "/books/1")
        .with_param("id", "1")
        .with_header(IF_MATCH, HeaderValue::from_str(&tag).unwrap());
    let response = ResourceStateMachine::new(ConditionalDeleteState::new(&books), &current, &config)
        .build()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(books.is_empty());
}

proptest! {
    #[test]
    fn collection_links_always_include_self(offset in 0u64..40, size in 1u64..15) {
        let books = shelf();
        for id in 3..=30 {
            books.insert(Book::new(id.to_string(), "x"));
        }
        let config = HalConfig::default();
        let request = request(Method::GET, "/books")
            .with_query("offset", offset.to_string())
            .with_query("size", size.to_string());

        let response = tokio_test::block_on(
            ResourceStateMachine::new(GetCollectionState::new(&books), &request, &config).build(),
        )
        .unwrap();

        let body = response.body().unwrap();
        prop_assert!(body.self_link().is_some());
        prop_assert_eq!(body.property("totalCount"), Some(&json!(30)));
        for relation in ["first", "prev", "next", "last"] {
            if let Some(links) = body.link(relation) {
                prop_assert!(links.as_link().unwrap().href.starts_with("http://localhost/books?"));
            }
        }
    }
}
