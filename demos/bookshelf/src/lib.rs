//! Bookshelf: a `books` HAL resource served through every lifecycle state.
//!
//! | Route | Method | State |
//! |---|---|---|
//! | `/books` | GET | `GetCollectionState` |
//! | `/books` | POST | `PostState` |
//! | `/books/:id` | GET | `GetState` |
//! | `/books/:id` | PUT | `ConditionalPutState` with `If-Match`/`If-Unmodified-Since`, `PutState` otherwise |
//! | `/books/:id` | DELETE | `ConditionalDeleteState` with `If-Match`/`If-Unmodified-Since`, `DeleteState` otherwise |

use axum::{Router, extract::State, routing::get};
use http::header::{IF_MATCH, IF_UNMODIFIED_SINCE};
use resourceful_core::state::{
    ConditionalDeleteState, ConditionalPutState, DeleteState, GetCollectionState, GetState, Hooks,
    PostState, PutState, model_from_body,
};
use resourceful_core::{CollectionResult, HalConfig, Model, ResourceError, ResourceStateMachine};
use resourceful_testing::InMemoryRepository;
use resourceful_web::{HalRequest, HalResponse, ResourceState, WebResult, trace_layer};
use serde::{Deserialize, Serialize};

/// A book on the shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Identifier, assigned on creation
    #[serde(default)]
    pub id: String,
    /// Title
    pub title: String,
    /// Author, sent as an embedded resource
    #[serde(default)]
    pub author: Option<Author>,
    /// Pinned books cannot be deleted
    #[serde(default)]
    pub pinned: bool,
    /// Creation time in epoch milliseconds
    #[serde(default)]
    pub created_at: i64,
    /// Last modification time in epoch milliseconds
    #[serde(default)]
    pub modified_at: i64,
}

/// A book's author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Identifier
    pub id: String,
    /// Display name
    pub name: String,
}

impl Model for Book {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn modified_at(&self) -> i64 {
        self.modified_at
    }

    fn set_created_at(&mut self, millis: i64) {
        self.created_at = millis;
    }

    fn set_modified_at(&mut self, millis: i64) {
        self.modified_at = millis;
    }
}

/// Book storage.
pub type Shelf = InMemoryRepository<Book>;

/// Router state.
pub type AppState = ResourceState<Shelf>;

/// An empty shelf numbering new books 1, 2, ...
#[must_use]
pub fn shelf() -> Shelf {
    InMemoryRepository::new().with_id_assigner(|book: &mut Book, id| book.id = id.to_string())
}

/// The bookshelf routes.
#[must_use]
pub fn router(config: HalConfig, shelf: Shelf) -> Router {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/:id",
            get(show_book).put(replace_book).delete(remove_book),
        )
        .layer(trace_layer())
        .with_state(ResourceState::new(config, shelf))
}

fn is_conditional(request: &HalRequest) -> bool {
    request.header(IF_MATCH).is_some() || request.header(IF_UNMODIFIED_SINCE).is_some()
}

fn book_hooks() -> Hooks<Book> {
    Hooks::new()
        .define_links(|builder| builder.with_absolute_link("collection", "/books"))
        .define_embedded(|builder| {
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
        })
}

fn validated(book: Book) -> Result<Book, ResourceError> {
    if book.title.trim().is_empty() {
        return Err(ResourceError::Validation("body/title must not be empty".into()));
    }
    Ok(book)
}

async fn list_books(State(state): State<AppState>, request: HalRequest) -> WebResult<HalResponse> {
    let hooks = Hooks::<CollectionResult<Book>>::new().define_embedded(|builder| {
        let results = &builder.model().results;
        builder.with_embedded_array("books", results, "/books/{id}", |items| items.with_properties())
    });
    let response = ResourceStateMachine::new(GetCollectionState::new(&*state.store), &request, &state.config)
        .with_hooks(hooks)
        .build()
        .await?;
    Ok(response.into())
}

async fn create_book(State(state): State<AppState>, request: HalRequest) -> WebResult<HalResponse> {
    let lifecycle = PostState::new(&*state.store)
        .with_factory(|request| model_from_body(request).and_then(validated));
    let response = ResourceStateMachine::new(lifecycle, &request, &state.config)
        .with_hooks(book_hooks())
        .build()
        .await?;
    Ok(response.into())
}

async fn show_book(State(state): State<AppState>, request: HalRequest) -> WebResult<HalResponse> {
    let response = ResourceStateMachine::new(GetState::new(&*state.store), &request, &state.config)
        .with_hooks(book_hooks())
        .build()
        .await?;
    Ok(response.into())
}

async fn replace_book(State(state): State<AppState>, request: HalRequest) -> WebResult<HalResponse> {
    let response = if is_conditional(&request) {
        // The stored id wins over whatever the body claims.
        let lifecycle = ConditionalPutState::new(&*state.store).with_factory(|request, current: &Book| {
            let replacement: Book = model_from_body(request)?;
            validated(Book {
                id: current.id.clone(),
                created_at: current.created_at,
                ..replacement
            })
        });
        ResourceStateMachine::new(lifecycle, &request, &state.config)
            .with_hooks(book_hooks())
            .build()
            .await?
    } else {
        let lifecycle = PutState::new(&*state.store)
            .with_factory(|request| model_from_body(request).and_then(validated));
        ResourceStateMachine::new(lifecycle, &request, &state.config)
            .with_hooks(book_hooks())
            .build()
            .await?
    };
    Ok(response.into())
}

async fn remove_book(State(state): State<AppState>, request: HalRequest) -> WebResult<HalResponse> {
    let response = if is_conditional(&request) {
        let lifecycle = ConditionalDeleteState::new(&*state.store).before_delete(|_request, book| {
            let pinned = book.pinned;
            Box::pin(async move {
                if pinned {
                    return Err(ResourceError::Validation("pinned books cannot be deleted".into()));
                }
                Ok(())
            })
        });
        ResourceStateMachine::new(lifecycle, &request, &state.config)
            .build()
            .await?
    } else {
        ResourceStateMachine::new(DeleteState::new(&*state.store), &request, &state.config)
            .build()
            .await?
    };
    Ok(response.into())
}
