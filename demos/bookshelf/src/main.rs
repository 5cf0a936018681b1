//! Bookshelf HTTP server.
//!
//! ```text
//! curl -i localhost:3000/books?size=2
//! curl -i -X POST localhost:3000/books -d '{"title":"Persuasion"}'
//! ```
//!
//! Configuration comes from `HAL_BASE_URL`, `HAL_HYPERTEXT_CACHE_PATTERN`,
//! `HAL_PAGINATION_DEFAULT_SIZE`, `HAL_PAGINATION_DEFAULT_OFFSET` and
//! `BOOKSHELF_ADDR` (default `127.0.0.1:3000`).

use bookshelf::{Author, Book, router, shelf};
use resourceful_core::HalConfig;
use resourceful_core::environment::{Clock, SystemClock};
use resourceful_core::metrics::describe_metrics;
use resourceful_core::state::SaveModel;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookshelf=info,resourceful_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    describe_metrics();

    let config = HalConfig::from_env()?;
    info!(
        base_url = config.base_url().unwrap_or("<from Host header>"),
        hypertext_cache_pattern = config.hypertext_cache_pattern,
        default_size = config.pagination.default_size,
        "Configuration loaded"
    );

    let books = shelf();
    let now = SystemClock.now_millis();
    for (title, author) in [
        ("Dune", Some(("1", "Frank Herbert"))),
        ("Emma", Some(("2", "Jane Austen"))),
        ("The Left Hand of Darkness", Some(("3", "Ursula K. Le Guin"))),
        ("Beowulf", None),
    ] {
        let book = Book {
            id: String::new(),
            title: title.to_string(),
            author: author.map(|(id, name)| Author {
                id: id.to_string(),
                name: name.to_string(),
            }),
            pinned: title == "Dune",
            created_at: now,
            modified_at: now,
        };
        books.save(book).await?;
    }
    info!(count = books.len(), "Shelf stocked");

    let addr = std::env::var("BOOKSHELF_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, router(config, books))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = signal::ctrl_c().await {
        tracing::error!(error = %error, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
