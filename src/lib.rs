//! Web exercise suite served from one axum application: a book API, a task
//! tracker with snapshot persistence, a contact form desk, a user directory
//! viewer and blog page enhancements.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};

pub mod blog;
pub mod books;
pub mod config;
pub mod contact;
pub mod directory;
pub mod error;
pub mod extract;
pub mod handler;
pub mod middleware;
pub mod model;
pub mod route;
pub mod schema;
pub mod storage;
pub mod tasks;
pub mod theme;

use books::BookStore;
use config::Config;
use contact::ContactDesk;
use directory::Directory;
use error::AppError;
use storage::Storage;
use tasks::{spawn_countdown_ticker, TaskTracker, TaskView};

// Struct representing the application state
pub struct AppState {
    pub config: Config,
    pub storage: Storage,
    pub books: Mutex<BookStore>,
    pub tasks: Arc<Mutex<TaskTracker>>,
    pub countdown: watch::Receiver<Vec<TaskView>>,
    pub contact: ContactDesk,
    pub directory: Directory,
}

impl AppState {
    /// Opens storage, restores the task snapshot and starts the countdown ticker.
    pub async fn new(config: Config) -> Result<Arc<Self>, AppError> {
        let storage = Storage::connect(&config.database_url).await?;
        let tracker = Arc::new(Mutex::new(TaskTracker::load(storage.clone()).await?));

        let (tick, countdown) = watch::channel(Vec::new());
        spawn_countdown_ticker(tracker.clone(), tick, config.countdown_period);

        let books = if config.seed_books {
            BookStore::seeded()
        } else {
            BookStore::default()
        };

        Ok(Arc::new(Self {
            books: Mutex::new(books),
            tasks: tracker,
            countdown,
            contact: ContactDesk::new(config.contact),
            directory: Directory::new(&config.users_source),
            storage,
            config,
        }))
    }
}
