use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::json;
use tokio::time::sleep;

use crate::{
    blog,
    contact::{self, ContactReport, DeskStatus},
    error::AppError,
    extract::{AppJson, AppQuery, JsonOrDefault},
    model::Book,
    schema::{
        ContactSchema, CreateBookSchema, CreateTaskSchema, EnhancePageSchema, ReorderTasksSchema,
        TaskFilterOptions, ThemeSchema, UpdateBookSchema,
    },
    tasks::{Board, TaskView},
    theme::ThemePreference,
    AppState,
};

// Path ids that are not integers never match a record
fn parse_id(raw: &str, what: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::NotFound(format!("{what} not found")))
}

// Handler for the health checker route
pub async fn health_checker_handler() -> impl IntoResponse {
    const MESSAGE: &str = "Book API, task tracker, contact desk and user directory with Rust and Axum";

    Json(json!({
        "status": "success",
        "message": MESSAGE
    }))
}

// Handler for listing all books in insertion order
pub async fn get_books(State(data): State<Arc<AppState>>) -> Json<Vec<Book>> {
    Json(data.books.lock().await.list())
}

// Handler for creating a new Book
pub async fn create_book(
    State(data): State<Arc<AppState>>,
    JsonOrDefault(body): JsonOrDefault<CreateBookSchema>,
) -> Result<impl IntoResponse, AppError> {
    let book = data.books.lock().await.create(body.title, body.author)?;
    tracing::info!(id = book.id, "Created book");

    Ok((StatusCode::CREATED, Json(book)))
}

// Handler for partially updating a Book by ID
pub async fn update_book(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    JsonOrDefault(body): JsonOrDefault<UpdateBookSchema>,
) -> Result<Json<Book>, AppError> {
    let id = parse_id(&id, "Book")?;
    let book = data.books.lock().await.update(id, body.title, body.author)?;

    Ok(Json(book))
}

// Handler for deleting a Book by ID, returns the removed record
pub async fn delete_book(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
) -> Result<Json<Book>, AppError> {
    let id = parse_id(&id, "Book")?;
    let book = data.books.lock().await.delete(id)?;
    tracing::info!(id, "Deleted book");

    Ok(Json(book))
}

// Handler for rendering the task board under a filter
pub async fn get_tasks(
    State(data): State<Arc<AppState>>,
    AppQuery(options): AppQuery<TaskFilterOptions>,
) -> Json<Board> {
    let tracker = data.tasks.lock().await;
    Json(tracker.render(options.filter, Utc::now()))
}

// Handler for adding a task at the head of the list
pub async fn create_task(
    State(data): State<Arc<AppState>>,
    AppJson(body): AppJson<CreateTaskSchema>,
) -> Result<impl IntoResponse, AppError> {
    let (task, notice) = data.tasks.lock().await.add(&body.title, body.due_date).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"status": "success", "notice": notice, "data": {"task": task}})),
    ))
}

pub async fn toggle_task(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "Task")?;
    let (task, notice) = data.tasks.lock().await.toggle(id).await?;

    Ok(Json(json!({"status": "success", "notice": notice, "data": {"task": task}})))
}

// Handler for deleting a task; the task shows as removing for the configured delay first
pub async fn delete_task(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "Task")?;
    data.tasks.lock().await.mark_removing(id)?;

    sleep(data.config.task_delete_delay).await;

    let (task, notice) = data.tasks.lock().await.delete(id).await?;

    Ok(Json(json!({"status": "success", "notice": notice, "data": {"task": task}})))
}

pub async fn reorder_tasks(
    State(data): State<Arc<AppState>>,
    AppJson(body): AppJson<ReorderTasksSchema>,
) -> Result<impl IntoResponse, AppError> {
    let mut tracker = data.tasks.lock().await;
    let tasks = tracker.reorder(body.dragged_id, body.target_id).await?;

    Ok(Json(json!({"status": "success", "data": {"tasks": tasks}})))
}

// Handler returning the views computed by the latest countdown tick
pub async fn get_countdown(State(data): State<Arc<AppState>>) -> Json<Vec<TaskView>> {
    Json(data.countdown.borrow().clone())
}

fn theme_response(theme: ThemePreference) -> Json<serde_json::Value> {
    Json(json!({"theme": theme, "icon": theme.icon()}))
}

pub async fn get_theme(State(data): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let theme = ThemePreference::load(&data.storage).await?;
    Ok(theme_response(theme))
}

pub async fn set_theme(
    State(data): State<Arc<AppState>>,
    AppJson(body): AppJson<ThemeSchema>,
) -> Result<impl IntoResponse, AppError> {
    body.theme.save(&data.storage).await?;
    Ok(theme_response(body.theme))
}

pub async fn toggle_theme(
    State(data): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let theme = ThemePreference::toggle(&data.storage).await?;
    Ok(theme_response(theme))
}

// Handler for submitting the contact form; resolves once the simulated send is confirmed
pub async fn submit_contact(
    State(data): State<Arc<AppState>>,
    AppJson(body): AppJson<ContactSchema>,
) -> Result<impl IntoResponse, AppError> {
    let contact = data.contact.submit(&body).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Thank you! Your message has been sent successfully.",
        "data": {"contact": contact}
    })))
}

pub async fn validate_contact(AppJson(body): AppJson<ContactSchema>) -> Json<ContactReport> {
    Json(contact::report(&body))
}

pub async fn contact_status(State(data): State<Arc<AppState>>) -> Json<DeskStatus> {
    Json(data.contact.status().await)
}

// Handler for fetching and rendering the user directory; every call re-fetches
pub async fn get_users(State(data): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let listing = data.directory.listing().await?;

    Ok(Json(json!({
        "status": "success",
        "results": listing.cards.len(),
        "stats": listing.stats,
        "notice": listing.notice,
        "users": listing.cards
    })))
}

pub async fn enhance_page(AppJson(body): AppJson<EnhancePageSchema>) -> Json<blog::EnhancementPlan> {
    Json(blog::enhance(&body.html, &body.intersections, &body.resizes))
}
