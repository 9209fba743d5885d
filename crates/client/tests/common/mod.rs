//! Shared test harness: an in-memory stub of the taskdeck backend.
//!
//! Spins up real axum servers on ephemeral ports so the client is
//! exercised over actual HTTP, including header attachment and body
//! decoding. The stub mirrors the backend's routes and status codes but
//! keeps tasks in a `Mutex<HashMap>` and issues unsigned tokens.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use uuid::Uuid;

use taskdeck_core::models::{Task, TaskPayload, User, UserRole};

/// Fixed user the stub issues tokens for.
pub const USER_ID: &str = "9f0c4f9c-0c24-4f90-b0fb-ff1d79b1cbd1";

/// Fixed email for the stub user.
pub const USER_EMAIL: &str = "tester@example.com";

type TaskMap = Arc<Mutex<HashMap<Uuid, Task>>>;

/// Serve the given router on an ephemeral port and return its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve stub");
    });

    format!("http://{addr}")
}

/// Spawn the full stub task API and return its base URL.
pub async fn spawn_task_api() -> String {
    spawn_server(task_api_router()).await
}

/// Build an unsigned three-segment token whose payload carries `sub`.
pub fn token_for_subject(sub: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{sub}"}}"#));
    format!("{header}.{payload}.stub-signature")
}

/// The stub backend's router: auth endpoints plus per-user task CRUD.
pub fn task_api_router() -> Router {
    let tasks: TaskMap = Arc::new(Mutex::new(HashMap::new()));

    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .route("/api/{user_id}/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/{user_id}/tasks/{task_id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route(
            "/api/{user_id}/tasks/{task_id}/complete",
            patch(toggle_complete),
        )
        .with_state(tasks)
}

/// Build the stub's user record.
fn stub_user() -> User {
    User {
        id: USER_ID.parse().expect("stub user id is a valid uuid"),
        email: USER_EMAIL.to_string(),
        role: UserRole::User,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Reject requests without a bearer token, the way the backend does.
fn require_bearer(headers: &HeaderMap) -> Result<(), StatusCode> {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer "));
    if authorized {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

async fn register(Json(body): Json<serde_json::Value>) -> Result<Json<User>, StatusCode> {
    if body.get("email").and_then(|v| v.as_str()).is_none() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    Ok(Json(stub_user()))
}

async fn login(Json(_body): Json<serde_json::Value>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "access_token": token_for_subject(USER_ID),
        "token_type": "bearer",
    }))
}

async fn logout() -> Json<serde_json::Value> {
    Json(serde_json::json!({"message": "Logged out successfully"}))
}

async fn me(headers: HeaderMap) -> Result<Json<User>, StatusCode> {
    require_bearer(&headers)?;
    Ok(Json(stub_user()))
}

async fn list_tasks(
    State(tasks): State<TaskMap>,
    Path(user_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Vec<Task>>, StatusCode> {
    require_bearer(&headers)?;
    let tasks = tasks.lock().unwrap();
    let mut owned: Vec<Task> = tasks
        .values()
        .filter(|t| t.user_id == user_id)
        .cloned()
        .collect();
    owned.sort_by_key(|t| t.created_at);
    Ok(Json(owned))
}

async fn create_task(
    State(tasks): State<TaskMap>,
    Path(user_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<TaskPayload>,
) -> Result<(StatusCode, Json<Task>), StatusCode> {
    require_bearer(&headers)?;
    if payload.title.is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let now = Utc::now();
    let task = Task {
        id: Uuid::new_v4(),
        title: payload.title,
        description: payload.description,
        completed: false,
        user_id,
        created_at: now,
        updated_at: now,
    };
    tasks.lock().unwrap().insert(task.id, task.clone());
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(
    State(tasks): State<TaskMap>,
    Path((_user_id, task_id)): Path<(Uuid, Uuid)>,
    headers: HeaderMap,
) -> Result<Json<Task>, StatusCode> {
    require_bearer(&headers)?;
    tasks
        .lock()
        .unwrap()
        .get(&task_id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_task(
    State(tasks): State<TaskMap>,
    Path((_user_id, task_id)): Path<(Uuid, Uuid)>,
    headers: HeaderMap,
    Json(payload): Json<TaskPayload>,
) -> Result<Json<Task>, StatusCode> {
    require_bearer(&headers)?;
    let mut tasks = tasks.lock().unwrap();
    let task = tasks.get_mut(&task_id).ok_or(StatusCode::NOT_FOUND)?;
    task.title = payload.title;
    task.description = payload.description;
    task.updated_at = Utc::now();
    Ok(Json(task.clone()))
}

async fn toggle_complete(
    State(tasks): State<TaskMap>,
    Path((_user_id, task_id)): Path<(Uuid, Uuid)>,
    headers: HeaderMap,
) -> Result<Json<Task>, StatusCode> {
    require_bearer(&headers)?;
    let mut tasks = tasks.lock().unwrap();
    let task = tasks.get_mut(&task_id).ok_or(StatusCode::NOT_FOUND)?;
    task.completed = !task.completed;
    task.updated_at = Utc::now();
    Ok(Json(task.clone()))
}

async fn delete_task(
    State(tasks): State<TaskMap>,
    Path((_user_id, task_id)): Path<(Uuid, Uuid)>,
    headers: HeaderMap,
) -> Result<StatusCode, StatusCode> {
    require_bearer(&headers)?;
    tasks
        .lock()
        .unwrap()
        .remove(&task_id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}
