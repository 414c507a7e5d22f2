//! In-process fake of the Vault HTTP API.
//!
//! Implements just enough of KV v2 and the Kubernetes auth method for hvc:
//! `GET {mount}/metadata/{path}`, `GET {mount}/data/{path}`,
//! `POST {mount}/data/{path}` and `POST auth/{mount}/login`.
//!
//! The server runs on its own thread and runtime so both blocking CLI tests
//! and `#[tokio::test]` functions can use it.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use super::fixtures::ROOT_TOKEN;

type Shared = Arc<Mutex<FakeState>>;

struct Entry {
    data: Value,
    updated_time: String,
    version: u64,
}

#[derive(Default)]
struct FakeState {
    tokens: HashSet<String>,
    secrets: HashMap<(String, String), Entry>,
    /// (auth mount, role) to (jwt, issued token).
    logins: HashMap<(String, String), (String, String)>,
    failing: HashSet<String>,
    reads: HashMap<String, usize>,
    writes: HashMap<String, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Metadata,
    Data,
}

/// Handle to a running fake Vault server.
pub struct FakeVault {
    address: String,
    state: Shared,
}

impl FakeVault {
    /// Start a server on an ephemeral local port accepting [`ROOT_TOKEN`].
    pub fn start() -> Self {
        let listener =
            std::net::TcpListener::bind("127.0.0.1:0").expect("failed to bind fake vault");
        listener
            .set_nonblocking(true)
            .expect("failed to configure fake vault listener");
        let addr = listener.local_addr().expect("fake vault has no address");

        let mut initial = FakeState::default();
        initial.tokens.insert(ROOT_TOKEN.to_string());
        let state = Arc::new(Mutex::new(initial));

        let app = Router::new()
            .route("/v1/{*path}", get(read).post(write))
            .with_state(Arc::clone(&state));

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build fake vault runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener)
                    .expect("failed to adopt fake vault listener");
                axum::serve(listener, app)
                    .await
                    .expect("fake vault server failed");
            });
        });

        Self {
            address: format!("http://{}", addr),
            state,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Store `data` at `mount/path` with an explicit `updated_time`.
    pub fn insert(&self, mount: &str, path: &str, data: Value, updated_time: &str) {
        let mut state = self.state.lock().unwrap();
        let key = (mount.to_string(), path.to_string());
        let version = state.secrets.get(&key).map_or(1, |e| e.version + 1);
        state.secrets.insert(
            key,
            Entry {
                data,
                updated_time: updated_time.to_string(),
                version,
            },
        );
    }

    /// Current payload at `mount/path`.
    pub fn get(&self, mount: &str, path: &str) -> Option<Value> {
        let state = self.state.lock().unwrap();
        state
            .secrets
            .get(&(mount.to_string(), path.to_string()))
            .map(|e| e.data.clone())
    }

    /// Answer every request for the API path `path` with a 500.
    pub fn fail(&self, path: &str) {
        self.state.lock().unwrap().failing.insert(path.to_string());
    }

    /// Accept Kubernetes logins for `role` on `mount` presenting `jwt`.
    pub fn allow_kubernetes(&self, mount: &str, role: &str, jwt: &str, token: &str) {
        self.state.lock().unwrap().logins.insert(
            (mount.to_string(), role.to_string()),
            (jwt.to_string(), token.to_string()),
        );
    }

    /// Number of reads of the API path `path`.
    pub fn reads_of(&self, path: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.reads.get(path).copied().unwrap_or(0)
    }

    /// Number of writes to the API path `path`.
    pub fn writes_of(&self, path: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.writes.get(path).copied().unwrap_or(0)
    }

    /// Number of writes across every path.
    pub fn total_writes(&self) -> usize {
        self.state.lock().unwrap().writes.values().sum()
    }
}

fn errors(status: StatusCode, message: &str) -> Response {
    let errors: Vec<&str> = if message.is_empty() {
        Vec::new()
    } else {
        vec![message]
    };
    (status, Json(json!({ "errors": errors }))).into_response()
}

fn authorized(state: &FakeState, headers: &HeaderMap) -> bool {
    headers
        .get("X-Vault-Token")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|token| state.tokens.contains(token))
}

/// Split `kv/data/app/db` into `("kv", Data, "app/db")`.
fn split(path: &str) -> Option<(String, Kind, String)> {
    [("/metadata/", Kind::Metadata), ("/data/", Kind::Data)]
        .into_iter()
        .filter_map(|(marker, kind)| path.find(marker).map(|at| (at, marker, kind)))
        .min_by_key(|(at, _, _)| *at)
        .map(|(at, marker, kind)| {
            (
                path[..at].to_string(),
                kind,
                path[at + marker.len()..].to_string(),
            )
        })
}

async fn read(State(state): State<Shared>, Path(path): Path<String>, headers: HeaderMap) -> Response {
    let mut state = state.lock().unwrap();
    if !authorized(&state, &headers) {
        return errors(StatusCode::FORBIDDEN, "permission denied");
    }
    *state.reads.entry(path.clone()).or_default() += 1;
    if state.failing.contains(&path) {
        return errors(StatusCode::INTERNAL_SERVER_ERROR, "internal error");
    }

    let Some((mount, kind, secret)) = split(&path) else {
        return errors(StatusCode::NOT_FOUND, "");
    };
    let Some(entry) = state.secrets.get(&(mount, secret)) else {
        return errors(StatusCode::NOT_FOUND, "");
    };

    let body = match kind {
        Kind::Metadata => json!({
            "data": {
                "updated_time": entry.updated_time,
                "current_version": entry.version,
            }
        }),
        Kind::Data => json!({
            "data": {
                "data": entry.data,
                "metadata": { "version": entry.version },
            }
        }),
    };
    Json(body).into_response()
}

async fn write(
    State(state): State<Shared>,
    Path(path): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();

    if let Some(mount) = path
        .strip_prefix("auth/")
        .and_then(|p| p.strip_suffix("/login"))
    {
        let role = body["role"].as_str().unwrap_or_default().to_string();
        let jwt = body["jwt"].as_str().unwrap_or_default();
        let issued = match state.logins.get(&(mount.to_string(), role)) {
            Some((expected, token)) if expected == jwt => token.clone(),
            _ => return errors(StatusCode::BAD_REQUEST, "invalid role or JWT"),
        };
        state.tokens.insert(issued.clone());
        return Json(json!({ "auth": { "client_token": issued } })).into_response();
    }

    if !authorized(&state, &headers) {
        return errors(StatusCode::FORBIDDEN, "permission denied");
    }
    if state.failing.contains(&path) {
        return errors(StatusCode::INTERNAL_SERVER_ERROR, "internal error");
    }

    let Some((mount, Kind::Data, secret)) = split(&path) else {
        return errors(StatusCode::METHOD_NOT_ALLOWED, "unsupported path");
    };
    let Some(data) = body.get("data").filter(|d| d.is_object()).cloned() else {
        return errors(StatusCode::BAD_REQUEST, "no data provided");
    };

    *state.writes.entry(path.clone()).or_default() += 1;
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
    let key = (mount, secret);
    let version = state.secrets.get(&key).map_or(1, |e| e.version + 1);
    state.secrets.insert(
        key,
        Entry {
            data,
            updated_time: now.clone(),
            version,
        },
    );

    Json(json!({ "data": { "version": version, "created_time": now } })).into_response()
}
