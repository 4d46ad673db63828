//! In-process stand-in for the optimization service.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use portfolio_client::config::ServiceConfig;
use portfolio_client::dispatch::HttpOptimizer;
use serde_json::{json, Value};

/// Request bodies received by the stub, in arrival order.
pub type Received = Arc<Mutex<Vec<Value>>>;

pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed binding stub listener");
    let addr = listener.local_addr().expect("missing local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server failed");
    });
    format!("http://{addr}")
}

/// Base URL of a port nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed binding probe listener");
    let addr = listener.local_addr().expect("missing local addr");
    drop(listener);
    format!("http://{addr}")
}

pub fn client(base_url: &str) -> HttpOptimizer {
    let settings = ServiceConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        connect_timeout_secs: 2,
        ..ServiceConfig::default()
    };
    HttpOptimizer::new(&settings).expect("failed building client")
}

pub fn detailed_fixture() -> Value {
    json!({
        "optimization_result": {
            "selected": ["Fondo_B", "Fondo_C", "Fondo_E"],
            "total_gain": 9300,
            "total_cost": 10500,
            "capacity_used": 100.0,
            "efficiency": 0.8857
        },
        "statistics": {
            "total_entries": 5,
            "selected_entries": 3,
            "selection_percentage": 60.0,
            "total_gain_available": 13300,
            "gain_obtained": 9300,
            "gain_obtained_percentage": 69.92,
            "total_cost_available": 15500,
            "cost_used": 10500,
            "cost_used_percentage": 67.74
        },
        "efficiencies": [
            { "name": "Fondo_E", "efficiency": 1.2, "gain": 1800, "cost": 1500 },
            { "name": "Fondo_B", "efficiency": 0.875, "gain": 3500, "cost": 4000 },
            { "name": "Fondo_D", "efficiency": 0.8333, "gain": 2500, "cost": 3000 },
            { "name": "Fondo_C", "efficiency": 0.8, "gain": 4000, "cost": 5000 },
            { "name": "Fondo_A", "efficiency": 0.75, "gain": 1500, "cost": 2000 }
        ],
        "performance": { "execution_time_ms": 1.27, "timestamp": 1700000000.25 }
    })
}

pub fn examples_fixture() -> Value {
    json!({
        "examples": {
            "case_1": {
                "description": "Full use of capacity",
                "input": {
                    "capacity": 10000,
                    "entries": [
                        { "name": "Fondo_A", "cost": 2000, "expected_gain": 1500 },
                        { "name": "Fondo_B", "cost": 4000, "expected_gain": 3500 },
                        { "name": "Fondo_C", "cost": 5000, "expected_gain": 4000 },
                        { "name": "Fondo_D", "cost": 3000, "expected_gain": 2500 },
                        { "name": "Fondo_E", "cost": 1500, "expected_gain": 1800 }
                    ]
                },
                "expected_output": {
                    "selected": ["Fondo_B", "Fondo_C", "Fondo_E"],
                    "total_gain": 9300,
                    "total_cost": 10000,
                    "capacity_used": 100.0,
                    "efficiency": 0.93
                }
            },
            "case_2": {
                "description": "Tight capacity",
                "input": {
                    "capacity": 8000,
                    "entries": [
                        { "name": "Stock_X", "cost": 1000, "expected_gain": 800 },
                        { "name": "Bond_Q", "cost": 1500, "expected_gain": 1200 }
                    ]
                }
            }
        }
    })
}

/// A healthy service that records every optimize body it receives.
pub fn healthy_service(received: Received) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/examples", get(examples))
        .route("/optimize/detailed", post(optimize_detailed))
        .route("/optimize", post(optimize))
        .with_state(received)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": 1700000000.0,
        "service": "portfolio-optimizer"
    }))
}

async fn examples() -> Json<Value> {
    Json(examples_fixture())
}

async fn optimize_detailed(State(received): State<Received>, Json(body): Json<Value>) -> Json<Value> {
    received.lock().expect("received mutex poisoned").push(body);
    Json(detailed_fixture())
}

async fn optimize(State(received): State<Received>, Json(body): Json<Value>) -> Json<Value> {
    received.lock().expect("received mutex poisoned").push(body);
    Json(detailed_fixture()["optimization_result"].clone())
}

/// Every route answers with `status` and `body`.
pub fn failing_service(status: StatusCode, body: Value) -> Router {
    let respond = move || {
        let body = body.clone();
        async move { (status, Json(body)).into_response() }
    };
    Router::new()
        .route("/health", get(respond.clone()))
        .route("/examples", get(respond.clone()))
        .route("/optimize/detailed", post(respond.clone()))
        .route("/optimize", post(respond))
}
