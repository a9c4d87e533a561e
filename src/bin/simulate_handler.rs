//! AWS Lambda handler serving `POST /simulate/coffee`
//!
//! Runs the same projection engine the client uses, so both variants agree.
//! Accepts `{"price_each", "per_week", "years", "annual_rate"}` as numbers or
//! numeric strings. Malformed JSON is a 400; rejected inputs are a 422 with a
//! `detail` message.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use aws_lambda_events::event::lambda_function_urls::LambdaFunctionUrlRequest;
use finance_advisor::projection::{ProjectionEngine, ProjectionParameters};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Function URL response envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HttpResponse {
    status_code: u16,
    headers: HashMap<String, String>,
    body: String,
    is_base64_encoded: bool,
}

impl HttpResponse {
    fn json(status_code: u16, body: &Value) -> Self {
        let mut headers = cors_headers();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code,
            headers,
            body: body.to_string(),
            is_base64_encoded: false,
        }
    }

    fn error(status_code: u16, detail: impl Into<String>) -> Self {
        Self::json(status_code, &json!({ "detail": detail.into() }))
    }
}

fn cors_headers() -> HashMap<String, String> {
    HashMap::from([
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        ("Access-Control-Allow-Methods".to_string(), "POST, OPTIONS".to_string()),
        ("Access-Control-Allow-Headers".to_string(), "Content-Type".to_string()),
    ])
}

/// Turn a request body into a response; split out from the handler for tests
fn simulate(body: &str) -> HttpResponse {
    let payload: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => return HttpResponse::error(400, format!("Invalid JSON: {}", e)),
    };

    let engine = match ProjectionParameters::from_json(&payload).and_then(ProjectionEngine::new) {
        Ok(engine) => engine,
        Err(e) => {
            log::debug!("rejected simulate request: {}", e);
            return HttpResponse::error(422, e.to_string());
        }
    };

    let result = engine.run();
    match serde_json::to_value(&result) {
        Ok(body) => HttpResponse::json(200, &body),
        Err(e) => HttpResponse::error(500, e.to_string()),
    }
}

/// Lambda handler function
async fn handler(event: LambdaEvent<LambdaFunctionUrlRequest>) -> Result<HttpResponse, Error> {
    let start = std::time::Instant::now();
    let request = event.payload;

    // Handle CORS preflight
    if request.request_context.http.method.as_deref() == Some("OPTIONS") {
        return Ok(HttpResponse {
            status_code: 200,
            headers: cors_headers(),
            body: String::new(),
            is_base64_encoded: false,
        });
    }

    if request.is_base64_encoded {
        return Ok(HttpResponse::error(400, "binary request bodies are not supported"));
    }

    let response = simulate(request.body.as_deref().unwrap_or("{}"));
    log::info!(
        "simulate returned {} in {} ms",
        response.status_code,
        start.elapsed().as_millis()
    );
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
