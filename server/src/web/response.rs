// server/src/web/response.rs

//! The JSON envelope every endpoint answers with.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
  Success,
  Failure,
}

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
  pub status: Outcome,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data: Option<T>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<Value>,
}

pub fn success<T: Serialize>(status: StatusCode, message: impl Into<String>, data: T) -> HttpResponse {
  HttpResponse::build(status).json(Envelope {
    status: Outcome::Success,
    message: message.into(),
    data: Some(data),
    error: None,
  })
}

pub fn failure(status: StatusCode, message: impl Into<String>, error: Option<Value>) -> HttpResponse {
  HttpResponse::build(status).json(Envelope::<Value> {
    status: Outcome::Failure,
    message: message.into(),
    data: None,
    error,
  })
}
