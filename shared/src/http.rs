//! HTTP helpers for the Lambda handler.

use lambda_http::{Body, Response};
use serde::Serialize;

use crate::service::Reply;

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(status: u16, data: &T) -> Result<Response<Body>, lambda_http::Error> {
    Ok(Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(data)?))?)
}

/// Create an error response with the given status code and message.
pub fn error_response(status: u16, message: impl Into<String>) -> Result<Response<Body>, lambda_http::Error> {
    json_response(status, &serde_json::json!({ "error": message.into() }))
}

/// Turn a service reply into an API Gateway response.
pub fn reply_response(reply: Reply) -> Result<Response<Body>, lambda_http::Error> {
    let mut builder = Response::builder().status(reply.status);
    if reply.no_cache {
        builder = builder.header("cache-control", "no-cache");
    }

    let response = match reply.body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body)?))?,
        None => builder.body(Body::Empty)?,
    };
    Ok(response)
}
