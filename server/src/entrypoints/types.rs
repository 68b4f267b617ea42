use std::io::Cursor;

use rocket::{
    http::{ContentType, Cookie, CookieJar, Header, Status},
    response::{self, Responder},
    Request, Response,
};
use serde::{Deserialize, Serialize};
use shared::{
    carousel::{Carousel, CarouselEvent, Effect, HintStore},
    github::FetchError,
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

/// JSON error body, plus `Retry-After` when GitHub throttled us.
#[derive(Debug)]
pub struct ApiError {
    status: Status,
    body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: Status, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.into(),
                retry_after: None,
            },
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(error: FetchError) -> Self {
        let status = match &error {
            FetchError::RateLimited { .. } => Status::TooManyRequests,
            FetchError::Status { status: 404, .. } => Status::NotFound,
            _ => Status::BadGateway,
        };
        Self {
            status,
            body: ErrorResponse {
                error: error.to_string(),
                retry_after: error.retry_after().map(|d| d.as_secs()),
            },
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, _req: &'r Request<'_>) -> response::Result<'static> {
        let body = serde_json::to_string(&self.body).map_err(|e| {
            tracing::error!("Failed to serialize error response: {e}");
            Status::InternalServerError
        })?;

        let mut response = Response::build();
        response.status(self.status).header(ContentType::JSON);
        if let Some(retry_after) = self.body.retry_after {
            response.header(Header::new("Retry-After", retry_after.to_string()));
        }
        response.sized_body(body.len(), Cursor::new(body)).ok()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CarouselRequest {
    pub carousel: Carousel,
    pub event: CarouselEvent,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CarouselResponse {
    pub carousel: Carousel,
    pub effects: Vec<Effect>,
}

/// Persists client flags as long-lived cookies on the current response.
pub struct CookieHintStore<'a, 'r>(pub &'a CookieJar<'r>);

impl HintStore for CookieHintStore<'_, '_> {
    fn get(&self, key: &str) -> Option<String> {
        self.0
            .get_pending(key)
            .map(|cookie| cookie.value().to_string())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.0.add(
            Cookie::build((key.to_string(), value.to_string()))
                .path("/")
                .permanent(),
        );
        Ok(())
    }
}
