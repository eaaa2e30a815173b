use std::error::Error;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use teloxide::error_handlers::ErrorHandler;
use teloxide::{ApiError, RequestError};

use crate::bot::HandlerError;

/// How loudly a failed update should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Network trouble or rate limiting; the next update will likely succeed.
    Transient,
    /// Telegram refused an edit or delete that is no longer meaningful.
    Stale,
    Fatal,
}

pub fn classify_request_error(err: &RequestError) -> ErrorClass {
    match err {
        RequestError::Network(_) | RequestError::Io(_) | RequestError::RetryAfter(_) => {
            ErrorClass::Transient
        }
        RequestError::Api(api) => classify_api_error(api),
        _ => ErrorClass::Fatal,
    }
}

fn classify_api_error(err: &ApiError) -> ErrorClass {
    match err {
        ApiError::MessageNotModified
        | ApiError::MessageToDeleteNotFound
        | ApiError::MessageToEditNotFound
        | ApiError::MessageCantBeDeleted
        | ApiError::InvalidQueryId => ErrorClass::Stale,
        ApiError::TerminatedByOtherGetUpdates => ErrorClass::Transient,
        ApiError::Unknown(text) if text.contains("query is too old") => ErrorClass::Stale,
        _ => ErrorClass::Fatal,
    }
}

pub fn classify(err: &(dyn Error + Send + Sync + 'static)) -> ErrorClass {
    match err.downcast_ref::<RequestError>() {
        Some(request) => classify_request_error(request),
        None => ErrorClass::Fatal,
    }
}

/// Dispatcher error sink: absorbs platform noise, reports the rest.
pub struct BotErrorHandler;

impl BotErrorHandler {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self)
    }
}

impl ErrorHandler<HandlerError> for BotErrorHandler {
    fn handle_error(self: Arc<Self>, error: HandlerError) -> BoxFuture<'static, ()> {
        match classify(error.as_ref()) {
            ErrorClass::Transient => tracing::warn!("Telegram request failed, update dropped: {}", error),
            ErrorClass::Stale => tracing::debug!("Ignored stale Telegram request: {}", error),
            ErrorClass::Fatal => tracing::error!("Unhandled error while processing update: {}", error),
        }
        Box::pin(async {})
    }
}
