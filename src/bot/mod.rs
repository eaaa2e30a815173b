pub mod callback_data;
pub mod commands;
pub mod context;
pub mod errors;
pub mod handlers;
pub mod keyboards;
pub mod session;

/// Error type every update handler returns to the dispatcher.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
pub type HandlerResult = Result<(), HandlerError>;
