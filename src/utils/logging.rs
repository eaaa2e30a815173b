use tracing::{debug, error, info, warn};

/// Logs command start with consistent format
pub fn log_command_start(command: &str, user: &str, user_id: i64, chat_id: i64, details: Option<&str>) {
    match details {
        Some(d) if !d.is_empty() => info!(
            "CMD_START: {} by {}({}) in chat {} - {}",
            command, user, user_id, chat_id, d
        ),
        _ => info!(
            "CMD_START: {} by {}({}) in chat {}",
            command, user, user_id, chat_id
        ),
    }
}

/// Logs command completion with consistent format
pub fn log_command_success(command: &str, user_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!("CMD_SUCCESS: {} by {} - {}", command, user_id, d),
        None => info!("CMD_SUCCESS: {} by {}", command, user_id),
    }
}

/// Logs command errors with consistent format
pub fn log_command_error(command: &str, user_id: i64, chat_id: i64, error: &str) {
    error!(
        "CMD_ERROR: {} by {} in chat {} - {}",
        command, user_id, chat_id, error
    );
}

/// Logs rejected user input
pub fn log_validation_error(command: &str, value: &str, error: &str, user_id: i64) {
    warn!(
        "VALIDATION_ERROR: {} - '{}' invalid: {} - user {}",
        command, value, error, user_id
    );
}

/// Logs refused actions
pub fn log_permission_denied(action: &str, user_id: i64, target: Option<i64>) {
    match target {
        Some(t) => warn!("PERMISSION_DENIED: {} by {} on {}", action, user_id, t),
        None => warn!("PERMISSION_DENIED: {} by {}", action, user_id),
    }
}

/// Logs database operations with consistent format
pub fn log_database_operation(operation: &str, table: &str, details: Option<&str>) {
    match details {
        Some(d) => debug!("DB_OP: {} on {} - {}", operation, table, d),
        None => debug!("DB_OP: {} on {}", operation, table),
    }
}

/// Logs database errors with consistent format
pub fn log_database_error(operation: &str, table: &str, error: &str, details: Option<&str>) {
    match details {
        Some(d) => error!("DB_ERROR: {} on {} failed: {} - {}", operation, table, error, d),
        None => error!("DB_ERROR: {} on {} failed: {}", operation, table, error),
    }
}

/// Logs the outcome of a single link probe
pub fn log_probe_result(url: &str, alive: bool, reason: &str) {
    if alive {
        debug!("PROBE: {} alive ({})", url, reason);
    } else {
        info!("PROBE: {} dead ({})", url, reason);
    }
}

/// Logs timeout events with consistent format
pub fn log_timeout(operation: &str, duration_secs: u64, details: Option<&str>) {
    match details {
        Some(d) => warn!("TIMEOUT: {} after {}s - {}", operation, duration_secs, d),
        None => warn!("TIMEOUT: {} after {}s", operation, duration_secs),
    }
}

/// Logs system events with consistent format
pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}
