use teloxide::prelude::*;

use crate::bot::HandlerResult;

/// Service messages announcing members joining or leaving.
pub fn is_membership_change(msg: Message) -> bool {
    msg.new_chat_members().is_some() || msg.left_chat_member().is_some()
}

/// Removes join/leave notices to keep group chats clean.
pub async fn handle_membership_change(bot: Bot, msg: Message) -> HandlerResult {
    if let Err(e) = bot.delete_message(msg.chat.id, msg.id).await {
        tracing::debug!(
            "Could not delete membership notice {} in chat {}: {}",
            msg.id.0,
            msg.chat.id.0,
            e
        );
    }
    Ok(())
}
