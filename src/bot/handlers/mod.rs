pub mod admin_text;
pub mod callback;
pub mod general_message;
pub mod message;

use std::sync::Arc;

use teloxide::{
    dispatching::UpdateHandler,
    prelude::*,
};

use crate::bot::commands::Command;
use crate::bot::context::AppContext;
use crate::bot::session::{SessionDialogue, SessionStorage};
use crate::bot::HandlerError;

/// Opens the dialogue of the user behind `update`, keyed by user id rather than chat id.
pub fn session_dialogue(update: &Update, storage: Arc<SessionStorage>) -> Option<SessionDialogue> {
    let user = update.user()?;
    Some(SessionDialogue::new(storage, ChatId(user.id.0 as i64)))
}

fn enter_session() -> UpdateHandler<HandlerError> {
    dptree::filter_map(|storage: Arc<SessionStorage>, update: Update| session_dialogue(&update, storage))
        .filter_map_async(|dialogue: SessionDialogue| async move {
            match dialogue.get_or_default().await {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::error!("Failed to load session for {}: {:?}", dialogue.chat_id(), e);
                    None
                }
            }
        })
}

pub struct BotHandler {
    pub ctx: AppContext,
}

impl BotHandler {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    pub fn schema(&self) -> UpdateHandler<HandlerError> {
        use teloxide::dispatching::UpdateFilterExt;

        let ctx_command = self.ctx.clone();
        let ctx_text = self.ctx.clone();
        let ctx_callback = self.ctx.clone();

        enter_session()
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command, dialogue: SessionDialogue| {
                        let ctx = ctx_command.clone();
                        async move { message::command_handler(bot, msg, cmd, dialogue, ctx).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(general_message::is_membership_change)
                    .endpoint(general_message::handle_membership_change),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| msg.text().is_some())
                    .endpoint(move |bot: Bot, msg: Message, dialogue: SessionDialogue| {
                        let ctx = ctx_text.clone();
                        async move { admin_text::admin_text_handler(bot, msg, dialogue, ctx).await }
                    }),
            )
            .branch(Update::filter_callback_query().endpoint(
                move |bot: Bot, q: CallbackQuery, dialogue: SessionDialogue| {
                    let ctx = ctx_callback.clone();
                    async move { callback::callback_handler(bot, q, dialogue, ctx).await }
                },
            ))
    }
}
