use std::path::Path;

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, InputFile, MessageId};

use crate::services::auto_delete::AutoDeleteService;
use crate::utils::text::{split_message, MESSAGE_CHUNK_LIMIT};

/// Sends plain-text replies into one chat and queues them for deletion.
///
/// Messages expire when the chat's session has auto-delete on, or when the
/// caller asks for it with one of the `*_forced` methods.
pub struct Reply {
    bot: Bot,
    chat_id: ChatId,
    cleaner: AutoDeleteService,
    auto_delete: bool,
}

impl Reply {
    pub fn new(bot: Bot, chat_id: ChatId, cleaner: AutoDeleteService, auto_delete: bool) -> Self {
        Self {
            bot,
            chat_id,
            cleaner,
            auto_delete,
        }
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Queues `message_id` when auto-delete is on.
    pub async fn expire(&self, message_id: MessageId) {
        if self.auto_delete {
            self.cleaner.schedule(self.chat_id, message_id).await;
        }
    }

    pub async fn expire_forced(&self, message_id: MessageId) {
        self.cleaner.schedule(self.chat_id, message_id).await;
    }

    pub async fn text(&self, text: impl Into<String>) -> ResponseResult<Message> {
        let sent = self.bot.send_message(self.chat_id, text).await?;
        self.expire(sent.id).await;
        Ok(sent)
    }

    pub async fn text_forced(&self, text: impl Into<String>) -> ResponseResult<Message> {
        let sent = self.bot.send_message(self.chat_id, text).await?;
        self.expire_forced(sent.id).await;
        Ok(sent)
    }

    pub async fn markup(
        &self,
        text: impl Into<String>,
        keyboard: InlineKeyboardMarkup,
    ) -> ResponseResult<Message> {
        let sent = self
            .bot
            .send_message(self.chat_id, text)
            .reply_markup(keyboard)
            .await?;
        self.expire(sent.id).await;
        Ok(sent)
    }

    /// Sends `text`, split into several messages when it is over the chunk limit.
    pub async fn long_text(&self, text: &str) -> ResponseResult<()> {
        for part in split_message(text, MESSAGE_CHUNK_LIMIT) {
            self.text(part).await?;
        }
        Ok(())
    }

    /// Replaces the text of a bot message. Without `keyboard` the old buttons are removed.
    pub async fn edit(
        &self,
        message_id: MessageId,
        text: impl Into<String>,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> ResponseResult<()> {
        let request = self.bot.edit_message_text(self.chat_id, message_id, text);
        let edited = match keyboard {
            Some(keyboard) => request.reply_markup(keyboard).await?,
            None => request.await?,
        };
        self.expire(edited.id).await;
        Ok(())
    }

    pub async fn document(
        &self,
        file_name: String,
        contents: Vec<u8>,
        caption: &str,
    ) -> ResponseResult<Message> {
        let file = InputFile::memory(contents).file_name(file_name);
        let sent = self
            .bot
            .send_document(self.chat_id, file)
            .caption(caption)
            .await?;
        self.expire(sent.id).await;
        Ok(sent)
    }

    /// Sends a local image. Returns `None` when the file does not exist.
    pub async fn photo(&self, path: &Path, caption: &str) -> ResponseResult<Option<Message>> {
        if tokio::fs::metadata(path).await.is_err() {
            return Ok(None);
        }
        let sent = self
            .bot
            .send_photo(self.chat_id, InputFile::file(path))
            .caption(caption)
            .await?;
        self.expire(sent.id).await;
        Ok(Some(sent))
    }
}
