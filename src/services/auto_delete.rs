use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::MessageId;
use tokio_cron_scheduler::{Job, JobScheduler};
use uuid::Uuid;

/// Deletes bot messages a fixed time after they were sent.
///
/// Each deletion is an independent one-shot job. Failures (the message is
/// already gone, the bot lost rights in the chat) are logged and dropped.
#[derive(Clone)]
pub struct AutoDeleteService {
    bot: Bot,
    scheduler: JobScheduler,
    delay: Duration,
}

impl AutoDeleteService {
    pub async fn new(bot: Bot, delay: Duration) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            bot,
            scheduler,
            delay,
        })
    }

    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.start().await?;
        tracing::info!(
            "Auto-delete service started - bot messages expire after {}s",
            self.delay.as_secs()
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        Ok(())
    }

    /// Queues `message_id` for deletion. Never fails the caller.
    pub async fn schedule(&self, chat_id: ChatId, message_id: MessageId) {
        let bot = self.bot.clone();
        let job = Job::new_one_shot_async(self.delay, move |job_id: Uuid, _scheduler| {
            let bot = bot.clone();
            Box::pin(async move {
                if let Err(e) = bot.delete_message(chat_id, message_id).await {
                    tracing::debug!(
                        "Auto-delete job {} skipped message {} in chat {}: {}",
                        job_id,
                        message_id.0,
                        chat_id.0,
                        e
                    );
                }
            })
        });

        let queued = match job {
            Ok(job) => self.scheduler.add(job).await.map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = queued {
            tracing::warn!(
                "Failed to schedule deletion of message {} in chat {}: {}",
                message_id.0,
                chat_id.0,
                e
            );
        }
    }
}
