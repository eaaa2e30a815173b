use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

/// Admin input the bot is waiting for from one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Pending {
    #[default]
    Idle,
    AddTitle,
    AddEpisodeName { title_id: i64 },
    AddEpisodeUrl { title_id: i64, name: String },
    EditTitle { title_id: i64 },
    EditEpisodeName { episode_id: i64 },
    EditEpisodeUrl { episode_id: i64 },
    BulkAdd { title_id: i64, buffer: String },
}

impl Pending {
    pub fn name(&self) -> &'static str {
        match self {
            Pending::Idle => "idle",
            Pending::AddTitle => "add_title",
            Pending::AddEpisodeName { .. } => "add_ep_name",
            Pending::AddEpisodeUrl { .. } => "add_ep_url",
            Pending::EditTitle { .. } => "edit_title",
            Pending::EditEpisodeName { .. } => "edit_ep_name",
            Pending::EditEpisodeUrl { .. } => "edit_ep_url",
            Pending::BulkAdd { .. } => "bulk_add",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Pending::Idle)
    }
}

/// Per-user conversation state, shared by every chat the user writes in.
///
/// `auto_delete` is on while the user is in an admin flow; bot replies are then
/// removed after the configured delay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub pending: Pending,
    pub auto_delete: bool,
}

impl Session {
    pub fn idle(auto_delete: bool) -> Self {
        Self {
            pending: Pending::Idle,
            auto_delete,
        }
    }

    pub fn waiting(pending: Pending) -> Self {
        Self {
            pending,
            auto_delete: true,
        }
    }

    /// Appends one message to the bulk buffer. Returns `false` outside a bulk add.
    pub fn append_bulk(&mut self, text: &str) -> bool {
        let Pending::BulkAdd { buffer, .. } = &mut self.pending else {
            return false;
        };
        let joined = format!("{buffer}\n{text}");
        *buffer = joined.trim().to_string();
        true
    }
}

pub type SessionStorage = InMemStorage<Session>;
pub type SessionDialogue = Dialogue<Session, SessionStorage>;
