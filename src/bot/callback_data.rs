//! Inline button payloads.
//!
//! Every button the bot renders carries one of these values as its callback
//! data. The wire form is a colon-separated string such as `admin:eps:4:0`;
//! it is decoded once when the query arrives and matched exhaustively after.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackData {
    User(UserAction),
    Admin(AdminAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Title(i64),
    Titles(usize),
    Episodes { title_id: i64, page: usize },
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    AddTitle,
    Manage,
    Titles(usize),
    Back,
    Title(i64),
    UseTitle(i64),
    AddEpisode(i64),
    BulkAdd(i64),
    CopyEpisodes(i64),
    Episodes { title_id: i64, page: usize },
    Episode(i64),
    EditTitle(i64),
    EditEpisodeName(i64),
    EditEpisodeUrl(i64),
    DeleteTitle(i64),
    ConfirmDeleteTitle(i64),
    DeleteEpisode(i64),
    ConfirmDeleteEpisode(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallbackDataError {
    #[error("unknown callback namespace in '{0}'")]
    UnknownNamespace(String),
    #[error("unknown callback action in '{0}'")]
    UnknownAction(String),
    #[error("malformed callback argument in '{0}'")]
    BadArgument(String),
}

impl CallbackData {
    pub fn is_admin(&self) -> bool {
        matches!(self, CallbackData::Admin(_))
    }
}

impl From<UserAction> for CallbackData {
    fn from(action: UserAction) -> Self {
        CallbackData::User(action)
    }
}

impl From<AdminAction> for CallbackData {
    fn from(action: AdminAction) -> Self {
        CallbackData::Admin(action)
    }
}

impl FromStr for CallbackData {
    type Err = CallbackDataError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = raw.split(':').collect();
        let bad = || CallbackDataError::BadArgument(raw.to_string());
        let unknown = || CallbackDataError::UnknownAction(raw.to_string());

        let id = |idx: usize| -> Result<i64, CallbackDataError> {
            parts.get(idx).and_then(|p| p.parse().ok()).ok_or_else(bad)
        };
        let page = |idx: usize| -> Result<usize, CallbackDataError> {
            parts.get(idx).and_then(|p| p.parse().ok()).ok_or_else(bad)
        };
        let arity = |expected: usize| -> Result<(), CallbackDataError> {
            if parts.len() == expected { Ok(()) } else { Err(bad()) }
        };

        match parts.as_slice() {
            ["user", action, ..] => {
                let action = match *action {
                    "title" => {
                        arity(3)?;
                        UserAction::Title(id(2)?)
                    }
                    "titles" => {
                        arity(3)?;
                        UserAction::Titles(page(2)?)
                    }
                    "eps" => {
                        arity(4)?;
                        UserAction::Episodes { title_id: id(2)?, page: page(3)? }
                    }
                    "back" => {
                        arity(2)?;
                        UserAction::Back
                    }
                    _ => return Err(unknown()),
                };
                Ok(CallbackData::User(action))
            }
            ["admin", action, ..] => {
                let action = match *action {
                    "add_title" => {
                        arity(2)?;
                        AdminAction::AddTitle
                    }
                    "manage" => {
                        arity(2)?;
                        AdminAction::Manage
                    }
                    "back" => {
                        arity(2)?;
                        AdminAction::Back
                    }
                    "titles" => {
                        arity(3)?;
                        AdminAction::Titles(page(2)?)
                    }
                    "eps" => {
                        arity(4)?;
                        AdminAction::Episodes { title_id: id(2)?, page: page(3)? }
                    }
                    other => {
                        arity(3)?;
                        let target = id(2)?;
                        match other {
                            "title" => AdminAction::Title(target),
                            "use_title" => AdminAction::UseTitle(target),
                            "addep" => AdminAction::AddEpisode(target),
                            "bulk_add" => AdminAction::BulkAdd(target),
                            "copy_eps" => AdminAction::CopyEpisodes(target),
                            "ep" => AdminAction::Episode(target),
                            "edit_title" => AdminAction::EditTitle(target),
                            "edit_ep_name" => AdminAction::EditEpisodeName(target),
                            "edit_ep_url" => AdminAction::EditEpisodeUrl(target),
                            "del_title" => AdminAction::DeleteTitle(target),
                            "confirm_del_title" => AdminAction::ConfirmDeleteTitle(target),
                            "del_ep" => AdminAction::DeleteEpisode(target),
                            "confirm_del_ep" => AdminAction::ConfirmDeleteEpisode(target),
                            _ => return Err(unknown()),
                        }
                    }
                };
                Ok(CallbackData::Admin(action))
            }
            _ => Err(CallbackDataError::UnknownNamespace(raw.to_string())),
        }
    }
}

impl fmt::Display for CallbackData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackData::User(action) => match action {
                UserAction::Title(id) => write!(f, "user:title:{id}"),
                UserAction::Titles(page) => write!(f, "user:titles:{page}"),
                UserAction::Episodes { title_id, page } => write!(f, "user:eps:{title_id}:{page}"),
                UserAction::Back => f.write_str("user:back"),
            },
            CallbackData::Admin(action) => match action {
                AdminAction::AddTitle => f.write_str("admin:add_title"),
                AdminAction::Manage => f.write_str("admin:manage"),
                AdminAction::Titles(page) => write!(f, "admin:titles:{page}"),
                AdminAction::Back => f.write_str("admin:back"),
                AdminAction::Title(id) => write!(f, "admin:title:{id}"),
                AdminAction::UseTitle(id) => write!(f, "admin:use_title:{id}"),
                AdminAction::AddEpisode(id) => write!(f, "admin:addep:{id}"),
                AdminAction::BulkAdd(id) => write!(f, "admin:bulk_add:{id}"),
                AdminAction::CopyEpisodes(id) => write!(f, "admin:copy_eps:{id}"),
                AdminAction::Episodes { title_id, page } => write!(f, "admin:eps:{title_id}:{page}"),
                AdminAction::Episode(id) => write!(f, "admin:ep:{id}"),
                AdminAction::EditTitle(id) => write!(f, "admin:edit_title:{id}"),
                AdminAction::EditEpisodeName(id) => write!(f, "admin:edit_ep_name:{id}"),
                AdminAction::EditEpisodeUrl(id) => write!(f, "admin:edit_ep_url:{id}"),
                AdminAction::DeleteTitle(id) => write!(f, "admin:del_title:{id}"),
                AdminAction::ConfirmDeleteTitle(id) => write!(f, "admin:confirm_del_title:{id}"),
                AdminAction::DeleteEpisode(id) => write!(f, "admin:del_ep:{id}"),
                AdminAction::ConfirmDeleteEpisode(id) => write!(f, "admin:confirm_del_ep:{id}"),
            },
        }
    }
}
