use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Khmer "episode" prefix every stored episode name carries.
pub const EP_PREFIX: &str = "\u{1797}\u{17B6}\u{1782}";

/// Legacy prefix left behind by a broken encoding of `EP_PREFIX`.
const BROKEN_PREFIX: &str = "???";

static HTTP_SCHEME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://").unwrap_or_else(|_| unreachable!("static regex"))
});

static MOBILE_FACEBOOK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://(?:m|web|mobile)\.facebook\.com/")
        .unwrap_or_else(|_| unreachable!("static regex"))
});

pub fn is_valid_url(url: &str) -> bool {
    let url = url.trim();
    !url.is_empty() && HTTP_SCHEME.is_match(url)
}

/// Trims the URL and collapses mobile Facebook hosts onto `www.facebook.com`.
pub fn normalize_url(url: &str) -> String {
    MOBILE_FACEBOOK
        .replace(url.trim(), "https://www.facebook.com/")
        .into_owned()
}

pub fn normalize_episode_name(name: &str) -> String {
    let name = name.trim();
    if name.starts_with(EP_PREFIX) {
        name.to_string()
    } else {
        format!("{EP_PREFIX}{name}")
    }
}

pub fn display_episode_name(name: &str) -> String {
    let name = name.trim();
    match name.strip_prefix(BROKEN_PREFIX) {
        Some(rest) => format!("{EP_PREFIX}{rest}"),
        None => name.to_string(),
    }
}

/// Splits `<title> | <user>` (or `<title words...> <user>`) into its two parts.
pub fn parse_grant_args(raw: &str) -> Option<(String, String)> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (title, user) = match raw.rsplit_once('|') {
        Some((title, user)) => (title.trim(), user.trim()),
        None => {
            let (title, user) = raw.rsplit_once(char::is_whitespace)?;
            (title.trim(), user.trim())
        }
    };

    if title.is_empty() || user.is_empty() {
        return None;
    }
    Some((title.to_string(), user.to_string()))
}

/// Target of a user argument: a numeric id or an `@username`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRef {
    Id(i64),
    Username(String),
}

pub fn parse_user_ref(raw: &str) -> Option<UserRef> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<i64>() {
        return Some(UserRef::Id(id));
    }
    match raw.strip_prefix('@') {
        Some(name) if !name.is_empty() => Some(UserRef::Username(raw.to_string())),
        _ => None,
    }
}

pub fn parse_user_id(raw: &str) -> Result<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(anyhow!("User ID is required"));
    }
    raw.parse()
        .map_err(|_| anyhow!("User ID must be a number."))
}

/// Parses `a-b` or `a b` into an inclusive, positive, non-decreasing range.
/// Widest span `/listep` will render.
pub const MAX_EPISODE_SPAN: u32 = 1000;

/// Longest look-back `/mangaupdated` accepts, in days.
pub const MAX_DAYS_BACK: u32 = 36500;

pub fn parse_episode_range(raw: &str) -> Option<(u32, u32)> {
    let raw = raw.trim();
    let (start, end) = match raw.split_once('-') {
        Some((start, end)) => (start.trim(), end.trim()),
        None => {
            let mut parts = raw.split_whitespace();
            (parts.next()?, parts.next()?)
        }
    };
    let start: u32 = start.parse().ok()?;
    let end: u32 = end.parse().ok()?;
    if start == 0 || end == 0 || end < start || end - start >= MAX_EPISODE_SPAN {
        return None;
    }
    Some((start, end))
}

/// Parses an optional positive count argument, capped at `max`.
pub fn parse_limit(raw: &str, default: i64, max: i64) -> Result<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(default.min(max));
    }
    if raw.split_whitespace().count() > 1 {
        return Err(anyhow!("Too many arguments"));
    }
    let value: i64 = raw.parse().map_err(|_| anyhow!("n must be a number."))?;
    if value <= 0 {
        return Err(anyhow!("n must be greater than 0."));
    }
    Ok(value.min(max))
}

/// Parses the optional day count of `/mangaupdated`.
pub fn parse_days_back(raw: &str) -> Result<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    if raw.split_whitespace().count() > 1 {
        return Err(anyhow!("Too many arguments"));
    }
    let value: i64 = raw
        .parse()
        .map_err(|_| anyhow!("n must be a number. Example: /mangaupdated 2"))?;
    if value < 0 {
        return Err(anyhow!("n must be 0 or higher."));
    }
    match u32::try_from(value) {
        Ok(days) if days <= MAX_DAYS_BACK => Ok(days),
        _ => Err(anyhow!("n is too large. Maximum is {MAX_DAYS_BACK}.")),
    }
}

pub fn validate_month(raw: &str) -> Result<()> {
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 7
        && bytes[4] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || b.is_ascii_digit());
    if shaped {
        Ok(())
    } else {
        Err(anyhow!("Month format must be YYYY-MM."))
    }
}

pub fn validate_title_name(name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("Please send text."));
    }
    if name.chars().count() > 200 {
        return Err(anyhow!("Manga name cannot be longer than 200 characters"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url_collapses_mobile_facebook() {
        assert_eq!(
            normalize_url(" https://m.facebook.com/story.php?id=1 "),
            "https://www.facebook.com/story.php?id=1"
        );
        assert_eq!(
            normalize_url("http://WEB.facebook.com/x"),
            "https://www.facebook.com/x"
        );
        assert_eq!(normalize_url("https://example.com/a"), "https://example.com/a");
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("http://x.test"));
        assert!(is_valid_url("HTTPS://x.test"));
        assert!(!is_valid_url("ftp://x.test"));
        assert!(!is_valid_url(""));
        assert!(!is_valid_url("x.test"));
    }

    #[test]
    fn test_episode_name_prefix() {
        assert_eq!(normalize_episode_name(" 1 "), format!("{EP_PREFIX}1"));
        let already = format!("{EP_PREFIX}2");
        assert_eq!(normalize_episode_name(&already), already);
        assert_eq!(display_episode_name("???5"), format!("{EP_PREFIX}5"));
    }

    #[test]
    fn test_parse_grant_args() {
        assert_eq!(
            parse_grant_args("One Piece | 555"),
            Some(("One Piece".to_string(), "555".to_string()))
        );
        assert_eq!(
            parse_grant_args("One Piece 555"),
            Some(("One Piece".to_string(), "555".to_string()))
        );
        assert_eq!(parse_grant_args("| 555"), None);
        assert_eq!(parse_grant_args("OnlyTitle"), None);
        assert_eq!(parse_grant_args(""), None);
    }

    #[test]
    fn test_parse_user_ref() {
        assert_eq!(parse_user_ref("42"), Some(UserRef::Id(42)));
        assert_eq!(parse_user_ref("@bob"), Some(UserRef::Username("@bob".to_string())));
        assert_eq!(parse_user_ref("@"), None);
        assert_eq!(parse_user_ref("bob"), None);
    }

    #[test]
    fn test_parse_episode_range() {
        assert_eq!(parse_episode_range("1-10"), Some((1, 10)));
        assert_eq!(parse_episode_range("3 5"), Some((3, 5)));
        assert_eq!(parse_episode_range("5-3"), None);
        assert_eq!(parse_episode_range("0-3"), None);
        assert_eq!(parse_episode_range("a-b"), None);
        assert_eq!(parse_episode_range("7"), None);
        assert_eq!(parse_episode_range("1-1000"), Some((1, 1000)));
        assert_eq!(parse_episode_range("1-1001"), None);
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit("", 20, 200).unwrap(), 20);
        assert_eq!(parse_limit("500", 20, 200).unwrap(), 200);
        assert_eq!(parse_limit("5", 20, 200).unwrap(), 5);
        assert!(parse_limit("0", 20, 200).is_err());
        assert!(parse_limit("abc", 20, 200).is_err());
        assert!(parse_limit("1 2", 20, 200).is_err());
    }

    #[test]
    fn test_validate_month() {
        assert!(validate_month("2024-05").is_ok());
        assert!(validate_month("2024-5").is_err());
        assert!(validate_month("202405").is_err());
        assert!(validate_month("abcd-ef").is_err());
    }
}
