use chrono::{TimeZone, Utc};
use manga_link_bot::utils::bulk::{parse_bulk_links, BulkParseError};
use manga_link_bot::utils::datetime::{month_window, update_window};
use manga_link_bot::utils::pagination::paginate;
use manga_link_bot::utils::text::{split_message, to_khmer_digits};
use manga_link_bot::utils::validation::*;

#[test]
fn test_url_validation_and_normalization() {
    assert!(is_valid_url("https://x.test/a"));
    assert!(is_valid_url("  HTTP://x.test/a "));
    assert!(!is_valid_url("ftp://x.test/a"));
    assert!(!is_valid_url("x.test/a"));
    assert!(!is_valid_url("   "));

    assert_eq!(
        normalize_url(" https://m.facebook.com/story.php?id=1 "),
        "https://www.facebook.com/story.php?id=1"
    );
    assert_eq!(
        normalize_url("http://web.facebook.com/x"),
        "https://www.facebook.com/x"
    );
    assert_eq!(normalize_url("https://x.test/a"), "https://x.test/a");
}

#[test]
fn test_episode_names_carry_prefix_once() {
    assert_eq!(normalize_episode_name(" 12 "), format!("{EP_PREFIX}12"));
    let already = format!("{EP_PREFIX}12");
    assert_eq!(normalize_episode_name(&already), already);
    assert_eq!(display_episode_name("???7"), format!("{EP_PREFIX}7"));
    assert_eq!(display_episode_name(" plain "), "plain");
}

#[test]
fn test_grant_arguments() {
    assert_eq!(
        parse_grant_args("One Piece | @reader"),
        Some(("One Piece".to_string(), "@reader".to_string()))
    );
    assert_eq!(
        parse_grant_args("One Piece 123"),
        Some(("One Piece".to_string(), "123".to_string()))
    );
    assert_eq!(parse_grant_args("| 123"), None);
    assert_eq!(parse_grant_args("lonely"), None);
    assert_eq!(parse_grant_args(""), None);

    assert_eq!(parse_user_ref("123"), Some(UserRef::Id(123)));
    assert_eq!(parse_user_ref("@bob"), Some(UserRef::Username("@bob".to_string())));
    assert_eq!(parse_user_ref("@"), None);
    assert_eq!(parse_user_ref("bob"), None);
}

#[test]
fn test_numeric_arguments() {
    assert_eq!(parse_user_id(" 42 ").unwrap(), 42);
    assert!(parse_user_id("abc").is_err());

    assert_eq!(parse_episode_range("1-10"), Some((1, 10)));
    assert_eq!(parse_episode_range("3 5"), Some((3, 5)));
    assert_eq!(parse_episode_range("5-3"), None);
    assert_eq!(parse_episode_range("0-3"), None);

    assert_eq!(parse_limit("", 20, 100).unwrap(), 20);
    assert_eq!(parse_limit("500", 20, 100).unwrap(), 100);
    assert!(parse_limit("0", 20, 100).is_err());
    assert!(parse_limit("1 2", 20, 100).is_err());

    assert_eq!(parse_days_back("").unwrap(), 0);
    assert_eq!(parse_days_back("3").unwrap(), 3);
    assert!(parse_days_back("-1").is_err());
    assert!(parse_days_back("x").is_err());
}

#[test]
fn test_oversized_arguments_are_rejected() {
    assert_eq!(parse_days_back(&MAX_DAYS_BACK.to_string()).unwrap(), MAX_DAYS_BACK);
    assert!(parse_days_back("100000000").is_err());
    assert!(parse_days_back("99999999999").is_err());

    let now = Utc.with_ymd_and_hms(2024, 3, 10, 20, 0, 0).unwrap();
    assert!(update_window(now, MAX_DAYS_BACK, 7).is_some());
    assert!(update_window(now, 100_000_000, 7).is_none());

    assert_eq!(parse_episode_range("1-1000"), Some((1, 1000)));
    assert_eq!(parse_episode_range("1-4000000000"), None);
    assert_eq!(parse_episode_range("5 1005"), None);
}

#[test]
fn test_month_and_title_validation() {
    assert!(validate_month("2024-02").is_ok());
    assert!(validate_month("2024-2").is_err());
    assert!(validate_month("2024/02").is_err());

    assert!(validate_title_name("Berserk").is_ok());
    assert!(validate_title_name("  ").is_err());
    assert!(validate_title_name(&"x".repeat(201)).is_err());
}

#[test]
fn test_bulk_paste_from_mobile_client() {
    let text = "\u{200B}1\nhttps://m.facebook.com/story.php\n?story_fbid=1\n&id=2\n\n2\nhttps://x.test/2\nhttps://x.test/orphan";
    let parsed = parse_bulk_links(text).unwrap();

    assert_eq!(parsed.added(), 2);
    assert_eq!(parsed.skipped, 1);
    assert_eq!(parsed.entries[0].0, format!("{EP_PREFIX}1"));
    assert_eq!(
        parsed.entries[0].1,
        "https://www.facebook.com/story.php?story_fbid=1&id=2"
    );
    assert_eq!(parse_bulk_links("no links here"), Err(BulkParseError::NoLinks));
}

#[test]
fn test_bulk_parse_is_stable_on_its_own_output() {
    let text = "EP1 https://m.facebook.com/a\n\n2\nhttps://x.test/2\n?p=1\nhttps://x.test/orphan\n3\nhttp://x.test/3";
    let first = parse_bulk_links(text).unwrap();
    assert_eq!(first.added(), 3);

    let serialized: String = first
        .entries
        .iter()
        .map(|(name, url)| format!("{name}\n{url}\n"))
        .collect();
    let second = parse_bulk_links(&serialized).unwrap();

    assert_eq!(second.entries, first.entries);
    assert_eq!(second.skipped, 0);
    assert_eq!(parse_bulk_links(text).unwrap(), first);
}

#[test]
fn test_pages_rebuild_the_input() {
    let per_page = 20;
    for (total, expected_pages) in [(0usize, 1usize), (1, 1), (20, 1), (21, 2), (45, 3)] {
        let items: Vec<usize> = (0..total).collect();
        let first = paginate(&items, 0, per_page);
        assert_eq!(first.pages, expected_pages, "total {total}");

        let rebuilt: Vec<usize> = (0..first.pages)
            .flat_map(|page| paginate(&items, page, per_page).items.to_vec())
            .collect();
        assert_eq!(rebuilt, items, "total {total}");
    }
}

#[test]
fn test_pagination_clamps_page() {
    let items: Vec<u32> = (0..45).collect();
    let last = paginate(&items, 9, 20);
    assert_eq!(last.page, 2);
    assert_eq!(last.items, &items[40..]);
    assert!(last.has_prev());
    assert!(!last.has_next());

    let empty: Vec<u32> = Vec::new();
    let page = paginate(&empty, 0, 20);
    assert_eq!(page.pages, 1);
    assert!(page.items.is_empty());
}

#[test]
fn test_text_helpers() {
    assert_eq!(to_khmer_digits(7, 2), "\u{17E0}\u{17E7}");
    let long = vec!["x".repeat(30); 5].join("\n");
    let parts = split_message(&long, 70);
    assert!(parts.iter().all(|p| p.chars().count() <= 70));
    assert_eq!(parts.join("\n"), long);
}

#[test]
fn test_report_windows_follow_local_offset() {
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 20, 0, 0).unwrap();
    let window = update_window(now, 1, 7).unwrap();
    assert_eq!(window.today.to_string(), "2024-03-11");
    assert_eq!(window.start_date.to_string(), "2024-03-10");
    assert_eq!(window.start_iso, "2024-03-09T17:00:00");

    let (start, end) = month_window("2024-12", 7).unwrap();
    assert_eq!(start, "2024-11-30T17:00:00");
    assert_eq!(end, "2024-12-31T17:00:00");
    assert!(month_window("2024-13", 7).is_none());
}
