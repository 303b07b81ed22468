//! Display helpers for post cards and profiles.

use chrono::{DateTime, Utc};
use url::Url;

const AVATAR_SERVICE: &str = "https://ui-avatars.com/api/";

/// Relative age of a post or comment: `Just now`, `5m ago`, `3h ago`,
/// `2d ago`, `1w ago`, then the calendar date.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    if seconds < 60 {
        return "Just now".to_string();
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    let days = hours / 24;
    if days < 7 {
        return format!("{days}d ago");
    }
    let weeks = days / 7;
    if weeks < 4 {
        return format!("{weeks}w ago");
    }
    then.format("%m/%d/%Y").to_string()
}

/// The user's picture, or a generated initials avatar.
pub fn avatar_url(username: &str, picture: Option<&str>, size: u32) -> String {
    if let Some(picture) = picture.filter(|p| !p.trim().is_empty()) {
        return picture.to_string();
    }
    let size = size.to_string();
    match Url::parse_with_params(
        AVATAR_SERVICE,
        &[
            ("name", username),
            ("background", "0095f6"),
            ("color", "fff"),
            ("size", size.as_str()),
        ],
    ) {
        Ok(url) => url.into(),
        Err(_) => AVATAR_SERVICE.to_string(),
    }
}

pub fn likes_label(count: u64) -> String {
    format!("{count} likes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_time_ago_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        assert_eq!(time_ago(now - Duration::seconds(59), now), "Just now");
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(time_ago(now - Duration::hours(23), now), "23h ago");
        assert_eq!(time_ago(now - Duration::days(6), now), "6d ago");
        assert_eq!(time_ago(now - Duration::days(21), now), "3w ago");
        assert_eq!(time_ago(now - Duration::days(40), now), "05/21/2024");
    }

    #[test]
    fn test_future_timestamps_read_as_now() {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        assert_eq!(time_ago(now + Duration::minutes(2), now), "Just now");
    }

    #[test]
    fn test_avatar_fallback() {
        assert_eq!(
            avatar_url("ana", Some("https://cdn/ana.jpg"), 80),
            "https://cdn/ana.jpg"
        );
        assert_eq!(
            avatar_url("ana lima", None, 80),
            "https://ui-avatars.com/api/?name=ana+lima&background=0095f6&color=fff&size=80"
        );
        assert!(avatar_url("bo", Some("  "), 128).ends_with("size=128"));
    }

    #[test]
    fn test_likes_label() {
        assert_eq!(likes_label(11), "11 likes");
    }
}
