//! Field-level validation shared by both forms.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

const VIDEO_HOSTS: &[&str] = &["youtube.com", "youtu.be", "vimeo.com"];

/// `local@domain.tld` with no whitespace and exactly one `@` per part.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// A parsable URL pointing at YouTube or Vimeo.
pub fn is_valid_video_url(input: &str) -> bool {
    url::Url::parse(input).is_ok() && VIDEO_HOSTS.iter().any(|host| input.contains(host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("asha@stagecraft.in"));
        assert!(is_valid_email("first.last+gigs@mail.example.com"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("asha"));
        assert!(!is_valid_email("asha@stagecraft"));
        assert!(!is_valid_email("asha @stagecraft.in"));
        assert!(!is_valid_email("asha@@stagecraft.in"));
    }

    #[test]
    fn test_video_urls() {
        assert!(is_valid_video_url("https://www.youtube.com/watch?v=0_1LkZHjVBE"));
        assert!(is_valid_video_url("https://youtu.be/eborT0V26EM"));
        assert!(is_valid_video_url("https://vimeo.com/123456"));
        assert!(!is_valid_video_url("https://example.com/video.mp4"));
        assert!(!is_valid_video_url("youtube.com/watch?v=abc"));
    }
}
