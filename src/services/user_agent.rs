//! UserAgent classification
//!
//! Wraps woothee to derive browser/OS names, a normalized device class,
//! and the bot predicate used to exclude crawlers from analytics.

use woothee::parser::Parser;

/// Classified UserAgent information
#[derive(Debug, Clone)]
pub struct ClassifiedAgent {
    pub browser: Option<String>,
    pub os: Option<String>,
    /// Normalized device class: "mobile", "desktop", "crawler", ...
    pub device: String,
    pub is_bot: bool,
}

/// Map woothee categories onto the device tokens targeting rules use.
///
/// woothee has no tablet category; smartphones and tablets both classify
/// as "smartphone". Unknown agents default to desktop.
fn normalize_category(category: &str) -> String {
    match category {
        "smartphone" | "mobilephone" => "mobile".to_string(),
        "pc" => "desktop".to_string(),
        "crawler" => "crawler".to_string(),
        "" | "unknown" | "UNKNOWN" => "desktop".to_string(),
        other => other.to_ascii_lowercase(),
    }
}

/// Keyword fallback for crawlers woothee does not know about.
fn looks_like_bot(ua: &str) -> bool {
    let ua = ua.to_ascii_lowercase();
    ua.contains("bot") || ua.contains("spider") || ua.contains("crawl")
}

/// Parse a UserAgent string using woothee
pub fn classify_user_agent(ua_string: &str) -> ClassifiedAgent {
    let parser = Parser::new();
    let result = parser.parse(ua_string).unwrap_or_default();

    let is_bot = result.category == "crawler" || looks_like_bot(ua_string);

    ClassifiedAgent {
        browser: if result.name != "UNKNOWN" && !result.name.is_empty() {
            Some(result.name.to_string())
        } else {
            None
        },
        os: if result.os != "UNKNOWN" && !result.os.is_empty() {
            Some(result.os.to_string())
        } else {
            None
        },
        device: normalize_category(result.category),
        is_bot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_DESKTOP: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const GOOGLEBOT: &str = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

    #[test]
    fn test_classify_desktop_browser() {
        let agent = classify_user_agent(CHROME_DESKTOP);
        assert_eq!(agent.device, "desktop");
        assert!(!agent.is_bot);
        assert_eq!(agent.browser.as_deref(), Some("Chrome"));
        assert!(agent.os.is_some());
    }

    #[test]
    fn test_classify_mobile_browser() {
        let agent = classify_user_agent(SAFARI_IPHONE);
        assert_eq!(agent.device, "mobile");
        assert!(!agent.is_bot);
    }

    #[test]
    fn test_classify_crawler() {
        let agent = classify_user_agent(GOOGLEBOT);
        assert!(agent.is_bot);
    }

    #[test]
    fn test_keyword_fallback_bot() {
        let agent = classify_user_agent("SomeCustomBot/1.0");
        assert!(agent.is_bot);
    }

    #[test]
    fn test_unknown_agent_defaults_to_desktop() {
        let agent = classify_user_agent("definitely not a real agent string");
        assert_eq!(agent.device, "desktop");
        assert!(agent.browser.is_none());
    }
}
