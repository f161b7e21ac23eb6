use chrono::{Duration, Local, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use super::types::SearchQuery;

/// Marker location meaning "resolve using the caller's live position",
/// distinct from any named place string.
pub const CURRENT_LOCATION: &str = "current_location";

type TimeResolver = fn(NaiveDateTime) -> NaiveDateTime;

/// Ordered phrase table. Declaration order is the tie-break: the first
/// matching pattern wins and later entries are not evaluated.
static TIME_PATTERNS: Lazy<Vec<(Regex, TimeResolver)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"\btoday\b").expect("valid regex"),
            start_of_day as TimeResolver,
        ),
        (
            Regex::new(r"\btomorrow\b").expect("valid regex"),
            (|now| start_of_day(now) + Duration::days(1)) as TimeResolver,
        ),
        (
            Regex::new(r"\bthis week\b").expect("valid regex"),
            start_of_day as TimeResolver,
        ),
        (
            Regex::new(r"\bnext week\b").expect("valid regex"),
            (|now| start_of_day(now) + Duration::weeks(1)) as TimeResolver,
        ),
    ]
});

static NEAR_ME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bnear me\b").expect("valid regex"));

/// Captures the place phrase after "in ". Runs against the original text so
/// the place keeps its casing; trailing time phrases are stripped afterwards.
static IN_PLACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bin\s+([A-Za-z,]+(?:\s+[A-Za-z,]+)*)").expect("valid regex"));

const REMOTE_TERMS: &[&str] = &["remote", "online", "virtual"];

/// Topic vocabulary. Matched keywords are appended in this order, each
/// entry at most once.
const TOPIC_VOCABULARY: &[&str] = &[
    "programming",
    "coding",
    "software",
    "tech",
    "python",
    "javascript",
    "data science",
    "machine learning",
    "ai",
    "web development",
    "mobile",
];

/// Rule-based extraction of structured search parameters from free text.
///
/// Total function: any input, including empty or nonsensical text, yields a
/// valid `SearchQuery` with unmatched fields left at their defaults.
pub struct QueryExtractor {
    max_results: usize,
}

impl QueryExtractor {
    pub fn new(max_results: usize) -> Self {
        Self { max_results }
    }

    pub fn extract(&self, text: &str) -> SearchQuery {
        self.extract_at(text, Local::now().naive_local())
    }

    /// Extraction with a pinned "now", so time phrases resolve
    /// deterministically under test.
    pub fn extract_at(&self, text: &str, now: NaiveDateTime) -> SearchQuery {
        let lowered = text.to_lowercase();
        let mut query = SearchQuery::new(self.max_results);

        for (pattern, resolve) in TIME_PATTERNS.iter() {
            if pattern.is_match(&lowered) {
                query.start_time = Some(resolve(now));
                break;
            }
        }

        if NEAR_ME.is_match(&lowered) {
            query.location = Some(CURRENT_LOCATION.to_string());
        } else if let Some(captures) = IN_PLACE.captures(text) {
            if let Some(place) = captures.get(1) {
                let place = strip_trailing_time_phrases(place.as_str());
                if !place.is_empty() {
                    query.location = Some(place);
                }
            }
        }

        query.remote_only = REMOTE_TERMS.iter().any(|term| lowered.contains(term));

        for keyword in TOPIC_VOCABULARY {
            if lowered.contains(keyword) {
                query.keywords.push((*keyword).to_string());
            }
        }

        query
    }
}

fn start_of_day(now: NaiveDateTime) -> NaiveDateTime {
    now.date().and_time(NaiveTime::MIN)
}

/// The place capture is greedy, so "in Boston tomorrow" captures
/// "Boston tomorrow". Peel recognized time phrases off the tail.
fn strip_trailing_time_phrases(place: &str) -> String {
    const TRAILING: &[&str] = &["today", "tomorrow", "this week", "next week"];

    let mut place = place.trim().trim_end_matches(',').trim_end().to_string();
    loop {
        let lowered = place.to_lowercase();
        let stripped = TRAILING.iter().find_map(|phrase| {
            let head = lowered.strip_suffix(phrase)?;
            if head.is_empty() || head.ends_with(' ') || head.ends_with(',') {
                Some(head.trim_end().trim_end_matches(',').trim_end().len())
            } else {
                None
            }
        });
        match stripped {
            Some(len) => place.truncate(len),
            None => break,
        }
    }
    place
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use test_case::test_case;

    fn extractor() -> QueryExtractor {
        QueryExtractor::new(20)
    }

    fn pinned_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(15, 30, 45)
            .unwrap()
    }

    fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_time(NaiveTime::MIN)
    }

    #[test_case(""; "empty input")]
    #[test_case("hello world"; "no recognizable patterns")]
    fn unmatched_input_yields_defaults(text: &str) {
        let query = extractor().extract_at(text, pinned_now());
        assert_eq!(query.location, None);
        assert!(query.keywords.is_empty());
        assert_eq!(query.start_time, None);
        assert!(!query.remote_only);
        assert_eq!(query.max_results, 20);
    }

    #[test_case("events today", midnight(2024, 3, 14); "today truncates to midnight")]
    #[test_case("events tomorrow", midnight(2024, 3, 15); "tomorrow adds a day")]
    #[test_case("events this week", midnight(2024, 3, 14); "this week anchors to today")]
    #[test_case("events next week", midnight(2024, 3, 21); "next week adds seven days")]
    fn time_phrases_resolve(text: &str, expected: NaiveDateTime) {
        let query = extractor().extract_at(text, pinned_now());
        assert_eq!(query.start_time, Some(expected));
    }

    #[test]
    fn first_declared_time_phrase_wins() {
        let query = extractor().extract_at("today or tomorrow", pinned_now());
        assert_eq!(query.start_time, Some(midnight(2024, 3, 14)));

        let query = extractor().extract_at("tomorrow not today", pinned_now());
        assert_eq!(query.start_time, Some(midnight(2024, 3, 14)));
    }

    #[test]
    fn near_me_maps_to_sentinel() {
        let query = extractor().extract_at("events near me", pinned_now());
        assert_eq!(query.location.as_deref(), Some(CURRENT_LOCATION));
    }

    #[test]
    fn city_capture_preserves_casing() {
        let query = extractor().extract_at("events in San Francisco", pinned_now());
        assert_eq!(query.location.as_deref(), Some("San Francisco"));
    }

    #[test]
    fn near_me_takes_precedence_over_in_place() {
        let query = extractor().extract_at("events in Boston near me", pinned_now());
        assert_eq!(query.location.as_deref(), Some(CURRENT_LOCATION));
    }

    #[test]
    fn trailing_time_phrase_is_stripped_from_place() {
        let query = extractor().extract_at("concerts in Boston tomorrow", pinned_now());
        assert_eq!(query.location.as_deref(), Some("Boston"));

        let query = extractor().extract_at("meetups in New York next week", pinned_now());
        assert_eq!(query.location.as_deref(), Some("New York"));
    }

    #[test_case("remote workshops"; "remote")]
    #[test_case("online classes"; "online")]
    #[test_case("virtual conference"; "virtual_term")]
    fn remote_terms_set_flag(text: &str) {
        assert!(extractor().extract_at(text, pinned_now()).remote_only);
    }

    #[test]
    fn keywords_follow_vocabulary_order() {
        let query = extractor().extract_at("python and javascript meetups", pinned_now());
        assert_eq!(query.keywords, vec!["python", "javascript"]);

        // Input order does not matter, vocabulary order does.
        let query = extractor().extract_at("javascript before python", pinned_now());
        assert_eq!(query.keywords, vec!["python", "javascript"]);
    }

    #[test]
    fn each_vocabulary_entry_contributes_once() {
        let query = extractor().extract_at("python python python", pinned_now());
        assert_eq!(query.keywords, vec!["python"]);
    }

    #[test]
    fn combined_query_extracts_every_category() {
        let query = extractor().extract_at(
            "remote python programming events near me today",
            pinned_now(),
        );
        assert!(query.remote_only);
        assert_eq!(query.keywords, vec!["programming", "python"]);
        assert_eq!(query.location.as_deref(), Some(CURRENT_LOCATION));
        assert_eq!(query.start_time, Some(midnight(2024, 3, 14)));
    }

    #[test]
    fn extraction_is_deterministic() {
        let text = "remote tech events in Seattle tomorrow";
        let first = extractor().extract_at(text, pinned_now());
        let second = extractor().extract_at(text, pinned_now());
        assert_eq!(first, second);
    }
}
