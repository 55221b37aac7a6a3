use std::fmt::{Display, Formatter};

use crate::model::ResultEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Relevance,
    Title,
    Date,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Relevance, SortKey::Title, SortKey::Date];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "relevance" => Some(Self::Relevance),
            "title" | "name" => Some(Self::Title),
            "date" => Some(Self::Date),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Title => "title",
            Self::Date => "date",
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn sanitize_relevance(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

pub fn date_sort_available(results: &[ResultEntry]) -> bool {
    !results.is_empty() && results.iter().all(|entry| entry.timestamp.is_some())
}

// Re-sorts in place. Returns false when the key cannot order this set
// (date without timestamps), in which case the order is left as received.
pub fn sort_results(results: &mut [ResultEntry], key: SortKey) -> bool {
    match key {
        SortKey::Relevance => {
            results.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
            true
        }
        SortKey::Title => {
            results.sort_by_cached_key(|entry| (entry.title.to_lowercase(), entry.title.clone()));
            true
        }
        SortKey::Date => {
            if !date_sort_available(results) {
                return false;
            }
            results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{date_sort_available, sanitize_relevance, sort_results, SortKey};
    use crate::model::{EntityType, ResultEntry};

    fn ids(results: &[ResultEntry]) -> Vec<&str> {
        results.iter().map(|entry| entry.id.as_str()).collect()
    }

    fn sample() -> Vec<ResultEntry> {
        vec![
            ResultEntry::new("1", EntityType::Course, "beta", 0.4),
            ResultEntry::new("2", EntityType::Room, "Alpha", 0.9),
            ResultEntry::new("3", EntityType::Teacher, "alpha", 0.6),
        ]
    }

    #[test]
    fn relevance_sorts_descending() {
        let mut results = sample();
        assert!(sort_results(&mut results, SortKey::Relevance));
        assert_eq!(ids(&results), vec!["2", "3", "1"]);
    }

    #[test]
    fn title_sorts_case_insensitively_then_exact() {
        let mut results = sample();
        assert!(sort_results(&mut results, SortKey::Title));
        assert_eq!(ids(&results), vec!["2", "3", "1"]);
        assert_eq!(results[0].title, "Alpha");
    }

    #[test]
    fn date_without_timestamps_is_pass_through() {
        let mut results = sample();
        assert!(!date_sort_available(&results));
        assert!(!sort_results(&mut results, SortKey::Date));
        assert_eq!(ids(&results), vec!["1", "2", "3"]);
    }

    #[test]
    fn date_sorts_most_recent_first_when_supplied() {
        let mut results: Vec<ResultEntry> = sample()
            .into_iter()
            .zip([10, 30, 20])
            .map(|(entry, ts)| entry.with_timestamp(ts))
            .collect();
        assert!(sort_results(&mut results, SortKey::Date));
        assert_eq!(ids(&results), vec!["2", "3", "1"]);
    }

    #[test]
    fn relevance_is_clamped() {
        assert_eq!(sanitize_relevance(1.7), 1.0);
        assert_eq!(sanitize_relevance(-0.2), 0.0);
        assert_eq!(sanitize_relevance(f64::NAN), 0.0);
        assert_eq!(sanitize_relevance(0.42), 0.42);
    }

    #[test]
    fn parses_sort_keys() {
        assert_eq!(SortKey::parse("Title"), Some(SortKey::Title));
        assert_eq!(SortKey::parse("popularity"), None);
    }
}
