use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

pub fn fuzzy_score(needle: &str, hay: &str) -> Option<i64> {
    let m = SkimMatcherV2::default().ignore_case();
    m.fuzzy_match(hay, needle)
}

/// Picks the candidate best matching `needle`: exact, then case-insensitive, then fuzzy.
/// Fuzzy ties go to the earlier candidate.
pub fn best_match<'a>(needle: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let candidates: Vec<&str> = candidates.into_iter().collect();
    if let Some(c) = candidates.iter().find(|c| **c == needle) {
        return Some(*c);
    }
    if let Some(c) = candidates.iter().find(|c| c.eq_ignore_ascii_case(needle)) {
        return Some(*c);
    }
    let mut best: Option<(i64, &str)> = None;
    for c in candidates {
        if let Some(score) = fuzzy_score(needle, c) {
            if best.map_or(true, |(b, _)| score > b) {
                best = Some((score, c));
            }
        }
    }
    best.map(|(_, c)| c)
}

/// Keeps the labels matching `query`, best first. An empty query keeps everything in order.
pub fn filter_labels<'a>(query: &str, labels: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let query = query.trim();
    if query.is_empty() {
        return labels.into_iter().collect();
    }
    let mut scored: Vec<(i64, &str)> = labels
        .into_iter()
        .filter_map(|l| fuzzy_score(query, l).map(|s| (s, l)))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, l)| l).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_wins_over_fuzzy() {
        let labels = ["Payment terms", "Payment"];
        assert_eq!(best_match("Payment", labels), Some("Payment"));
    }

    #[test]
    fn case_insensitive_and_fuzzy_fallbacks() {
        let labels = ["Contract", "Credibility"];
        assert_eq!(best_match("contract", labels), Some("Contract"));
        assert_eq!(best_match("crdblty", labels), Some("Credibility"));
        assert_eq!(best_match("zzz", labels), None);
    }

    #[test]
    fn empty_filter_keeps_order() {
        let labels = ["b", "a"];
        assert_eq!(filter_labels("  ", labels), ["b", "a"]);
        assert_eq!(filter_labels("a", ["xyz", "a"]), ["a"]);
    }
}
