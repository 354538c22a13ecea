//! Country-code standardization.
//!
//! Resolution order for each country:
//!
//! 1. override table
//! 2. the existing code, if it is a known ISO alpha-3 code
//! 3. exact (case-insensitive) name lookup
//! 4. fuzzy name match
//!
//! Names that resolve to nothing keep a `None` code and are reported back to
//! the caller; resolution never fails the pipeline.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info, warn};

use crate::countries::registry::{self, COUNTRIES, CountryEntry};
use crate::domain::IndicatorRecord;

/// Names whose World Bank spelling either has no ISO entry or matches the wrong one.
const OVERRIDES: &[(&str, &str)] = &[("European Union", "EUU"), ("Korea, Rep.", "KOR")];

/// How a code was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    Override,
    ExistingCode,
    ExactName,
    Fuzzy,
}

/// Summary of a standardization pass.
#[derive(Debug, Clone, Default)]
pub struct StandardizeReport {
    /// Distinct country names left without a code, sorted.
    pub unresolved: Vec<String>,
    /// Distinct countries per resolution path.
    pub resolved: HashMap<Resolution, usize>,
}

/// Resolve a canonical code for one country.
pub fn resolve_code(name: &str, existing: Option<&str>) -> Option<(String, Resolution)> {
    let name = name.trim();
    if let Some((_, code)) = OVERRIDES.iter().find(|(n, _)| *n == name) {
        return Some((code.to_string(), Resolution::Override));
    }

    if let Some(code) = existing.map(str::trim).filter(|c| looks_like_alpha3(c)) {
        if let Some(entry) = registry::by_alpha3(code) {
            return Some((entry.alpha3.to_string(), Resolution::ExistingCode));
        }
    }

    if let Some(entry) = registry::by_name(name) {
        return Some((entry.alpha3.to_string(), Resolution::ExactName));
    }

    fuzzy_match(name).map(|entry| (entry.alpha3.to_string(), Resolution::Fuzzy))
}

/// Fill `iso_code` on every record, in place.
///
/// Each distinct (name, code) pair is resolved once.
pub fn standardize_country_codes(records: &mut [IndicatorRecord]) -> StandardizeReport {
    let mut memo: HashMap<(String, Option<String>), Option<(String, Resolution)>> = HashMap::new();
    let mut unresolved = BTreeSet::new();
    let mut counted = BTreeSet::new();
    let mut report = StandardizeReport::default();

    for record in records.iter_mut() {
        let key = (record.country.clone(), record.iso_code.clone());
        let resolved = memo
            .entry(key)
            .or_insert_with(|| resolve_code(&record.country, record.iso_code.as_deref()))
            .clone();

        match resolved {
            Some((code, how)) => {
                if counted.insert(record.country.clone()) {
                    *report.resolved.entry(how).or_default() += 1;
                    if how == Resolution::Fuzzy {
                        debug!(
                            country = %record.country,
                            code = %code,
                            "fuzzy-matched country code"
                        );
                    }
                }
                record.iso_code = Some(code);
            }
            None => {
                unresolved.insert(record.country.clone());
                record.iso_code = None;
            }
        }
    }

    report.unresolved = unresolved.into_iter().collect();
    if !report.unresolved.is_empty() {
        warn!(
            count = report.unresolved.len(),
            countries = ?report.unresolved,
            "could not resolve ISO codes"
        );
    }
    info!(
        resolved = counted.len(),
        unresolved = report.unresolved.len(),
        "standardized country codes"
    );
    report
}

fn looks_like_alpha3(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

/// Tokens that name a form of government rather than a place.
const GENERIC_TOKENS: &[&str] = &[
    "administrative",
    "arab",
    "bolivarian",
    "democratic",
    "federal",
    "federated",
    "islamic",
    "people",
    "plurinational",
    "region",
    "republic",
    "special",
];

const STOPWORDS: &[&str] = &["and", "of", "the"];

/// Ranking of one registry spelling against a query; fields compare in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct MatchScore {
    /// Distinctive query tokens found in the candidate.
    distinctive: usize,
    /// All query tokens found in the candidate.
    shared: usize,
    /// Candidate tokens the query does not mention; fewer is better.
    extra: Reverse<usize>,
}

/// Best fuzzy candidate for a name.
///
/// A candidate must cover a strict majority of the query's distinctive
/// tokens, so regional aggregates ("North America", "Sub-Saharan Africa")
/// and longer names that merely mention a country ("Hong Kong SAR, China")
/// never fall onto the wrong entry.
pub fn fuzzy_match(name: &str) -> Option<&'static CountryEntry> {
    let query = tokens(name);
    if query.is_empty() {
        return None;
    }

    let mut best: Option<(MatchScore, &'static CountryEntry)> = None;
    for entry in COUNTRIES {
        let score = entry
            .names()
            .filter_map(|n| score_candidate(&query, &tokens(n)))
            .max();
        // Strictly greater: earlier registry entries win ties.
        if let Some(score) = score {
            if best.is_none_or(|(s, _)| score > s) {
                best = Some((score, entry));
            }
        }
    }
    best.map(|(_, entry)| entry)
}

fn score_candidate(query: &[String], candidate: &[String]) -> Option<MatchScore> {
    let distinctive: Vec<&String> = query
        .iter()
        .filter(|t| !GENERIC_TOKENS.contains(&t.as_str()))
        .collect();
    if distinctive.is_empty() || candidate.is_empty() {
        return None;
    }

    let covered = distinctive.iter().filter(|&&t| candidate.contains(t)).count();
    if covered * 2 <= distinctive.len() {
        return None;
    }

    let shared = query.iter().filter(|&t| candidate.contains(t)).count();
    Some(MatchScore {
        distinctive: covered,
        shared,
        extra: Reverse(candidate.len() - shared),
    })
}

/// Normalized, deduplicated tokens with World Bank abbreviations spelled out.
fn tokens(name: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in normalize(name).split(' ') {
        let expanded: &[&str] = match token {
            "dem" => &["democratic"],
            "rep" => &["republic"],
            "pdr" => &["people", "democratic", "republic"],
            "sar" => &["special", "administrative", "region"],
            "rb" => &["bolivarian", "republic"],
            "fed" => &["federated"],
            "st" => &["saint"],
            "sts" => &["states"],
            t if t.chars().count() < 2 || STOPWORDS.contains(&t) => &[],
            t => {
                out.push(t.to_string());
                continue;
            }
        };
        out.extend(expanded.iter().map(|t| t.to_string()));
    }
    out.sort();
    out.dedup();
    out
}

/// Lowercase, fold common Latin diacritics, turn punctuation into spaces, collapse runs.
fn normalize(s: &str) -> String {
    let mut folded = String::with_capacity(s.len());
    for ch in s.chars().flat_map(char::to_lowercase) {
        let mapped = match ch {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'ç' => 'c',
            'è' | 'é' | 'ê' | 'ë' => 'e',
            'ì' | 'í' | 'î' | 'ï' => 'i',
            'ñ' => 'n',
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
            'ù' | 'ú' | 'û' | 'ü' => 'u',
            'ý' | 'ÿ' => 'y',
            c if c.is_alphanumeric() => c,
            _ => ' ',
        };
        folded.push(mapped);
    }
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(country: &str, code: Option<&str>, year: i32) -> IndicatorRecord {
        IndicatorRecord::new(country, code.map(str::to_string), year)
    }

    fn resolved(code: &str, how: Resolution) -> Option<(String, Resolution)> {
        Some((code.to_string(), how))
    }

    #[test]
    fn overrides_take_precedence() {
        assert_eq!(
            resolve_code("European Union", Some("EUU")),
            resolved("EUU", Resolution::Override)
        );
        assert_eq!(resolve_code("Korea, Rep.", None), resolved("KOR", Resolution::Override));
    }

    #[test]
    fn valid_existing_code_is_kept() {
        assert_eq!(
            resolve_code("Whatever", Some("fra")),
            resolved("FRA", Resolution::ExistingCode)
        );
    }

    #[test]
    fn unknown_code_falls_through_to_name_lookup() {
        assert_eq!(resolve_code("Germany", Some("XXX")), resolved("DEU", Resolution::ExactName));
        assert_eq!(resolve_code("germany", Some("DE")), resolved("DEU", Resolution::ExactName));
    }

    #[test]
    fn fuzzy_matches_world_bank_spellings() {
        assert_eq!(fuzzy_match("Egypt, Arab Rep.").map(|e| e.alpha3), Some("EGY"));
        assert_eq!(fuzzy_match("Iran, Islamic Rep.").map(|e| e.alpha3), Some("IRN"));
        assert_eq!(fuzzy_match("Vietnam").map(|e| e.alpha3), Some("VNM"));
        assert_eq!(fuzzy_match("Cote d'Ivoire").map(|e| e.alpha3), Some("CIV"));
        assert_eq!(fuzzy_match("Niger").map(|e| e.alpha3), Some("NER"));
    }

    #[test]
    fn abbreviated_world_bank_names_resolve_to_the_right_entry() {
        let cases = [
            ("Congo, Dem. Rep.", "COD"),
            ("Congo, Rep.", "COG"),
            ("Hong Kong SAR, China", "HKG"),
            ("Macao SAR, China", "MAC"),
            ("Korea, Dem. People's Rep.", "PRK"),
            ("Lao PDR", "LAO"),
            ("St. Lucia", "LCA"),
            ("Venezuela, RB", "VEN"),
            ("Micronesia, Fed. Sts.", "FSM"),
            ("Virgin Islands (U.S.)", "VIR"),
        ];
        for (name, code) in cases {
            assert_eq!(resolve_code(name, None), resolved(code, Resolution::Fuzzy), "{name}");
        }
    }

    #[test]
    fn partial_overlap_is_not_a_match() {
        for name in [
            "North America",
            "Sub-Saharan Africa",
            "Europe & Central Asia",
            "Small states",
            "Arab World",
            "Republic",
        ] {
            assert_eq!(fuzzy_match(name), None, "{name}");
        }
    }

    #[test]
    fn abbreviations_are_spelled_out() {
        assert_eq!(
            tokens("Korea, Dem. People's Rep."),
            vec!["democratic", "korea", "people", "republic"]
        );
        assert_eq!(tokens("St. Kitts and Nevis"), vec!["kitts", "nevis", "saint"]);
    }

    #[test]
    fn aggregates_stay_unresolved_and_are_reported_once() {
        let mut records = vec![
            rec("World", Some("WLD"), 2019),
            rec("World", Some("WLD"), 2020),
            rec("France", Some("FRA"), 2020),
        ];
        let report = standardize_country_codes(&mut records);
        assert_eq!(report.unresolved, vec!["World".to_string()]);
        assert_eq!(records[0].iso_code, None);
        assert_eq!(records[1].iso_code, None);
        assert_eq!(records[2].iso_code.as_deref(), Some("FRA"));
        assert_eq!(report.resolved.get(&Resolution::ExistingCode), Some(&1));
    }

    #[test]
    fn normalize_folds_case_accents_and_punctuation() {
        assert_eq!(normalize("  Côte d'Ivoire "), "cote d ivoire");
        assert_eq!(normalize("Korea, Dem. People's Rep."), "korea dem people s rep");
    }
}
