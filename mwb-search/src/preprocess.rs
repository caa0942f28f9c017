//! Query preprocessing: raw user terms to structured search requests.
//!
//! Each term that carries text becomes one request. Terms made only of
//! duration markers (`">90"`) do not search anything on their own; their
//! bounds are intersected into every other request. When no term carries
//! text, a single match-all request with the combined bounds is produced.

use crate::errors::MediaSearchError;
use crate::selector::{ParsedTerm, SelectorToken, parse_term};
use crate::types::{DurationBounds, FieldConstraint, QueryOptions, SearchRequest};

/// Builds the search requests for `terms`, in term order.
///
/// Every term is parsed before any request is returned, so malformed input
/// is rejected before anything reaches the index.
///
/// # Errors
/// - `MediaSearchError::MalformedDuration` - bad `>`/`<` marker in any term
/// - `MediaSearchError::EmptySelector` - selector character without value
/// - `MediaSearchError::EmptyTerm` - blank term
pub fn preprocess(
    terms: &[String],
    options: &QueryOptions,
) -> Result<Vec<SearchRequest>, MediaSearchError> {
    let parsed = terms
        .iter()
        .map(|term| parse_term(term).map(|p| (term.as_str(), p)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut shared = DurationBounds::default();
    for (_, term) in parsed.iter().filter(|(_, p)| p.is_duration_only()) {
        shared.intersect(&bounds_of(term));
    }

    let mut requests: Vec<SearchRequest> = parsed
        .iter()
        .filter(|(_, p)| !p.is_duration_only())
        .map(|(raw, term)| {
            let mut request = build_request(raw, term, options);
            request.duration.intersect(&shared);
            request
        })
        .collect();

    if requests.is_empty() {
        let mut request = SearchRequest::match_all(terms.join(" "), options);
        request.duration = shared;
        requests.push(request);
    }

    tracing::debug!(
        terms = terms.len(),
        requests = requests.len(),
        "Preprocessed query terms"
    );

    Ok(requests)
}

/// Builds the request for a single term.
///
/// # Errors
/// Same as [`preprocess`].
pub fn preprocess_term(
    term: &str,
    options: &QueryOptions,
) -> Result<SearchRequest, MediaSearchError> {
    Ok(build_request(term, &parse_term(term)?, options))
}

/// Tightest duration range expressed anywhere in `terms`.
///
/// # Errors
/// Same as [`preprocess`].
pub fn collect_duration_bounds(terms: &[String]) -> Result<DurationBounds, MediaSearchError> {
    let mut bounds = DurationBounds::default();
    for term in terms {
        bounds.intersect(&bounds_of(&parse_term(term)?));
    }
    Ok(bounds)
}

fn bounds_of(term: &ParsedTerm) -> DurationBounds {
    let mut bounds = DurationBounds::default();
    for bound in &term.durations {
        bounds.tighten(*bound);
    }
    bounds
}

fn build_request(raw: &str, term: &ParsedTerm, options: &QueryOptions) -> SearchRequest {
    let mut request = SearchRequest::match_all(raw, options);
    request.duration = bounds_of(term);

    if term.is_fully_selected() {
        request.constraints = selector_constraints(&term.units);
    } else {
        // Plain words: search the whole phrase in every field instead of guessing one
        let text = term
            .units
            .iter()
            .filter_map(SelectorToken::text)
            .collect::<Vec<_>>()
            .join(" ");
        tracing::trace!(term = raw, text = %text, "Broadening free-text term");
        request.constraints = vec![FieldConstraint::broadened(text)];
    }

    request
}

/// One constraint per field in order of first mention; repeats become OR-values.
fn selector_constraints(units: &[SelectorToken]) -> Vec<FieldConstraint> {
    let mut constraints: Vec<FieldConstraint> = Vec::new();

    for unit in units {
        let (Some(field), Some(text)) = (unit.field(), unit.text()) else {
            continue;
        };
        match constraints.iter_mut().find(|c| c.fields == [field]) {
            Some(existing) => existing.values.push(text.to_string()),
            None => constraints.push(FieldConstraint::single(field, text)),
        }
    }

    constraints
}

#[cfg(test)]
mod tests {
    use mwb_core::{SortKey, SortOrder};

    use super::*;
    use crate::types::SearchField;

    fn terms(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_selectors_are_kept_precise() {
        let request = preprocess_term("!ARD #Tatort", &QueryOptions::default()).unwrap();

        assert_eq!(
            request.constraints,
            vec![
                FieldConstraint::single(SearchField::Channel, "ARD"),
                FieldConstraint::single(SearchField::Topic, "Tatort"),
            ]
        );
        assert!(request.constraints.iter().all(|c| !c.is_broadened()));
    }

    #[test]
    fn test_free_text_is_broadened_with_duration() {
        let request = preprocess_term("tatort >85", &QueryOptions::default()).unwrap();

        assert_eq!(request.duration.min_minutes, Some(85));
        assert_eq!(request.duration.max_minutes, None);
        assert_eq!(request.constraints, vec![FieldConstraint::broadened("tatort")]);
    }

    #[test]
    fn test_mixed_term_broadens_whole_text_portion() {
        let request = preprocess_term("!ARD krimi <60", &QueryOptions::default()).unwrap();

        assert_eq!(request.constraints, vec![FieldConstraint::broadened("ARD krimi")]);
        assert_eq!(request.duration.max_minutes, Some(60));
    }

    #[test]
    fn test_repeated_selector_becomes_or_values() {
        let request = preprocess_term("!ARD !ZDF #Tatort", &QueryOptions::default()).unwrap();

        assert_eq!(request.values_for(SearchField::Channel), vec!["ARD", "ZDF"]);
        assert_eq!(request.values_for(SearchField::Topic), vec!["Tatort"]);
        assert_eq!(request.constraints.len(), 2);
    }

    #[test]
    fn test_duration_terms_tighten_into_one_request() {
        let requests = preprocess(&terms(&[">60", ">90"]), &QueryOptions::default()).unwrap();

        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].duration.min_minutes, Some(90));
        assert!(requests[0].is_match_all());
    }

    #[test]
    fn test_pure_duration_query_matches_everything() {
        let requests = preprocess(&terms(&[">90"]), &QueryOptions::default()).unwrap();

        assert_eq!(requests.len(), 1);
        assert!(requests[0].is_match_all());
        assert_eq!(requests[0].duration.min_minutes, Some(90));
        assert_eq!(requests[0].duration.max_minutes, None);
    }

    #[test]
    fn test_opposite_bounds_form_a_range() {
        let request = preprocess_term("doku >60 <120", &QueryOptions::default()).unwrap();
        assert_eq!(request.duration.min_minutes, Some(60));
        assert_eq!(request.duration.max_minutes, Some(120));
    }

    #[test]
    fn test_duration_terms_apply_to_every_text_term() {
        let requests = preprocess(
            &terms(&["tatort >30", "polizeiruf", ">45"]),
            &QueryOptions::default(),
        )
        .unwrap();

        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].term, "tatort >30");
        assert_eq!(requests[0].duration.min_minutes, Some(45));
        assert_eq!(requests[1].term, "polizeiruf");
        assert_eq!(requests[1].duration.min_minutes, Some(45));
    }

    #[test]
    fn test_options_copied_into_requests() {
        let options = QueryOptions {
            size: 40,
            offset: 0,
            sort_key: SortKey::Duration,
            sort_order: SortOrder::Ascending,
            include_future: false,
        };
        let request = preprocess_term("#Tatort", &options).unwrap();

        assert_eq!(request.size, 40);
        assert_eq!(request.sort_key, SortKey::Duration);
        assert_eq!(request.sort_order, SortOrder::Ascending);
        assert!(!request.include_future);
    }

    #[test]
    fn test_default_options() {
        let request = preprocess_term("tatort", &QueryOptions::default()).unwrap();
        assert_eq!(request.size, 15);
        assert_eq!(request.offset, 0);
        assert_eq!(request.sort_key, SortKey::Timestamp);
        assert_eq!(request.sort_order, SortOrder::Descending);
        assert!(request.include_future);
    }

    #[test]
    fn test_invalid_term_fails_whole_batch() {
        let err = preprocess(&terms(&["tatort", ">lang"]), &QueryOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            MediaSearchError::MalformedDuration { ref token } if token == ">lang"
        ));
    }

    #[test]
    fn test_blank_term_is_not_match_all() {
        let cases: [&[&str]; 3] = [&[""], &["  "], &["tatort", " "]];
        for raw in cases {
            let err = preprocess(&terms(raw), &QueryOptions::default()).unwrap_err();
            assert!(matches!(err, MediaSearchError::EmptyTerm), "{raw:?}");
        }
        assert!(collect_duration_bounds(&terms(&[""])).is_err());
    }

    #[test]
    fn test_collect_duration_bounds_across_terms() {
        let bounds = collect_duration_bounds(&terms(&["Tatort >80", "<100", ">60"])).unwrap();
        assert_eq!(bounds.min_minutes, Some(80));
        assert_eq!(bounds.max_minutes, Some(100));
    }
}
