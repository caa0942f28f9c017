//! Requests as they reach the provider.

use mwb_search::providers::mock::MockProvider;
use mwb_search::{
    DurationBounds, MediaSearchError, PlaylistFormat, SearchField, SearchOptions,
    collect_duration_bounds, derive_filename,
};

use crate::common::{service_over, terms};

#[tokio::test]
async fn test_duration_only_terms_merge_into_one_request() {
    let (service, provider) = service_over(MockProvider::new());

    service
        .run(&terms(&[">60", ">90"]), &SearchOptions::default())
        .await
        .unwrap();

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].is_match_all());
    assert_eq!(requests[0].duration.min_minutes, Some(90));
    assert_eq!(requests[0].duration.max_minutes, None);
}

#[tokio::test]
async fn test_selectors_reach_provider_unbroadened() {
    let (service, provider) = service_over(MockProvider::new());

    service
        .run(&terms(&["!ARD #Tatort"]), &SearchOptions::default())
        .await
        .unwrap();

    let requests = provider.requests();
    let request = &requests[0];
    assert_eq!(request.values_for(SearchField::Channel), vec!["ARD"]);
    assert_eq!(request.values_for(SearchField::Topic), vec!["Tatort"]);
    assert!(request.constraints.iter().all(|c| !c.is_broadened()));
}

#[tokio::test]
async fn test_free_text_with_duration_is_broadened() {
    let (service, provider) = service_over(MockProvider::new());

    service
        .run(&terms(&["tatort >85"]), &SearchOptions::default())
        .await
        .unwrap();

    let requests = provider.requests();
    let request = &requests[0];
    assert_eq!(request.duration.min_minutes, Some(85));
    assert_eq!(request.constraints.len(), 1);
    assert!(request.constraints[0].is_broadened());
    assert_eq!(request.constraints[0].values, vec!["tatort"]);
}

#[tokio::test]
async fn test_malformed_term_rejected_before_any_request() {
    let (service, provider) = service_over(MockProvider::new());

    let err = service
        .run(&terms(&["tatort", ">abc"]), &SearchOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, MediaSearchError::MalformedDuration { .. }));
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn test_blank_term_rejected_before_any_request() {
    let (service, provider) = service_over(MockProvider::new());

    let err = service
        .run(&terms(&[" "]), &SearchOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, MediaSearchError::EmptyTerm));
    assert!(err.is_user_error());
    assert!(provider.requests().is_empty());
}

#[test]
fn test_playlist_name_from_query_bounds() {
    let query = terms(&["Tatort >80"]);
    let bounds = collect_duration_bounds(&query).unwrap();
    assert_eq!(
        bounds,
        DurationBounds {
            min_minutes: Some(80),
            max_minutes: None
        }
    );

    let first = derive_filename(&query, &bounds, PlaylistFormat::M3u);
    let second = derive_filename(&query, &bounds, PlaylistFormat::M3u);
    for name in [&first, &second] {
        assert!(name.starts_with("mwb_Tatort_m80_"), "{name}");
        assert!(name.ends_with(".m3u"));
    }
    assert_eq!(first.len(), second.len());
}
