use super::*;

fn items(prefix: &str, count: usize) -> Vec<ResultItem> {
    (0..count)
        .map(|i| ResultItem {
            image_url: format!("https://img.test/{prefix}/{i}/large.jpg"),
            thumbnail_url: format!("https://img.test/{prefix}/{i}/small.jpg"),
            tags: format!("{prefix}, {i}"),
        })
        .collect()
}

fn page_of(prefix: &str, count: usize, total_hits: u32) -> SearchPage {
    SearchPage {
        total_hits,
        items: items(prefix, count),
    }
}

fn only_fetch(effects: &[Effect]) -> FetchRequest {
    match effects {
        [Effect::Fetch(request)] => request.clone(),
        other => panic!("expected a single fetch, got {other:?}"),
    }
}

fn only_notice(effects: &[Effect]) -> Notification {
    match effects {
        [Effect::Notify(notification)] => notification.clone(),
        other => panic!("expected a single notification, got {other:?}"),
    }
}

/// Submit `keyword` and answer the first page with `first`.
fn searched(keyword: &str, first: SearchPage) -> (SearchState, Vec<Effect>) {
    let mut state = SearchState::default();
    let request = only_fetch(&state.handle(QueryEvent::Submit(keyword.to_string())));
    let effects = state.handle(QueryEvent::Completed {
        request,
        result: Ok(first),
    });
    (state, effects)
}

fn load_more_with(state: &mut SearchState, result: Result<SearchPage, NetworkError>) -> Vec<Effect> {
    let request = only_fetch(&state.handle(QueryEvent::LoadMore));
    state.handle(QueryEvent::Completed { request, result })
}

#[test]
fn test_initial_state_is_idle_and_empty() {
    let state = SearchState::default();
    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(state.page(), 0);
    assert!(state.results().is_empty());
    assert!(!state.is_loading());
    assert!(!state.has_more());
}

#[test]
fn test_submit_starts_loading_page_one() {
    let mut state = SearchState::default();
    let request = only_fetch(&state.handle(QueryEvent::Submit("  fox ".to_string())));
    assert_eq!(request.keyword, "fox");
    assert_eq!(request.page, 1);
    assert_eq!(state.keyword(), "fox");
    assert!(state.is_loading());
    assert!(!state.can_load_more());
}

#[test]
fn test_new_keyword_resets_results_before_fetch() {
    let (mut state, _) = searched("fox", page_of("fox", 12, 40));
    let _ = load_more_with(&mut state, Ok(page_of("fox2", 12, 40)));
    assert_eq!(state.results().len(), 24);
    assert_eq!(state.page(), 2);

    let request = only_fetch(&state.handle(QueryEvent::Submit("owl".to_string())));
    assert_eq!(request.page, 1);
    assert!(state.results().is_empty());
    assert_eq!(state.page(), 0);
    assert!(!state.has_more());
    assert!(state.is_loading());
}

#[test]
fn test_empty_keyword_warns_without_touching_state() {
    let (mut state, _) = searched("fox", page_of("fox", 3, 3));
    let effects = state.handle(QueryEvent::Submit("   ".to_string()));
    let notice = only_notice(&effects);
    assert_eq!(notice.severity, Severity::Warning);
    assert_eq!(notice.message, EMPTY_KEYWORD);
    assert_eq!(state.keyword(), "fox");
    assert_eq!(state.results().len(), 3);
}

#[test]
fn test_same_keyword_is_ignored_once_loaded() {
    let (mut state, _) = searched("fox", page_of("fox", 3, 3));
    let generation = state.generation();
    assert!(state.handle(QueryEvent::Submit("fox".to_string())).is_empty());
    assert_eq!(state.generation(), generation);
    assert_eq!(state.results().len(), 3);
}

#[test]
fn test_same_keyword_is_ignored_while_loading() {
    let mut state = SearchState::default();
    let _ = state.handle(QueryEvent::Submit("fox".to_string()));
    assert!(state.handle(QueryEvent::Submit("fox".to_string())).is_empty());
}

#[test]
fn test_same_keyword_retries_after_failed_first_page() {
    let mut state = SearchState::default();
    let request = only_fetch(&state.handle(QueryEvent::Submit("fox".to_string())));
    let _ = state.handle(QueryEvent::Completed {
        request,
        result: Err(NetworkError::Status(503)),
    });

    let retry = only_fetch(&state.handle(QueryEvent::Submit("fox".to_string())));
    assert_eq!(retry.page, 1);
    assert!(state.is_loading());
}

#[test]
fn test_no_results_emits_info() {
    let (state, effects) = searched("qwxz", page_of("none", 0, 0));
    let notice = only_notice(&effects);
    assert_eq!(notice.severity, Severity::Info);
    assert_eq!(notice.message, NO_RESULTS);
    assert_eq!(state.page(), 1);
    assert!(!state.has_more());
    assert_eq!(state.phase(), Phase::Ready);
}

#[test]
fn test_single_result_uses_singular_wording() {
    let (_, effects) = searched("unicorn", page_of("u", 1, 1));
    let notice = only_notice(&effects);
    assert_eq!(notice.severity, Severity::Success);
    assert_eq!(notice.message, "We found 1 result");
}

#[test]
fn test_many_results_use_plural_wording_and_count() {
    let (state, effects) = searched("fox", page_of("fox", 12, 25));
    let notice = only_notice(&effects);
    assert_eq!(notice.severity, Severity::Success);
    assert_eq!(notice.message, "We found 25 results");
    assert!(state.has_more());
    assert!(state.can_load_more());
}

#[test]
fn test_load_more_reports_remaining_results() {
    let (mut state, _) = searched("fox", page_of("fox", 12, 40));
    let effects = load_more_with(&mut state, Ok(page_of("fox-2", 12, 40)));
    let notice = only_notice(&effects);
    assert_eq!(notice.severity, Severity::Success);
    assert_eq!(notice.message, "We found 16 more results");
    assert_eq!(state.page(), 2);
    assert!(state.has_more());
}

#[test]
fn test_load_more_exhaustion_at_thirteen_hits() {
    let (mut state, _) = searched("fox", page_of("fox", 12, 13));
    assert!(state.has_more());

    let effects = load_more_with(&mut state, Ok(page_of("fox-2", 1, 13)));
    let notice = only_notice(&effects);
    assert_eq!(notice.severity, Severity::Info);
    assert_eq!(notice.message, NO_MORE_RESULTS);
    assert_eq!(state.page(), 2);
    assert_eq!(state.results().len(), 13);
    assert!(!state.has_more());
    assert!(!state.can_load_more());
}

#[test]
fn test_load_more_requests_next_page_for_current_keyword() {
    let (mut state, _) = searched("fox", page_of("fox", 12, 100));
    let request = only_fetch(&state.handle(QueryEvent::LoadMore));
    assert_eq!(request.keyword, "fox");
    assert_eq!(request.page, 2);
    assert_eq!(request.generation, state.generation());
}

#[test]
fn test_load_more_ignored_while_loading() {
    let (mut state, _) = searched("fox", page_of("fox", 12, 100));
    let _ = only_fetch(&state.handle(QueryEvent::LoadMore));
    assert!(state.handle(QueryEvent::LoadMore).is_empty());
}

#[test]
fn test_load_more_ignored_without_more_pages() {
    let (mut state, _) = searched("fox", page_of("fox", 5, 5));
    assert!(state.handle(QueryEvent::LoadMore).is_empty());
    assert_eq!(state.phase(), Phase::Ready);
}

#[test]
fn test_load_more_ignored_before_any_search() {
    let mut state = SearchState::default();
    assert!(state.handle(QueryEvent::LoadMore).is_empty());
    assert_eq!(state.phase(), Phase::Idle);
}

#[test]
fn test_failed_first_page_leaves_empty_ready_state() {
    let mut state = SearchState::default();
    let request = only_fetch(&state.handle(QueryEvent::Submit("fox".to_string())));
    let effects = state.handle(QueryEvent::Completed {
        request,
        result: Err(NetworkError::Transport("connection refused".to_string())),
    });

    let notice = only_notice(&effects);
    assert_eq!(notice.severity, Severity::Error);
    assert_eq!(notice.message, REQUEST_FAILED);
    assert!(state.results().is_empty());
    assert!(!state.is_loading());
    assert_eq!(state.phase(), Phase::Ready);
}

#[test]
fn test_failure_does_not_leak_into_next_search() {
    let mut state = SearchState::default();
    let request = only_fetch(&state.handle(QueryEvent::Submit("fox".to_string())));
    let _ = state.handle(QueryEvent::Completed {
        request,
        result: Err(NetworkError::Status(500)),
    });

    let request = only_fetch(&state.handle(QueryEvent::Submit("owl".to_string())));
    assert!(state.results().is_empty());
    assert_eq!(state.page(), 0);
    let effects = state.handle(QueryEvent::Completed {
        request,
        result: Ok(page_of("owl", 4, 4)),
    });
    assert_eq!(only_notice(&effects).message, "We found 4 results");
    assert_eq!(state.results().len(), 4);
    assert_eq!(state.page(), 1);
}

#[test]
fn test_failed_load_more_keeps_previous_pages() {
    let (mut state, _) = searched("fox", page_of("fox", 12, 40));
    let effects = load_more_with(&mut state, Err(NetworkError::Malformed("eof".to_string())));
    assert_eq!(only_notice(&effects).severity, Severity::Error);
    assert_eq!(state.results().len(), 12);
    assert_eq!(state.page(), 1);
    assert!(state.can_load_more());

    // The same page is requested again on the next attempt.
    let request = only_fetch(&state.handle(QueryEvent::LoadMore));
    assert_eq!(request.page, 2);
}

#[test]
fn test_stale_response_for_old_keyword_is_discarded() {
    let mut state = SearchState::default();
    let old = only_fetch(&state.handle(QueryEvent::Submit("fox".to_string())));
    let new = only_fetch(&state.handle(QueryEvent::Submit("owl".to_string())));
    assert_ne!(old.generation, new.generation);

    let effects = state.handle(QueryEvent::Completed {
        request: old,
        result: Ok(page_of("fox", 12, 50)),
    });
    assert!(effects.is_empty());
    assert!(state.results().is_empty());
    assert!(state.is_loading());

    let effects = state.handle(QueryEvent::Completed {
        request: new,
        result: Ok(page_of("owl", 2, 2)),
    });
    assert_eq!(only_notice(&effects).message, "We found 2 results");
    assert_eq!(state.results()[0].tags, "owl, 0");
}

#[test]
fn test_stale_failure_for_old_keyword_is_silent() {
    let mut state = SearchState::default();
    let old = only_fetch(&state.handle(QueryEvent::Submit("fox".to_string())));
    let _ = state.handle(QueryEvent::Submit("owl".to_string()));
    let effects = state.handle(QueryEvent::Completed {
        request: old,
        result: Err(NetworkError::Status(500)),
    });
    assert!(effects.is_empty());
    assert!(state.is_loading());
}

#[test]
fn test_duplicate_completion_is_applied_once() {
    let mut state = SearchState::default();
    let request = only_fetch(&state.handle(QueryEvent::Submit("fox".to_string())));
    let _ = state.handle(QueryEvent::Completed {
        request: request.clone(),
        result: Ok(page_of("fox", 12, 30)),
    });
    let effects = state.handle(QueryEvent::Completed {
        request,
        result: Ok(page_of("fox", 12, 30)),
    });
    assert!(effects.is_empty());
    assert_eq!(state.results().len(), 12);
}

#[test]
fn test_duplicate_items_across_pages_are_kept() {
    let (mut state, _) = searched("fox", page_of("fox", 12, 30));
    let _ = load_more_with(&mut state, Ok(page_of("fox", 12, 30)));
    assert_eq!(state.results().len(), 24);
    assert_eq!(state.results()[0], state.results()[12]);
}

#[test]
fn test_route_effects_splits_fetches_and_notifications() {
    let request = FetchRequest {
        keyword: "fox".to_string(),
        page: 1,
        generation: 1,
    };
    let mut sink: Vec<Notification> = Vec::new();
    let fetches = route_effects(
        vec![
            Effect::Notify(Notification::info("a")),
            Effect::Fetch(request.clone()),
            Effect::Notify(Notification::error("b")),
        ],
        &mut sink,
    );
    assert_eq!(fetches, vec![request]);
    assert_eq!(sink, vec![Notification::info("a"), Notification::error("b")]);
}

#[test]
fn test_has_more_boundaries() {
    assert!(!has_more(0, 0));
    assert!(has_more(0, 1));
    assert!(has_more(1, 13));
    assert!(!has_more(1, 12));
    assert!(!has_more(2, 13));
    assert!(has_more(2, 25));
}

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn has_more_matches_page_count(page in 0..1000u32, total in 0..20_000u32) {
            prop_assert_eq!(has_more(page, total), page * PAGE_SIZE < total);
        }

        #[test]
        fn load_more_accumulates_in_fetch_order(
            first in 0..=12usize,
            extra in proptest::collection::vec(0..=12usize, 0..8),
        ) {
            let total = u32::try_from(12 * (extra.len() + 2)).unwrap();
            let (mut state, _) = searched("fox", page_of("p0", first, total));
            let mut expected = items("p0", first);

            for (i, count) in extra.iter().enumerate() {
                let prefix = format!("p{}", i + 1);
                let _ = load_more_with(&mut state, Ok(page_of(&prefix, *count, total)));
                expected.extend(items(&prefix, *count));
            }

            prop_assert_eq!(state.results(), expected.as_slice());
            prop_assert_eq!(state.page() as usize, extra.len() + 1);
            prop_assert_eq!(state.has_more(), state.page() * PAGE_SIZE < total);
        }

        #[test]
        fn submit_always_resets_before_fetching(
            keywords in proptest::collection::vec("[a-z]{1,6}", 1..6),
        ) {
            let mut state = SearchState::default();
            for keyword in keywords {
                let changed = keyword != state.keyword() || state.page() == 0;
                let effects = state.handle(QueryEvent::Submit(keyword.clone()));
                prop_assert!(!changed || state.results().is_empty());
                if let [Effect::Fetch(request)] = effects.as_slice() {
                    prop_assert_eq!(state.page(), 0);
                    prop_assert!(state.results().is_empty());
                    let _ = state.handle(QueryEvent::Completed {
                        request: request.clone(),
                        result: Ok(page_of(&keyword, 12, 100)),
                    });
                }
            }
        }
    }
}
