mod support;

use serde_json::json;
use tokio_util::sync::CancellationToken;

use harvest_checkpoint::keys;
use harvest_engine::{EngineError, EngineState, RunOutcome};
use harvest_protocols::{KeyValueStore, NOT_FOUND, SellerRecord, Sentinel};

use support::{Event, FakeSite, OUT_OF_STOCK_ID, harness, seller};

fn emails(records: &[SellerRecord]) -> Vec<&str> {
    records.iter().map(|r| r.email.as_str()).collect()
}

/// At most one context open at a time, and none open while the filter changes.
fn assert_contexts_balanced(events: &[Event]) {
    let mut open = 0usize;
    for event in events {
        match event {
            Event::Open(_) => {
                assert_eq!(open, 0, "context opened while another was open");
                open += 1;
            }
            Event::Close(_) => {
                assert_eq!(open, 1, "close without open");
                open -= 1;
            }
            Event::ClickFacet(_) | Event::Apply => {
                assert_eq!(open, 0, "filter changed with a context still open");
            }
            Event::GoBack | Event::Reload => {}
        }
    }
    assert_eq!(open, 0, "context left open at the end of the run");
}

#[tokio::test(start_paused = true)]
async fn test_three_sellers_end_to_end() {
    let site = FakeSite::new(vec![
        seller("a"),
        seller("b").no_seller_link(),
        seller("c").popup_blocked(),
    ]);
    let h = harness(site.clone());

    let outcome = h.engine.run(CancellationToken::new()).await.unwrap();

    let records = h.store.records().await;
    assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(
        records.iter().map(|r| r.unique_id.as_str()).collect::<Vec<_>>(),
        vec!["a", "b", "c"]
    );

    let a = &records[0];
    assert_eq!(a.email, "a@mail.example");
    assert_eq!(a.business_name.as_deref(), Some("a LLC"));
    assert_eq!(a.headquarters.as_deref(), Some("1 Main St, Anytown"));
    assert_eq!(a.store_link.as_deref(), Some("https://shop.example/sellers/a"));

    assert_eq!(records[1].email, Sentinel::SellerLinkNotFound.as_str());
    assert_eq!(records[1].store_link.as_deref(), Some(NOT_FOUND));
    assert_eq!(records[2].email, Sentinel::PopupBlocked.as_str());

    // Cursor advanced once per seller, then rewound for the next run.
    assert_eq!(h.backend.cursor_writes(), vec![1, 2, 3, 0]);
    assert_eq!(h.store.cursor().await, 0);
    assert_eq!(h.store.total_sellers().await, Some(3));

    let summary = outcome.summary();
    assert!(matches!(outcome, RunOutcome::Completed { .. }));
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.found, 1);
    assert_eq!(summary.not_found, 2);
    assert_eq!(h.engine.state(), EngineState::Completed);
    assert!(!h.engine.is_running());

    // b was reopened once; c never opened.
    assert_eq!(
        site.opens(),
        vec![
            "https://shop.example/p/a".to_string(),
            "https://shop.example/p/b".to_string(),
            "https://shop.example/p/b".to_string(),
        ]
    );
    assert_eq!(site.closes(), 3);
    assert_contexts_balanced(&site.events());
}

#[tokio::test(start_paused = true)]
async fn test_listing_context_is_captured() {
    let h = harness(FakeSite::new(vec![seller("a")]));

    h.engine.run(CancellationToken::new()).await.unwrap();

    assert_eq!(h.store.category_name().await.as_deref(), Some("Laptops"));
    let crumbs = h.store.breadcrumbs().await;
    assert_eq!(crumbs.len(), 2);
    assert_eq!(crumbs[1].name, "Laptops");
}

#[tokio::test(start_paused = true)]
async fn test_resume_processes_only_remaining_sellers() {
    let h = harness(FakeSite::new(vec![
        seller("a"),
        seller("b"),
        seller("c"),
        seller("d"),
    ]));
    let earlier = vec![
        SellerRecord::found(1, "a", "a LLC", "a@mail.example", "1 Main St"),
        SellerRecord::unreachable(2, "b", Sentinel::NavigationFailed),
    ];
    h.store.save_records(&earlier).await.unwrap();
    h.store.save_cursor(2).await.unwrap();

    h.engine.run(CancellationToken::new()).await.unwrap();

    assert_eq!(h.site.filtered_sellers(), vec!["c", "d"]);
    let records = h.store.records().await;
    assert_eq!(records.len(), 4);
    assert_eq!(&records[..2], &earlier[..]);
    assert_eq!(records[2].id, 3);
    assert_eq!(records[3].unique_id, "d");
    assert_eq!(h.backend.cursor_writes(), vec![2, 3, 4, 0]);
}

#[tokio::test(start_paused = true)]
async fn test_previous_seller_unchecked_and_out_of_stock_kept() {
    let site = FakeSite::new(vec![seller("a"), seller("b"), seller("c")]);
    site.check(OUT_OF_STOCK_ID);
    site.check("b");
    let h = harness(site.clone());
    h.store.save_cursor(2).await.unwrap();
    h.store.save_previous_seller("b").await.unwrap();

    h.engine.run(CancellationToken::new()).await.unwrap();

    let events = site.events();
    assert_eq!(events[0], Event::ClickFacet("b".to_string()));
    assert_eq!(events[1], Event::ClickFacet("c".to_string()));
    assert!(!events.contains(&Event::ClickFacet(OUT_OF_STOCK_ID.to_string())));
    assert!(site.checked().contains(&OUT_OF_STOCK_ID.to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_stale_cursor_beyond_count_restarts() {
    let h = harness(FakeSite::new(vec![seller("a"), seller("b")]));
    h.store.save_cursor(7).await.unwrap();

    h.engine.run(CancellationToken::new()).await.unwrap();

    assert_eq!(h.backend.cursor_writes(), vec![7, 0, 1, 2, 0]);
    assert_eq!(h.site.filtered_sellers(), vec!["a", "b"]);
}

#[tokio::test(start_paused = true)]
async fn test_every_failure_mode_yields_exactly_one_record() {
    let site = FakeSite::new(vec![
        seller("a").checkbox_vanishes(),
        seller("b").listing_fails(),
        seller("c").no_product(),
        seller("d").never_ready(),
        seller("e").no_contact_tab(),
        seller("f").apply_fails(),
        seller("g"),
    ]);
    let h = harness(site.clone());

    let outcome = h.engine.run(CancellationToken::new()).await.unwrap();

    let records = h.store.records().await;
    assert_eq!(
        emails(&records),
        vec![
            Sentinel::CheckboxMissing.as_str(),
            Sentinel::NavigationFailed.as_str(),
            Sentinel::NotFound.as_str(),
            Sentinel::TabLoadTimeout.as_str(),
            Sentinel::NoContactTab.as_str(),
            Sentinel::UnexpectedError.as_str(),
            "g@mail.example",
        ]
    );
    assert!(records.iter().all(|r| !r.email.is_empty()));
    assert_eq!(records[4].store_link.as_deref(), Some("https://shop.example/sellers/e"));
    assert_eq!(outcome.summary().found, 1);
    assert_eq!(outcome.summary().recovery_failures, 0);
    assert_contexts_balanced(&site.events());
}

#[tokio::test(start_paused = true)]
async fn test_lost_listing_recovers_by_reload() {
    let site = FakeSite::new(vec![seller("a").loses_listing(), seller("b")]).without_history();
    let h = harness(site.clone());

    let outcome = h.engine.run(CancellationToken::new()).await.unwrap();

    let events = site.events();
    let back = events.iter().position(|e| *e == Event::GoBack).unwrap();
    let reload = events.iter().position(|e| *e == Event::Reload).unwrap();
    assert!(back < reload);
    assert_eq!(outcome.summary().recovery_failures, 0);
    assert_eq!(emails(&h.store.records().await), vec!["a@mail.example", "b@mail.example"]);
}

#[tokio::test(start_paused = true)]
async fn test_unrecoverable_listing_still_records_every_seller() {
    let site = FakeSite::new(vec![seller("a").loses_listing(), seller("b"), seller("c")])
        .listing_unrecoverable();
    let h = harness(site.clone());

    let outcome = h.engine.run(CancellationToken::new()).await.unwrap();

    assert!(matches!(outcome, RunOutcome::Completed { .. }));
    assert_eq!(h.engine.state(), EngineState::Completed);
    let records = h.store.records().await;
    assert_eq!(
        emails(&records),
        vec![
            "a@mail.example",
            Sentinel::CheckboxMissing.as_str(),
            Sentinel::CheckboxMissing.as_str(),
        ]
    );
    assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3]);

    let summary = outcome.summary();
    assert_eq!(summary.processed, 3);
    assert!(summary.recovery_failures >= 1);
    assert!(summary.panel_failures >= 1);
    let events = site.events();
    assert!(events.contains(&Event::GoBack));
    assert!(events.contains(&Event::Reload));
    assert_eq!(site.opens(), vec!["https://shop.example/p/a".to_string()]);
    assert_contexts_balanced(&events);
    assert_eq!(h.backend.cursor_writes(), vec![1, 2, 3, 0]);
}

#[tokio::test(start_paused = true)]
async fn test_reopen_timeout_keeps_first_partial_record() {
    let site = FakeSite::new(vec![
        seller("a")
            .contact_reads(vec![Some("Headquarters:\n5 Elm St\nRiverside")])
            .ready_for_opens(1),
        seller("b"),
    ]);
    let h = harness(site.clone());

    h.engine.run(CancellationToken::new()).await.unwrap();

    let records = h.store.records().await;
    assert_eq!(records.len(), 2);
    let a = &records[0];
    assert_eq!(a.email, NOT_FOUND);
    assert_eq!(a.headquarters.as_deref(), Some("5 Elm St, Riverside"));
    assert_eq!(a.store_link.as_deref(), Some("https://shop.example/sellers/a"));
    assert_eq!(records[1].email, "b@mail.example");
    assert_eq!(
        site.opens(),
        vec![
            "https://shop.example/p/a".to_string(),
            "https://shop.example/p/a".to_string(),
            "https://shop.example/p/b".to_string(),
        ]
    );
    assert_contexts_balanced(&site.events());
}

#[tokio::test(start_paused = true)]
async fn test_panel_never_opens_is_fatal() {
    let site = FakeSite::new(vec![seller("a")]).with_dead_filter_clicks(usize::MAX);
    let h = harness(site.clone());

    let err = h.engine.run(CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, EngineError::PanelUnavailable { attempts: 5 }));
    assert_eq!(h.engine.state(), EngineState::Fatal);
    assert!(h.backend.cursor_writes().is_empty());
    assert!(h.store.records().await.is_empty());
    assert!(site.opens().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_panel_opens_after_dead_clicks() {
    let site = FakeSite::new(vec![seller("a")]).with_dead_filter_clicks(2);
    let h = harness(site);

    let outcome = h.engine.run(CancellationToken::new()).await.unwrap();
    assert_eq!(outcome.summary().found, 1);
}

#[tokio::test(start_paused = true)]
async fn test_no_selectable_sellers_is_fatal() {
    let h = harness(FakeSite::new(vec![seller("a").disabled(), seller("b").disabled()]));

    let err = h.engine.run(CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, EngineError::NoSellers));
    assert_eq!(h.store.total_sellers().await, Some(0));
    assert!(h.backend.cursor_writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_disabled_sellers_are_skipped() {
    let h = harness(FakeSite::new(vec![seller("a"), seller("b").disabled(), seller("c")]));

    h.engine.run(CancellationToken::new()).await.unwrap();

    assert_eq!(h.site.filtered_sellers(), vec!["a", "c"]);
    assert_eq!(h.store.total_sellers().await, Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_store_failure_is_fatal() {
    let h = harness(FakeSite::new(vec![seller("a")]));
    h.backend.fail_writes();

    let err = h.engine.run(CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, EngineError::Store(_)));
    assert_eq!(h.engine.state(), EngineState::Fatal);
}

#[tokio::test(start_paused = true)]
async fn test_unreadable_records_fail_without_overwriting() {
    let h = harness(FakeSite::new(vec![seller("a"), seller("b"), seller("c")]));
    let stored = json!([
        {"id": 1, "unique_id": "a", "email": "a@mail.example"},
        {"id": 2, "unique_id": "b"}
    ]);
    h.backend.set(keys::SELLER_DATA, stored.clone()).await.unwrap();
    h.store.save_cursor(2).await.unwrap();

    let err = h.engine.run(CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, EngineError::Store(_)));
    assert_eq!(h.engine.state(), EngineState::Fatal);
    assert_eq!(h.backend.get(keys::SELLER_DATA).await.unwrap(), Some(stored));
    assert_eq!(h.store.cursor().await, 2);
    assert!(h.site.filtered_sellers().is_empty());
    assert!(h.site.opens().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unreadable_cursor_is_fatal() {
    let h = harness(FakeSite::new(vec![seller("a")]));
    h.backend
        .set(keys::CURRENT_SELLER_INDEX, json!("two"))
        .await
        .unwrap();

    let err = h.engine.run(CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, EngineError::Store(_)));
    assert!(h.store.records().await.is_empty());
    assert!(h.site.filtered_sellers().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_second_run_appends_after_completion() {
    let h = harness(FakeSite::new(vec![seller("a"), seller("b")]));

    h.engine.run(CancellationToken::new()).await.unwrap();
    h.engine.run(CancellationToken::new()).await.unwrap();

    let records = h.store.records().await;
    assert_eq!(records.len(), 4);
    assert_eq!(records[2].id, 1);
    assert_eq!(h.store.cursor().await, 0);
}
