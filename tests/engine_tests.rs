// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use std::sync::{Arc, Mutex};

use chrono::TimeDelta;
use common::{at, clock_at, dec, new_tx, store};
use rust_decimal::Decimal;
use spendlens::analytics::NO_DATA;
use spendlens::engine::{AnalyticsEngine, MonthScope, ViewResult};
use spendlens::models::{CategorySlice, MonthlySummary, YearMonth};
use spendlens::store::{RecordSnapshot, RecordStore};

type Seen<T> = Arc<Mutex<Vec<ViewResult<T>>>>;

fn collect<T: Clone + Send + 'static>() -> (Seen<T>, Box<dyn FnMut(&ViewResult<T>) + Send>) {
    let seen: Seen<T> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, Box::new(move |v: &ViewResult<T>| sink.lock().unwrap().push(v.clone())))
}

fn names(slices: &ViewResult<Vec<CategorySlice>>) -> Vec<String> {
    slices
        .as_ref()
        .unwrap()
        .iter()
        .map(|s| s.name.clone())
        .collect()
}

#[test]
fn slices_follow_store_writes() {
    let store = store();
    let engine = AnalyticsEngine::new(store.clone(), clock_at(2024, 3, 20), TimeDelta::seconds(5));
    let (seen, cb) = collect::<Vec<CategorySlice>>();
    let _sub = engine.observe_category_slices(cb);

    store.insert(new_tx("Food", "100", at(2024, 3, 1, 9))).unwrap();
    store.insert(new_tx("Transport", "50", at(2024, 3, 2, 9))).unwrap();
    // Outside the selected month: recomputes, but changes nothing.
    store.insert(new_tx("Bills", "500", at(2024, 2, 2, 9))).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 4);
    assert_eq!(names(&seen[0]), vec![NO_DATA]);
    assert_eq!(names(&seen[1]), vec!["Food"]);
    assert_eq!(names(&seen[2]), vec!["Food", "Transport"]);
    assert_eq!(seen[3], seen[2]);
}

#[test]
fn month_change_recomputes_every_view() {
    let store = store();
    store.insert(new_tx("Food", "10", at(2024, 2, 28, 9))).unwrap();
    store.insert(new_tx("Bills", "30", at(2024, 3, 1, 9))).unwrap();
    let engine = AnalyticsEngine::new(store.clone(), clock_at(2024, 3, 20), TimeDelta::seconds(5));

    let (slices, cb) = collect::<Vec<CategorySlice>>();
    let _s = engine.observe_category_slices(cb);
    let (daily, cb) = collect::<Vec<Decimal>>();
    let _d = engine.observe_daily_series(3, cb);

    engine.set_selected_month(2024, 2).unwrap();
    // Same month again: nothing new is published.
    engine.set_selected_month(2024, 2).unwrap();

    let slices = slices.lock().unwrap();
    assert_eq!(slices.len(), 2);
    assert_eq!(names(&slices[0]), vec!["Bills"]);
    assert_eq!(names(&slices[1]), vec!["Food"]);

    let daily = daily.lock().unwrap();
    assert_eq!(daily.len(), 2);
    // March is current: the window ends today (the 20th).
    assert_eq!(daily[0], Ok(vec![Decimal::ZERO; 3]));
    // February is past: the window ends on the 29th (leap year).
    assert_eq!(daily[1], Ok(vec![Decimal::ZERO, dec("10"), Decimal::ZERO]));
}

#[test]
fn past_month_window_anchors_at_month_end() {
    let store = store();
    store.insert(new_tx("Food", "4", at(2024, 1, 31, 22))).unwrap();
    store.insert(new_tx("Food", "6", at(2024, 1, 25, 7))).unwrap();
    store.insert(new_tx("Food", "9", at(2024, 1, 24, 7))).unwrap();
    let engine = AnalyticsEngine::new(store, clock_at(2024, 6, 15), TimeDelta::seconds(5));
    engine.set_selected_month(2024, 1).unwrap();

    let series = engine.daily_series(7).unwrap();
    assert_eq!(
        series,
        vec![
            dec("6"),
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
            dec("4"),
        ]
    );
}

#[test]
fn observers_of_one_view_share_its_computation() {
    let store = store();
    let engine = AnalyticsEngine::new(store.clone(), clock_at(2024, 3, 20), TimeDelta::seconds(5));
    let (a, cb_a) = collect::<Vec<CategorySlice>>();
    let (b, cb_b) = collect::<Vec<CategorySlice>>();
    let _sa = engine.observe_category_slices(cb_a);
    store.insert(new_tx("Food", "1", at(2024, 3, 3, 9))).unwrap();
    let _sb = engine.observe_category_slices(cb_b);
    store.insert(new_tx("Bills", "3", at(2024, 3, 4, 9))).unwrap();

    let a = a.lock().unwrap();
    let b = b.lock().unwrap();
    // The late observer starts from the cached value, not a fresh run.
    assert_eq!(a.len(), 3);
    assert_eq!(b.len(), 2);
    assert_eq!(a[1..], b[..]);
}

#[test]
fn detached_view_restarts_from_current_store_state() {
    let store = store();
    let clock = clock_at(2024, 3, 20);
    let engine = AnalyticsEngine::new(store.clone(), clock.clone(), TimeDelta::seconds(5));

    let first = engine.category_slices().unwrap();
    assert_eq!(first[0].name, NO_DATA);

    clock.advance(TimeDelta::seconds(30));
    assert!(engine.sweep() >= 1);
    store.insert(new_tx("Shopping", "20", at(2024, 3, 19, 9))).unwrap();

    let (seen, cb) = collect::<Vec<CategorySlice>>();
    let _sub = engine.observe_category_slices(cb);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(names(&seen[0]), vec!["Shopping"]);
}

#[test]
fn summary_tracks_selected_month() {
    let store = store();
    store.insert(new_tx("Food", "12.40", at(2024, 3, 1, 9))).unwrap();
    store.insert(new_tx("Bills", "60", at(2024, 3, 2, 9))).unwrap();
    let engine = AnalyticsEngine::new(store, clock_at(2024, 3, 20), TimeDelta::zero());

    let summary = engine.summary().unwrap();
    assert_eq!(summary.count, 2);
    assert_eq!(summary.total, dec("72.40"));
    assert_eq!(summary.top_category.as_deref(), Some("Bills"));

    engine.set_selected_month(2024, 4).unwrap();
    assert_eq!(engine.summary().unwrap().count, 0);
    assert_eq!(engine.selected_month(), YearMonth::new(2024, 4).unwrap());
}

#[test]
fn store_stream_replays_current_snapshot() {
    let store = store();
    store.insert(new_tx("Food", "5", at(2024, 3, 1, 9))).unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let sub = store.stream_all(Box::new(move |snap: &RecordSnapshot| {
        sink.lock().unwrap().push(snap.as_ref().map(|v| v.len()).unwrap_or(0));
    }));
    store.insert(new_tx("Food", "6", at(2024, 3, 2, 9))).unwrap();
    drop(sub);
    store.insert(new_tx("Food", "7", at(2024, 3, 3, 9))).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
}

#[test]
fn filtered_scope_and_summary_observers_see_each_write() {
    let store = store();
    let engine = AnalyticsEngine::new(store.clone(), clock_at(2024, 3, 20), TimeDelta::seconds(5));
    let (scopes, cb) = collect::<MonthScope>();
    let _f = engine.observe_filtered(cb);
    let (summaries, cb) = collect::<MonthlySummary>();
    let _s = engine.observe_summary(cb);

    let food = store.insert(new_tx("Food", "7.50", at(2024, 3, 3, 9))).unwrap();
    store.insert(new_tx("Food", "2.50", at(2024, 3, 4, 9))).unwrap();
    store.delete(food.id).unwrap();

    let scopes = scopes.lock().unwrap();
    let counts: Vec<usize> = scopes.iter().map(|s| s.as_ref().unwrap().records.len()).collect();
    assert_eq!(counts, vec![0, 1, 2, 1]);
    let totals: Vec<Decimal> = summaries
        .lock()
        .unwrap()
        .iter()
        .map(|s| s.as_ref().unwrap().total)
        .collect();
    assert_eq!(totals, vec![Decimal::ZERO, dec("7.50"), dec("10.00"), dec("2.50")]);

    let scope = engine.filtered().unwrap();
    assert_eq!(scope.month, YearMonth::new(2024, 3).unwrap());
    assert_eq!(scope.records[0].amount, dec("2.50"));
}

#[test]
fn daily_window_follows_clock_on_next_recompute() {
    let store = store();
    store.insert(new_tx("Food", "3", at(2024, 3, 20, 9))).unwrap();
    let clock = clock_at(2024, 3, 20);
    let engine = AnalyticsEngine::new(store.clone(), clock.clone(), TimeDelta::seconds(5));
    let (daily, cb) = collect::<Vec<Decimal>>();
    let _d = engine.observe_daily_series(2, cb);

    clock.set(at(2024, 3, 21, 8));
    store.insert(new_tx("Food", "4", at(2024, 3, 21, 7))).unwrap();

    let daily = daily.lock().unwrap();
    assert_eq!(daily[0], Ok(vec![Decimal::ZERO, dec("3")]));
    assert_eq!(daily[1], Ok(vec![dec("3"), dec("4")]));
}

#[test]
fn month_changed_from_a_replay_reaches_that_observer() {
    let store = store();
    store.insert(new_tx("Food", "10", at(2024, 2, 10, 9))).unwrap();
    let engine = Arc::new(AnalyticsEngine::new(
        store,
        clock_at(2024, 3, 20),
        TimeDelta::seconds(5),
    ));
    let (_first, cb) = collect::<Vec<CategorySlice>>();
    let _a = engine.observe_category_slices(cb);

    let seen: Seen<Vec<CategorySlice>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let handle = Arc::clone(&engine);
    let _b = engine.observe_category_slices(Box::new(
        move |v: &ViewResult<Vec<CategorySlice>>| {
            sink.lock().unwrap().push(v.clone());
            handle.set_selected_month(2024, 2).unwrap();
        },
    ));

    let seen = seen.lock().unwrap();
    assert_eq!(engine.selected_month(), YearMonth::new(2024, 2).unwrap());
    assert_eq!(seen.len(), 2);
    assert_eq!(names(&seen[0]), vec![NO_DATA]);
    assert_eq!(names(&seen[1]), vec!["Food"]);
    assert_eq!(engine.category_slices(), seen[1]);
}
