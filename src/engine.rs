// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Live analytics over the record feed, scoped to a selected month.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::TimeDelta;
use rust_decimal::Decimal;

use crate::analytics::{category_slices, daily_series, filter_month, monthly_summary};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::{MonthError, StoreError};
use crate::models::{CategorySlice, MonthlySummary, Transaction, YearMonth};
use crate::reactive::{Callback, SharedView, StateCell, Subscription, combine_latest};
use crate::store::{RecordSnapshot, RecordStore};

/// What every derived view carries: a value, or the store failure that
/// prevented computing it.
pub type ViewResult<T> = Result<T, StoreError>;

/// The records of one month, tagged with that month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthScope {
    pub month: YearMonth,
    pub records: Arc<Vec<Transaction>>,
}

type DailyView = SharedView<ViewResult<Vec<Decimal>>>;

pub struct AnalyticsEngine {
    month: Arc<StateCell<YearMonth>>,
    clock: Arc<dyn Clock>,
    grace: TimeDelta,
    filtered: SharedView<ViewResult<MonthScope>>,
    slices: SharedView<ViewResult<Vec<CategorySlice>>>,
    summary: SharedView<ViewResult<MonthlySummary>>,
    daily: Mutex<HashMap<usize, DailyView>>,
}

fn derive<U>(scope: &ViewResult<MonthScope>, f: impl FnOnce(&MonthScope) -> U) -> ViewResult<U> {
    scope.as_ref().map_err(StoreError::clone).map(f)
}

impl AnalyticsEngine {
    /// Builds the graph. The selected month starts at the clock's current
    /// month; nothing is computed until a view gets its first observer.
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, grace: TimeDelta) -> Self {
        let month = Arc::new(StateCell::new(YearMonth::of(clock.today())));

        let filtered = {
            let month = Arc::clone(&month);
            SharedView::new("filtered", Arc::clone(&clock), grace, move |emitter| {
                combine_latest(
                    |cb| store.stream_all(cb),
                    |cb| month.subscribe(cb),
                    move |snapshot: &RecordSnapshot, month: &YearMonth| {
                        let scope = snapshot.as_ref().map_err(StoreError::clone).map(|all| {
                            MonthScope {
                                month: *month,
                                records: Arc::new(filter_month(all, *month)),
                            }
                        });
                        match &scope {
                            Ok(s) => tracing::debug!(
                                %month,
                                records = s.records.len(),
                                "month filter recomputed"
                            ),
                            Err(err) => tracing::warn!(error = %err, "record feed failed"),
                        }
                        emitter.emit(scope);
                    },
                )
            })
        };

        let slices = {
            let filtered = filtered.clone();
            SharedView::new("category_slices", Arc::clone(&clock), grace, move |emitter| {
                vec![filtered.observe(Box::new(move |scope: &ViewResult<MonthScope>| {
                    emitter.emit(derive(scope, |s| category_slices(&s.records)));
                }))]
            })
        };

        let summary = {
            let filtered = filtered.clone();
            SharedView::new("summary", Arc::clone(&clock), grace, move |emitter| {
                vec![filtered.observe(Box::new(move |scope: &ViewResult<MonthScope>| {
                    emitter.emit(derive(scope, |s| monthly_summary(&s.records)));
                }))]
            })
        };

        Self {
            month,
            clock,
            grace,
            filtered,
            slices,
            summary,
            daily: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_config(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, config: &Config) -> Self {
        Self::new(store, clock, config.share_grace())
    }

    pub fn selected_month(&self) -> YearMonth {
        self.month.get()
    }

    /// Changes the month every view is scoped to. An invalid month leaves
    /// the current selection untouched.
    pub fn set_selected_month(&self, year: i32, month: u32) -> Result<(), MonthError> {
        let selected = YearMonth::new(year, month)?;
        if self.month.set(selected) {
            tracing::info!(month = %selected, "selected month changed");
        }
        Ok(())
    }

    pub fn observe_filtered(&self, callback: Callback<ViewResult<MonthScope>>) -> Subscription {
        self.filtered.observe(callback)
    }

    pub fn observe_category_slices(
        &self,
        callback: Callback<ViewResult<Vec<CategorySlice>>>,
    ) -> Subscription {
        self.slices.observe(callback)
    }

    pub fn observe_summary(&self, callback: Callback<ViewResult<MonthlySummary>>) -> Subscription {
        self.summary.observe(callback)
    }

    /// Trailing `days`-day spend series. Observers asking for the same
    /// window length share one view.
    pub fn observe_daily_series(
        &self,
        days: usize,
        callback: Callback<ViewResult<Vec<Decimal>>>,
    ) -> Subscription {
        self.daily_view(days).observe(callback)
    }

    pub fn category_slices(&self) -> ViewResult<Vec<CategorySlice>> {
        self.slices.snapshot().unwrap_or(Err(StoreError::Unavailable))
    }

    pub fn summary(&self) -> ViewResult<MonthlySummary> {
        self.summary.snapshot().unwrap_or(Err(StoreError::Unavailable))
    }

    pub fn daily_series(&self, days: usize) -> ViewResult<Vec<Decimal>> {
        self.daily_view(days)
            .snapshot()
            .unwrap_or(Err(StoreError::Unavailable))
    }

    pub fn filtered(&self) -> ViewResult<MonthScope> {
        self.filtered.snapshot().unwrap_or(Err(StoreError::Unavailable))
    }

    /// Tears down views idle past the grace period. Returns how many went.
    pub fn sweep(&self) -> usize {
        let mut swept = 0;
        let daily: Vec<DailyView> = self.lock_daily().values().cloned().collect();
        // Dependents first, so the filter view sees its last observer leave.
        for view in daily {
            swept += usize::from(view.sweep());
        }
        swept += usize::from(self.slices.sweep());
        swept += usize::from(self.summary.sweep());
        swept += usize::from(self.filtered.sweep());
        // Torn-down daily views restart from scratch anyway; drop them.
        self.lock_daily().retain(|_, view| view.is_active());
        swept
    }

    fn lock_daily(&self) -> std::sync::MutexGuard<'_, HashMap<usize, DailyView>> {
        self.daily.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn daily_view(&self, days: usize) -> DailyView {
        self.lock_daily()
            .entry(days)
            .or_insert_with(|| {
                let filtered = self.filtered.clone();
                let clock = Arc::clone(&self.clock);
                SharedView::new("daily_series", Arc::clone(&self.clock), self.grace, move |emitter| {
                    let clock = Arc::clone(&clock);
                    vec![filtered.observe(Box::new(move |scope: &ViewResult<MonthScope>| {
                        let today = clock.today();
                        emitter.emit(derive(scope, |s| {
                            daily_series(&s.records, s.month, today, days)
                        }));
                    }))]
                })
            })
            .clone()
    }
}
