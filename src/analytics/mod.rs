// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pure aggregation over transaction snapshots. Nothing in here reads a
//! clock or touches storage; every function is a total function of its
//! arguments.

pub mod categories;
pub mod daily;
pub mod month;
pub mod summary;

pub use categories::{NO_DATA, category_color, category_slices};
pub use daily::{DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS, daily_series, window_anchor};
pub use month::filter_month;
pub use summary::monthly_summary;
