// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use limited_lottery::{LotteryState, WinnerRecord};
use linera_sdk::views::{linera_views, MapView, RegisterView, RootView, ViewStorageContext};

/// The application state for the Limited Lottery.
#[derive(RootView)]
#[view(context = ViewStorageContext)]
pub struct LimitedLotteryState {
    /// Configuration and the tickets of the current round.
    pub lottery: RegisterView<LotteryState>,
    /// Past draws, keyed by round number.
    pub winners: MapView<u64, WinnerRecord>,
}
