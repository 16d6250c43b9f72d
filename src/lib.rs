// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

/*! ABI of the Limited Lottery application */

pub mod lottery;

use async_graphql::{Request, Response};
use linera_sdk::linera_base_types::{AccountOwner, Amount, ContractAbi, ServiceAbi};
use serde::{Deserialize, Serialize};

pub use lottery::{
    check_admin, LotteryConfig, LotteryError, LotteryState, TicketPurchase, WinnerRecord,
};

pub struct LimitedLotteryAbi;

impl ContractAbi for LimitedLotteryAbi {
    type Operation = LotteryOperation;
    type Response = LotteryResponse;
}

impl ServiceAbi for LimitedLotteryAbi {
    type Query = Request;
    type QueryResponse = Response;
}

/// Application-wide settings fixed at creation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LotteryParameters {
    /// Signer allowed to draw, reset and reconfigure. `None` leaves those
    /// operations open to anyone.
    pub admin: Option<AccountOwner>,
}

#[derive(Debug, Deserialize, Serialize)]
pub enum LotteryOperation {
    /// Buy `count` tickets for the signer, paying `payment` from their account.
    /// Any excess over the ticket cost is sent back.
    BuyTickets { count: u64, payment: Amount },
    /// Pay the whole pool to the owner of ticket `seed mod max_tickets`.
    DrawWinner { seed: u64 },
    /// Abandon the current round without a payout.
    ResetLottery,
    /// Replace the round configuration before any ticket is sold.
    SetParams {
        ticket_cost: Amount,
        max_tickets: u64,
        max_tickets_per_address: u64,
    },
}

#[derive(Debug, Deserialize, Serialize)]
pub enum LotteryResponse {
    Ok,
    Purchase(TicketPurchase),
    Winner(WinnerRecord),
}
