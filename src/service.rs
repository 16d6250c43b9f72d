// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(target_arch = "wasm32", no_main)]

mod state;

use std::sync::Arc;

use async_graphql::{EmptySubscription, Object, Request, Response, Schema, SimpleObject};
use limited_lottery::{
    LimitedLotteryAbi, LotteryConfig, LotteryOperation, LotteryParameters, WinnerRecord,
};
use linera_sdk::{
    linera_base_types::{AccountOwner, Amount, WithServiceAbi},
    views::View,
    Service, ServiceRuntime,
};
use self::state::LimitedLotteryState;

pub struct LimitedLotteryService {
    state: Arc<LimitedLotteryState>,
    runtime: Arc<ServiceRuntime<Self>>,
}

linera_sdk::service!(LimitedLotteryService);

impl WithServiceAbi for LimitedLotteryService {
    type Abi = LimitedLotteryAbi;
}

impl Service for LimitedLotteryService {
    type Parameters = LotteryParameters;

    async fn new(runtime: ServiceRuntime<Self>) -> Self {
        let state = LimitedLotteryState::load(runtime.root_view_storage_context())
            .await
            .expect("Failed to load state");
        LimitedLotteryService {
            state: Arc::new(state),
            runtime: Arc::new(runtime),
        }
    }

    async fn handle_query(&self, request: Request) -> Response {
        let schema = Schema::build(
            QueryRoot {
                state: self.state.clone(),
                runtime: self.runtime.clone(),
            },
            MutationRoot {
                runtime: self.runtime.clone(),
            },
            EmptySubscription,
        )
        .finish();
        schema.execute(request).await
    }
}

/// A sold ticket of the current round.
#[derive(SimpleObject)]
struct TicketEntry {
    index: u64,
    owner: AccountOwner,
}

struct QueryRoot {
    state: Arc<LimitedLotteryState>,
    runtime: Arc<ServiceRuntime<LimitedLotteryService>>,
}

#[Object]
impl QueryRoot {
    async fn config(&self) -> LotteryConfig {
        self.state.lottery.get().config()
    }

    async fn ticket_cost(&self) -> Amount {
        self.state.lottery.get().ticket_cost()
    }

    async fn max_tickets(&self) -> u64 {
        self.state.lottery.get().max_tickets()
    }

    async fn max_tickets_per_address(&self) -> u64 {
        self.state.lottery.get().max_tickets_per_address()
    }

    async fn tickets_available(&self) -> u64 {
        self.state.lottery.get().tickets_available()
    }

    async fn tickets_sold(&self) -> u64 {
        self.state.lottery.get().tickets_sold()
    }

    /// Number of the round currently selling tickets.
    async fn round(&self) -> u64 {
        self.state.lottery.get().round()
    }

    /// Whether tickets can still be bought in this round.
    async fn round_open(&self) -> bool {
        self.state.lottery.get().is_round_open()
    }

    async fn participants(&self) -> Vec<TicketEntry> {
        self.state
            .lottery
            .get()
            .participants()
            .iter()
            .zip(0u64..)
            .map(|(owner, index)| TicketEntry {
                index,
                owner: *owner,
            })
            .collect()
    }

    async fn tickets_of(&self, owner: AccountOwner) -> u64 {
        self.state.lottery.get().tickets_of(&owner)
    }

    /// Balance of the application account that will be paid to the next winner.
    async fn pool_balance(&self) -> Amount {
        let application = AccountOwner::from(self.runtime.application_id().forget_abi());
        self.runtime.owner_balance(application)
    }

    async fn admin(&self) -> Option<AccountOwner> {
        self.runtime.application_parameters().admin
    }

    async fn winner(&self, round: u64) -> Option<WinnerRecord> {
        self.state.winners.get(&round).await.ok().flatten()
    }

    async fn winners(&self) -> Result<Vec<WinnerRecord>, async_graphql::Error> {
        let rounds = self.state.winners.indices().await?;
        let mut winners = Vec::with_capacity(rounds.len());
        for round in rounds {
            if let Some(record) = self.state.winners.get(&round).await? {
                winners.push(record);
            }
        }
        Ok(winners)
    }
}

struct MutationRoot {
    runtime: Arc<ServiceRuntime<LimitedLotteryService>>,
}

#[Object]
impl MutationRoot {
    /// Buy tickets for the signer of the scheduled operation
    async fn buy_tickets(&self, count: u64, payment: Amount) -> String {
        self.runtime
            .schedule_operation(&LotteryOperation::BuyTickets { count, payment });
        "BuyTickets operation scheduled".to_string()
    }

    async fn draw_winner(&self, seed: u64) -> String {
        self.runtime
            .schedule_operation(&LotteryOperation::DrawWinner { seed });
        "DrawWinner operation scheduled".to_string()
    }

    async fn reset_lottery(&self) -> String {
        self.runtime.schedule_operation(&LotteryOperation::ResetLottery);
        "ResetLottery operation scheduled".to_string()
    }

    async fn set_params(
        &self,
        ticket_cost: Amount,
        max_tickets: u64,
        max_tickets_per_address: u64,
    ) -> String {
        self.runtime.schedule_operation(&LotteryOperation::SetParams {
            ticket_cost,
            max_tickets,
            max_tickets_per_address,
        });
        "SetParams operation scheduled".to_string()
    }
}
