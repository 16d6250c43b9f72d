// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(target_arch = "wasm32", no_main)]

mod state;

use limited_lottery::{
    check_admin, LimitedLotteryAbi, LotteryConfig, LotteryError, LotteryOperation,
    LotteryParameters, LotteryResponse, LotteryState,
};
use linera_sdk::{
    linera_base_types::{Account, AccountOwner, Amount, WithContractAbi},
    views::{RootView, View},
    Contract, ContractRuntime,
};
use self::state::LimitedLotteryState;

pub struct LimitedLotteryContract {
    state: LimitedLotteryState,
    runtime: ContractRuntime<Self>,
}

linera_sdk::contract!(LimitedLotteryContract);

impl WithContractAbi for LimitedLotteryContract {
    type Abi = LimitedLotteryAbi;
}

impl Contract for LimitedLotteryContract {
    type Message = ();
    type Parameters = LotteryParameters;
    type InstantiationArgument = LotteryConfig;
    type EventValue = ();

    async fn load(runtime: ContractRuntime<Self>) -> Self {
        let state = LimitedLotteryState::load(runtime.root_view_storage_context())
            .await
            .expect("Failed to load state");
        LimitedLotteryContract { state, runtime }
    }

    async fn instantiate(&mut self, config: Self::InstantiationArgument) {
        let params = self.runtime.application_parameters();
        let lottery = LotteryState::new(config).unwrap_or_else(|error| abort("instantiate", error));
        log::info!(
            "Lottery created: {} tickets at {} each, {} per address, admin {:?}",
            config.max_tickets,
            config.ticket_cost,
            config.max_tickets_per_address,
            params.admin,
        );
        self.state.lottery.set(lottery);
    }

    async fn execute_operation(&mut self, operation: Self::Operation) -> Self::Response {
        match operation {
            LotteryOperation::BuyTickets { count, payment } => {
                let buyer = self
                    .runtime
                    .authenticated_signer()
                    .expect("Buying tickets requires an authenticated signer");
                let purchase = self
                    .state
                    .lottery
                    .get_mut()
                    .buy_tickets(buyer, payment, count)
                    .unwrap_or_else(|error| abort("buy tickets", error));

                let pool = self.pool_owner();
                self.send(buyer, pool, payment);
                if !purchase.change.is_zero() {
                    self.send(pool, buyer, purchase.change);
                }
                log::info!(
                    "{:?} bought tickets {}..{} for {}, change {}",
                    buyer,
                    purchase.first_ticket,
                    purchase.first_ticket + purchase.count,
                    purchase.cost,
                    purchase.change,
                );
                LotteryResponse::Purchase(purchase)
            }

            LotteryOperation::DrawWinner { seed } => {
                self.authorize("draw winner");
                let pool = self.pool_owner();
                let balance = self.runtime.owner_balance(pool);
                let record = self
                    .state
                    .lottery
                    .get_mut()
                    .draw_winner(seed, balance)
                    .unwrap_or_else(|error| abort("draw winner", error));

                if !record.prize.is_zero() {
                    self.send(pool, record.owner, record.prize);
                }
                self.state
                    .winners
                    .insert(&record.round, record.clone())
                    .expect("Failed to record winner");
                log::info!(
                    "Round {} won by {:?} with ticket {} (seed {}), prize {}",
                    record.round,
                    record.owner,
                    record.ticket_index,
                    seed,
                    record.prize,
                );
                LotteryResponse::Winner(record)
            }

            LotteryOperation::ResetLottery => {
                self.authorize("reset lottery");
                let lottery = self.state.lottery.get_mut();
                log::info!(
                    "Round {} reset with {} tickets sold",
                    lottery.round(),
                    lottery.tickets_sold()
                );
                lottery.reset();
                LotteryResponse::Ok
            }

            LotteryOperation::SetParams {
                ticket_cost,
                max_tickets,
                max_tickets_per_address,
            } => {
                self.authorize("set params");
                let config = LotteryConfig {
                    ticket_cost,
                    max_tickets,
                    max_tickets_per_address,
                };
                self.state
                    .lottery
                    .get_mut()
                    .set_params(config)
                    .unwrap_or_else(|error| abort("set params", error));
                log::info!("Lottery reconfigured: {:?}", config);
                LotteryResponse::Ok
            }
        }
    }

    async fn execute_message(&mut self, _message: Self::Message) {
        panic!("Limited Lottery does not exchange messages");
    }

    async fn store(mut self) {
        self.state.save().await.expect("Failed to save state");
    }
}

impl LimitedLotteryContract {
    /// The application's own account, which holds the pool.
    fn pool_owner(&mut self) -> AccountOwner {
        AccountOwner::from(self.runtime.application_id().forget_abi())
    }

    fn send(&mut self, source: AccountOwner, owner: AccountOwner, amount: Amount) {
        let destination = Account {
            chain_id: self.runtime.chain_id(),
            owner,
        };
        log::debug!("Transfer of {} from {:?} to {:?}", amount, source, owner);
        self.runtime.transfer(source, destination, amount);
    }

    fn authorize(&mut self, operation: &str) {
        let admin = self.runtime.application_parameters().admin;
        let caller = self.runtime.authenticated_signer();
        if let Err(error) = check_admin(admin, caller) {
            abort(operation, error);
        }
    }
}

/// Rejects the operation; the runtime discards every effect it had.
fn abort(operation: &str, error: LotteryError) -> ! {
    panic!("Failed to {operation}: {error}")
}
