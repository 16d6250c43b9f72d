// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Ticket sales, caps and winner selection for a single lottery pool.
//!
//! Every transition validates all of its preconditions before the first
//! mutation, so a returned error always leaves the state untouched.

use std::collections::BTreeMap;

use async_graphql::SimpleObject;
use linera_sdk::linera_base_types::{AccountOwner, Amount};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MAX_TICKETS: u64 = 5;
pub const DEFAULT_MAX_TICKETS_PER_ADDRESS: u64 = 2;

/// Pool configuration for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct LotteryConfig {
    /// Price of a single ticket.
    pub ticket_cost: Amount,
    /// Tickets sold per round.
    pub max_tickets: u64,
    /// Tickets a single owner may hold in a round.
    pub max_tickets_per_address: u64,
}

impl Default for LotteryConfig {
    fn default() -> Self {
        LotteryConfig {
            ticket_cost: Amount::ONE,
            max_tickets: DEFAULT_MAX_TICKETS,
            max_tickets_per_address: DEFAULT_MAX_TICKETS_PER_ADDRESS,
        }
    }
}

impl LotteryConfig {
    /// Checks the cap relation, then the cost, then the pool size.
    pub fn validate(&self) -> Result<(), LotteryError> {
        if self.max_tickets < self.max_tickets_per_address {
            return Err(LotteryError::InvalidCapRelation {
                max_tickets: self.max_tickets,
                max_tickets_per_address: self.max_tickets_per_address,
            });
        }
        if self.ticket_cost.is_zero() {
            return Err(LotteryError::InvalidCost);
        }
        if self.max_tickets == 0 {
            return Err(LotteryError::InvalidMax);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LotteryError {
    #[error("at least one ticket must be requested")]
    ZeroTickets,
    #[error("no tickets are available in this round")]
    SoldOut,
    #[error("payment of {attached} does not cover {required}")]
    InsufficientPayment { required: Amount, attached: Amount },
    #[error("owner would hold {owned} tickets, the limit is {limit}")]
    AddressLimitExceeded { owned: u64, limit: u64 },
    #[error("purchase of {requested} tickets exceeds the pool ({available} left of {max_tickets})")]
    PoolLimitExceeded {
        requested: u64,
        available: u64,
        max_tickets: u64,
    },
    #[error("{0} tickets are still unsold")]
    RoundIncomplete(u64),
    #[error("parameters cannot change while a round is in progress")]
    RoundInProgress,
    #[error("max tickets ({max_tickets}) must be at least the per-address limit ({max_tickets_per_address})")]
    InvalidCapRelation {
        max_tickets: u64,
        max_tickets_per_address: u64,
    },
    #[error("ticket cost must be positive")]
    InvalidCost,
    #[error("max tickets must be positive")]
    InvalidMax,
    #[error("caller is not the lottery administrator")]
    Unauthorized,
    #[error("ticket {0} has no owner")]
    MissingTicket(u64),
}

/// Outcome of a successful purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct TicketPurchase {
    pub owner: AccountOwner,
    /// Index of the first ticket assigned by this purchase.
    pub first_ticket: u64,
    pub count: u64,
    /// `ticket_cost * count`, kept in the pool.
    pub cost: Amount,
    /// Excess payment to return to the owner.
    pub change: Amount,
}

/// Outcome of a successful draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct WinnerRecord {
    pub round: u64,
    pub ticket_index: u64,
    pub owner: AccountOwner,
    pub prize: Amount,
}

/// Admits `caller` when no administrator is configured or when it is the administrator.
pub fn check_admin(
    admin: Option<AccountOwner>,
    caller: Option<AccountOwner>,
) -> Result<(), LotteryError> {
    match admin {
        None => Ok(()),
        Some(admin) if caller == Some(admin) => Ok(()),
        Some(_) => Err(LotteryError::Unauthorized),
    }
}

/// The mutable lottery record: configuration plus the current round's tickets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryState {
    config: LotteryConfig,
    tickets_avbl: u64,
    /// Ticket index to owner, in purchase order.
    participants: Vec<AccountOwner>,
    tickets_by_owner: BTreeMap<AccountOwner, u64>,
    round: u64,
}

impl Default for LotteryState {
    fn default() -> Self {
        let config = LotteryConfig::default();
        LotteryState {
            config,
            tickets_avbl: config.max_tickets,
            participants: Vec::new(),
            tickets_by_owner: BTreeMap::new(),
            round: 0,
        }
    }
}

impl LotteryState {
    pub fn new(config: LotteryConfig) -> Result<Self, LotteryError> {
        config.validate()?;
        Ok(LotteryState {
            config,
            tickets_avbl: config.max_tickets,
            ..LotteryState::default()
        })
    }

    pub fn config(&self) -> LotteryConfig {
        self.config
    }

    pub fn ticket_cost(&self) -> Amount {
        self.config.ticket_cost
    }

    pub fn max_tickets(&self) -> u64 {
        self.config.max_tickets
    }

    pub fn max_tickets_per_address(&self) -> u64 {
        self.config.max_tickets_per_address
    }

    pub fn tickets_available(&self) -> u64 {
        self.tickets_avbl
    }

    pub fn tickets_sold(&self) -> u64 {
        self.participants.len() as u64
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn participants(&self) -> &[AccountOwner] {
        &self.participants
    }

    pub fn owner_of(&self, ticket_index: u64) -> Option<AccountOwner> {
        usize::try_from(ticket_index)
            .ok()
            .and_then(|index| self.participants.get(index))
            .copied()
    }

    pub fn tickets_of(&self, owner: &AccountOwner) -> u64 {
        self.tickets_by_owner.get(owner).copied().unwrap_or(0)
    }

    /// Whether tickets can still be bought this round.
    pub fn is_round_open(&self) -> bool {
        self.tickets_avbl > 0
    }

    /// Whether no ticket has been sold yet this round.
    pub fn is_round_fresh(&self) -> bool {
        self.tickets_avbl == self.config.max_tickets
    }

    /// Sells `count` tickets to `buyer`, who attached `payment`.
    pub fn buy_tickets(
        &mut self,
        buyer: AccountOwner,
        payment: Amount,
        count: u64,
    ) -> Result<TicketPurchase, LotteryError> {
        if count == 0 {
            return Err(LotteryError::ZeroTickets);
        }
        if self.tickets_avbl == 0 {
            return Err(LotteryError::SoldOut);
        }
        let cost = u128::from(self.config.ticket_cost)
            .checked_mul(u128::from(count))
            .map(Amount::from_attos)
            .ok_or(LotteryError::InsufficientPayment {
                required: Amount::from_attos(u128::MAX),
                attached: payment,
            })?;
        if payment < cost {
            return Err(LotteryError::InsufficientPayment {
                required: cost,
                attached: payment,
            });
        }
        let owned = self.tickets_of(&buyer).saturating_add(count);
        if owned > self.config.max_tickets_per_address {
            return Err(LotteryError::AddressLimitExceeded {
                owned,
                limit: self.config.max_tickets_per_address,
            });
        }
        if owned > self.config.max_tickets || count > self.tickets_avbl {
            return Err(LotteryError::PoolLimitExceeded {
                requested: count,
                available: self.tickets_avbl,
                max_tickets: self.config.max_tickets,
            });
        }

        let first_ticket = self.tickets_sold();
        self.participants
            .extend(std::iter::repeat(buyer).take(count as usize));
        self.tickets_by_owner.insert(buyer, owned);
        self.tickets_avbl -= count;

        Ok(TicketPurchase {
            owner: buyer,
            first_ticket,
            count,
            cost,
            change: payment.saturating_sub(cost),
        })
    }

    /// Picks ticket `seed mod max_tickets` and awards it the whole `pool_balance`.
    ///
    /// The seed is trusted as given: whoever chooses it chooses the winner.
    pub fn draw_winner(
        &mut self,
        seed: u64,
        pool_balance: Amount,
    ) -> Result<WinnerRecord, LotteryError> {
        if self.tickets_avbl != 0 {
            return Err(LotteryError::RoundIncomplete(self.tickets_avbl));
        }
        let ticket_index = seed % self.config.max_tickets;
        let owner = self
            .owner_of(ticket_index)
            .ok_or(LotteryError::MissingTicket(ticket_index))?;

        let record = WinnerRecord {
            round: self.round,
            ticket_index,
            owner,
            prize: pool_balance,
        };
        self.start_next_round();
        Ok(record)
    }

    /// Abandons the current round. Funds already paid stay in the pool.
    pub fn reset(&mut self) {
        self.start_next_round();
    }

    /// Replaces the configuration; only allowed before the first sale of a round.
    pub fn set_params(&mut self, config: LotteryConfig) -> Result<(), LotteryError> {
        if !self.is_round_fresh() {
            return Err(LotteryError::RoundInProgress);
        }
        config.validate()?;
        self.config = config;
        self.tickets_avbl = config.max_tickets;
        Ok(())
    }

    fn start_next_round(&mut self) {
        self.participants.clear();
        self.tickets_by_owner.clear();
        self.tickets_avbl = self.config.max_tickets;
        self.round += 1;
    }
}
