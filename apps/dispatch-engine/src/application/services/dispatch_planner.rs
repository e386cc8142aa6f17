//! Dispatch Planner
//!
//! The synchronous half of a dispatch: validate the request against the
//! market, run the risk gate, resolve and presence-filter the target
//! accounts, allocate, and evaluate each share's margin. Preview and
//! dispatch share it so both see exactly the same plan.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use super::presence_registry::PresenceRegistry;
use crate::application::dto::DispatchRequest;
use crate::application::ports::QuoteSourcePort;
use crate::config::RiskConfig;
use crate::domain::accounts::{Account, AccountRepository};
use crate::domain::allocation::allocate;
use crate::domain::order_dispatch::OrderSide;
use crate::domain::risk_management::{
    MarginCheck, RiskViolation, basic_risk_check, price_band_check,
};
use crate::domain::shared::{Money, Quote, Symbol};
use crate::error::DispatchError;

/// One online account's share of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedShare {
    /// Target account.
    pub account: Account,
    /// Allocated quantity, always positive.
    pub qty: u64,
    /// Margin requirement against the account's capital.
    pub margin: MarginCheck,
}

/// Validated plan for a dispatch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPlan {
    /// Normalized symbol.
    pub symbol: Symbol,
    /// Quote the plan was priced against.
    pub quote: Quote,
    /// Price used for risk and margin.
    pub effective_price: Decimal,
    /// Lot multiplier.
    pub lot: u32,
    /// Accounts matching the selector before the presence filter.
    pub candidates: usize,
    /// Shares with positive quantity, in candidate order.
    pub shares: Vec<PlannedShare>,
}

impl DispatchPlan {
    /// Σ planned quantity.
    #[must_use]
    pub fn requested_qty(&self) -> u64 {
        self.shares.iter().map(|s| s.qty).sum()
    }

    /// First share whose account lacks margin.
    #[must_use]
    pub fn first_margin_failure(&self) -> Option<&PlannedShare> {
        self.shares.iter().find(|s| !s.margin.passes())
    }
}

/// Builds dispatch plans.
pub struct DispatchPlanner<A, Q>
where
    A: AccountRepository,
    Q: QuoteSourcePort,
{
    accounts: Arc<A>,
    quotes: Arc<Q>,
    presence: Arc<PresenceRegistry>,
    risk: RiskConfig,
}

impl<A, Q> DispatchPlanner<A, Q>
where
    A: AccountRepository,
    Q: QuoteSourcePort,
{
    /// Create a planner.
    #[must_use]
    pub const fn new(
        accounts: Arc<A>,
        quotes: Arc<Q>,
        presence: Arc<PresenceRegistry>,
        risk: RiskConfig,
    ) -> Self {
        Self {
            accounts,
            quotes,
            presence,
            risk,
        }
    }

    /// Plan a request. Has no side effects.
    #[tracing::instrument(
        skip(self, request),
        fields(symbol = %request.symbol, side = %request.side, order_type = %request.order_type)
    )]
    pub async fn plan(&self, request: &DispatchRequest) -> Result<DispatchPlan, DispatchError> {
        if request.master_qty == 0 {
            return Err(DispatchError::InvalidQty);
        }

        let unknown = || DispatchError::UnknownSymbol {
            symbol: request.symbol.clone(),
        };
        let symbol = Symbol::parse(&request.symbol).map_err(|_| unknown())?;
        let quote = self.quotes.quote(&symbol).await.ok_or_else(unknown)?;

        let order_type = request.order_type;
        let supplied_price = request.price.filter(|p| *p > Decimal::ZERO);
        if order_type.requires_price() && supplied_price.is_none() {
            return Err(DispatchError::InvalidPrice {
                order_type: order_type.as_str(),
            });
        }
        if order_type.requires_trigger()
            && !request.trigger_price.is_some_and(|t| t > Decimal::ZERO)
        {
            return Err(DispatchError::InvalidTrigger {
                order_type: order_type.as_str(),
            });
        }

        let effective_price = supplied_price.unwrap_or(match request.side {
            OrderSide::Buy => quote.ask,
            OrderSide::Sell => quote.bid,
        });

        basic_risk_check(
            effective_price,
            request.master_qty,
            order_type.requires_price(),
            Money::new(self.risk.max_order_value),
        )
        .map_err(DispatchError::RiskBlock)?;
        price_band_check(
            request.side,
            order_type,
            effective_price,
            &quote,
            self.risk.max_away_pct,
        )
        .map_err(|violation| match violation {
            RiskViolation::PriceAwayTooMuch {
                away_pct,
                max_away_pct,
            } => DispatchError::PriceBand {
                away_pct,
                max_away_pct,
            },
            other => DispatchError::RiskBlock(other),
        })?;

        let matching = self.accounts.find_matching(&request.targets).await?;
        if matching.is_empty() {
            return Err(DispatchError::NoMatchingAccounts);
        }
        let candidates = matching.len();

        let online_set = self.presence.online_set();
        let online: Vec<Account> = matching
            .into_iter()
            .filter(|a| online_set.contains(&a.id))
            .collect();
        if online.is_empty() {
            return Err(DispatchError::NoOnlineAccounts { candidates });
        }

        let allocation = allocate(
            request.allocation_mode,
            &request.allocation_params,
            &online,
            request.master_qty,
            &HashMap::new(),
        )?;
        if allocation.is_zero() {
            return Err(DispatchError::ZeroAllocation);
        }

        let lot = request
            .lot
            .filter(|l| *l > 0)
            .unwrap_or(self.risk.default_lot);
        let shares: Vec<PlannedShare> = online
            .into_iter()
            .filter_map(|account| {
                let qty = allocation.qty_for(&account.id);
                (qty > 0).then(|| PlannedShare {
                    margin: MarginCheck::evaluate(
                        effective_price,
                        qty,
                        lot,
                        request.product_type,
                        account.capital,
                    ),
                    account,
                    qty,
                })
            })
            .collect();

        tracing::debug!(
            candidates,
            online = shares.len(),
            allocated_qty = allocation.total(),
            %effective_price,
            "Dispatch plan built"
        );

        Ok(DispatchPlan {
            symbol,
            quote,
            effective_price,
            lot,
            candidates,
            shares,
        })
    }
}

impl<A, Q> std::fmt::Debug for DispatchPlanner<A, Q>
where
    A: AccountRepository,
    Q: QuoteSourcePort,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchPlanner")
            .field("risk", &self.risk)
            .finish_non_exhaustive()
    }
}
