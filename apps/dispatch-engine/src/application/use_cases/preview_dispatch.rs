//! Preview Dispatch Use Case
//!
//! Shows what a dispatch would do without persisting or launching anything.

use std::sync::Arc;

use crate::application::dto::{DispatchPreview, DispatchRequest, PreviewRow, PreviewTotals};
use crate::application::ports::QuoteSourcePort;
use crate::application::services::DispatchPlanner;
use crate::domain::accounts::AccountRepository;
use crate::error::DispatchError;

/// Use case for previewing a dispatch.
pub struct PreviewDispatchUseCase<A, Q>
where
    A: AccountRepository,
    Q: QuoteSourcePort,
{
    planner: Arc<DispatchPlanner<A, Q>>,
}

impl<A, Q> PreviewDispatchUseCase<A, Q>
where
    A: AccountRepository,
    Q: QuoteSourcePort,
{
    /// Create a new `PreviewDispatchUseCase`.
    pub const fn new(planner: Arc<DispatchPlanner<A, Q>>) -> Self {
        Self { planner }
    }

    /// Build the per-account preview.
    pub async fn execute(&self, request: &DispatchRequest) -> Result<DispatchPreview, DispatchError> {
        let plan = self.planner.plan(request).await?;

        let rows: Vec<PreviewRow> = plan
            .shares
            .iter()
            .map(|share| PreviewRow {
                account_id: share.account.id.clone(),
                display_name: share.account.display_name.clone(),
                broker: share.account.broker,
                capital: share.account.capital,
                qty: share.qty,
                price: plan.effective_price,
                required_margin: share.margin.required,
                margin_ok: share.margin.passes(),
            })
            .collect();

        let totals = PreviewTotals {
            requested_qty: rows.iter().map(|r| r.qty).sum(),
            pass_qty: rows.iter().filter(|r| r.margin_ok).map(|r| r.qty).sum(),
            total_required_margin: rows.iter().map(|r| r.required_margin).sum(),
        };

        Ok(DispatchPreview {
            symbol: plan.symbol.to_string(),
            side: request.side,
            order_type: request.order_type,
            effective_price: plan.effective_price,
            rows,
            totals,
        })
    }
}
