//! Per-account margin requirement.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_dispatch::value_objects::ProductType;
use crate::domain::shared::Money;

/// Margin an account must hold for one child order.
///
/// `price x qty x lot x fraction(product)`, rounded to 2 dp.
#[must_use]
pub fn required_margin(price: Decimal, qty: u64, lot: u32, product: ProductType) -> Money {
    Money::new(price * Decimal::from(qty) * Decimal::from(lot) * product.margin_fraction()).round()
}

/// Outcome of a margin check for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginCheck {
    /// Margin needed.
    pub required: Money,
    /// Capital available.
    pub capital: Money,
}

impl MarginCheck {
    /// Evaluate the requirement against available capital.
    #[must_use]
    pub fn evaluate(price: Decimal, qty: u64, lot: u32, product: ProductType, capital: Money) -> Self {
        Self {
            required: required_margin(price, qty, lot, product),
            capital,
        }
    }

    /// Returns true if capital covers the requirement.
    #[must_use]
    pub fn passes(&self) -> bool {
        self.capital >= self.required
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn intraday_margin_is_one_fifth() {
        assert_eq!(
            required_margin(dec!(100), 10, 1, ProductType::Mis).amount(),
            dec!(200.00)
        );
    }

    #[test]
    fn capital_must_cover_requirement() {
        let short = MarginCheck::evaluate(dec!(100), 10, 1, ProductType::Mis, Money::from_units(150));
        assert!(!short.passes());
        let exact = MarginCheck::evaluate(dec!(100), 10, 1, ProductType::Mis, Money::from_units(200));
        assert!(exact.passes());
    }

    #[test]
    fn lot_and_product_scale_requirement() {
        assert_eq!(
            required_margin(dec!(100), 10, 2, ProductType::Nrml).amount(),
            dec!(1000.00)
        );
        assert_eq!(
            required_margin(dec!(100), 10, 1, ProductType::Cnc).amount(),
            dec!(1000.00)
        );
    }

    #[test]
    fn rounds_to_cents() {
        assert_eq!(
            required_margin(dec!(1234.567), 3, 1, ProductType::Mis).amount(),
            dec!(740.74)
        );
    }
}
