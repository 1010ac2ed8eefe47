//! FX conversion and margin math.
//!
//! All catalog prices are NOK rounded to whole kroner. Supplier-side amounts
//! keep their scraped precision until [`round_nok`] is applied.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::products::Money;

/// Markup applied when a margin string cannot be parsed.
const FALLBACK_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("unsupported currency {0}; expected NOK, USD or EUR")]
    UnsupportedCurrency(String),
}

/// How a sale price is derived from a supplier cost.
///
/// Parsed from admin input: `"50%"` is a percentage markup, `"+20"` is an
/// additive markup in NOK, and a plain number is a fractional multiplier
/// (`0.5` means +50%). Anything else falls back to `cost × 1.5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfitMargin {
    Percent(Decimal),
    Additive(Decimal),
    Fraction(Decimal),
    Fallback,
}

impl ProfitMargin {
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if let Some(pct) = trimmed.strip_suffix('%') {
            return pct
                .trim()
                .parse::<Decimal>()
                .map_or(Self::Fallback, Self::Percent);
        }
        if let Some(add) = trimmed.strip_prefix('+') {
            return add
                .trim()
                .parse::<Decimal>()
                .map_or(Self::Fallback, Self::Additive);
        }
        trimmed
            .parse::<Decimal>()
            .map_or(Self::Fallback, Self::Fraction)
    }

    /// Builds a percentage margin from a whole-number percent (`50` → +50%).
    ///
    /// Callers that store margins as numbers rather than strings use this
    /// shape; it is not interchangeable with [`ProfitMargin::Fraction`].
    #[must_use]
    pub fn from_percent_number(percent: Decimal) -> Self {
        Self::Percent(percent)
    }
}

impl fmt::Display for ProfitMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfitMargin::Percent(p) => write!(f, "{p}%"),
            ProfitMargin::Additive(a) => write!(f, "+{a}"),
            ProfitMargin::Fraction(x) => write!(f, "{x}"),
            ProfitMargin::Fallback => write!(f, "x{FALLBACK_MULTIPLIER}"),
        }
    }
}

/// Applies `margin` to `cost`. The result is not rounded.
#[must_use]
pub fn calculate_sale_price(cost: Decimal, margin: &ProfitMargin) -> Decimal {
    match *margin {
        ProfitMargin::Percent(pct) => cost * (Decimal::ONE + pct / Decimal::ONE_HUNDRED),
        ProfitMargin::Additive(add) => cost + add,
        ProfitMargin::Fraction(fraction) => cost * (Decimal::ONE + fraction),
        ProfitMargin::Fallback => cost * FALLBACK_MULTIPLIER,
    }
}

/// Rounds to whole kroner, half away from zero.
#[must_use]
pub fn round_nok(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Exchange rates and catalog-wide price constants, injected wherever prices
/// are computed.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
    pub usd_to_nok_rate: Decimal,
    pub eur_to_nok_rate: Decimal,
    pub default_margin: ProfitMargin,
    pub compare_at_multiplier: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            usd_to_nok_rate: Decimal::new(105, 1),
            eur_to_nok_rate: Decimal::new(115, 1),
            default_margin: ProfitMargin::Percent(Decimal::from(50)),
            compare_at_multiplier: Decimal::new(13, 1),
        }
    }
}

/// NOK prices for one catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NokPrices {
    pub supplier_price: Decimal,
    pub price: Decimal,
    pub compare_at_price: Decimal,
}

impl PricingConfig {
    /// Converts a supplier amount to NOK without rounding.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::UnsupportedCurrency`] for anything other than
    /// NOK, USD, or EUR.
    pub fn to_nok(&self, money: &Money) -> Result<Decimal, PricingError> {
        match money.currency.as_str() {
            "NOK" => Ok(money.amount),
            "USD" => Ok(money.amount * self.usd_to_nok_rate),
            "EUR" => Ok(money.amount * self.eur_to_nok_rate),
            other => Err(PricingError::UnsupportedCurrency(other.to_string())),
        }
    }

    /// Derives rounded supplier, sale, and compare-at prices from a supplier
    /// amount.
    ///
    /// # Errors
    ///
    /// Propagates [`PricingError`] from currency conversion.
    pub fn nok_prices(&self, cost: &Money, margin: &ProfitMargin) -> Result<NokPrices, PricingError> {
        let cost_nok = self.to_nok(cost)?;
        let sale = calculate_sale_price(cost_nok, margin);
        Ok(NokPrices {
            supplier_price: round_nok(cost_nok),
            price: round_nok(sale),
            compare_at_price: round_nok(sale * self.compare_at_multiplier),
        })
    }
}

/// Target-margin settings for the supplier sync runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPricing {
    pub min_markup: Decimal,
    /// Desired gross margin, in percent of the sale price.
    pub target_margin_pct: Decimal,
}

impl Default for SyncPricing {
    fn default() -> Self {
        Self {
            min_markup: FALLBACK_MULTIPLIER,
            target_margin_pct: Decimal::from(55),
        }
    }
}

/// Suggested sale price: `max(cost × min_markup, cost / (1 − target%))`.
///
/// A target margin of 100% or more cannot be reached by any price, so only
/// the markup floor applies in that case. Rounded to two decimals.
#[must_use]
pub fn suggested_price(cost: Decimal, pricing: &SyncPricing) -> Decimal {
    let by_markup = cost * pricing.min_markup;
    let keep = Decimal::ONE - pricing.target_margin_pct / Decimal::ONE_HUNDRED;
    let suggested = if keep > Decimal::ZERO {
        by_markup.max(cost / keep)
    } else {
        by_markup
    };
    suggested.round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn percent_margin_doubles_cost_at_100() {
        let margin = ProfitMargin::parse("100%");
        assert_eq!(margin, ProfitMargin::Percent(dec("100")));
        assert_eq!(calculate_sale_price(dec("100"), &margin), dec("200"));
    }

    #[test]
    fn additive_margin_adds_amount() {
        let margin = ProfitMargin::parse("+50");
        assert_eq!(calculate_sale_price(dec("100"), &margin), dec("150"));
    }

    #[test]
    fn plain_number_is_fractional_multiplier() {
        let margin = ProfitMargin::parse("0.5");
        assert_eq!(margin, ProfitMargin::Fraction(dec("0.5")));
        assert_eq!(calculate_sale_price(dec("100"), &margin), dec("150"));
    }

    #[test]
    fn whole_number_percent_constructor_divides_by_hundred() {
        let margin = ProfitMargin::from_percent_number(dec("50"));
        assert_eq!(calculate_sale_price(dec("100"), &margin), dec("150"));
    }

    #[test]
    fn unparseable_margin_falls_back_to_one_and_a_half() {
        for input in ["", "abc", "%", "+", "fifty%"] {
            let margin = ProfitMargin::parse(input);
            assert_eq!(margin, ProfitMargin::Fallback, "input {input:?}");
            assert_eq!(calculate_sale_price(dec("100"), &margin), dec("150"));
        }
    }

    #[test]
    fn margin_parse_tolerates_whitespace() {
        assert_eq!(ProfitMargin::parse(" 25 % "), ProfitMargin::Percent(dec("25")));
        assert_eq!(ProfitMargin::parse("+ 20"), ProfitMargin::Additive(dec("20")));
    }

    #[test]
    fn round_nok_rounds_half_away_from_zero() {
        assert_eq!(round_nok(dec("104.5")), dec("105"));
        assert_eq!(round_nok(dec("104.49")), dec("104"));
    }

    #[test]
    fn nok_prices_convert_usd_then_apply_margin() {
        let config = PricingConfig::default();
        let prices = config
            .nok_prices(&Money::new(dec("10"), "USD"), &ProfitMargin::parse("50%"))
            .unwrap();
        assert_eq!(prices.supplier_price, dec("105"));
        assert_eq!(prices.price, dec("158"));
        assert_eq!(prices.compare_at_price, dec("205"));
    }

    #[test]
    fn nok_amounts_are_not_converted() {
        let config = PricingConfig::default();
        assert_eq!(
            config.to_nok(&Money::new(dec("99"), "NOK")).unwrap(),
            dec("99")
        );
    }

    #[test]
    fn unknown_currency_is_rejected() {
        let config = PricingConfig::default();
        let err = config.to_nok(&Money::new(dec("1"), "CNY")).unwrap_err();
        assert_eq!(err, PricingError::UnsupportedCurrency("CNY".to_string()));
    }

    #[test]
    fn suggested_price_uses_target_margin_when_higher() {
        // 100 / 0.45 = 222.22 beats 100 * 1.5
        assert_eq!(
            suggested_price(dec("100"), &SyncPricing::default()),
            dec("222.22")
        );
    }

    #[test]
    fn suggested_price_uses_markup_floor_when_higher() {
        let pricing = SyncPricing {
            min_markup: dec("3"),
            target_margin_pct: dec("20"),
        };
        assert_eq!(suggested_price(dec("10"), &pricing), dec("30"));
    }

    #[test]
    fn suggested_price_ignores_unreachable_target() {
        let pricing = SyncPricing {
            min_markup: dec("1.5"),
            target_margin_pct: dec("100"),
        };
        assert_eq!(suggested_price(dec("10"), &pricing), dec("15"));
    }
}
