//! Concentrated-liquidity price range inputs

use serde::Serialize;

use crate::tokens::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeColor {
    Blue,
    Purple,
}

/// One bound of the range as laid out side by side
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeBlock {
    pub label: &'static str,
    pub color: RangeColor,
    pub value: String,
    pub base: &'static str,
    pub quote: &'static str,
}

/// Min/max price typed by the user, in quote per base of the pool's token pair
#[derive(Debug, Clone)]
pub struct PriceRange {
    pub base: Token,
    pub quote: Token,
    pub min_price: String,
    pub max_price: String,
}

impl PriceRange {
    pub fn new(base: Token, quote: Token) -> Self {
        Self { base, quote, min_price: String::new(), max_price: String::new() }
    }

    pub fn set_min_price(&mut self, value: impl Into<String>) {
        self.min_price = value.into();
    }

    pub fn set_max_price(&mut self, value: impl Into<String>) {
        self.max_price = value.into();
    }

    pub fn blocks(&self) -> [RangeBlock; 2] {
        [
            RangeBlock {
                label: "MIN PRICE",
                color: RangeColor::Blue,
                value: self.min_price.clone(),
                base: self.base.symbol,
                quote: self.quote.symbol,
            },
            RangeBlock {
                label: "MAX PRICE",
                color: RangeColor::Purple,
                value: self.max_price.clone(),
                base: self.base.symbol,
                quote: self.quote.symbol,
            },
        ]
    }

    /// Both bounds parse as positive numbers and min lies below max
    pub fn is_valid(&self) -> bool {
        match (self.min_price.trim().parse::<f64>(), self.max_price.trim().parse::<f64>()) {
            (Ok(min), Ok(max)) => min > 0.0 && min < max,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainId;
    use crate::tokens::{dai, usdc};

    fn range() -> PriceRange {
        PriceRange::new(dai(ChainId::ETHEREUM).unwrap(), usdc(ChainId::ETHEREUM).unwrap())
    }

    #[test]
    fn test_blocks() {
        let mut range = range();
        range.set_min_price("0.99");
        range.set_max_price("1.01");

        let [min, max] = range.blocks();
        assert_eq!(min.label, "MIN PRICE");
        assert_eq!(min.color, RangeColor::Blue);
        assert_eq!(min.value, "0.99");
        assert_eq!(max.color, RangeColor::Purple);
        assert_eq!((max.base, max.quote), ("DAI", "USDC"));
        assert!(range.is_valid());
    }

    #[test]
    fn test_invalid_ranges() {
        let mut range = range();
        assert!(!range.is_valid());

        range.set_min_price("2");
        range.set_max_price("1");
        assert!(!range.is_valid());

        range.set_min_price("abc");
        range.set_max_price("3");
        assert!(!range.is_valid());
    }
}
