//! Presentation contract for token amounts, prices and percents.
//!
//! Amounts are raw integers scaled by the token's decimals. Prices are the
//! ratio of two raw amounts, percents the ratio of two integers. Only what the
//! views need for display is here; none of it is used for on-chain math.

use alloy_primitives::U256;

use crate::tokens::Token;

/// 1e18, the scale of health and interest values reported by Kashi
pub const WAD: u64 = 1_000_000_000_000_000_000;

fn to_f64(value: U256) -> f64 {
    // Display of a U256 is always a plain decimal integer
    value.to_string().parse::<f64>().unwrap_or(0.0)
}

fn pow10(decimals: u8) -> f64 {
    10_f64.powi(decimals as i32)
}

/// Format a value with `significant` significant digits, trailing zeros trimmed
pub fn to_significant_digits(value: f64, significant: u32) -> String {
    if value == 0.0 || !value.is_finite() {
        return "0".to_string();
    }
    let significant = significant.max(1) as i32;
    let exponent = value.abs().log10().floor() as i32;

    let formatted = if exponent >= significant - 1 {
        let scale = 10_f64.powi(exponent - significant + 1);
        format!("{:.0}", (value / scale).round() * scale)
    } else {
        let decimals = (significant - 1 - exponent) as usize;
        format!("{:.*}", decimals, value)
    };

    trim_zeros(&formatted)
}

fn trim_zeros(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

/// Insert thousands separators into the integer part of a decimal string
pub fn format_number(value: &str) -> String {
    let (sign, unsigned) = match value.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", value),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

// ============================================
// CURRENCY AMOUNT
// ============================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyAmount {
    pub token: Token,
    pub raw: U256,
}

impl CurrencyAmount {
    pub fn from_raw(token: Token, raw: U256) -> Self {
        Self { token, raw }
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Scale by a percent, rounding down
    pub fn multiply(&self, percent: &Percent) -> Self {
        let raw = if percent.denominator.is_zero() {
            U256::ZERO
        } else {
            self.raw.saturating_mul(percent.numerator) / percent.denominator
        };
        Self { token: self.token.clone(), raw }
    }

    /// Full precision decimal string
    pub fn to_exact(&self) -> String {
        let digits = self.raw.to_string();
        let decimals = self.token.decimals as usize;
        if decimals == 0 {
            return digits;
        }
        let padded = format!("{:0>width$}", digits, width = decimals + 1);
        let (integer, fraction) = padded.split_at(padded.len() - decimals);
        trim_zeros(&format!("{}.{}", integer, fraction))
    }

    pub fn to_significant(&self, significant: u32) -> String {
        to_significant_digits(to_f64(self.raw) / pow10(self.token.decimals), significant)
    }
}

// ============================================
// PRICE
// ============================================

/// Amount of `quote` per one unit of `base`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price {
    pub base: Token,
    pub quote: Token,
    /// Raw quote amount
    pub numerator: U256,
    /// Raw base amount
    pub denominator: U256,
}

impl Price {
    pub fn from_amounts(base: &CurrencyAmount, quote: &CurrencyAmount) -> Self {
        Self {
            base: base.token.clone(),
            quote: quote.token.clone(),
            numerator: quote.raw,
            denominator: base.raw,
        }
    }

    pub fn invert(&self) -> Self {
        Self {
            base: self.quote.clone(),
            quote: self.base.clone(),
            numerator: self.denominator,
            denominator: self.numerator,
        }
    }

    /// Decimal-adjusted value; `None` when the base amount is zero
    pub fn value(&self) -> Option<f64> {
        if self.denominator.is_zero() {
            return None;
        }
        let quote = to_f64(self.numerator) / pow10(self.quote.decimals);
        let base = to_f64(self.denominator) / pow10(self.base.decimals);
        Some(quote / base)
    }

    /// Significant-digit rendering, "-" for an undefined price
    pub fn to_significant(&self, significant: u32) -> String {
        match self.value() {
            Some(v) => to_significant_digits(v, significant),
            None => "-".to_string(),
        }
    }
}

// ============================================
// PERCENT
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Percent {
    pub numerator: U256,
    pub denominator: U256,
}

impl Percent {
    pub fn new(numerator: u64, denominator: u64) -> Self {
        Self { numerator: U256::from(numerator), denominator: U256::from(denominator) }
    }

    /// Value scaled by 1e18
    pub fn from_wad(numerator: U256) -> Self {
        Self { numerator, denominator: U256::from(WAD) }
    }

    /// Percentage with a fixed number of decimals, e.g. "75.00"
    pub fn to_fixed(&self, decimals: usize) -> String {
        if self.denominator.is_zero() {
            return format!("{:.*}", decimals, 0.0);
        }
        let ratio = to_f64(self.numerator) / to_f64(self.denominator);
        format!("{:.*}", decimals, ratio * 100.0)
    }
}
