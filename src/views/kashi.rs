//! Kashi borrow positions and the repay review

use alloy_primitives::{Address, U256};
use eyre::Result;
use futures::future::BoxFuture;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::{info, warn};

use crate::amount::{format_number, CurrencyAmount, Percent, Price};
use crate::i18n::Catalog;
use crate::oracle::Oracle;
use crate::tokens::Token;

/// Loan-to-value at which a position gets liquidated
pub const LTV: Percent = Percent {
    numerator: U256::from_limbs([75, 0, 0, 0]),
    denominator: U256::from_limbs([100, 0, 0, 0]),
};

fn format_percent(percent: &Percent) -> String {
    format!("{}%", percent.to_fixed(2))
}

// ============================================
// BORROW POSITION
// ============================================

/// A user's open borrow in one Kashi pair. Amounts are raw, health and
/// interest are 1e18-scaled.
#[derive(Debug, Clone)]
pub struct BorrowPosition {
    pub pair: Address,
    pub asset: Token,
    pub collateral: Token,
    pub oracle: Oracle,
    pub user_collateral_amount: U256,
    pub current_user_borrow_amount: U256,
    pub health: U256,
    pub current_interest_per_year: U256,
}

/// Formatted row as shown in the borrowing list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowSummary {
    pub market: String,
    pub oracle: String,
    pub collateral: String,
    pub liquidation_price: String,
    pub borrowed: String,
    pub health: String,
    pub apr: String,
    pub link: String,
}

impl BorrowPosition {
    pub fn collateral_amount(&self) -> CurrencyAmount {
        CurrencyAmount::from_raw(self.collateral.clone(), self.user_collateral_amount)
    }

    pub fn borrow_amount(&self) -> CurrencyAmount {
        CurrencyAmount::from_raw(self.asset.clone(), self.current_user_borrow_amount)
    }

    /// Asset per unit of collateral at which the position hits the LTV
    pub fn liquidation_price(&self) -> Price {
        let borrowed_at_ltv = self.borrow_amount().multiply(&LTV);
        Price::from_amounts(&borrowed_at_ltv, &self.collateral_amount()).invert()
    }

    pub fn health(&self) -> Percent {
        Percent::from_wad(self.health)
    }

    pub fn interest_per_year(&self) -> Percent {
        Percent::from_wad(self.current_interest_per_year)
    }

    pub fn summary(&self) -> BorrowSummary {
        let liquidation_price = self.liquidation_price();
        BorrowSummary {
            market: format!("{}/{}", self.asset.symbol, self.collateral.symbol),
            oracle: self.oracle.name().to_string(),
            collateral: format!(
                "{} {}",
                format_number(&self.collateral_amount().to_significant(6)),
                self.collateral.symbol
            ),
            liquidation_price: format!(
                "{} {}",
                format_number(&liquidation_price.to_significant(6)),
                liquidation_price.quote.symbol
            ),
            borrowed: format!(
                "{} {}",
                format_number(&self.borrow_amount().to_significant(6)),
                self.asset.symbol
            ),
            health: format_percent(&self.health()),
            apr: format_percent(&self.interest_per_year()),
            link: format!("/kashi/{}", self.pair),
        }
    }
}

// ============================================
// REPAY
// ============================================

#[derive(Debug, Clone, Default)]
pub struct RepayRequest {
    pub repay_amount: Option<CurrencyAmount>,
    pub remove_amount: Option<CurrencyAmount>,
    pub repay_from_wallet: bool,
    pub remove_to_wallet: bool,
    pub close_position: bool,
    pub repay_max: bool,
    pub remove_max: bool,
}

/// Sends the repay and yields the transaction hash, if any
pub trait RepayExecutor: Send + Sync {
    fn execute(&self, request: &RepayRequest) -> BoxFuture<'static, Result<Option<String>>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted(String),
    /// Executor returned without a transaction
    NoHash,
    /// A submission is already in flight
    Busy,
    Failed(String),
}

/// Confirmation step for a repay or close-position
pub struct RepayReview {
    request: RepayRequest,
    attempting: AtomicBool,
    tx_hash: Mutex<Option<String>>,
}

impl RepayReview {
    pub fn new(request: RepayRequest) -> Self {
        Self { request, attempting: AtomicBool::new(false), tx_hash: Mutex::new(None) }
    }

    pub fn request(&self) -> &RepayRequest {
        &self.request
    }

    pub fn header(&self, catalog: &Catalog) -> String {
        if self.request.close_position {
            catalog.translate("Close Position")
        } else {
            catalog.translate("Confirm Repay")
        }
    }

    /// Amount shown for an optional input, "0" when absent or zero
    pub fn display_amount(amount: Option<&CurrencyAmount>) -> String {
        match amount {
            Some(amount) if !amount.is_zero() => {
                format!("{} {}", amount.to_significant(6), amount.token.symbol)
            }
            Some(amount) => format!("0 {}", amount.token.symbol),
            None => "0".to_string(),
        }
    }

    pub fn is_attempting(&self) -> bool {
        self.attempting.load(Ordering::SeqCst)
    }

    pub fn tx_hash(&self) -> Option<String> {
        self.tx_hash.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Forget the submitted hash once the review is closed
    pub fn dismiss(&self) {
        *self.tx_hash.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Run the executor once. Errors are reported, never retried.
    /// The attempting flag clears even if the returned future is dropped.
    pub async fn submit(&self, executor: &dyn RepayExecutor) -> SubmitOutcome {
        if self
            .attempting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return SubmitOutcome::Busy;
        }

        let _reset = AttemptGuard(&self.attempting);
        let result = executor.execute(&self.request).await;

        match result {
            Ok(Some(hash)) => {
                info!("Repay submitted: {}", hash);
                *self.tx_hash.lock().unwrap_or_else(|e| e.into_inner()) = Some(hash.clone());
                SubmitOutcome::Submitted(hash)
            }
            Ok(None) => SubmitOutcome::NoHash,
            Err(e) => {
                warn!("Repay failed: {}", e);
                SubmitOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Clears the attempting flag when the submit future finishes or is dropped
struct AttemptGuard<'a>(&'a AtomicBool);

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
