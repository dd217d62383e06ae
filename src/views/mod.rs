//! Display models behind the Kashi, MISO and Trident screens
//!
//! - Kashi borrow rows (liquidation price, health, APR)
//! - Repay review with its submission state
//! - Auction price ticker
//! - Concentrated-liquidity price range and unknown-token warning

pub mod auction;
pub mod kashi;
pub mod range;
pub mod warning;

pub use auction::{render_price, AuctionPriceTicker, PriceSource, DEFAULT_TICK};
pub use kashi::{
    BorrowPosition, BorrowSummary, RepayExecutor, RepayRequest, RepayReview, SubmitOutcome, LTV,
};
pub use range::{PriceRange, RangeBlock, RangeColor};
pub use warning::TokenWarning;
