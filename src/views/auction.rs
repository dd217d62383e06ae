//! Live auction price

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::trace;

use crate::amount::{format_number, Price};

pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Anything that can report an auction's price right now
pub trait PriceSource: Send + Sync {
    fn current_price(&self) -> Option<Price>;
}

/// `"{price} {quote}"`, empty until a price is known
pub fn render_price(price: Option<&Price>) -> String {
    match price {
        Some(price) => {
            format!("{} {}", format_number(&price.to_significant(6)), price.quote.symbol)
        }
        None => String::new(),
    }
}

/// Polls a price source on a fixed tick and publishes changes.
/// The first poll happens one tick after start.
pub struct AuctionPriceTicker {
    price: watch::Receiver<Option<Price>>,
    handle: JoinHandle<()>,
}

impl AuctionPriceTicker {
    pub fn spawn(source: Arc<dyn PriceSource>, tick: Duration) -> Self {
        let (tx, price) = watch::channel(None);

        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + tick, tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let latest = source.current_price();
                let changed = tx.send_if_modified(|current| {
                    if *current == latest {
                        return false;
                    }
                    *current = latest;
                    true
                });
                if changed {
                    trace!("Auction price updated");
                }
                if tx.is_closed() {
                    break;
                }
            }
        });

        Self { price, handle }
    }

    pub fn latest(&self) -> Option<Price> {
        self.price.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Price>> {
        self.price.clone()
    }

    pub fn render(&self) -> String {
        render_price(self.price.borrow().as_ref())
    }
}

impl Drop for AuctionPriceTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainId;
    use crate::tokens::Token;
    use alloy_primitives::{Address, U256};
    use std::sync::Mutex;

    const SUSHI: Token = Token::new(ChainId::ETHEREUM, Address::ZERO, 18, "SUSHI", "SushiToken");
    const WETH: Token = Token::new(ChainId::ETHEREUM, Address::ZERO, 18, "WETH", "Wrapped Ether");

    fn price(quote_raw: u64, base_raw: u64) -> Price {
        Price {
            base: SUSHI,
            quote: WETH,
            numerator: U256::from(quote_raw),
            denominator: U256::from(base_raw),
        }
    }

    struct FixedSource(Mutex<Option<Price>>);

    impl PriceSource for FixedSource {
        fn current_price(&self) -> Option<Price> {
            self.0.lock().unwrap().clone()
        }
    }

    #[test]
    fn test_render_price() {
        assert_eq!(render_price(None), "");
        assert_eq!(render_price(Some(&price(25, 10_000))), "0.0025 WETH");
        assert_eq!(render_price(Some(&price(1_234_500, 1))), "1,234,500 WETH");
    }

    #[tokio::test]
    async fn test_ticker_publishes_changes() {
        let source = Arc::new(FixedSource(Mutex::new(None)));
        let ticker = AuctionPriceTicker::spawn(source.clone(), Duration::from_millis(20));
        let mut updates = ticker.subscribe();

        assert_eq!(ticker.render(), "");

        *source.0.lock().unwrap() = Some(price(3, 2));
        tokio::time::timeout(Duration::from_secs(2), updates.changed())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(ticker.latest(), Some(price(3, 2)));
        assert_eq!(ticker.render(), "1.5 WETH");
    }

    #[tokio::test]
    async fn test_ticker_waits_one_tick() {
        let source = Arc::new(FixedSource(Mutex::new(Some(price(1, 1)))));
        let ticker = AuctionPriceTicker::spawn(source, Duration::from_millis(200));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(ticker.latest().is_none());
    }
}
