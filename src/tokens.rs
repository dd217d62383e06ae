//! Token registry
//!
//! Includes:
//! - SUSHI per chain (drives the legacy "Add liquidity" link)
//! - Native currency per chain
//! - Stablecoins (DAI, USDC, USDT) where deployed
//! - Nervos testnet tokens
//! - Auction payment currency options

use alloy_primitives::{address, Address};

use crate::chain::ChainId;

/// A token on a specific chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub chain_id: ChainId,
    pub address: Address,
    pub decimals: u8,
    pub symbol: &'static str,
    pub name: &'static str,
}

impl Token {
    pub const fn new(
        chain_id: ChainId,
        address: Address,
        decimals: u8,
        symbol: &'static str,
        name: &'static str,
    ) -> Self {
        Self { chain_id, address, decimals, symbol, name }
    }
}

// ============================================
// SUSHI
// ============================================

pub fn sushi_address(chain_id: ChainId) -> Option<Address> {
    match chain_id {
        ChainId::ETHEREUM => Some(address!("6B3595068778DD592e39A122f4f5a5cF09C90fE2")),
        ChainId::KOVAN => Some(address!("0769fd68dFb93167989C6f7254cd0D766Fb2841F")),
        ChainId::POLYGON => Some(address!("0b3F868E0BE5597D5DB7fEB59E1CADBb0fdDa50a")),
        ChainId::ARBITRUM => Some(address!("d4d42F0b6DEF4CE0383636770eF773390d85c61A")),
        ChainId::HARMONY => Some(address!("BEC775Cb42AbFa4288dE81F387a9b1A3c4Bc552A")),
        _ => None,
    }
}

// ============================================
// NATIVE CURRENCY
// ============================================

pub fn native_symbol(chain_id: ChainId) -> Option<&'static str> {
    match chain_id {
        ChainId::ETHEREUM | ChainId::KOVAN | ChainId::ARBITRUM => Some("ETH"),
        ChainId::POLYGON => Some("MATIC"),
        ChainId::HARMONY => Some("ONE"),
        ChainId::NERVOS | ChainId::NERVOS_TESTNET => Some("CKB"),
        _ => None,
    }
}

// ============================================
// STABLECOINS
// ============================================

pub fn dai(chain_id: ChainId) -> Option<Token> {
    let address = match chain_id {
        ChainId::ETHEREUM => address!("6B175474E89094C44Da98b954EedcdeCB5BE3830"),
        ChainId::POLYGON => address!("8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063"),
        ChainId::ARBITRUM => address!("DA10009cBd5D07dd0CeCc66161FC93D7c9000da1"),
        ChainId::NERVOS_TESTNET => return Some(NERVOS_TESTNET_DAI),
        _ => return None,
    };
    Some(Token::new(chain_id, address, 18, "DAI", "Dai Stablecoin"))
}

pub fn usdc(chain_id: ChainId) -> Option<Token> {
    let address = match chain_id {
        ChainId::ETHEREUM => address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
        ChainId::POLYGON => address!("2791Bca1f2de4661ED88A30C99A7a9449Aa84174"),
        ChainId::ARBITRUM => address!("FF970A61A04b1cA14834A43f5dE4533eBDDB5CC8"),
        ChainId::NERVOS_TESTNET => return Some(NERVOS_TESTNET_USDC),
        _ => return None,
    };
    Some(Token::new(chain_id, address, 6, "USDC", "USD Coin"))
}

pub fn usdt(chain_id: ChainId) -> Option<Token> {
    let address = match chain_id {
        ChainId::ETHEREUM => address!("dAC17F958D2ee523a2206206994597C13D831ec7"),
        ChainId::POLYGON => address!("c2132D05D31c914a87C6611C10748AEb04B58e8F"),
        ChainId::ARBITRUM => address!("Fd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9"),
        _ => return None,
    };
    Some(Token::new(chain_id, address, 6, "USDT", "Tether USD"))
}

// ============================================
// NERVOS TESTNET
// ============================================

// Both bridged with 18 decimals on the testnet
pub const NERVOS_TESTNET_DAI: Token = Token::new(
    ChainId::NERVOS_TESTNET,
    address!("21cDE7E32a6CAF4742d00d44B07279e7596d26B9"),
    18,
    "DAI",
    "Dai Stablecoin",
);

pub const NERVOS_TESTNET_USDC: Token = Token::new(
    ChainId::NERVOS_TESTNET,
    address!("c946DAf81b08146B1C7A8Da2A851Ddf2B3EAaf85"),
    18,
    "USDC",
    "USD Coin",
);

// ============================================
// AUCTION PAYMENT CURRENCIES
// ============================================

/// One selectable payment currency for a new auction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentCurrency {
    pub symbol: &'static str,
    /// Zero address stands for the native currency
    pub address: Address,
}

/// Options offered when creating an auction: native, DAI, USDC, USDT.
/// Stablecoins that are not deployed on the chain are left out.
pub fn payment_currencies(chain_id: Option<ChainId>) -> Vec<PaymentCurrency> {
    let Some(chain_id) = chain_id else {
        return Vec::new();
    };

    let mut options = Vec::new();
    if let Some(symbol) = native_symbol(chain_id) {
        options.push(PaymentCurrency { symbol, address: Address::ZERO });
    }
    for token in [dai(chain_id), usdc(chain_id), usdt(chain_id)].into_iter().flatten() {
        options.push(PaymentCurrency { symbol: token.symbol, address: token.address });
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_currencies_ethereum() {
        let options = payment_currencies(Some(ChainId::ETHEREUM));
        let symbols: Vec<_> = options.iter().map(|o| o.symbol).collect();
        assert_eq!(symbols, vec!["ETH", "DAI", "USDC", "USDT"]);
        assert_eq!(options[0].address, Address::ZERO);
    }

    #[test]
    fn test_payment_currencies_nervos_testnet() {
        let options = payment_currencies(Some(ChainId::NERVOS_TESTNET));
        let symbols: Vec<_> = options.iter().map(|o| o.symbol).collect();
        assert_eq!(symbols, vec!["CKB", "DAI", "USDC"]);
        assert_eq!(options[2].address, NERVOS_TESTNET_USDC.address);
    }

    #[test]
    fn test_no_chain_no_options() {
        assert!(payment_currencies(None).is_empty());
        assert!(payment_currencies(Some(ChainId::from(999))).is_empty());
    }

    #[test]
    fn test_sushi_address() {
        assert!(sushi_address(ChainId::ETHEREUM).is_some());
        assert!(sushi_address(ChainId::NERVOS_TESTNET).is_none());
    }
}
