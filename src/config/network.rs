//! Target network, fixed at build time

use alloy_primitives::utils::format_units;
use alloy_primitives::U256;
use anyhow::{Context, Result};
use reqwest::Url;

/// Native currency of a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

/// Static description of the one chain this tool talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    pub id: u64,
    pub name: &'static str,
    pub native_currency: NativeCurrency,
    pub rpc_endpoint: &'static str,
}

pub const ARC_TESTNET: NetworkConfig = NetworkConfig {
    id: 5_042_002,
    name: "Arc Testnet",
    native_currency: NativeCurrency {
        name: "USDC",
        symbol: "USDC",
        decimals: 6,
    },
    rpc_endpoint: "https://rpc.testnet.arc.network",
};

impl NetworkConfig {
    pub fn rpc_url(&self) -> Result<Url> {
        self.rpc_endpoint
            .parse()
            .with_context(|| format!("Invalid RPC URL for {}: {}", self.name, self.rpc_endpoint))
    }

    /// "Arc Testnet (5042002)"
    pub fn display(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }

    /// Format a raw balance with the native currency's decimals
    pub fn format_balance(&self, raw: U256) -> String {
        let amount = format_units(raw, self.native_currency.decimals)
            .unwrap_or_else(|_| raw.to_string());
        format!("{} {}", trim_decimal(&amount), self.native_currency.symbol)
    }
}

fn trim_decimal(value: &str) -> &str {
    if !value.contains('.') {
        return value;
    }
    value.trim_end_matches('0').trim_end_matches('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc_testnet_constant() {
        assert_eq!(ARC_TESTNET.id, 5042002);
        assert_eq!(ARC_TESTNET.native_currency.decimals, 6);
        let url = ARC_TESTNET.rpc_url().unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("rpc.testnet.arc.network"));
    }

    #[test]
    fn test_format_balance() {
        assert_eq!(ARC_TESTNET.format_balance(U256::from(1_500_000u64)), "1.5 USDC");
        assert_eq!(ARC_TESTNET.format_balance(U256::from(10_000_000u64)), "10 USDC");
        assert_eq!(ARC_TESTNET.format_balance(U256::ZERO), "0 USDC");
    }

    #[test]
    fn test_display() {
        assert_eq!(ARC_TESTNET.display(), "Arc Testnet (5042002)");
    }
}
