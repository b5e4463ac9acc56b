//! Currency conversion, supported currencies and the exchange-rate provider abstraction

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Ledger currency used when the configuration does not name one.
pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: usize,
}

#[rustfmt::skip]
pub const SUPPORTED_CURRENCIES: &[Currency] = &[
    Currency { code: "USD", symbol: "$", name: "US Dollar", decimals: 2 },
    Currency { code: "EUR", symbol: "€", name: "Euro", decimals: 2 },
    Currency { code: "GBP", symbol: "£", name: "British Pound", decimals: 2 },
    Currency { code: "JPY", symbol: "¥", name: "Japanese Yen", decimals: 0 },
    Currency { code: "INR", symbol: "₹", name: "Indian Rupee", decimals: 2 },
    Currency { code: "CAD", symbol: "C$", name: "Canadian Dollar", decimals: 2 },
    Currency { code: "AUD", symbol: "A$", name: "Australian Dollar", decimals: 2 },
    Currency { code: "CHF", symbol: "CHF ", name: "Swiss Franc", decimals: 2 },
    Currency { code: "CNY", symbol: "CN¥", name: "Chinese Yuan", decimals: 2 },
];

/// Looks up a supported currency by its code, ignoring case.
pub fn find_currency(code: &str) -> Option<&'static Currency> {
    SUPPORTED_CURRENCIES
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Rounds `amount` to the number of decimals the currency is displayed with
/// (two for unknown codes). Residue that rounds away becomes `0.0`, never `-0.0`.
pub fn round_to_currency(amount: f64, code: &str) -> f64 {
    let decimals = find_currency(code).map_or(2, |c| c.decimals);
    let factor = 10f64.powi(decimals as i32);
    let rounded = (amount * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Renders an amount with the currency symbol, e.g. `$1,234.50` or `-€12.00`.
///
/// Unsupported codes fall back to `CODE 12.34`.
pub fn format_amount(amount: f64, code: &str) -> String {
    let amount = round_to_currency(amount, code);
    let sign = if amount < 0.0 { "-" } else { "" };
    match find_currency(code) {
        Some(currency) => format!(
            "{sign}{}{}",
            currency.symbol,
            group_thousands(amount.abs(), currency.decimals)
        ),
        None => format!("{sign}{} {}", code.to_uppercase(), group_thousands(amount.abs(), 2)),
    }
}

fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}

/// Converts `amount` between two currencies using rates expressed against a
/// common base currency.
///
/// A currency missing from `rates` is treated as being at parity (rate 1.0)
/// with the base currency.
pub fn convert(amount: f64, from: &str, to: &str, rates: &HashMap<String, f64>) -> f64 {
    if from == to {
        return amount;
    }

    let from_rate = rate_or_parity(rates, from);
    let to_rate = rate_or_parity(rates, to);
    let converted = amount / from_rate * to_rate;
    debug!("Converted {amount} {from} -> {converted} {to} (rates {from_rate}/{to_rate})");
    converted
}

fn rate_or_parity(rates: &HashMap<String, f64>, code: &str) -> f64 {
    match rates.get(code) {
        Some(rate) => *rate,
        None => {
            warn!(currency = code, "No exchange rate available, assuming parity");
            1.0
        }
    }
}

/// Snapshot of exchange rates relative to `base`. A refresh produces a new
/// table instead of mutating an existing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateTable {
    pub base: String,
    pub rates: HashMap<String, f64>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl ExchangeRateTable {
    pub fn new(base: &str, rates: HashMap<String, f64>) -> Self {
        Self {
            base: base.to_uppercase(),
            rates,
            fetched_at: Some(Utc::now()),
        }
    }

    /// A table with no rates. Every conversion through it runs at parity.
    pub fn empty(base: &str) -> Self {
        Self {
            base: base.to_uppercase(),
            rates: HashMap::new(),
            fetched_at: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        match self.rates.get(code) {
            Some(rate) => Some(*rate),
            None if code == self.base => Some(1.0),
            None => None,
        }
    }

    pub fn convert(&self, amount: f64, from: &str, to: &str) -> f64 {
        convert(amount, from, to, &self.rates)
    }

    /// Like [`ExchangeRateTable::convert`] but fails on currencies the table
    /// does not know instead of assuming parity.
    pub fn try_convert(&self, amount: f64, from: &str, to: &str) -> Result<f64> {
        if from == to {
            return Ok(amount);
        }
        let from_rate = self
            .rate(from)
            .ok_or_else(|| anyhow!("No exchange rate for {} (base {})", from, self.base))?;
        let to_rate = self
            .rate(to)
            .ok_or_else(|| anyhow!("No exchange rate for {} (base {})", to, self.base))?;
        if from_rate <= 0.0 {
            return Err(anyhow!("Invalid exchange rate {from_rate} for {from}"));
        }
        Ok(amount / from_rate * to_rate)
    }
}

#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    async fn fetch_rates(&self, base: &str) -> Result<ExchangeRateTable>;
}
