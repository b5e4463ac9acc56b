use super::AppContext;
use crate::core::currency::{ExchangeRateTable, format_amount};
use anyhow::Result;

/// Converts `amount` between two currencies using the stored rate table for
/// the ledger currency, fetching one if none is stored yet.
pub async fn run(ctx: &AppContext, amount: f64, from: &str, to: &str, strict: bool) -> Result<()> {
    let table = ctx.rates.resolve(&ctx.ledger_currency()).await;
    println!("{}", convert_line(&table, amount, from, to, strict)?);
    Ok(())
}

/// Formats `amount from = result to`. With `strict`, unknown currencies are an
/// error instead of converting at parity.
pub fn convert_line(
    table: &ExchangeRateTable,
    amount: f64,
    from: &str,
    to: &str,
    strict: bool,
) -> Result<String> {
    let from = from.to_uppercase();
    let to = to.to_uppercase();
    let converted = if strict {
        table.try_convert(amount, &from, &to)?
    } else {
        table.convert(amount, &from, &to)
    };
    Ok(format!(
        "{} = {}",
        format_amount(amount, &from),
        format_amount(converted, &to)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn table() -> ExchangeRateTable {
        ExchangeRateTable::new(
            "USD",
            HashMap::from([
                ("USD".to_string(), 1.0),
                ("EUR".to_string(), 0.5),
                ("GBP".to_string(), 0.25),
            ]),
        )
    }

    #[test]
    fn test_convert_line() {
        assert_eq!(
            convert_line(&table(), 100.0, "eur", "gbp", false).unwrap(),
            "€100.00 = £50.00"
        );
    }

    #[test]
    fn test_convert_line_parity_unless_strict() {
        assert_eq!(
            convert_line(&table(), 10.0, "USD", "XYZ", false).unwrap(),
            "$10.00 = XYZ 10.00"
        );
        assert!(convert_line(&table(), 10.0, "USD", "XYZ", true).is_err());
    }
}
