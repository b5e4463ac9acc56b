use anyhow::{Result, bail};

/// Rejects negative, NaN and infinite amounts.
pub fn ensure_amount(field: &str, amount: f64) -> Result<()> {
    if !amount.is_finite() {
        bail!("{field} must be a finite number, got {amount}");
    }
    if amount < 0.0 {
        bail!("{field} cannot be negative, got {amount}");
    }
    Ok(())
}

pub fn ensure_not_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("{field} cannot be empty");
    }
    Ok(())
}

/// User ids scope every storage key, so they must not contain the key separator.
pub fn ensure_user_id(user_id: &str) -> Result<()> {
    ensure_not_blank("User id", user_id)?;
    if user_id.contains('/') {
        bail!("User id cannot contain '/': {user_id}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_validation() {
        assert!(ensure_amount("Amount", 0.0).is_ok());
        assert!(ensure_amount("Amount", 12.5).is_ok());
        assert!(ensure_amount("Amount", -0.01).is_err());
        assert!(ensure_amount("Amount", f64::NAN).is_err());
        assert!(ensure_amount("Amount", f64::INFINITY).is_err());
    }

    #[test]
    fn test_user_id_validation() {
        assert!(ensure_user_id("alice").is_ok());
        assert!(ensure_user_id("  ").is_err());
        assert!(ensure_user_id("a/b").is_err());
    }
}
