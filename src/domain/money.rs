use std::fmt;

/// Balances and movements are carried as plain floating-point amounts.
/// No rounding or fixed-point scale is applied anywhere in the ledger.
pub type Amount = f64;

/// Format an amount with two decimals for display.
/// Example: 100.0 -> "100.00", -0.5 -> "-0.50"
pub fn format_amount(amount: Amount) -> String {
    format!("{:.2}", amount)
}

/// Parse a user-supplied amount string.
/// Accepts anything `f64` parses except NaN and infinities.
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let value: Amount = input
        .trim()
        .parse()
        .map_err(|_| ParseAmountError::InvalidFormat)?;

    if !value.is_finite() {
        return Err(ParseAmountError::NotFinite);
    }

    Ok(value)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    InvalidFormat,
    NotFinite,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::InvalidFormat => write!(f, "invalid amount format"),
            ParseAmountError::NotFinite => write!(f, "amount must be a finite number"),
        }
    }
}

impl std::error::Error for ParseAmountError {}
