use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    Prefix,
    Suffix,
}

/// Culture-style currency rendering: `$1,234.50`, `1.234,50 €`, ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub symbol_position: SymbolPosition,
    pub thousands_separator: String,
    pub decimal_separator: String,
    pub decimal_places: u32,
    /// Put a no-break space between amount and symbol.
    #[serde(default)]
    pub space_between: bool,
}

pub const SUPPORTED_LOCALES: [&str; 5] = ["en-US", "en-GB", "de-DE", "fr-FR", "ja-JP"];

impl CurrencyFormat {
    pub fn for_locale(locale: &str) -> Option<Self> {
        let format = match locale {
            "en-US" => Self::prefixed("$", ",", ".", 2),
            "en-GB" => Self::prefixed("£", ",", ".", 2),
            "de-DE" => Self::suffixed("€", ".", ",", 2),
            "fr-FR" => Self::suffixed("€", "\u{202F}", ",", 2),
            "ja-JP" => Self::prefixed("¥", ",", ".", 0),
            _ => return None,
        };
        Some(format)
    }

    fn prefixed(symbol: &str, thousands: &str, decimal: &str, places: u32) -> Self {
        Self {
            symbol: symbol.to_string(),
            symbol_position: SymbolPosition::Prefix,
            thousands_separator: thousands.to_string(),
            decimal_separator: decimal.to_string(),
            decimal_places: places,
            space_between: false,
        }
    }

    fn suffixed(symbol: &str, thousands: &str, decimal: &str, places: u32) -> Self {
        Self {
            symbol: symbol.to_string(),
            symbol_position: SymbolPosition::Suffix,
            thousands_separator: thousands.to_string(),
            decimal_separator: decimal.to_string(),
            decimal_places: places,
            space_between: true,
        }
    }

    pub fn format(&self, amount: Decimal) -> String {
        let mut rounded =
            amount.round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(self.decimal_places);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();

        let digits = rounded.abs().to_string();
        let (integer, fraction) = match digits.split_once('.') {
            Some((integer, fraction)) => (integer.to_string(), Some(fraction.to_string())),
            None => (digits, None),
        };

        let mut number = group_thousands(&integer, &self.thousands_separator);
        if let Some(fraction) = fraction {
            number.push_str(&self.decimal_separator);
            number.push_str(&fraction);
        }

        let gap = if self.space_between { "\u{00A0}" } else { "" };
        let body = match self.symbol_position {
            SymbolPosition::Prefix => format!("{}{}{}", self.symbol, gap, number),
            SymbolPosition::Suffix => format!("{}{}{}", number, gap, self.symbol),
        };

        if negative {
            format!("-{}", body)
        } else {
            body
        }
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::prefixed("$", ",", ".", 2)
    }
}

fn group_thousands(integer: &str, separator: &str) -> String {
    let len = integer.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (index, ch) in integer.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}
