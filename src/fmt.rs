use chrono::NaiveDate;

use crate::settings::Settings;

/// Format an amount with the configured separators, currency symbol, and the
/// currency's decimal places: defaults give "$1,234.56", a European profile
/// gives "-1.234,56 €", a zero-decimal currency gives "¥120".
pub fn money(val: f64, symbol: &str, decimals: u32, settings: &Settings) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let rendered = format!("{:.*}", decimals as usize, abs);
    let mut parts = rendered.split('.');
    let int_part = parts.next().unwrap_or("0");
    let dec_part = parts.next();

    let mut with_separators = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_separators.push_str(&settings.thousands_separator.chars().rev().collect::<String>());
        }
        with_separators.push(c);
    }
    let with_separators: String = with_separators.chars().rev().collect();

    let sign = if negative { "-" } else { "" };
    let number = match dec_part {
        Some(dec) => format!("{with_separators}{}{dec}", settings.decimal_separator),
        None => with_separators,
    };
    if prefix_symbol(symbol) {
        format!("{sign}{symbol}{number}")
    } else {
        format!("{sign}{number} {symbol}")
    }
}

// Currency symbols conventionally written before the amount.
fn prefix_symbol(symbol: &str) -> bool {
    matches!(symbol, "$" | "£" | "¥" | "₹" | "R$" | "C$" | "A$")
}

/// Render an ISO date with the user's preferred chrono format string.
/// Unparseable dates pass through unchanged.
pub fn date(iso: &str, settings: &Settings) -> String {
    match NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        Ok(d) => d.format(&settings.date_format).to_string(),
        Err(_) => iso.to_string(),
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn us() -> Settings {
        Settings::default()
    }

    fn eu() -> Settings {
        Settings {
            decimal_separator: ",".to_string(),
            thousands_separator: ".".to_string(),
            date_format: "%d.%m.%Y".to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_money_us_formatting() {
        assert_eq!(money(1234.56, "$", 2, &us()), "$1,234.56");
        assert_eq!(money(-500.00, "$", 2, &us()), "-$500.00");
        assert_eq!(money(0.0, "$", 2, &us()), "$0.00");
        assert_eq!(money(1000000.99, "$", 2, &us()), "$1,000,000.99");
    }

    #[test]
    fn test_money_eu_formatting() {
        assert_eq!(money(1234.56, "€", 2, &eu()), "1.234,56 €");
        assert_eq!(money(-42.1, "€", 2, &eu()), "-42,10 €");
    }

    #[test]
    fn test_money_zero_decimal_currency() {
        assert_eq!(money(120.0, "¥", 0, &us()), "¥120");
        assert_eq!(money(1234567.0, "¥", 0, &us()), "¥1,234,567");
        assert_eq!(money(-120.4, "¥", 0, &us()), "-¥120");
    }

    #[test]
    fn test_suffix_symbol_placement() {
        assert_eq!(money(10.0, "kr", 2, &us()), "10.00 kr");
    }

    #[test]
    fn test_date_formatting() {
        assert_eq!(date("2026-01-15", &eu()), "15.01.2026");
        assert_eq!(date("2026-01-15", &us()), "2026-01-15");
        assert_eq!(date("not-a-date", &us()), "not-a-date");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
