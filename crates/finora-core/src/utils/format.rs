/// Short month names indexed by month number; index 0 is unused.
const MONTH_NAMES: [&str; 13] = [
    "", "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Short name for a month in 1..=12, empty otherwise.
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES.get(month as usize).copied().unwrap_or("")
}

/// Human label for a period, e.g. "Mar 2024".
pub fn period_label(year: i32, month: u32) -> String {
    let name = month_name(month);
    if name.is_empty() {
        year.to_string()
    } else {
        format!("{} {}", name, year)
    }
}

/// Format an amount with two decimals followed by the currency code
pub fn format_amount(value: f64, currency: &str) -> String {
    format!("{:.2} {}", value, currency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_label() {
        assert_eq!(period_label(2024, 3), "Mar 2024");
        assert_eq!(period_label(2023, 12), "Dec 2023");
        assert_eq!(period_label(2024, 1), "Jan 2024");
        assert_eq!(period_label(2024, 0), "2024");
        assert_eq!(period_label(2024, 13), "2024");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1234.5, "EUR"), "1234.50 EUR");
        assert_eq!(format_amount(-3.0, "USD"), "-3.00 USD");
    }
}
