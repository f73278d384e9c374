/// Format a value with a fixed number of decimal places and no grouping.
///
/// Negative zero is printed as `0`.
///
/// # Examples
///
/// ```
/// use billing_core::formatting::format_fixed;
///
/// assert_eq!(format_fixed(120.0, 2), "120.00");
/// assert_eq!(format_fixed(7.456, 2), "7.46");
/// assert_eq!(format_fixed(-0.001, 2), "0.00");
/// ```
pub fn format_fixed(value: f64, decimals: usize) -> String {
    let text = format!("{:.prec$}", value, prec = decimals);
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text[1..].to_string()
    } else {
        text
    }
}

/// Format an energy quantity in kilowatt-hours.
///
/// # Examples
///
/// ```
/// use billing_core::formatting::format_kwh;
///
/// assert_eq!(format_kwh(1520.5), "1520.50 kWh");
/// assert_eq!(format_kwh(0.0), "0.00 kWh");
/// ```
pub fn format_kwh(value: f64) -> String {
    format!("{} kWh", format_fixed(value, 2))
}

/// Format a monetary amount in Brazilian reais.
///
/// # Examples
///
/// ```
/// use billing_core::formatting::format_brl;
///
/// assert_eq!(format_brl(62.0), "R$ 62.00");
/// assert_eq!(format_brl(-7.5), "R$ -7.50");
/// ```
pub fn format_brl(amount: f64) -> String {
    format!("R$ {}", format_fixed(amount, 2))
}

/// Pad or truncate `text` to exactly `width` characters.
pub fn fit_width(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{}{}", text, " ".repeat(width - count))
    } else if width == 0 {
        String::new()
    } else {
        let mut out: String = text.chars().take(width - 1).collect();
        out.push('…');
        out
    }
}
