use colored::Colorize;
use std::fmt;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

fn build_label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "[i]",
        MessageKind::Success => "[✓]",
        MessageKind::Warning => "[!]",
        MessageKind::Error => "[x]",
        MessageKind::Section => "",
    }
}

pub fn format_message(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()).bold().to_string(),
        _ => {
            let line = format!("{} {}", build_label(kind), text);
            match kind {
                MessageKind::Success => line.green().to_string(),
                MessageKind::Warning => line.yellow().to_string(),
                MessageKind::Error => line.red().to_string(),
                _ => line,
            }
        }
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    println!("{}", format_message(kind, message));
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

/// Errors go to stderr so scripted callers can separate them from output.
pub fn error(message: impl fmt::Display) {
    eprintln!("{}", format_message(MessageKind::Error, message));
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code.to_ascii_uppercase().as_str() {
        "USD" | "CAD" | "AUD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        "INR" => Some("₹"),
        _ => None,
    }
}

/// Formats an amount with two decimals and the currency's symbol or code.
pub fn format_amount(amount: f64, currency: &str) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    match currency_symbol(currency) {
        Some(symbol) => format!("{sign}{symbol}{:.2}", amount.abs()),
        None => format!("{sign}{:.2} {}", amount.abs(), currency.to_ascii_uppercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_use_symbols_when_known() {
        assert_eq!(format_amount(52.5, "USD"), "$52.50");
        assert_eq!(format_amount(-3.0, "eur"), "-€3.00");
        assert_eq!(format_amount(7.126, "CHF"), "7.13 CHF");
    }

    #[test]
    fn messages_carry_labels() {
        colored::control::set_override(false);
        assert_eq!(format_message(MessageKind::Success, "Saved"), "[✓] Saved");
        assert_eq!(format_message(MessageKind::Section, " Summary "), "=== Summary ===");
        assert_eq!(
            format_message(MessageKind::Error, "Expense not found"),
            "[x] Expense not found"
        );
    }
}
