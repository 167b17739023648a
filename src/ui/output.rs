use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::BASKET, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn muted(text: &str) -> String {
    text.style(theme().muted.clone()).to_string()
}

/// Two-decimal amount
pub fn money(amount: f64) -> String {
    format!("{:.2}", amount).style(theme().money.clone()).to_string()
}

/// Stock count, or "out of stock" when empty
pub fn stock_label(quantity: i64) -> String {
    if quantity <= 0 {
        "out of stock".to_string()
    } else {
        quantity.to_string()
    }
}

/// [`stock_label`], highlighted when empty
pub fn stock_level(quantity: i64) -> String {
    let label = stock_label(quantity);
    if quantity <= 0 {
        label.style(theme().out_of_stock.clone()).to_string()
    } else {
        label
    }
}

pub fn fruit_added(uri: &str) {
    println!("{} {}", Icons::NEW.style(theme().success.clone()), uri);
}

pub fn fruit_changed(uri: &str) {
    println!("{} {}", Icons::MOD.style(theme().warn.clone()), uri);
}

pub fn fruit_removed(what: &str) {
    println!("{} {}", Icons::DEL.style(theme().error.clone()), what);
}
