//! Message templates and escaping for chat notifications.
//!
//! Escaping is a fixed character substitution, applied to interpolated data
//! only. The templates' own markup (bold markers, tags) is left intact.

use crate::models::RestockEvent;
use crate::plugins::traits::ParseMode;

/// Characters Telegram MarkdownV2 reserves outside of entities.
pub const MARKDOWN_V2_SPECIAL: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

pub fn escape_markdown_v2(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_V2_SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn escape(mode: ParseMode, text: &str) -> String {
    match mode {
        ParseMode::MarkdownV2 => escape_markdown_v2(text),
        ParseMode::Html => escape_html(text),
    }
}

fn bold(mode: ParseMode, text: &str) -> String {
    match mode {
        ParseMode::MarkdownV2 => format!("*{}*", escape_markdown_v2(text)),
        ParseMode::Html => format!("<b>{}</b>", escape_html(text)),
    }
}

fn link(mode: ParseMode, url: &str) -> String {
    match mode {
        ParseMode::MarkdownV2 => escape_markdown_v2(url),
        ParseMode::Html => format!("<a href=\"{0}\">{0}</a>", escape_html(url)),
    }
}

/// Alert for a single restocked product.
pub fn restock_alert(mode: ParseMode, event: &RestockEvent) -> String {
    format!(
        "🍵 {} IN STOCK: {}\n🔗 {}",
        escape(mode, &event.site),
        bold(mode, &event.product_name),
        link(mode, event.link()),
    )
}

/// Summary for a site where at least one product restocked this cycle.
pub fn summary_alert(mode: ParseMode, site: &str, site_url: &str, restocked: usize) -> String {
    format!(
        "🍵 {}\n{}\n🔗 {}\n{}",
        bold(mode, &format!("{} IS IN STOCK", site)),
        escape(mode, &format!("Total matcha restocked: {}", restocked)),
        escape(mode, "Link:"),
        link(mode, site_url),
    )
}
