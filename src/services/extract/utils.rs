use crate::types::PRICE_UNAVAILABLE;
use scraper::ElementRef;

const PRICE_LABEL: &str = "Price:";

const CURRENCY_SYMBOLS: [char; 5] = ['$', '£', '€', '₹', '¥'];

/// Clean a located price string.
///
/// Drops `Price:` labels, collapses a leading run of currency symbols to the
/// first one and prefixes `symbol` when the text carries no currency at all.
/// Empty input yields [`PRICE_UNAVAILABLE`]. Applying it twice changes nothing.
pub fn sanitize_price(raw: &str, symbol: &str) -> String {
    let mut text = raw.trim().to_string();
    while text.contains(PRICE_LABEL) {
        text = text.replace(PRICE_LABEL, "");
    }
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case(PRICE_UNAVAILABLE) {
        return PRICE_UNAVAILABLE.to_string();
    }

    let mut lead: Option<&str> = None;
    let mut rest = text;
    loop {
        rest = rest.trim_start();
        match leading_symbol(rest, symbol) {
            Some(sym) => {
                lead.get_or_insert(sym);
                rest = &rest[sym.len()..];
            }
            None => break,
        }
    }
    let rest = rest.trim_end();
    if rest.is_empty() {
        return PRICE_UNAVAILABLE.to_string();
    }

    match lead {
        Some(sym) => format!("{}{}", sym, rest),
        None if has_currency(rest, symbol) => rest.to_string(),
        None => format!("{}{}", symbol, rest),
    }
}

fn leading_symbol<'a>(text: &'a str, symbol: &str) -> Option<&'a str> {
    if !symbol.is_empty() && text.starts_with(symbol) {
        return Some(&text[..symbol.len()]);
    }
    let c = text.chars().next()?;
    CURRENCY_SYMBOLS
        .contains(&c)
        .then(|| &text[..c.len_utf8()])
}

fn has_currency(text: &str, symbol: &str) -> bool {
    text.contains(CURRENCY_SYMBOLS) || (!symbol.is_empty() && text.contains(symbol))
}

/// Resolve `href` against `origin` (scheme + host, no trailing slash).
pub fn normalize_link(href: &str, origin: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    if let Some(rest) = href.strip_prefix("//") {
        let scheme = origin
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .unwrap_or("https");
        return format!("{}://{}", scheme, rest);
    }
    format!("{}{}", origin, href)
}

/// `src`, else `data-src`, resolved against `origin`. Inline `data:`
/// placeholders are ignored.
pub fn image_source(img: ElementRef<'_>, origin: &str) -> String {
    let attr = |name: &str| {
        img.value()
            .attr(name)
            .map(str::trim)
            .filter(|v| !v.is_empty() && !v.starts_with("data:"))
    };
    attr("src")
        .or_else(|| attr("data-src"))
        .map(|v| normalize_link(v, origin))
        .unwrap_or_default()
}

/// Href of a located link element, resolved against `origin`.
pub fn link_target(a: ElementRef<'_>, origin: &str) -> String {
    a.value()
        .attr("href")
        .map(|href| normalize_link(href, origin))
        .unwrap_or_default()
}

/// Located name if it has visible text.
pub fn accepted_name(name: Option<String>) -> Option<String> {
    name.filter(|n| !n.trim().is_empty())
}
