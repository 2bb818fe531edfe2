//! First-match-wins field lookup inside one container.

use crate::selectors::PatternList;
use scraper::ElementRef;

/// Visible text of `el`, whitespace collapsed to single spaces and trimmed.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first pattern whose first match has non-blank text.
///
/// Patterns are tried strictly in order and nothing after the winning pattern
/// is evaluated.
pub fn locate_text(fragment: ElementRef<'_>, patterns: &PatternList) -> Option<String> {
    for sel in patterns.selectors() {
        if let Some(el) = fragment.select(sel).next() {
            let text = element_text(el);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// First element matched by the first pattern that matches anything.
pub fn locate_element<'a>(fragment: ElementRef<'a>, patterns: &PatternList) -> Option<ElementRef<'a>> {
    patterns
        .selectors()
        .find_map(|sel| fragment.select(sel).next())
}
