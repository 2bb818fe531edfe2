//! Structural patterns
//!
//! Every logical field is located through an ordered list of patterns. Order is
//! part of the contract: narrow shapes sit before loose ones, and the first
//! pattern that yields a result wins.

use crate::error::PatternError;
use scraper::Selector;
use std::sync::{Arc, LazyLock};

/// One structural match rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Any selector understood by `scraper`.
    Css(&'static str),
    /// Element (optionally of `tag`) carrying `attr`.
    HasAttr {
        tag: Option<&'static str>,
        attr: &'static str,
    },
    /// Element whose `attr` contains `needle`.
    AttrContains {
        tag: Option<&'static str>,
        attr: &'static str,
        needle: &'static str,
    },
    /// Element whose `attr` equals `value` exactly.
    AttrEquals {
        tag: Option<&'static str>,
        attr: &'static str,
        value: &'static str,
    },
}

impl Pattern {
    pub fn to_css(&self) -> String {
        match self {
            Pattern::Css(css) => css.to_string(),
            Pattern::HasAttr { tag, attr } => format!("{}[{}]", tag.unwrap_or(""), attr),
            Pattern::AttrContains { tag, attr, needle } => {
                format!("{}[{}*=\"{}\"]", tag.unwrap_or(""), attr, needle)
            }
            Pattern::AttrEquals { tag, attr, value } => {
                format!("{}[{}=\"{}\"]", tag.unwrap_or(""), attr, value)
            }
        }
    }

    pub fn compile(&self) -> Result<Selector, PatternError> {
        let css = self.to_css();
        Selector::parse(&css)
            .map_err(|e| e.to_string())
            .map_err(|reason| PatternError { reason, css })
    }
}

/// Ordered, compiled pattern list for one field.
#[derive(Debug, Clone)]
pub struct PatternList {
    entries: Vec<(Pattern, Selector)>,
}

impl PatternList {
    pub fn compile(patterns: &[Pattern]) -> Result<Self, PatternError> {
        let entries = patterns
            .iter()
            .map(|p| p.compile().map(|sel| (*p, sel)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Selectors in evaluation order.
    pub fn selectors(&self) -> impl Iterator<Item = &Selector> {
        self.entries.iter().map(|(_, sel)| sel)
    }

    pub fn patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.entries.iter().map(|(p, _)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Pattern, &Selector)> {
        self.entries.iter().map(|(p, sel)| (p, sel))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Container strategies plus one pattern list per record field.
#[derive(Debug, Clone)]
pub struct ExtractionProfile {
    pub containers: PatternList,
    pub name: PatternList,
    pub price: PatternList,
    pub link: PatternList,
    pub image: PatternList,
}

impl ExtractionProfile {
    pub fn compile(
        containers: &[Pattern],
        name: &[Pattern],
        price: &[Pattern],
        link: &[Pattern],
        image: &[Pattern],
    ) -> Result<Self, PatternError> {
        Ok(Self {
            containers: PatternList::compile(containers)?,
            name: PatternList::compile(name)?,
            price: PatternList::compile(price)?,
            link: PatternList::compile(link)?,
            image: PatternList::compile(image)?,
        })
    }

    /// Search-result layout shared by the Amazon storefronts. Compiled once.
    pub fn amazon() -> Arc<ExtractionProfile> {
        Arc::clone(&AMAZON_PROFILE)
    }
}

/// Search-result containers, tried in order; the first that matches anything is
/// used exclusively.
pub const AMAZON_CONTAINERS: &[Pattern] = &[
    Pattern::AttrEquals {
        tag: None,
        attr: "data-component-type",
        value: "s-search-result",
    },
    Pattern::Css(r#"[data-asin][data-component-type="s-search-result"]"#),
    Pattern::Css(r#".s-result-item[data-component-type="s-search-result"]"#),
    Pattern::AttrContains {
        tag: None,
        attr: "data-cel-widget",
        needle: "search_result",
    },
    Pattern::Css(r#".s-result-item:not([data-component-type="s-search-result"])"#),
];

pub const AMAZON_NAME: &[Pattern] = &[
    Pattern::Css("h2.a-size-mini span"),
    Pattern::Css("h2 a span"),
    Pattern::Css(".a-size-base-plus"),
    Pattern::Css(".a-size-medium"),
    Pattern::Css("h2.s-size-mini span"),
    Pattern::AttrEquals {
        tag: None,
        attr: "data-cy",
        value: "title-recipe-title",
    },
    Pattern::Css(".a-size-mini span"),
    Pattern::Css("h3 a span"),
    Pattern::Css(".s-size-mini span"),
];

pub const AMAZON_PRICE: &[Pattern] = &[
    Pattern::Css(".a-price.a-text-price.a-size-medium.a-color-base .a-offscreen"),
    Pattern::Css(".a-price-whole"),
    Pattern::Css(".a-price .a-offscreen"),
    Pattern::Css(".a-price-symbol"),
    Pattern::Css(".a-price-range .a-offscreen"),
    Pattern::Css(".a-price-range"),
    Pattern::Css(r#"[data-a-size="xl"] .a-offscreen"#),
    Pattern::Css(".a-price.a-text-price .a-offscreen"),
];

pub const AMAZON_LINK: &[Pattern] = &[
    Pattern::Css("h2.a-size-mini a"),
    Pattern::Css("h2 a"),
    Pattern::Css(r#"[data-cy="title-recipe-title"] a"#),
    Pattern::Css(r#".a-link-normal[href*="/dp/"]"#),
    Pattern::AttrContains {
        tag: Some("a"),
        attr: "href",
        needle: "/dp/",
    },
    Pattern::Css(".a-link-normal"),
];

pub const AMAZON_IMAGE: &[Pattern] = &[
    Pattern::Css(".s-image"),
    Pattern::Css(".a-dynamic-image"),
    Pattern::AttrContains {
        tag: Some("img"),
        attr: "data-src",
        needle: "amazon",
    },
    Pattern::AttrContains {
        tag: Some("img"),
        attr: "src",
        needle: "amazon",
    },
    Pattern::HasAttr {
        tag: Some("img"),
        attr: "data-src",
    },
    Pattern::Css(".rush-component img"),
];

static AMAZON_PROFILE: LazyLock<Arc<ExtractionProfile>> = LazyLock::new(|| {
    Arc::new(
        ExtractionProfile::compile(
            AMAZON_CONTAINERS,
            AMAZON_NAME,
            AMAZON_PRICE,
            AMAZON_LINK,
            AMAZON_IMAGE,
        )
        .expect("valid amazon patterns"),
    )
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amazon_profile_compiles() {
        let profile = ExtractionProfile::amazon();
        assert_eq!(profile.containers.len(), AMAZON_CONTAINERS.len());
        assert_eq!(profile.name.len(), AMAZON_NAME.len());
        assert_eq!(profile.price.len(), AMAZON_PRICE.len());
        assert_eq!(profile.link.len(), AMAZON_LINK.len());
        assert_eq!(profile.image.len(), AMAZON_IMAGE.len());
    }

    #[test]
    fn typed_patterns_render_css() {
        assert_eq!(
            Pattern::HasAttr {
                tag: Some("img"),
                attr: "data-src"
            }
            .to_css(),
            "img[data-src]"
        );
        assert_eq!(
            Pattern::AttrContains {
                tag: None,
                attr: "data-cel-widget",
                needle: "search_result"
            }
            .to_css(),
            r#"[data-cel-widget*="search_result"]"#
        );
        assert_eq!(
            Pattern::AttrEquals {
                tag: Some("div"),
                attr: "data-cy",
                value: "title"
            }
            .to_css(),
            r#"div[data-cy="title"]"#
        );
    }

    #[test]
    fn compile_preserves_order() {
        let list = PatternList::compile(&[
            Pattern::Css("h2 span"),
            Pattern::Css(".title"),
            Pattern::Css("h3"),
        ])
        .unwrap();
        let css: Vec<String> = list.patterns().map(Pattern::to_css).collect();
        assert_eq!(css, vec!["h2 span", ".title", "h3"]);
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = PatternList::compile(&[Pattern::Css("h2"), Pattern::Css("[[nope")]).unwrap_err();
        assert_eq!(err.css, "[[nope");
        assert!(!err.reason.is_empty());
    }

    #[test]
    fn typed_pattern_compile_error_keeps_rendered_css() {
        let err = Pattern::AttrEquals {
            tag: Some("div"),
            attr: "data cy",
            value: "x",
        }
        .compile()
        .unwrap_err();
        assert_eq!(err.css, r#"div[data cy="x"]"#);
        assert!(err.to_string().starts_with("invalid pattern `div[data cy=\"x\"]`"), "{}", err);
    }
}
