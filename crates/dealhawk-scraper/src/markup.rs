//! Thin traversal layer over the parsed HTML document.
//!
//! Extraction and selection never touch the parsing library directly; they
//! see only [`SearchPage`], [`ResultCard`], and [`ProductPage`], which
//! expose find-first/text/attribute lookups over otherwise opaque nodes.
//! Swapping the underlying parser touches this module alone.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

/// Literal the marketplace serves on its bot-check interstitial instead of
/// search results.
pub const CAPTCHA_MARKER: &str = "Enter the characters you see below";

static RESULT_CARD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.s-result-item").expect("valid selector"));
static HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2").expect("valid selector"));
static PRICE_WHOLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.a-price-whole").expect("valid selector"));
static PRICE_FRACTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.a-price-fraction").expect("valid selector"));
static PRODUCT_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.a-link-normal").expect("valid selector"));
static RESULT_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img.s-image").expect("valid selector"));
static QUANTITY_SELECT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("select#quantity").expect("valid selector"));
static OPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("option").expect("valid selector"));

/// Returns `true` when the raw page body is a CAPTCHA interstitial rather
/// than real content.
#[must_use]
pub fn is_captcha_challenge(raw_html: &str) -> bool {
    raw_html.contains(CAPTCHA_MARKER)
}

/// A parsed search-results document.
pub struct SearchPage {
    html: Html,
}

impl SearchPage {
    #[must_use]
    pub fn parse(raw_html: &str) -> Self {
        Self {
            html: Html::parse_document(raw_html),
        }
    }

    /// All result cards in document order.
    #[must_use]
    pub fn result_cards(&self) -> Vec<ResultCard<'_>> {
        self.html
            .select(&RESULT_CARD)
            .map(|element| ResultCard { element })
            .collect()
    }
}

/// One opaque result-card node from a [`SearchPage`].
#[derive(Debug, Clone, Copy)]
pub struct ResultCard<'a> {
    element: ElementRef<'a>,
}

impl<'a> ResultCard<'a> {
    fn find_first(&self, selector: &Selector) -> Option<ElementRef<'a>> {
        self.element.select(selector).next()
    }

    fn first_text(&self, selector: &Selector) -> Option<String> {
        self.find_first(selector)
            .map(|node| node.text().collect::<String>().trim().to_string())
    }

    fn first_attr(&self, selector: &Selector, attr: &str) -> Option<String> {
        self.find_first(selector)
            .and_then(|node| node.value().attr(attr))
            .map(ToOwned::to_owned)
    }

    /// Concatenated text content of the whole card.
    #[must_use]
    pub fn full_text(&self) -> String {
        self.element.text().collect()
    }

    /// Trimmed text of the first heading node, if any.
    #[must_use]
    pub fn heading_text(&self) -> Option<String> {
        self.first_text(&HEADING)
    }

    /// Trimmed text of the whole-number price node, if any.
    #[must_use]
    pub fn price_whole_text(&self) -> Option<String> {
        self.first_text(&PRICE_WHOLE)
    }

    /// Trimmed text of the price-fraction node, if any. The marketplace
    /// splits decimal prices across two sibling nodes.
    #[must_use]
    pub fn price_fraction_text(&self) -> Option<String> {
        self.first_text(&PRICE_FRACTION)
    }

    /// `href` of the first normal product link, if any. Site-relative.
    #[must_use]
    pub fn product_href(&self) -> Option<String> {
        self.first_attr(&PRODUCT_LINK, "href")
    }

    /// `src` of the first search-result image, if any.
    #[must_use]
    pub fn image_src(&self) -> Option<String> {
        self.first_attr(&RESULT_IMAGE, "src")
    }
}

/// A parsed product-detail document, used for stock assessment.
pub struct ProductPage {
    html: Html,
}

impl ProductPage {
    #[must_use]
    pub fn parse(raw_html: &str) -> Self {
        Self {
            html: Html::parse_document(raw_html),
        }
    }

    /// Largest numeric value among the quantity dropdown's options, or
    /// `None` when the page has no quantity dropdown at all.
    ///
    /// Non-numeric option values (placeholder rows) are ignored; a dropdown
    /// with no numeric options reads as quantity 0.
    #[must_use]
    pub fn max_quantity(&self) -> Option<u32> {
        let dropdown = self.html.select(&QUANTITY_SELECT).next()?;

        let max = dropdown
            .select(&OPTION)
            .filter_map(|option| option.value().attr("value"))
            .filter_map(|value| value.parse::<u32>().ok())
            .max();

        Some(max.unwrap_or(0))
    }
}
