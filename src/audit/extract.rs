//! On-page signal extraction
//!
//! Everything here is synchronous and works on an already parsed document.
//! Missing tags degrade to empty values; nothing in this module fails.

use crate::audit::report::{
    DuplicateFlags, HeadingSummary, Hreflang, ImageSummary, LinkSummary, MetadataInfo,
    SchemaSummary, TextSignal, WordStats,
};
use crate::audit::tracker::DuplicationTrackers;
use crate::config::{ExtractionMode, QueryPolicy};
use crate::url::{request_url, resolve_link, SiteScope};
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

/// Elements whose text never counts as visible
const HIDDEN_ELEMENTS: [&str; 5] = ["head", "script", "style", "noscript", "template"];

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\b").expect("Failed to compile word regex"));

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static META_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("meta"));
static LINK_REL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("link[rel][href]"));
static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("a"));
static IMG_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static SCRIPT_TYPE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("script[type]"));
static ITEMSCOPE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("[itemscope]"));
static HEADING_SELECTORS: LazyLock<[Selector; 6]> = LazyLock::new(|| {
    [
        selector("h1"),
        selector("h2"),
        selector("h3"),
        selector("h4"),
        selector("h5"),
        selector("h6"),
    ]
});

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Failed to parse static selector - this is a bug")
}

/// Signals extracted from one document
#[derive(Debug, Clone)]
pub struct PageAnalysis {
    pub title: TextSignal,
    pub description: TextSignal,
    /// `None` in light mode
    pub metadata: Option<MetadataInfo>,
    pub headings: HeadingSummary,
    pub word_stats: WordStats,
    pub links: LinkSummary,
    pub images: ImageSummary,
    /// `None` in light mode
    pub schema: Option<SchemaSummary>,
    /// `None` in light mode
    pub meta_robots: Option<String>,
    pub duplicates: DuplicateFlags,
    pub content_hash: String,
    /// Resolved image sources in document order, without duplicates
    pub image_sources: Vec<Url>,
    /// Same-site link targets in document order, without duplicates
    pub internal_links: Vec<Url>,
}

/// Extracts the signals of `document`
///
/// `html` is the raw markup the document was parsed from; it is only used for
/// the text-to-HTML ratio. The duplication trackers are updated as a side effect.
///
/// # Arguments
///
/// * `html` - Raw markup of the page
/// * `document` - `html` parsed
/// * `page_url` - Final URL of the page, used to resolve relative links
/// * `scope` - Decides which links are internal
/// * `trackers` - Run-scoped duplicate detection
/// * `mode` - `Light` leaves metadata, schema and meta robots empty
///
/// # Returns
///
/// The page signals plus the image sources and internal links to probe
pub fn extract(
    html: &str,
    document: &Html,
    page_url: &Url,
    scope: &SiteScope,
    trackers: &mut DuplicationTrackers,
    mode: ExtractionMode,
) -> PageAnalysis {
    let title = extract_title(document);
    let description = extract_description(document);

    let text = visible_text(document.root_element());
    let content_hash = content_hash(&text);

    let duplicates = DuplicateFlags {
        title: trackers.check_title(&title.text),
        description: trackers.check_description(&description.text),
        content: !text.is_empty() && trackers.check_content(&content_hash),
    };

    let (links, internal_links) = extract_links(document, page_url, scope);
    let (images, image_sources) = extract_images(document, page_url);

    let full = mode == ExtractionMode::Full;

    PageAnalysis {
        title,
        description,
        metadata: full.then(|| extract_metadata(document)),
        headings: extract_headings(document),
        word_stats: word_stats(document, html, &text),
        links,
        images,
        schema: full.then(|| extract_schema(document)),
        meta_robots: if full {
            meta_content(document, "name", "robots").0
        } else {
            None
        },
        duplicates,
        content_hash,
        image_sources,
        internal_links,
    }
}

/// Parses `html` and extracts its signals
pub fn extract_html(
    html: &str,
    page_url: &Url,
    scope: &SiteScope,
    trackers: &mut DuplicationTrackers,
    mode: ExtractionMode,
) -> PageAnalysis {
    let document = Html::parse_document(html);
    extract(html, &document, page_url, scope, trackers, mode)
}

/// Collects the visible text under `element`, one space between text nodes
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    push_visible_text(element, &mut parts);
    parts.join(" ")
}

fn push_visible_text(element: ElementRef<'_>, parts: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    parts.push(text.to_string());
                }
            }
            Node::Element(el) if !HIDDEN_ELEMENTS.contains(&el.name()) => {
                if let Some(child) = ElementRef::wrap(child) {
                    push_visible_text(child, parts);
                }
            }
            _ => {}
        }
    }
}

/// Counts `\b\w+\b` tokens in lowercased text
pub fn count_words(text: &str) -> usize {
    WORD_RE.find_iter(&text.to_lowercase()).count()
}

/// `part / whole` as a percentage, rounded to 2 decimals and clamped to [0, 100]
///
/// A zero denominator yields 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2((part as f64 / whole as f64 * 100.0).clamp(0.0, 100.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// SHA-256 of the text with whitespace runs collapsed
pub fn content_hash(text: &str) -> String {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    hex::encode(Sha256::digest(normalized.as_bytes()))
}

fn text_signal(text: Option<String>, tag_count: usize) -> TextSignal {
    let found = text.is_some();
    let text = text.unwrap_or_default();
    let length = text.chars().count();
    let words = text.split_whitespace().count();
    let chars_per_word = if words == 0 {
        0.0
    } else {
        round2(length as f64 / words as f64)
    };

    TextSignal {
        found,
        text,
        length,
        words,
        chars_per_word,
        tag_count,
    }
}

fn extract_title(document: &Html) -> TextSignal {
    let titles: Vec<ElementRef<'_>> = document.select(&TITLE_SELECTOR).collect();
    let text = titles
        .first()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()));
    text_signal(text, titles.len())
}

fn extract_description(document: &Html) -> TextSignal {
    let (content, count) = meta_content(document, "name", "description");
    text_signal(content.map(|c| collapse_whitespace(&c)), count)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `content` of `<meta {attr}="{value}">` plus the number of such tags
///
/// The attribute value is compared case-insensitively.
fn meta_content(document: &Html, attr: &str, value: &str) -> (Option<String>, usize) {
    let mut matching = document.select(&META_SELECTOR).filter(|el| {
        el.value()
            .attr(attr)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case(value))
    });

    let first = matching.next();
    let count = first.map_or(0, |_| 1 + matching.count());
    let content = first
        .and_then(|el| el.value().attr("content"))
        .map(|c| c.trim().to_string());
    (content, count)
}

/// Returns true if the space-separated `rel` attribute contains `token`
fn has_rel(element: &ElementRef<'_>, token: &str) -> bool {
    element
        .value()
        .attr("rel")
        .is_some_and(|rel| rel.split_whitespace().any(|t| t.eq_ignore_ascii_case(token)))
}

fn link_href(document: &Html, rel: &str) -> Option<String> {
    document
        .select(&LINK_REL_SELECTOR)
        .find(|el| has_rel(el, rel))
        .and_then(|el| el.value().attr("href"))
        .map(|href| href.trim().to_string())
}

fn extract_metadata(document: &Html) -> MetadataInfo {
    let charset = document
        .select(&META_SELECTOR)
        .find_map(|el| el.value().attr("charset"))
        .map(|c| c.trim().to_string());

    let hreflangs = document
        .select(&LINK_REL_SELECTOR)
        .filter(|el| has_rel(el, "alternate"))
        .filter_map(|el| {
            let language = el.value().attr("hreflang")?;
            let url = el.value().attr("href")?;
            Some(Hreflang {
                language: language.trim().to_string(),
                url: url.trim().to_string(),
            })
        })
        .collect();

    MetadataInfo {
        charset,
        canonical: link_href(document, "canonical"),
        favicon: link_href(document, "icon"),
        viewport: meta_content(document, "name", "viewport").0,
        keywords: meta_content(document, "name", "keywords").0,
        locale: meta_content(document, "property", "og:locale").0,
        content_type: meta_content(document, "property", "og:type").0,
        site_name: meta_content(document, "property", "og:site_name").0,
        site_image: meta_content(document, "property", "og:image").0,
        hreflangs,
    }
}

fn extract_headings(document: &Html) -> HeadingSummary {
    let counts: Vec<usize> = HEADING_SELECTORS
        .iter()
        .map(|sel| document.select(sel).count())
        .collect();

    let h1_content = document
        .select(&HEADING_SELECTORS[0])
        .next()
        .map(|h1| collapse_whitespace(&visible_text(h1)))
        .unwrap_or_default();

    HeadingSummary {
        h1: counts[0],
        h2: counts[1],
        h3: counts[2],
        h4: counts[3],
        h5: counts[4],
        h6: counts[5],
        h1_count: counts[0],
        h1_content,
    }
}

fn word_stats(document: &Html, html: &str, text: &str) -> WordStats {
    let total_words = count_words(text);
    let anchor_words: usize = document
        .select(&ANCHOR_SELECTOR)
        .map(|a| count_words(&visible_text(a)))
        .sum();

    let text_length = text.chars().count();
    let html_length = html.chars().count();

    WordStats {
        total_words,
        anchor_words,
        anchor_ratio: percentage(anchor_words, total_words),
        text_length,
        html_length,
        text_to_html_ratio: percentage(text_length, html_length),
    }
}

fn extract_links(document: &Html, page_url: &Url, scope: &SiteScope) -> (LinkSummary, Vec<Url>) {
    let mut summary = LinkSummary::default();
    let mut internal_links = Vec::new();
    let mut seen = HashSet::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        summary.total += 1;

        if has_rel(&anchor, "nofollow") {
            summary.nofollow += 1;
        }

        let Some(resolved) = resolve_link(href, page_url) else {
            summary.non_crawlable += 1;
            continue;
        };

        if scope.contains(&resolved) {
            summary.internal += 1;
            let target = request_url(&resolved, QueryPolicy::Preserve);
            if seen.insert(target.to_string()) {
                internal_links.push(target);
            }
        } else {
            summary.external += 1;
        }
    }

    (summary, internal_links)
}

fn extract_images(document: &Html, page_url: &Url) -> (ImageSummary, Vec<Url>) {
    let mut summary = ImageSummary::default();
    let mut sources = Vec::new();
    let mut seen = HashSet::new();

    for img in document.select(&IMG_SELECTOR) {
        summary.total_images += 1;

        let alt = img.value().attr("alt").map(str::trim).unwrap_or_default();
        if alt.is_empty() {
            summary.images_without_alt += 1;
        }

        let src = img.value().attr("src").map(str::trim).unwrap_or_default();
        if src.is_empty() {
            summary.images_without_src += 1;
            continue;
        }

        if let Some(url) = resolve_link(src, page_url) {
            if seen.insert(url.to_string()) {
                sources.push(url);
            }
        }
    }

    summary.alt_coverage = percentage(
        summary.total_images - summary.images_without_alt,
        summary.total_images,
    );

    (summary, sources)
}

fn extract_schema(document: &Html) -> SchemaSummary {
    let mut json_ld_count = 0;
    let mut json_ld_types = Vec::new();

    let json_ld_scripts = document.select(&SCRIPT_TYPE_SELECTOR).filter(|el| {
        el.value()
            .attr("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
    });

    for script in json_ld_scripts {
        json_ld_count += 1;
        let body = script.text().collect::<String>();
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
            collect_schema_types(&value, &mut json_ld_types);
        }
    }

    let mut microdata_count = 0;
    let mut microdata_types = Vec::new();
    for scope in document.select(&ITEMSCOPE_SELECTOR) {
        microdata_count += 1;
        if let Some(item_type) = scope.value().attr("itemtype") {
            for t in item_type.split_whitespace() {
                push_unique(&mut microdata_types, t);
            }
        }
    }

    SchemaSummary {
        has_structured_data: json_ld_count > 0 || microdata_count > 0,
        json_ld_count,
        json_ld_types,
        microdata_count,
        microdata_types,
    }
}

/// Gathers `@type` values from a JSON-LD value, following arrays and `@graph`
fn collect_schema_types(value: &serde_json::Value, types: &mut Vec<String>) {
    use serde_json::Value;

    match value {
        Value::Array(items) => {
            for item in items {
                collect_schema_types(item, types);
            }
        }
        Value::Object(map) => {
            match map.get("@type") {
                Some(Value::String(t)) => push_unique(types, t),
                Some(Value::Array(ts)) => {
                    for t in ts.iter().filter_map(Value::as_str) {
                        push_unique(types, t);
                    }
                }
                _ => {}
            }
            if let Some(graph) = map.get("@graph") {
                collect_schema_types(graph, types);
            }
        }
        _ => {}
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}
