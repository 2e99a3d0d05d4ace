use crate::parsers::text;
use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

static TAG_LIKE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Full text content of an HTML fragment, whitespace-collapsed
///
/// Unlike the rendered text a browser reports for an element, this includes
/// text inside hidden descendants (a collapsed answer panel, for example).
pub fn text_content(fragment: &str) -> String {
    let doc = Html::parse_fragment(fragment);
    let raw = doc.root_element().text().collect::<String>();
    text::clean_text(&raw)
}

/// Removes HTML-tag-like substrings left in captured text
pub fn strip_tags(input: &str) -> String {
    TAG_LIKE.replace_all(input, "").into_owned()
}
