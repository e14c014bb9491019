use once_cell::sync::Lazy;
use regex::Regex;

/// "<brand words> <code>", e.g. "웰라 콜레스톤 8/0"
static SPACED_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<brand>.+?)\s+(?P<code>#?[0-9A-Za-z./\-]*[0-9][0-9A-Za-z./\-]*)$")
        .expect("valid spaced code pattern")
});

/// Hangul brand glued to its code, as speech-to-text often emits: "아모스6N"
static GLUED_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<brand>.*[^\x00-\x7F])(?P<code>#?[0-9][0-9A-Za-z./\-]*)$")
        .expect("valid glued code pattern")
});

/// Separate a product code from a spoken brand phrase.
///
/// "로레알 7.1" becomes ("로레알", Some("7.1")). When a code is already known
/// it wins, and a copy of it trailing the brand is dropped. A single word is
/// never split, so brands such as "3CE" survive intact.
pub fn split_brand_code(brand: &str, code: Option<&str>) -> (String, Option<String>) {
    let brand = brand.trim();

    if let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) {
        let deduped = brand
            .strip_suffix(code)
            .filter(|rest| rest.ends_with(char::is_whitespace))
            .map(str::trim_end)
            .filter(|rest| !rest.is_empty());
        return (deduped.unwrap_or(brand).to_string(), Some(code.to_string()));
    }

    for pattern in [&*SPACED_CODE, &*GLUED_CODE] {
        if let Some(caps) = pattern.captures(brand) {
            let head = caps["brand"].trim();
            if !head.is_empty() {
                return (head.to_string(), Some(caps["code"].to_string()));
            }
        }
    }

    (brand.to_string(), None)
}
