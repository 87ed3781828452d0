//! Just enough HTML handling for the documentation sites we scrape:
//! locating an element by attribute, listing its links, and flattening text.

use regex::Regex;
use std::sync::LazyLock;

static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<a\b([^>]*)>(.*?)</a\s*>"#).expect("valid anchor regex"));

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("valid attribute regex")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid space regex"));

/// A link with its attributes and flattened text
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub attrs: Vec<(String, String)>,
    pub text: String,
}

impl Anchor {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn href(&self) -> Option<&str> {
        self.attr("href")
    }

    /// True when the element carries every class in `classes` (space separated)
    pub fn has_classes(&self, classes: &str) -> bool {
        has_classes(self.attr("class"), classes)
    }
}

/// Parse the attributes of a start tag body (`class="x" href="y"`)
pub fn parse_attrs(tag_body: &str) -> Vec<(String, String)> {
    ATTR_RE
        .captures_iter(tag_body)
        .map(|c| {
            let value = c.get(2).or_else(|| c.get(3)).map(|m| m.as_str()).unwrap_or("");
            (c[1].to_string(), decode_entities(value))
        })
        .collect()
}

fn has_classes(class_attr: Option<&str>, classes: &str) -> bool {
    let Some(class_attr) = class_attr else {
        return false;
    };
    let present: Vec<&str> = class_attr.split_whitespace().collect();
    classes.split_whitespace().all(|c| present.contains(&c))
}

/// Every `<a>` element in `html`, in document order
pub fn anchors(html: &str) -> Vec<Anchor> {
    ANCHOR_RE
        .captures_iter(html)
        .map(|c| Anchor {
            attrs: parse_attrs(&c[1]),
            text: text_content(&c[2]),
        })
        .collect()
}

/// Inner HTML of the first `<tag>` whose attributes satisfy `pred`.
/// Nested elements of the same tag are balanced.
pub fn find_element<'a>(
    html: &'a str,
    tag: &str,
    pred: impl Fn(&[(String, String)]) -> bool,
) -> Option<&'a str> {
    let start_re = Regex::new(&format!(r"(?is)<{}\b([^>]*)>", regex::escape(tag))).ok()?;
    let boundary_re =
        Regex::new(&format!(r"(?is)<(/?){}\b[^>]*>", regex::escape(tag))).ok()?;

    let open = start_re
        .captures_iter(html)
        .find(|c| pred(&parse_attrs(&c[1])))?;
    let inner_start = open.get(0)?.end();

    let mut depth = 1usize;
    for c in boundary_re.captures_iter(&html[inner_start..]) {
        let m = c.get(0)?;
        if c[1].is_empty() {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                return Some(&html[inner_start..inner_start + m.start()]);
            }
        }
    }

    // Unclosed element: take the rest of the document
    Some(&html[inner_start..])
}

/// Inner HTML of the first `<tag id="...">`
pub fn element_by_id<'a>(html: &'a str, tag: &str, id: &str) -> Option<&'a str> {
    find_element(html, tag, |attrs| {
        attrs.iter().any(|(k, v)| k.eq_ignore_ascii_case("id") && v == id)
    })
}

/// Inner HTML of the first `<tag>` carrying all of `classes`
pub fn element_by_class<'a>(html: &'a str, tag: &str, classes: &str) -> Option<&'a str> {
    find_element(html, tag, |attrs| {
        let class_attr = attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("class"))
            .map(|(_, v)| v.as_str());
        has_classes(class_attr, classes)
    })
}

/// Drop tags, decode entities and collapse whitespace
pub fn text_content(html: &str) -> String {
    let without_tags = TAG_RE.replace_all(html, "");
    let decoded = decode_entities(&without_tags);
    WS_RE.replace_all(decoded.trim(), " ").into_owned()
}

/// Like [`text_content`] but keeps line breaks, for code samples
pub fn text_lines(html: &str) -> String {
    decode_entities(&TAG_RE.replace_all(html, ""))
}

/// Decode the handful of entities Sphinx output actually uses
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let Some(end) = rest[..rest.len().min(10)].find(';') else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };

        let entity = &rest[1..end];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" | "#39" | "#x27" => Some('\''),
            "nbsp" => Some(' '),
            _ => entity
                .strip_prefix("#x")
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };

        match decoded {
            Some(ch) => {
                out.push(ch);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchors_with_attributes() {
        let html = r#"<p><a class="reference internal" href="iam.html">IAM</a>
            <a href='#top' class="headerlink">¶</a></p>"#;
        let links = anchors(html);

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].href(), Some("iam.html"));
        assert_eq!(links[0].text, "IAM");
        assert!(links[0].has_classes("reference internal"));
        assert!(!links[1].has_classes("reference"));
        assert_eq!(links[1].href(), Some("#top"));
    }

    #[test]
    fn test_anchor_text_is_flattened() {
        let html = r#"<a href="x.html"><code class="xref"><span class="pre">create_role</span></code></a>"#;
        assert_eq!(anchors(html)[0].text, "create_role");
    }

    #[test]
    fn test_nested_sections_are_balanced() {
        let html = r#"
            <section id="client"><h2>Client</h2>
              <section id="methods"><a href="a.html">a</a></section>
              <a href="b.html">b</a>
            </section>
            <section id="paginators"><a href="c.html">c</a></section>"#;

        let client = element_by_id(html, "section", "client").unwrap();
        let hrefs: Vec<_> = anchors(client).iter().filter_map(|a| a.href().map(String::from)).collect();
        assert_eq!(hrefs, vec!["a.html", "b.html"]);

        let pagi = element_by_id(html, "section", "paginators").unwrap();
        assert_eq!(anchors(pagi).len(), 1);
        assert!(element_by_id(html, "section", "waiters").is_none());
    }

    #[test]
    fn test_element_by_class() {
        let html = r#"<ul class="simple"><li>x</li></ul><ul class="current nav"><li><a href="s3.html">S3</a></li></ul>"#;
        let ul = element_by_class(html, "ul", "current").unwrap();
        assert_eq!(anchors(ul)[0].text, "S3");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt; &#39;d&#x27;"), "a & b <c> 'd'");
        assert_eq!(decode_entities("AT&T; & more"), "AT&T; & more");
    }

    #[test]
    fn test_text_content_collapses_whitespace() {
        assert_eq!(text_content("<p>  Hello\n  <b>world</b> </p>"), "Hello world");
    }
}
