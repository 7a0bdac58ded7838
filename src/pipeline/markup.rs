//! HTML assembly for the rich-reconstruction strategy.
//!
//! The rich strategy hands pandoc a single HTML document. When vector pages
//! were rendered, each page's SVG is inlined in its own `div.page`; when none
//! were, the extracted text is split into paragraphs instead. Text coming out
//! of `pdftotext` is cleaned first by a short chain of deterministic rules.
//!
//! ## Rule Order
//!
//! Line endings are normalised before anything inspects lines, and invisible
//! characters are removed before blank-line detection so a line holding only
//! a zero-width space still counts as blank.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

/// Head of every assembled document.
const HTML_HEAD: &str = "<!DOCTYPE html>\n<html>\n<head>\n<meta charset='utf-8'>\n<style>\n\
body { font-family: Arial, sans-serif; }\n\
.page { page-break-after: always; margin-bottom: 20px; }\n\
.svg-container { max-width: 100%; }\n\
</style>\n</head>\n<body>\n";

const HTML_TAIL: &str = "</body>\n</html>";

/// One rendered page: its file path and SVG markup.
#[derive(Debug, Clone)]
pub struct SvgPage {
    pub path: PathBuf,
    pub svg: String,
}

/// Apply all text-cleanup rules to raw extractor output.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Replace form feeds (page breaks) with blank lines
/// 3. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 4. Trim trailing whitespace per line
/// 5. Collapse 3+ consecutive blank lines down to 1
pub fn clean_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = replace_form_feeds(&s);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    collapse_blank_lines(&s)
}

/// Split cleaned text into non-empty paragraphs separated by blank lines.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    RE_PARAGRAPH_BREAK
        .split(text)
        .map(|p| p.trim_matches('\n'))
        .filter(|p| !p.trim().is_empty())
        .collect()
}

/// Assemble the HTML document.
///
/// Pages win over text: the text is only used when `pages` is empty.
pub fn build_html(pages: &[SvgPage], text: &str) -> String {
    let mut html = String::from(HTML_HEAD);

    if pages.is_empty() {
        let cleaned = clean_text(text);
        for para in split_paragraphs(&cleaned) {
            let body = para
                .lines()
                .map(escape_html)
                .collect::<Vec<_>>()
                .join("<br>");
            html.push_str("<p>");
            html.push_str(&body);
            html.push_str("</p>\n");
        }
    } else {
        for page in pages {
            html.push_str("<div class='page'>\n<div class='svg-container'>\n");
            html.push_str(strip_svg_prolog(&page.svg).trim());
            html.push_str("\n</div>\n</div>\n");
        }
    }

    html.push_str(HTML_TAIL);
    html
}

/// Escape the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ── Markdown source ──────────────────────────────────────────────────────────

/// Turn extracted text into Markdown that reads back as the same text.
///
/// Every ASCII punctuation character is backslash-escaped so `*`, `_`, `#`,
/// `<tag>` and friends stay literal. Leading indentation is dropped: an
/// indented line would become a code block, where escapes are not honoured.
pub fn text_to_markdown(text: &str) -> String {
    let cleaned = clean_text(text);
    let mut out = String::with_capacity(cleaned.len() + cleaned.len() / 8);
    for (i, line) in cleaned.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for c in line.trim_start().chars() {
            if c.is_ascii_punctuation() {
                out.push('\\');
            }
            out.push(c);
        }
    }
    out.push('\n');
    out
}

// ── SVG inlining ─────────────────────────────────────────────────────────────

static RE_XML_DECL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<\?xml.*?\?>").unwrap());
static RE_DOCTYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!DOCTYPE[^\[>]*(\[.*?\])?\s*>").unwrap());

/// Remove the XML declaration and DOCTYPE, which are invalid inside HTML.
pub fn strip_svg_prolog(svg: &str) -> String {
    let s = RE_XML_DECL.replace_all(svg, "");
    RE_DOCTYPE.replace_all(&s, "").into_owned()
}

static RE_DEFS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<defs\b.*?</defs>").unwrap());
static RE_DRAWABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(path|use|image|text|rect|circle|ellipse|line|polyline|polygon)\b").unwrap());

/// True when the SVG draws something outside its `<defs>`.
///
/// poppler renders a blank page as a bare `<g id="surface1">`, which is a
/// non-empty file with nothing on it.
pub fn svg_has_content(svg: &str) -> bool {
    RE_DRAWABLE.is_match(&RE_DEFS.replace_all(svg, ""))
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Form feeds ───────────────────────────────────────────────────────

fn replace_form_feeds(input: &str) -> String {
    input.replace('\u{000C}', "\n\n")
}

// ── Rule 3: Remove invisible Unicode characters ──────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 4: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 5: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static RE_PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_pipeline() {
        let input = "Title   \r\n\r\n\r\n\r\nBody\u{200B} line\u{000C}Next page";
        let cleaned = clean_text(input);
        assert_eq!(cleaned, "Title\n\nBody line\n\nNext page");
    }

    #[test]
    fn test_split_paragraphs() {
        let text = "first line\nsecond line\n\n\nthird\n  \nfourth";
        let paras = split_paragraphs(text);
        assert_eq!(paras, vec!["first line\nsecond line", "third", "fourth"]);
    }

    #[test]
    fn test_split_paragraphs_empty() {
        assert!(split_paragraphs("").is_empty());
        assert!(split_paragraphs("\n\n   \n").is_empty());
    }

    #[test]
    fn test_build_html_from_text() {
        let html = build_html(&[], "Q1 <draft>\nrevenue & costs\n\nSummary");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<p>Q1 &lt;draft&gt;<br>revenue &amp; costs</p>"));
        assert!(html.contains("<p>Summary</p>"));
        assert!(!html.contains("class='page'"));
        assert!(html.ends_with("</html>"));
    }

    #[test]
    fn test_build_html_prefers_pages() {
        let pages = vec![
            SvgPage {
                path: PathBuf::from("a-0001.svg"),
                svg: "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg id='p1'></svg>\n".into(),
            },
            SvgPage {
                path: PathBuf::from("a-0002.svg"),
                svg: "<svg id='p2'></svg>".into(),
            },
        ];
        let html = build_html(&pages, "ignored text");
        assert_eq!(html.matches("<div class='page'>").count(), 2);
        assert!(html.contains("<svg id='p1'></svg>"));
        assert!(!html.contains("<?xml"));
        assert!(!html.contains("ignored text"));
    }

    #[test]
    fn test_strip_svg_prolog_with_doctype() {
        let svg = "<?xml version=\"1.0\"?>\n<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n<svg/>";
        assert_eq!(strip_svg_prolog(svg).trim(), "<svg/>");
    }

    #[test]
    fn test_svg_has_content() {
        let blank = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
            <svg xmlns=\"http://www.w3.org/2000/svg\" width=\"612pt\" height=\"792pt\">\n\
            <g id=\"surface1\">\n</g>\n</svg>\n";
        assert!(!svg_has_content(blank));

        let glyphs_only_in_defs = "<svg><defs><g><symbol id=\"glyph0-1\"><path d=\"M1 1\"/></symbol></g></defs>\
            <g id=\"surface1\"></g></svg>";
        assert!(!svg_has_content(glyphs_only_in_defs));

        let text_page = "<svg><defs><symbol id=\"glyph0-1\"><path d=\"M1 1\"/></symbol></defs>\
            <g id=\"surface1\"><use xlink:href=\"#glyph0-1\" x=\"72\" y=\"72\"/></g></svg>";
        assert!(svg_has_content(text_page));
    }

    #[test]
    fn test_text_to_markdown_keeps_text_literal() {
        let md = text_to_markdown("# Total: 5 * 3_000 <net>\n    1. indented\n\nplain words\r\n");
        assert_eq!(
            md,
            "\\# Total\\: 5 \\* 3\\_000 \\<net\\>\n1\\. indented\n\nplain words\n"
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
    }
}
