//! Conversion of edited rich text back to canonical plain text.
//!
//! Normalization runs in two passes. Markup is first tokenized into text
//! and line breaks, producing a plain intermediate string. Declarative
//! boundary rules then restore the blank lines between the header, the
//! update block and the footer when editing removed them.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::render::{RenderLinks, DEFAULT_INCIDENT_BASE_URL};

/// Footer label that starts the last message section.
pub const DEFAULT_FOOTER_LABEL: &str = "Status Dashboard";

const MAX_ENTITY_LEN: usize = 10;

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    LineBreak,
    Markup,
}

/// Split markup into text runs, line breaks and discarded tags.
///
/// `<br>`, `</div>` and `</p>` end a line. A `<` with no closing `>` is
/// text.
fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = input;

    while let Some(open) = rest.find('<') {
        let Some(close) = rest[open..].find('>') else {
            break;
        };
        if open > 0 {
            tokens.push(Token::Text(&rest[..open]));
        }

        let inner = &rest[open + 1..open + close];
        tokens.push(classify_tag(inner));
        rest = &rest[open + close + 1..];
    }

    if !rest.is_empty() {
        tokens.push(Token::Text(rest));
    }
    tokens
}

fn classify_tag(inner: &str) -> Token<'static> {
    let closing = inner.trim_start().starts_with('/');
    let name = inner
        .trim_start()
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default();

    let breaks = name.eq_ignore_ascii_case("br")
        || (closing && (name.eq_ignore_ascii_case("div") || name.eq_ignore_ascii_case("p")));

    if breaks {
        Token::LineBreak
    } else {
        Token::Markup
    }
}

/// Decode the character references an editable region produces.
///
/// Unknown references are kept verbatim. Non-breaking spaces become plain
/// spaces.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        let decoded = after
            .find(';')
            .filter(|end| *end <= MAX_ENTITY_LEN)
            .and_then(|end| decode_entity(&after[..end]).map(|ch| (end, ch)));

        match decoded {
            Some((end, ch)) => {
                out.push(ch);
                rest = &after[end + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix('x').or_else(|| number.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)?
        }
    };

    Some(if ch == '\u{a0}' { ' ' } else { ch })
}

/// Collapse runs of spaces and tabs to a single space.
fn collapse_horizontal_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;

    for ch in text.chars() {
        if ch == ' ' || ch == '\t' {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}

/// Whitespace between two tokens that must be replaced by a fixed separator.
#[derive(Debug, Clone)]
pub struct BoundaryRule {
    name: &'static str,
    pattern: Regex,
    separator: &'static str,
}

impl BoundaryRule {
    /// A rule matching `before`, optional whitespace, then `after`.
    ///
    /// Both arguments are regular expressions.
    pub fn new(
        name: &'static str,
        before: &str,
        after: &str,
        separator: &'static str,
    ) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"({})\s*({})", before, after))?;
        Ok(Self {
            name,
            pattern,
            separator,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &Captures<'_>| {
                format!("{}{}{}", &caps[1], self.separator, &caps[2])
            })
            .into_owned()
    }
}

/// Converts edited notification markup into plain text for delivery.
#[derive(Debug, Clone)]
pub struct PlainTextNormalizer {
    rules: Vec<BoundaryRule>,
    excess_newlines: Regex,
}

impl PlainTextNormalizer {
    /// Build the standard boundary rules for an incident link base and
    /// footer label.
    pub fn new(incident_base_url: &str, footer_label: &str) -> Result<Self, regex::Error> {
        let rules = vec![
            BoundaryRule::new(
                "header-end",
                &format!(r"{}\d+", regex::escape(incident_base_url)),
                r"[A-Z][a-z]+ \d+",
                "\n\n",
            )?,
            BoundaryRule::new(
                "update-line-end",
                r"\d+:\d+ [AP]M [A-Z]{3,4}",
                "-",
                "\n",
            )?,
            BoundaryRule::new("footer-start", "[.!?]", &regex::escape(footer_label), "\n\n")?,
        ];
        Self::with_rules(rules)
    }

    /// Rules matching messages rendered with `links`, using the default
    /// footer label.
    pub fn for_links(links: &RenderLinks) -> Result<Self, regex::Error> {
        Self::new(&links.incident_base_url, DEFAULT_FOOTER_LABEL)
    }

    /// Use a custom rule list, applied in order.
    pub fn with_rules(rules: Vec<BoundaryRule>) -> Result<Self, regex::Error> {
        Ok(Self {
            rules,
            excess_newlines: Regex::new(r"\n\s*\n\s*\n+")?,
        })
    }

    pub fn rules(&self) -> &[BoundaryRule] {
        &self.rules
    }

    /// Normalize edited markup (or already-plain text) to canonical plain
    /// text. Idempotent on canonical output.
    pub fn normalize(&self, rich: &str) -> String {
        let mut text = String::with_capacity(rich.len());
        for token in tokenize(rich) {
            match token {
                Token::Text(run) => text.push_str(&decode_entities(run)),
                Token::LineBreak => text.push('\n'),
                Token::Markup => {}
            }
        }

        let mut text = collapse_horizontal_whitespace(&text);
        for rule in &self.rules {
            text = rule.apply(&text);
        }

        self.excess_newlines
            .replace_all(&text, "\n\n")
            .trim()
            .to_string()
    }
}

fn default_normalizer() -> &'static PlainTextNormalizer {
    static NORMALIZER: OnceLock<PlainTextNormalizer> = OnceLock::new();
    NORMALIZER.get_or_init(|| {
        PlainTextNormalizer::new(DEFAULT_INCIDENT_BASE_URL, DEFAULT_FOOTER_LABEL)
            .expect("default boundary patterns are valid")
    })
}

/// Normalize with the default incident link base and footer label.
pub fn to_plain_text(rich: &str) -> String {
    default_normalizer().normalize(rich)
}

/// Render plain text as editable markup: escapes `&`, `<`, `>` and turns
/// newlines into `<br>`.
pub fn to_rich_text(plain: &str) -> String {
    let mut out = String::with_capacity(plain.len() + plain.len() / 8);
    for ch in plain.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\n' => out.push_str("<br>"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str = "SEV 2 | SEV2 | Page | API errors spiking | https://discoveryinc.pagerduty.com/incidents/2668960\n\
        \n\
        Update 1 | 12-September-2025 | 3:28 PM EDT\n\
        - SRO US received a report stating \"API errors spiking\".\n\
        - The Streaming team has engaged to investigate the incident.\n\
        - Further updates will be provided as they become available.\n\
        \n\
        Status Dashboard - https://discoveryinc.pagerduty.com/status-dashboard";

    #[test]
    fn test_tokenize_classifies_tags() {
        assert_eq!(
            tokenize("a<br/>b</DIV><div class=\"x\">c</p><b>d</b>"),
            vec![
                Token::Text("a"),
                Token::LineBreak,
                Token::Text("b"),
                Token::LineBreak,
                Token::Markup,
                Token::Text("c"),
                Token::LineBreak,
                Token::Markup,
                Token::Text("d"),
                Token::Markup,
            ]
        );
    }

    #[test]
    fn test_unterminated_tag_is_text() {
        assert_eq!(to_plain_text("a < b"), "a < b");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(
            decode_entities("&lt;b&gt; &amp;amp; &quot;x&quot; &#39;y&#x27; &bogus; & done"),
            "<b> &amp; \"x\" 'y' &bogus; & done"
        );
    }

    #[test]
    fn test_nbsp_collapses_with_spaces() {
        assert_eq!(to_plain_text("a&nbsp;&nbsp; \t b"), "a b");
    }

    #[test]
    fn test_canonical_text_is_unchanged() {
        assert_eq!(to_plain_text(CANONICAL), CANONICAL);
        assert_eq!(to_plain_text(&to_plain_text(CANONICAL)), CANONICAL);
    }

    #[test]
    fn test_rich_text_round_trip() {
        assert_eq!(to_plain_text(&to_rich_text(CANONICAL)), CANONICAL);
    }

    #[test]
    fn test_restores_removed_section_breaks() {
        let squashed = CANONICAL.replace("\n\n", " ").replace("EDT\n", "EDT ");
        assert_eq!(to_plain_text(&squashed), CANONICAL);
    }

    #[test]
    fn test_div_per_line_editing() {
        let rich = "<div>Header https://discoveryinc.pagerduty.com/incidents/7</div>\
                    <div>Update 2 | 1-May-2025 | 9:00 AM EDT</div>\
                    <div>- Bullet one.</div>\
                    <div><br></div>\
                    <div>Status Dashboard - x</div>";
        assert_eq!(
            to_plain_text(rich),
            "Header https://discoveryinc.pagerduty.com/incidents/7\n\nUpdate 2 | 1-May-2025 | 9:00 AM EDT\n- Bullet one.\n\nStatus Dashboard - x"
        );
    }

    #[test]
    fn test_collapses_excess_blank_lines() {
        assert_eq!(to_plain_text("a<br><br><br><br>b"), "a\n\nb");
        assert_eq!(to_plain_text("a\n \n\t\nb"), "a\n\nb");
    }

    #[test]
    fn test_custom_footer_label() {
        let normalizer =
            PlainTextNormalizer::new("https://example.com/i/", "Dashboard").unwrap();
        assert_eq!(normalizer.rules().len(), 3);
        assert_eq!(normalizer.normalize("Done. Dashboard: x"), "Done.\n\nDashboard: x");
    }
}
