//! Inline span parsing and rendering.
//!
//! A line starts as a single [`Span::Text`]. Each pass rewrites only the
//! `Text` spans left by earlier passes, so finished fragments (links, badges)
//! are never scanned again. Emphasis pairs may enclose fragments produced by
//! earlier passes; their inner text stays open to the passes that follow.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::block::{Severity, Span};
use crate::config::Config;
use crate::html::open_tag;

/// Parse a line of text into spans, recognising badges for `labels`
pub fn parse_inline(text: &str, labels: &[String]) -> Vec<Span> {
    let spans = vec![Span::Text(text.to_string())];
    let spans = pair_pass(spans, "***", PairRule::Loose, Span::BoldItalic);
    let spans = text_pass(spans, &|text| badges(text, labels));
    let spans = text_pass(spans, &links);
    let spans = pair_pass(spans, "**", PairRule::Loose, Span::Bold);
    pair_pass(spans, "*", PairRule::Tight, Span::Italic)
}

/// Render a line of text to HTML
pub fn render_inline(text: &str, config: &Config) -> String {
    let spans = parse_inline(text, &config.badge.labels);
    let mut out = String::new();
    spans_to_html(&spans, config, &mut out);
    out
}

fn push_text(spans: &mut Vec<Span>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Span::Text(last)) = spans.last_mut() {
        last.push_str(text);
    } else {
        spans.push(Span::Text(text.to_string()));
    }
}

/// Apply `rewrite` to every open `Text` span, descending into emphasis
fn text_pass(spans: Vec<Span>, rewrite: &dyn Fn(&str) -> Vec<Span>) -> Vec<Span> {
    let mut out = Vec::with_capacity(spans.len());
    for span in spans {
        match span {
            Span::Text(text) => {
                for produced in rewrite(&text) {
                    match produced {
                        Span::Text(text) => push_text(&mut out, &text),
                        other => out.push(other),
                    }
                }
            }
            Span::Bold(inner) => out.push(Span::Bold(text_pass(inner, rewrite))),
            Span::Italic(inner) => out.push(Span::Italic(text_pass(inner, rewrite))),
            Span::BoldItalic(inner) => out.push(Span::BoldItalic(text_pass(inner, rewrite))),
            closed @ (Span::Link { .. } | Span::Badge { .. }) => out.push(closed),
        }
    }
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum PairRule {
    /// Content may contain marker characters (`**(.+?)**`)
    Loose,
    /// Content may not contain marker characters (`*([^*]+?)*`)
    Tight,
}

/// Position of a marker: span index and byte offset inside that `Text` span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pos {
    index: usize,
    offset: usize,
}

fn pair_pass(
    spans: Vec<Span>,
    marker: &str,
    rule: PairRule,
    wrap: fn(Vec<Span>) -> Span,
) -> Vec<Span> {
    let spans: Vec<Span> = spans
        .into_iter()
        .map(|span| match span {
            Span::Bold(inner) => Span::Bold(pair_pass(inner, marker, rule, wrap)),
            Span::Italic(inner) => Span::Italic(pair_pass(inner, marker, rule, wrap)),
            Span::BoldItalic(inner) => Span::BoldItalic(pair_pass(inner, marker, rule, wrap)),
            other @ (Span::Text(_) | Span::Link { .. } | Span::Badge { .. }) => other,
        })
        .collect();

    let mut out = Vec::new();
    let mut from = Pos { index: 0, offset: 0 };
    while let Some((open, close)) = find_pair(&spans, from, marker, rule) {
        copy_range(&spans, from, open, &mut out);
        let mut content = Vec::new();
        let content_start = Pos {
            offset: open.offset + marker.len(),
            ..open
        };
        copy_range(&spans, content_start, close, &mut content);
        out.push(wrap(content));
        from = Pos {
            offset: close.offset + marker.len(),
            ..close
        };
    }
    let end = Pos {
        index: spans.len(),
        offset: 0,
    };
    copy_range(&spans, from, end, &mut out);
    out
}

fn find_marker(spans: &[Span], from: Pos, marker: &str) -> Option<Pos> {
    spans
        .iter()
        .enumerate()
        .skip(from.index)
        .find_map(|(index, span)| {
            let Span::Text(text) = span else {
                return None;
            };
            let start = if index == from.index { from.offset } else { 0 };
            text.get(start..)?.find(marker).map(|found| Pos {
                index,
                offset: start + found,
            })
        })
}

/// Leftmost opener at or after `from` with the shortest non-empty content
fn find_pair(spans: &[Span], from: Pos, marker: &str, rule: PairRule) -> Option<(Pos, Pos)> {
    let mut open = find_marker(spans, from, marker)?;
    loop {
        let content_start = Pos {
            index: open.index,
            offset: open.offset + marker.len(),
        };
        let close = find_marker(spans, content_start, marker)?;
        if close != content_start {
            return Some((open, close));
        }
        match rule {
            PairRule::Tight => open = close,
            PairRule::Loose => {
                // Markers are ASCII, so one byte on is still a char boundary
                let after = Pos {
                    offset: content_start.offset + 1,
                    ..content_start
                };
                let close = find_marker(spans, after, marker)?;
                return Some((open, close));
            }
        }
    }
}

/// Copy the spans between two positions into `out`, cutting `Text` at the edges.
///
/// Positions always point into `Text` spans, except `{0, 0}` and the end.
fn copy_range(spans: &[Span], from: Pos, to: Pos, out: &mut Vec<Span>) {
    let last = to.index.min(spans.len().saturating_sub(1));
    for (index, span) in spans.iter().enumerate().take(last + 1).skip(from.index) {
        match span {
            Span::Text(text) => {
                let start = if index == from.index { from.offset } else { 0 };
                let end = if index == to.index { to.offset } else { text.len() };
                if start < end {
                    push_text(out, &text[start..end]);
                }
            }
            other if index < to.index && (index > from.index || from.offset == 0) => {
                out.push(other.clone())
            }
            _ => {}
        }
    }
}

/// Scan `text` for `trigger`, replacing every position where `matcher` succeeds
fn scan(text: &str, trigger: char, matcher: impl Fn(&str) -> Option<(usize, Span)>) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut plain_start = 0;
    let mut cursor = 0;

    while let Some(found) = text[cursor..].find(trigger) {
        let at = cursor + found;
        if let Some((len, span)) = matcher(&text[at..]) {
            push_text(&mut spans, &text[plain_start..at]);
            spans.push(span);
            cursor = at + len;
            plain_start = cursor;
        } else {
            cursor = at + trigger.len_utf8();
        }
    }
    push_text(&mut spans, &text[plain_start..]);
    spans
}

fn badges(text: &str, labels: &[String]) -> Vec<Span> {
    if labels.is_empty() {
        return vec![Span::Text(text.to_string())];
    }
    scan(text, '*', |s| {
        labels.iter().find_map(|label| {
            let (severity, rest) = badge(s, label)?;
            let span = Span::Badge {
                label: label.clone(),
                severity,
            };
            Some((s.len() - rest.len(), span))
        })
    })
}

/// Match one badge form at the start of `s`, returning the unconsumed rest.
///
/// Accepted: `**L: S**`, `**L:** S`, `**L:** **S**`, `*L:* **S**`, `*L:* S`.
fn badge<'a>(s: &'a str, label: &str) -> Option<(Severity, &'a str)> {
    let (open, rest) = match s.strip_prefix("**") {
        Some(rest) => ("**", rest),
        None => ("*", s.strip_prefix('*')?),
    };
    let rest = rest.strip_prefix(label)?.strip_prefix(':')?;

    if let Some(rest) = rest.strip_prefix(open) {
        return trailing_severity(rest.trim_start());
    }
    if open == "**" {
        let (severity, rest) = severity_prefix(rest.trim_start())?;
        let rest = rest.trim_start().strip_prefix("**")?;
        return Some((severity, rest));
    }
    None
}

fn trailing_severity(s: &str) -> Option<(Severity, &str)> {
    if let Some(inner) = s.strip_prefix("**") {
        let (severity, rest) = severity_prefix(inner)?;
        return Some((severity, rest.strip_prefix("**")?));
    }
    let (severity, rest) = severity_prefix(s)?;
    if rest.chars().next().is_some_and(char::is_alphanumeric) {
        return None;
    }
    Some((severity, rest))
}

fn severity_prefix(s: &str) -> Option<(Severity, &str)> {
    [Severity::High, Severity::Medium, Severity::Low]
        .into_iter()
        .find_map(|severity| {
            let word = severity.as_str();
            let head = s.get(..word.len())?;
            head.eq_ignore_ascii_case(word)
                .then(|| (severity, &s[word.len()..]))
        })
}

/// Replace `[label](url)` with link spans.
///
/// Every `[` before the same `]` shares that `]`'s target, so a failed target
/// moves the cursor past the `]` and each byte is scanned once.
fn links(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut plain_start = 0;
    let mut cursor = 0;

    while let Some(found) = text[cursor..].find('[') {
        let open = cursor + found;
        let Some(close) = text[open + 1..].find(']').map(|at| open + 1 + at) else {
            break;
        };
        cursor = close + 1;
        let label = &text[open + 1..close];
        let Some(url) = link_target(&text[cursor..]) else {
            continue;
        };
        if label.is_empty() {
            continue;
        }
        push_text(&mut spans, &text[plain_start..open]);
        spans.push(Span::Link {
            label: label.to_string(),
            url: url.to_string(),
        });
        // `(` + url + `)`
        cursor += url.len() + 2;
        plain_start = cursor;
    }
    push_text(&mut spans, &text[plain_start..]);
    spans
}

/// `(http(s)://address)` at the start of `s`, returning the url
fn link_target(s: &str) -> Option<&str> {
    let target = s.strip_prefix('(')?;
    let url = &target[..target.find(')')?];
    let address = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    if address.is_empty() || url.contains(char::is_whitespace) {
        return None;
    }
    Some(url)
}

pub(crate) fn spans_to_html(spans: &[Span], config: &Config, out: &mut String) {
    for span in spans {
        span_to_html(span, config, out);
    }
}

fn span_to_html(span: &Span, config: &Config, out: &mut String) {
    let style = &config.style;
    match span {
        Span::Text(text) => out.push_str(&encode_text(text)),
        Span::Bold(inner) => {
            open_tag(out, "strong", &style.strong);
            spans_to_html(inner, config, out);
            out.push_str("</strong>");
        }
        Span::Italic(inner) => {
            open_tag(out, "em", &style.em);
            spans_to_html(inner, config, out);
            out.push_str("</em>");
        }
        Span::BoldItalic(inner) => {
            out.push_str("<strong><em>");
            spans_to_html(inner, config, out);
            out.push_str("</em></strong>");
        }
        Span::Link { label, url } => {
            out.push_str("<a href=\"");
            out.push_str(&encode_double_quoted_attribute(url));
            out.push('"');
            if !style.link.is_empty() {
                out.push_str(" style=\"");
                out.push_str(&encode_double_quoted_attribute(&style.link));
                out.push('"');
            }
            out.push_str(" target=\"_blank\">");
            out.push_str(&encode_text(label));
            out.push_str("</a>");
        }
        Span::Badge { label, severity } => {
            let tier = config.badge.tier(*severity);
            open_tag(out, "span", &config.badge.wrapper);
            if !tier.icon.is_empty() {
                out.push_str(&encode_text(&tier.icon));
                out.push(' ');
            }
            out.push_str("<strong>");
            out.push_str(&encode_text(label));
            out.push_str(":</strong> ");
            severity_pill(*severity, config, out);
            out.push_str("</span>");
        }
    }
}

/// Colored pill for a severity tier, shared by badges and table cells
pub(crate) fn severity_pill(severity: Severity, config: &Config, out: &mut String) {
    let badge = &config.badge;
    let background = &badge.tier(severity).background;
    let css = if background.is_empty() {
        badge.pill.clone()
    } else {
        format!("background:{background};{}", badge.pill)
    };
    out.push_str("<span data-severity=\"");
    out.push_str(severity.as_str());
    out.push('"');
    if !css.is_empty() {
        out.push_str(" style=\"");
        out.push_str(&encode_double_quoted_attribute(&css));
        out.push('"');
    }
    out.push('>');
    out.push_str(&severity.as_str().to_ascii_uppercase());
    out.push_str("</span>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StyleConfig;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn text(s: &str) -> Span {
        Span::Text(s.to_string())
    }

    fn labels() -> Vec<String> {
        vec!["Hubbell Signal".to_string(), "Risk".to_string()]
    }

    fn parse(s: &str) -> Vec<Span> {
        parse_inline(s, &labels())
    }

    fn plain() -> Config {
        let mut config = Config::default();
        config.style = StyleConfig::unstyled();
        config.badge.wrapper.clear();
        config.badge.pill.clear();
        config.badge.high.icon.clear();
        config.badge.medium.icon.clear();
        config.badge.low.icon.clear();
        config
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(parse("just words"), vec![text("just words")]);
    }

    #[test]
    fn emphasis_kinds() {
        assert_eq!(
            parse("***both*** **bold** *it*"),
            vec![
                Span::BoldItalic(vec![text("both")]),
                text(" "),
                Span::Bold(vec![text("bold")]),
                text(" "),
                Span::Italic(vec![text("it")]),
            ]
        );
    }

    #[test]
    fn italic_inside_bold() {
        assert_eq!(
            parse("**a *b* c**"),
            vec![Span::Bold(vec![
                text("a "),
                Span::Italic(vec![text("b")]),
                text(" c"),
            ])]
        );
    }

    #[test]
    fn bold_wraps_link() {
        assert_eq!(
            parse("**[Headline](https://news.test/a)** (Reuters)"),
            vec![
                Span::Bold(vec![Span::Link {
                    label: "Headline".to_string(),
                    url: "https://news.test/a".to_string(),
                }]),
                text(" (Reuters)"),
            ]
        );
    }

    #[test]
    fn link_label_is_opaque() {
        assert_eq!(
            parse("[a_b*c](https://x.test)"),
            vec![Span::Link {
                label: "a_b*c".to_string(),
                url: "https://x.test".to_string(),
            }]
        );
    }

    #[rstest]
    #[case("[label](ftp://x.test)")]
    #[case("[label](https://)")]
    #[case("[label] (https://x.test)")]
    #[case("[label](https://x.test/a b)")]
    #[case("[](https://x.test)")]
    #[case("[label](https://x.test")]
    fn non_links_stay_literal(#[case] input: &str) {
        assert_eq!(parse(input), vec![text(input)]);
    }

    #[test]
    fn leftmost_bracket_opens_label() {
        assert_eq!(
            parse("[a [b](http://x.test)"),
            vec![Span::Link {
                label: "a [b".to_string(),
                url: "http://x.test".to_string(),
            }]
        );
    }

    #[test]
    fn failed_target_does_not_hide_later_link() {
        assert_eq!(
            parse("[x] and [y](http://y.test)"),
            vec![
                text("[x] and "),
                Span::Link {
                    label: "y".to_string(),
                    url: "http://y.test".to_string(),
                },
            ]
        );
    }

    #[test]
    fn long_lines_parse_in_one_pass() {
        let line = "*a* ".repeat(100_000);
        let spans = parse(&line);
        assert_eq!(spans.len(), 200_000);
        assert_eq!(spans[0], Span::Italic(vec![text("a")]));
        assert_eq!(spans[199_999], text(" "));

        let line = "**b** [c](http://c.test) ".repeat(50_000);
        let spans = parse(&line);
        assert_eq!(spans.len(), 200_000);

        let brackets = "[".repeat(200_000);
        assert_eq!(parse(&brackets), vec![text(&brackets)]);
    }

    #[rstest]
    #[case("**Risk: High**", "Risk", Severity::High)]
    #[case("**Risk: high**", "Risk", Severity::High)]
    #[case("**Hubbell Signal:** Medium", "Hubbell Signal", Severity::Medium)]
    #[case("**Hubbell Signal:** **LOW**", "Hubbell Signal", Severity::Low)]
    #[case("*Hubbell Signal:* **High**", "Hubbell Signal", Severity::High)]
    #[case("*Hubbell Signal:*  low", "Hubbell Signal", Severity::Low)]
    fn badge_forms(#[case] input: &str, #[case] label: &str, #[case] severity: Severity) {
        assert_eq!(
            parse(input),
            vec![Span::Badge {
                label: label.to_string(),
                severity,
            }]
        );
    }

    #[test]
    fn badge_inside_sentence() {
        assert_eq!(
            parse("*Hubbell Signal:* **High** — switchgear demand"),
            vec![
                Span::Badge {
                    label: "Hubbell Signal".to_string(),
                    severity: Severity::High,
                },
                text(" — switchgear demand"),
            ]
        );
    }

    #[test]
    fn severity_needs_word_boundary() {
        assert_eq!(
            parse("**Risk:** Highway"),
            vec![Span::Bold(vec![text("Risk:")]), text(" Highway")]
        );
    }

    #[test]
    fn unknown_label_is_plain_bold() {
        assert_eq!(
            parse("**AWS: High**"),
            vec![Span::Bold(vec![text("AWS: High")])]
        );
    }

    #[test]
    fn badges_need_labels() {
        assert_eq!(
            parse_inline("**Risk: High**", &[]),
            vec![Span::Bold(vec![text("Risk: High")])]
        );
    }

    #[rstest]
    #[case("**unterminated")]
    #[case("a * b")]
    #[case("**")]
    #[case("****")]
    fn unterminated_markers_stay_literal(#[case] input: &str) {
        assert_eq!(parse(input), vec![text(input)]);
    }

    #[test]
    fn empty_italic_moves_opener() {
        assert_eq!(
            parse("** x*"),
            vec![text("*"), Span::Italic(vec![text(" x")])]
        );
    }

    #[test]
    fn renders_escaped_text() {
        assert_eq!(
            render_inline("a < b & **c**", &plain()),
            "a &lt; b &amp; <strong>c</strong>"
        );
    }

    #[test]
    fn renders_link() {
        assert_eq!(
            render_inline("[Read more →](https://x.test/?a=1&b=2)", &plain()),
            "<a href=\"https://x.test/?a=1&amp;b=2\" target=\"_blank\">Read more →</a>"
        );
    }

    #[test]
    fn renders_badge_pill() {
        assert_eq!(
            render_inline("**Risk: High**", &plain()),
            "<span><strong>Risk:</strong> <span data-severity=\"high\" style=\"background:#166534;\">HIGH</span></span>"
        );
    }

    #[test]
    fn styled_badge_uses_tier_icon() {
        let html = render_inline("*Hubbell Signal:* **Medium**", &Config::default());
        assert!(html.contains("◆ <strong>Hubbell Signal:</strong>"));
        assert!(html.contains("data-severity=\"medium\""));
        assert!(html.contains("background:#92400e;"));
        assert!(!html.contains('*'));
    }
}
