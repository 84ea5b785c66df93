mod block;
mod config;
mod error;
mod html;
mod inline;
mod parser;

pub mod delivery;
pub mod email;
pub mod prompt;
pub mod source;

pub use block::{Block, Group, List, ListItem, Severity, Span, Table, TableRow};
pub use config::{
    BadgeConfig, BriefingConfig, Config, EmailConfig, SmtpConfig, StyleConfig, TierConfig,
};
pub use error::Error;
pub use inline::parse_inline;

use std::sync::LazyLock;

static DEFAULT_CONFIG: LazyLock<Config> = LazyLock::new(Config::compiled_default);

/// Classify markdown into one block per line.
pub fn classify(markdown: &str) -> Vec<(usize, Block)> {
    parser::classify(markdown)
}

/// Parse markdown into render units.
pub fn parse(markdown: &str) -> Vec<Group> {
    parser::group(parser::classify(markdown))
}

/// Render one line of inline markdown using default config.
pub fn render_inline(text: &str) -> String {
    inline::render_inline(text, &DEFAULT_CONFIG)
}

/// Convert markdown to an HTML fragment using default config.
pub fn markdown_to_html(markdown: &str) -> String {
    markdown_to_html_with_config(markdown, &DEFAULT_CONFIG)
}

/// Convert markdown to an HTML fragment with custom config.
pub fn markdown_to_html_with_config(markdown: &str, config: &Config) -> String {
    let groups = parse(markdown);
    html::groups_to_html(&groups, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_rendering_uses_bundled_styles() {
        let html = markdown_to_html("# Brief");
        assert!(html.starts_with("<h1 style=\"font-family:"));
        assert!(html.contains("Playfair Display"));
    }

    #[test]
    fn inline_entry_point() {
        assert_eq!(
            render_inline("*quiet*"),
            "<em style=\"color:#4b5563;\">quiet</em>"
        );
    }

    #[test]
    fn rendering_is_repeatable() {
        let md = "## Hyperscaler Tracker\n- **AWS:** 1 GW in Ohio\n\n| A | B |\n|---|---|\n| 1 | 2 |";
        assert_eq!(markdown_to_html(md), markdown_to_html(md));
    }

    #[test]
    fn parse_groups_document() {
        let groups = parse("# T\n\ntext\n---");
        assert_eq!(
            groups,
            vec![
                Group::Heading {
                    level: 1,
                    text: "T".to_string()
                },
                Group::Paragraph(vec!["text".to_string()]),
                Group::Rule,
            ]
        );
    }
}
