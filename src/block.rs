use std::fmt;

/// Severity tier used by badges and severity-valued table cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Parse a severity word, ignoring ASCII case.
    pub fn parse(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("high") {
            Some(Self::High)
        } else if word.eq_ignore_ascii_case("medium") {
            Some(Self::Medium)
        } else if word.eq_ignore_ascii_case("low") {
            Some(Self::Low)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inline text spans with formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Bold(Vec<Span>),
    Italic(Vec<Span>),
    BoldItalic(Vec<Span>),
    Link { label: String, url: String },
    Badge { label: String, severity: Severity },
}

/// A single classified input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Rule,
    TableRow { cells: Vec<String>, separator: bool },
    ListItem { depth: u8, text: String },
    Paragraph(String),
    Blank,
}

/// A list entry with at most one level of nested items.
///
/// `text` is `None` for a nested run that had no depth-0 item in front of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub text: Option<String>,
    pub nested: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub items: Vec<ListItem>,
}

/// Consecutive table rows, separators still included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<String>,
    pub separator: bool,
}

/// Render units built from runs of line blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Group {
    Heading { level: u8, text: String },
    Rule,
    Table(Table),
    List(List),
    Paragraph(Vec<String>),
}
