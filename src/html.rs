use html_escape::encode_double_quoted_attribute;

use crate::block::{Group, List, Severity, Table, TableRow};
use crate::config::Config;
use crate::inline::{render_inline, severity_pill};

/// Convert groups to an HTML fragment, one rendered unit per line
pub fn groups_to_html(groups: &[Group], config: &Config) -> String {
    let mut units = Vec::with_capacity(groups.len());

    for group in groups {
        let mut unit = String::new();
        emit_group(group, config, &mut unit);
        if unit.is_empty() {
            tracing::debug!(?group, "dropping empty render unit");
        } else {
            units.push(unit);
        }
    }

    units.join("\n")
}

/// Write an opening tag, with a `style` attribute only when `css` is set
pub(crate) fn open_tag(out: &mut String, tag: &str, css: &str) {
    out.push('<');
    out.push_str(tag);
    if !css.is_empty() {
        out.push_str(" style=\"");
        out.push_str(&encode_double_quoted_attribute(css));
        out.push('"');
    }
    out.push('>');
}

fn emit_group(group: &Group, config: &Config, out: &mut String) {
    let style = &config.style;
    match group {
        Group::Heading { level, text } => {
            let (tag, css) = match level {
                1 => ("h1", &style.h1),
                2 => ("h2", &style.h2),
                _ => ("h3", &style.h3),
            };
            open_tag(out, tag, css);
            out.push_str(&render_inline(text, config));
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        Group::Rule => {
            open_tag(out, "hr", &style.rule);
        }
        Group::Table(table) => table_to_html(table, config, out),
        Group::List(list) => list_to_html(list, config, out),
        Group::Paragraph(lines) => paragraph_to_html(lines, config, out),
    }
}

fn paragraph_to_html(lines: &[String], config: &Config, out: &mut String) {
    let rendered: Vec<String> = lines
        .iter()
        .map(|line| render_inline(line, config))
        .filter(|line| !line.trim().is_empty())
        .collect();
    if rendered.is_empty() {
        return;
    }

    open_tag(out, "p", &config.style.paragraph);
    out.push_str(&rendered.join("<br>\n"));
    out.push_str("</p>");
}

fn list_to_html(list: &List, config: &Config, out: &mut String) {
    let style = &config.style;
    open_tag(out, "ul", &style.list);
    out.push('\n');

    for item in &list.items {
        match &item.text {
            Some(text) => {
                open_tag(out, "li", &style.list_item);
                out.push_str(&render_inline(text, config));
            }
            // Holder for a nested run that has no parent entry
            None => out.push_str("<li style=\"list-style:none\">"),
        }

        if !item.nested.is_empty() {
            out.push('\n');
            open_tag(out, "ul", &style.sublist);
            out.push('\n');
            for text in &item.nested {
                open_tag(out, "li", &style.sublist_item);
                out.push_str(&render_inline(text, config));
                out.push_str("</li>\n");
            }
            out.push_str("</ul>\n");
        }
        out.push_str("</li>\n");
    }

    out.push_str("</ul>");
}

fn table_to_html(table: &Table, config: &Config, out: &mut String) {
    let style = &config.style;
    let mut rows = table.rows.iter().filter(|row| !row.separator);
    let Some(header) = rows.next() else {
        return;
    };
    let body: Vec<&TableRow> = rows.collect();
    let columns = body
        .iter()
        .map(|row| row.cells.len())
        .fold(header.cells.len(), usize::max);

    open_tag(out, "table", &style.table);
    out.push('\n');

    out.push_str("<thead>\n<tr>");
    for index in 0..columns {
        open_tag(out, "th", &style.th);
        cell_to_html(header.cells.get(index), config, out);
        out.push_str("</th>");
    }
    out.push_str("</tr>\n</thead>\n");

    if !body.is_empty() {
        out.push_str("<tbody>\n");
        for (number, row) in body.iter().enumerate() {
            if number % 2 == 1 {
                open_tag(out, "tr", &style.row_alt);
            } else {
                out.push_str("<tr>");
            }
            for index in 0..columns {
                open_tag(out, "td", &style.td);
                cell_to_html(row.cells.get(index), config, out);
                out.push_str("</td>");
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</tbody>\n");
    }

    out.push_str("</table>");
}

fn cell_to_html(cell: Option<&String>, config: &Config, out: &mut String) {
    let Some(text) = cell else {
        return;
    };
    match severity_cell(text) {
        Some(severity) => severity_pill(severity, config, out),
        None => out.push_str(&render_inline(text, config)),
    }
}

/// A cell holding only a severity word, optionally in bold
fn severity_cell(text: &str) -> Option<Severity> {
    let word = text
        .strip_prefix("**")
        .and_then(|inner| inner.strip_suffix("**"))
        .unwrap_or(text);
    Severity::parse(word.trim())
}
