use crate::block::{Block, Group, List, ListItem, Table, TableRow};

/// Indentation (in columns) at which a list item becomes nested
const NESTED_INDENT: usize = 2;

/// Classify every line of the document, keeping 1-based line numbers
pub fn classify(markdown: &str) -> Vec<(usize, Block)> {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut blocks: Vec<Block> = lines.iter().map(|line| classify_line(line)).collect();
    join_single_cell_rows(&lines, &mut blocks);

    blocks
        .into_iter()
        .enumerate()
        .map(|(index, block)| (index + 1, block))
        .collect()
}

/// A `|cell|` line has no interior pipe. It is a row only when its run of
/// pipe-wrapped lines also holds a multi-cell row or a separator.
fn join_single_cell_rows(lines: &[&str], blocks: &mut [Block]) {
    let mut start = 0;
    while start < lines.len() {
        let run = lines[start..]
            .iter()
            .take_while(|line| is_pipe_wrapped(line))
            .count();
        if run == 0 {
            start += 1;
            continue;
        }
        let end = start + run;
        let rows: Vec<Option<Block>> = lines[start..end]
            .iter()
            .zip(&blocks[start..end])
            .map(|(line, block)| match block {
                Block::Paragraph(_) => single_cell_row(line),
                _ => None,
            })
            .collect();
        let is_table = blocks[start..end]
            .iter()
            .any(|block| matches!(block, Block::TableRow { .. }))
            || rows
                .iter()
                .flatten()
                .any(|row| matches!(row, Block::TableRow { separator: true, .. }));
        if is_table {
            for (block, row) in blocks[start..end].iter_mut().zip(rows) {
                if let Some(row) = row {
                    *block = row;
                }
            }
        }
        start = end;
    }
}

fn is_pipe_wrapped(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 2 && trimmed.starts_with('|') && trimmed.ends_with('|')
}

fn classify_line(line: &str) -> Block {
    let line = line.trim_end();
    if let Some(block) = heading(line) {
        return block;
    }

    let trimmed = line.trim_start();
    if is_rule(trimmed) {
        return Block::Rule;
    }
    if let Some(block) = table_row(trimmed) {
        return block;
    }
    if let Some(block) = list_item(line) {
        return block;
    }
    if trimmed.is_empty() {
        return Block::Blank;
    }
    Block::Paragraph(trimmed.to_string())
}

fn heading(line: &str) -> Option<Block> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    let text = rest
        .strip_prefix(' ')
        .or_else(|| rest.strip_prefix('\t'))?
        .trim();
    if text.is_empty() {
        return None;
    }
    // Only three visual tiers exist
    let level = if hashes > 3 { 3 } else { hashes as u8 };
    Some(Block::Heading {
        level,
        text: text.to_string(),
    })
}

fn is_rule(trimmed: &str) -> bool {
    trimmed.len() >= 3 && trimmed.bytes().all(|b| b == b'-')
}

fn table_row(trimmed: &str) -> Option<Block> {
    let inner = trimmed.strip_prefix('|')?.strip_suffix('|')?;
    if !inner.contains('|') {
        return None;
    }
    let cells: Vec<String> = inner.split('|').map(|c| c.trim().to_string()).collect();
    let separator = cells.iter().all(|cell| is_separator_cell(cell));
    Some(Block::TableRow { cells, separator })
}

fn single_cell_row(line: &str) -> Option<Block> {
    let cell = line.trim().strip_prefix('|')?.strip_suffix('|')?;
    if cell.contains('|') {
        return None;
    }
    let cell = cell.trim();
    Some(Block::TableRow {
        cells: vec![cell.to_string()],
        separator: is_separator_cell(cell),
    })
}

fn is_separator_cell(cell: &str) -> bool {
    cell.contains('-') && cell.bytes().all(|b| b == b'-' || b == b':')
}

fn list_item(line: &str) -> Option<Block> {
    let rest = line.trim_start();
    let text = if rest == "-" {
        ""
    } else {
        rest.strip_prefix("- ")?.trim()
    };
    let indent: usize = line[..line.len() - rest.len()]
        .chars()
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum();
    let depth = if indent >= NESTED_INDENT { 1 } else { 0 };
    Some(Block::ListItem {
        depth,
        text: text.to_string(),
    })
}

/// Merge runs of classified lines into render units
pub fn group(blocks: Vec<(usize, Block)>) -> Vec<Group> {
    let mut groups = Vec::new();
    let mut state = GroupState::default();

    for (line, block) in blocks {
        tracing::trace!(line, ?block, "grouping line");
        process_block(block, &mut state, &mut groups);
    }
    state.flush(&mut groups);

    groups
}

#[derive(Default)]
struct GroupState {
    table_rows: Vec<TableRow>,
    list_items: Vec<ListItem>,
    paragraph_lines: Vec<String>,
}

impl GroupState {
    fn flush_table(&mut self, groups: &mut Vec<Group>) {
        if !self.table_rows.is_empty() {
            let rows = std::mem::take(&mut self.table_rows);
            groups.push(Group::Table(Table { rows }));
        }
    }

    fn flush_list(&mut self, groups: &mut Vec<Group>) {
        if !self.list_items.is_empty() {
            let items = std::mem::take(&mut self.list_items);
            groups.push(Group::List(List { items }));
        }
    }

    fn flush_paragraph(&mut self, groups: &mut Vec<Group>) {
        if !self.paragraph_lines.is_empty() {
            groups.push(Group::Paragraph(std::mem::take(&mut self.paragraph_lines)));
        }
    }

    fn flush(&mut self, groups: &mut Vec<Group>) {
        self.flush_table(groups);
        self.flush_list(groups);
        self.flush_paragraph(groups);
    }
}

fn process_block(block: Block, state: &mut GroupState, groups: &mut Vec<Group>) {
    match block {
        Block::Heading { level, text } => {
            state.flush(groups);
            groups.push(Group::Heading { level, text });
        }
        Block::Rule => {
            state.flush(groups);
            groups.push(Group::Rule);
        }
        Block::TableRow { cells, separator } => {
            state.flush_list(groups);
            state.flush_paragraph(groups);
            state.table_rows.push(TableRow { cells, separator });
        }
        Block::ListItem { depth, text } => {
            state.flush_table(groups);
            state.flush_paragraph(groups);
            if depth == 0 {
                state.list_items.push(ListItem {
                    text: Some(text),
                    nested: Vec::new(),
                });
            } else if let Some(parent) = state.list_items.last_mut() {
                parent.nested.push(text);
            } else {
                // Nested run without a parent: keep it as its own entry
                state.list_items.push(ListItem {
                    text: None,
                    nested: vec![text],
                });
            }
        }
        Block::Paragraph(text) => {
            state.flush_table(groups);
            state.flush_list(groups);
            state.paragraph_lines.push(text);
        }
        Block::Blank => {
            state.flush(groups);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn only(line: &str) -> Block {
        let mut blocks = classify(line);
        assert_eq!(blocks.len(), 1);
        blocks.remove(0).1
    }

    fn heading(level: u8, text: &str) -> Block {
        Block::Heading {
            level,
            text: text.to_string(),
        }
    }

    #[rstest]
    #[case("# Title", heading(1, "Title"))]
    #[case("## Top Headlines", heading(2, "Top Headlines"))]
    #[case("### Detail", heading(3, "Detail"))]
    #[case("##### Deep", heading(3, "Deep"))]
    #[case("#hashtag", Block::Paragraph("#hashtag".to_string()))]
    #[case("# ", Block::Paragraph("#".to_string()))]
    #[case("---", Block::Rule)]
    #[case("-----  ", Block::Rule)]
    #[case("--", Block::Paragraph("--".to_string()))]
    #[case("   \t", Block::Blank)]
    #[case("plain text", Block::Paragraph("plain text".to_string()))]
    fn classifies_line(#[case] line: &str, #[case] expected: Block) {
        assert_eq!(only(line), expected);
    }

    #[test]
    fn heading_marker_without_text_is_not_a_heading() {
        assert_eq!(only("##"), Block::Paragraph("##".to_string()));
    }

    #[rstest]
    #[case("- Top item", 0, "Top item")]
    #[case("  - Sub item", 1, "Sub item")]
    #[case(" - One space", 0, "One space")]
    #[case("\t- Tabbed", 1, "Tabbed")]
    #[case("-", 0, "")]
    fn classifies_list_items(#[case] line: &str, #[case] depth: u8, #[case] text: &str) {
        assert_eq!(
            only(line),
            Block::ListItem {
                depth,
                text: text.to_string()
            }
        );
    }

    #[test]
    fn dash_without_space_is_paragraph() {
        assert_eq!(only("-dash"), Block::Paragraph("-dash".to_string()));
    }

    #[test]
    fn table_rows_and_separators() {
        assert_eq!(
            only("| Name | Level |"),
            Block::TableRow {
                cells: vec!["Name".to_string(), "Level".to_string()],
                separator: false,
            }
        );
        assert_eq!(
            only("|:-----|------:|"),
            Block::TableRow {
                cells: vec![":-----".to_string(), "------:".to_string()],
                separator: true,
            }
        );
    }

    #[test]
    fn pipe_line_needs_interior_pipe() {
        assert_eq!(only("|alone|"), Block::Paragraph("|alone|".to_string()));
        assert_eq!(only("| a | b"), Block::Paragraph("| a | b".to_string()));
    }

    #[test]
    fn single_cell_row_joins_table_run() {
        let md = "| a | b | c |\n|---|---|---|\n| 1 |\n| 2 | 3 |";
        let groups = group(classify(md));
        let [Group::Table(table)] = groups.as_slice() else {
            panic!("expected one table, got {groups:?}");
        };
        let cells: Vec<Vec<String>> = table.rows.iter().map(|r| r.cells.clone()).collect();
        assert_eq!(
            cells,
            vec![
                vec!["a".to_string(), "b".to_string(), "c".to_string()],
                vec!["---".to_string(), "---".to_string(), "---".to_string()],
                vec!["1".to_string()],
                vec!["2".to_string(), "3".to_string()],
            ]
        );
    }

    #[test]
    fn single_cell_row_before_table_joins_it() {
        let blocks: Vec<Block> = classify("| Name |\n| Eaton | High |")
            .into_iter()
            .map(|(_, block)| block)
            .collect();
        assert_eq!(
            blocks[0],
            Block::TableRow {
                cells: vec!["Name".to_string()],
                separator: false,
            }
        );
    }

    #[test]
    fn single_column_table_with_separator() {
        let groups = group(classify("| Move |\n|:---:|\n| Acquired |"));
        let [Group::Table(table)] = groups.as_slice() else {
            panic!("expected one table, got {groups:?}");
        };
        let separators: Vec<bool> = table.rows.iter().map(|r| r.separator).collect();
        assert_eq!(separators, vec![false, true, false]);
    }

    #[test]
    fn standalone_single_cell_stays_paragraph() {
        assert_eq!(
            group(classify("|alone|\n\n| a | b |\n\n|also alone|")),
            vec![
                Group::Paragraph(vec!["|alone|".to_string()]),
                Group::Table(Table {
                    rows: vec![TableRow {
                        cells: vec!["a".to_string(), "b".to_string()],
                        separator: false,
                    }],
                }),
                Group::Paragraph(vec!["|also alone|".to_string()]),
            ]
        );
    }

    #[test]
    fn line_numbers_are_one_based() {
        let blocks = classify("# A\n\ntext");
        let lines: Vec<usize> = blocks.iter().map(|(line, _)| *line).collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }

    #[test]
    fn classification_is_deterministic() {
        let md = "# T\n- a\n  - b\n| x | y |\n|---|---|\n\npara *x*\n---";
        assert_eq!(classify(md), classify(md));
    }

    #[test]
    fn empty_document_has_no_blocks() {
        assert!(classify("").is_empty());
        assert!(group(classify("")).is_empty());
    }

    #[test]
    fn groups_nested_list() {
        let md = "- Top item\n  - Sub item A\n  - Sub item B\n- Second top item";
        assert_eq!(
            group(classify(md)),
            vec![Group::List(List {
                items: vec![
                    ListItem {
                        text: Some("Top item".to_string()),
                        nested: vec!["Sub item A".to_string(), "Sub item B".to_string()],
                    },
                    ListItem {
                        text: Some("Second top item".to_string()),
                        nested: Vec::new(),
                    },
                ],
            })]
        );
    }

    #[test]
    fn orphan_nested_items_are_kept() {
        let md = "  - Orphan\n- Parent";
        assert_eq!(
            group(classify(md)),
            vec![Group::List(List {
                items: vec![
                    ListItem {
                        text: None,
                        nested: vec!["Orphan".to_string()],
                    },
                    ListItem {
                        text: Some("Parent".to_string()),
                        nested: Vec::new(),
                    },
                ],
            })]
        );
    }

    #[test]
    fn blank_lines_split_paragraphs() {
        let md = "one\ntwo\n\n\nthree";
        assert_eq!(
            group(classify(md)),
            vec![
                Group::Paragraph(vec!["one".to_string(), "two".to_string()]),
                Group::Paragraph(vec!["three".to_string()]),
            ]
        );
    }

    #[test]
    fn kinds_do_not_merge() {
        let md = "intro\n| a | b |\n- item\nafter";
        let groups = group(classify(md));
        assert_eq!(groups.len(), 4);
        assert!(matches!(groups[0], Group::Paragraph(_)));
        assert!(matches!(groups[1], Group::Table(_)));
        assert!(matches!(groups[2], Group::List(_)));
        assert!(matches!(groups[3], Group::Paragraph(_)));
    }

    #[test]
    fn table_run_keeps_separator_rows() {
        let md = "| Name | Level |\n|------|-------|\n| Eaton | High |";
        let groups = group(classify(md));
        let [Group::Table(table)] = groups.as_slice() else {
            panic!("expected one table, got {groups:?}");
        };
        let separators: Vec<bool> = table.rows.iter().map(|r| r.separator).collect();
        assert_eq!(separators, vec![false, true, false]);
    }
}
