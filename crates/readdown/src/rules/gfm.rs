//! GitHub Flavored Markdown rules: tables, strikethrough, task lists and
//! highlights.
//!
//! Table rows and cells are rendered bottom-up like everything else, so the
//! cell and row rules emit their text behind separator characters that the
//! table rule later splits on to lay out the grid. Escaping strips control
//! characters from document text, so the separators never collide with content.

use readdown_dom::{Node, NodeRef};

use super::commonmark::{inline_code, wrap_delimited};
use super::{Filter, Rule};
use crate::context::RenderContext;
use crate::utilities::{collapse_whitespace, flanking_space, split_flanking};

const ROW_SEPARATOR: char = '\u{1e}';
const CELL_SEPARATOR: char = '\u{1f}';
const CAPTION_SEPARATOR: char = '\u{1d}';

/// Create all GFM rules
pub fn gfm_rules() -> Vec<Rule> {
    vec![
        strikethrough_rule(),
        task_list_item_rule(),
        table_rule(),
        table_section_rule(),
        table_row_rule(),
        table_cell_rule(),
        table_caption_rule(),
        highlight_rule(),
    ]
}

fn strikethrough_rule() -> Rule {
    Rule::for_tags(&["del", "s", "strike"], |_, content, _| {
        wrap_delimited(content, "~~")
    })
}

fn task_list_item_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| {
            tag == "input"
                && node
                    .attr("type")
                    .is_some_and(|t| t.eq_ignore_ascii_case("checkbox"))
                && node.parent().is_some_and(|p| p.is("li"))
        }),
        |node, _, _| {
            let mark = if node.has_attr("checked") { "[x]" } else { "[ ]" };
            let spaced = node.next_sibling().is_some_and(|next| {
                next.is_text()
                    && next
                        .node
                        .node_value
                        .as_deref()
                        .is_some_and(|t| t.starts_with(|c: char| c.is_ascii_whitespace()))
            });
            if spaced {
                mark.to_string()
            } else {
                format!("{} ", mark)
            }
        },
    )
}

fn in_table(node: &NodeRef<'_>) -> bool {
    node.ancestors().any(|a| a.is("table"))
}

fn table_section_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| {
            matches!(tag, "thead" | "tbody" | "tfoot") && in_table(node)
        }),
        |_, content, _| content.to_string(),
    )
}

fn table_row_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| tag == "tr" && in_table(node)),
        |node, content, _| {
            let kind = if node.parent().is_some_and(|p| p.is("thead")) {
                'h'
            } else {
                'd'
            };
            format!("{}{}{}", ROW_SEPARATOR, kind, content)
        },
    )
}

fn table_cell_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| matches!(tag, "th" | "td") && in_table(node)),
        |node, content, ctx| {
            format!(
                "{}{}{}",
                CELL_SEPARATOR,
                Alignment::of(node.node).code(),
                cell_text(content, ctx)
            )
        },
    )
}

fn table_caption_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| tag == "caption" && in_table(node)),
        |_, content, _| {
            format!(
                "{}{}{}",
                CAPTION_SEPARATOR,
                strip_separators(content.trim()),
                CAPTION_SEPARATOR
            )
        },
    )
}

/// Cell content on one line: breaks become the configured marker
fn cell_text(content: &str, ctx: &RenderContext<'_>) -> String {
    strip_separators(content)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.replace('|', "\\|"))
        .collect::<Vec<_>>()
        .join(&ctx.options.table_cell_break)
}

fn strip_separators(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(*c, ROW_SEPARATOR | CELL_SEPARATOR | CAPTION_SEPARATOR))
        .collect()
}

fn highlight_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, _, ctx| tag == "mark" && !ctx.in_pre),
        |node, _, _| {
            let text = collapse_whitespace(&node.text_content());
            let (lead, body, trail) = split_flanking(&text);
            if body.is_empty() {
                return flanking_space(lead).to_string();
            }
            format!("{}{}{}", flanking_space(lead), inline_code(body), flanking_space(trail))
        },
    )
}

/// Column alignment from `align` or an inline `text-align` style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alignment {
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    fn of(node: &Node) -> Self {
        let value = node.attr("align").map(str::to_ascii_lowercase).or_else(|| {
            node.attr("style")?.split(';').find_map(|declaration| {
                let (property, value) = declaration.split_once(':')?;
                property
                    .trim()
                    .eq_ignore_ascii_case("text-align")
                    .then(|| value.trim().to_ascii_lowercase())
            })
        });
        match value.as_deref() {
            Some("left") => Alignment::Left,
            Some("center") => Alignment::Center,
            Some("right") => Alignment::Right,
            _ => Alignment::None,
        }
    }

    fn code(self) -> char {
        match self {
            Alignment::None => 'n',
            Alignment::Left => 'l',
            Alignment::Center => 'c',
            Alignment::Right => 'r',
        }
    }

    fn from_code(code: Option<char>) -> Self {
        match code {
            Some('l') => Alignment::Left,
            Some('c') => Alignment::Center,
            Some('r') => Alignment::Right,
            _ => Alignment::None,
        }
    }

    fn separator(self, width: usize) -> String {
        match self {
            Alignment::None => "-".repeat(width),
            Alignment::Left => format!(":{}", "-".repeat(width - 1)),
            Alignment::Right => format!("{}:", "-".repeat(width - 1)),
            Alignment::Center => format!(":{}:", "-".repeat(width - 2)),
        }
    }

    fn pad(self, text: &str, width: usize) -> String {
        let fill = width.saturating_sub(text.chars().count());
        match self {
            Alignment::Right => format!("{}{}", " ".repeat(fill), text),
            Alignment::Center => {
                let left = fill / 2;
                format!("{}{}{}", " ".repeat(left), text, " ".repeat(fill - left))
            }
            Alignment::None | Alignment::Left => format!("{}{}", text, " ".repeat(fill)),
        }
    }
}

struct TableRow {
    in_head: bool,
    cells: Vec<(Alignment, String)>,
}

fn table_rule() -> Rule {
    Rule::for_tag("table", |_, content, _| render_table(content))
}

fn render_table(content: &str) -> String {
    // Captions sit between paired separators; everything else is row data
    let mut prelude: Vec<String> = Vec::new();
    let mut body = String::new();
    for (i, part) in content.split(CAPTION_SEPARATOR).enumerate() {
        if i % 2 == 1 {
            prelude.push(part.trim().to_string());
        } else {
            body.push_str(part);
        }
    }

    let mut segments = body.split(ROW_SEPARATOR);
    // Stray text outside any row is kept ahead of the table
    if let Some(leading) = segments.next() {
        prelude.push(strip_separators(leading).trim().to_string());
    }
    prelude.retain(|p| !p.is_empty());

    let mut rows: Vec<TableRow> = segments
        .map(|segment| {
            let mut chars = segment.chars();
            let in_head = chars.next() == Some('h');
            let cells = chars
                .as_str()
                .split(CELL_SEPARATOR)
                .skip(1)
                .map(|cell| {
                    let mut cell_chars = cell.chars();
                    let alignment = Alignment::from_code(cell_chars.next());
                    (alignment, cell_chars.as_str().trim().to_string())
                })
                .collect();
            TableRow { in_head, cells }
        })
        .filter(|row: &TableRow| !row.cells.is_empty())
        .collect();

    let prelude = prelude.join("\n\n");
    if rows.is_empty() {
        return if prelude.is_empty() {
            String::new()
        } else {
            format!("\n\n{}\n\n", prelude)
        };
    }

    // The thead row is the header; without one the first row is
    if let Some(head) = rows.iter().position(|row| row.in_head) {
        let row = rows.remove(head);
        rows.insert(0, row);
    }

    let columns = rows.iter().map(|row| row.cells.len()).max().unwrap_or(0);
    let mut widths = vec![3usize; columns];
    let mut alignments = vec![Alignment::None; columns];
    for row in &rows {
        for (i, (alignment, text)) in row.cells.iter().enumerate() {
            widths[i] = widths[i].max(text.chars().count());
            if alignments[i] == Alignment::None {
                alignments[i] = *alignment;
            }
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    for (index, row) in rows.iter().enumerate() {
        lines.push(render_row(row, &widths, &alignments));
        if index == 0 {
            let separators: Vec<String> = widths
                .iter()
                .zip(&alignments)
                .map(|(width, alignment)| alignment.separator(*width))
                .collect();
            lines.push(format!("| {} |", separators.join(" | ")));
        }
    }

    if prelude.is_empty() {
        format!("\n\n{}\n\n", lines.join("\n"))
    } else {
        format!("\n\n{}\n\n{}\n\n", prelude, lines.join("\n"))
    }
}

fn render_row(row: &TableRow, widths: &[usize], alignments: &[Alignment]) -> String {
    let cells: Vec<String> = widths
        .iter()
        .zip(alignments)
        .enumerate()
        .map(|(i, (width, alignment))| {
            let text = row.cells.get(i).map(|(_, text)| text.as_str()).unwrap_or("");
            alignment.pad(text, *width)
        })
        .collect();
    format!("| {} |", cells.join(" | "))
}
