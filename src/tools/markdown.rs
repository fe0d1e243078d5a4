//! Markdown outline and pagination helpers used by the paper tools.

use regex::Regex;
use std::sync::OnceLock;

fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("valid header regex"))
}

/// A header-delimited span of a markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Header text, empty for the preamble.
    pub name: String,
    /// Header level (1-6), 0 for the preamble.
    pub level: usize,
    /// 1-based line of the header (first line for the preamble).
    pub line: usize,
    /// 1-based inclusive last line of the section.
    pub end_line: usize,
    /// Section text including its header line.
    pub content: String,
}

impl Section {
    pub fn is_preamble(&self) -> bool {
        self.level == 0
    }
}

/// Split a document into sections in document order.
///
/// A section runs from its header to the line before the next header of any
/// level. Text before the first header becomes a preamble section when it
/// contains anything other than whitespace.
pub fn split_sections(text: &str) -> Vec<Section> {
    let lines: Vec<&str> = text.lines().collect();
    let mut sections = Vec::new();

    let mut starts: Vec<(usize, usize, String)> = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if let Some(caps) = header_regex().captures(line) {
            let level = caps[1].len();
            let name = caps[2].trim().to_string();
            starts.push((idx, level, name));
        }
    }

    let first_header = starts.first().map(|(idx, _, _)| *idx).unwrap_or(lines.len());
    if lines[..first_header].iter().any(|l| !l.trim().is_empty()) {
        sections.push(Section {
            name: String::new(),
            level: 0,
            line: 1,
            end_line: first_header,
            content: lines[..first_header].join("\n"),
        });
    }

    for (i, (idx, level, name)) in starts.iter().enumerate() {
        let end = starts.get(i + 1).map(|(next, _, _)| *next).unwrap_or(lines.len());
        sections.push(Section {
            name: name.clone(),
            level: *level,
            line: idx + 1,
            end_line: end,
            content: lines[*idx..end].join("\n"),
        });
    }

    sections
}

/// First named section whose name contains `query`, ignoring case.
pub fn find_section<'a>(sections: &'a [Section], query: &str) -> Option<&'a Section> {
    let query = query.to_lowercase();
    sections
        .iter()
        .filter(|s| !s.is_preamble())
        .find(|s| s.name.to_lowercase().contains(&query))
}

/// Number of pages needed for `total_lines` at `page_size` lines per page.
pub fn total_pages(total_lines: usize, page_size: usize) -> usize {
    total_lines.div_ceil(page_size.max(1))
}

/// 1-based inclusive line range of `page`, or `None` when out of range.
pub fn page_bounds(page: usize, page_size: usize, total_lines: usize) -> Option<(usize, usize)> {
    let page_size = page_size.max(1);
    if page == 0 || page > total_pages(total_lines, page_size) {
        return None;
    }
    let start = (page - 1) * page_size + 1;
    let end = (page * page_size).min(total_lines);
    Some((start, end))
}
