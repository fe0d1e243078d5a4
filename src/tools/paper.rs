//! Markdown paper reading tools: whole file, line ranges, pages, sections and search.

use super::markdown::{find_section, page_bounds, split_sections, total_pages};
use crate::error::{ToolError, ToolErrorKind, ToolResult};
use std::path::Path;

fn load(file_path: &str, action: &str) -> std::result::Result<String, ToolError> {
    if !Path::new(file_path).exists() {
        return Err(ToolError::not_found(format!(
            "Error: File '{}' does not exist",
            file_path
        )));
    }
    std::fs::read_to_string(file_path).map_err(|e| ToolError::io(action, e))
}

fn numbered(first_line: usize, lines: &[&str]) -> String {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:4} | {}\n", first_line + i, line))
        .collect()
}

pub fn read_markdown_file(file_path: &str) -> ToolResult {
    if !Path::new(file_path).exists() {
        return Err(ToolError::not_found(format!(
            "Error: File '{}' does not exist",
            file_path
        )));
    }
    if !file_path.to_lowercase().ends_with(".md") {
        return Err(ToolError::new(
            ToolErrorKind::NotMarkdown,
            format!("Warning: File '{}' is not a markdown file (.md)", file_path),
        ));
    }

    let content = load(file_path, "reading markdown file")?;
    Ok(format!(
        "=== File: {} ===\nTotal lines: {}\nFile size: {} characters\n\n{}",
        file_path,
        content.lines().count(),
        content.chars().count(),
        content
    ))
}

pub fn read_markdown_lines(file_path: &str, start_line: usize, end_line: Option<usize>) -> ToolResult {
    let content = load(file_path, "reading markdown lines")?;
    let lines: Vec<&str> = content.lines().collect();
    let total = lines.len();

    let start_idx = start_line.saturating_sub(1);
    let end_idx = end_line.map_or(total, |end| end.min(total));

    if start_idx >= total {
        return Err(ToolError::out_of_range(format!(
            "Error: Start line {} is beyond file length ({} lines)",
            start_line, total
        )));
    }
    if end_idx <= start_idx {
        return Err(ToolError::invalid(format!(
            "Error: End line {} is before start line {}",
            end_idx, start_line
        )));
    }

    Ok(format!(
        "=== Lines {}-{} from {} ===\nTotal file lines: {}\n\n{}",
        start_idx + 1,
        end_idx,
        file_path,
        total,
        numbered(start_idx + 1, &lines[start_idx..end_idx])
    ))
}

pub fn read_markdown_pages(file_path: &str, page_num: Option<usize>, lines_per_page: usize) -> ToolResult {
    if lines_per_page == 0 {
        return Err(ToolError::invalid("Error: lines_per_page must be at least 1"));
    }

    let content = load(file_path, "reading markdown pages")?;
    let lines: Vec<&str> = content.lines().collect();
    let total = lines.len();
    let pages = total_pages(total, lines_per_page);

    let Some(page) = page_num else {
        let mut result = format!(
            "=== File: {} ===\nTotal lines: {}\nLines per page: {}\nTotal pages: {}\n\n",
            file_path, total, lines_per_page, pages
        );
        for page in 1..=pages {
            if let Some((start, end)) = page_bounds(page, lines_per_page, total) {
                result.push_str(&format!("Page {}: Lines {}-{}\n", page, start, end));
            }
        }
        return Ok(result);
    };

    let (start, end) = page_bounds(page, lines_per_page, total).ok_or_else(|| {
        ToolError::out_of_range(format!(
            "Error: Page {} is out of range. File has {} pages.",
            page, pages
        ))
    })?;

    Ok(format!(
        "=== Page {}/{} from {} ===\nLines {}-{} of {}\n\n{}",
        page,
        pages,
        file_path,
        start,
        end,
        total,
        numbered(start, &lines[start - 1..end])
    ))
}

pub fn read_markdown_sections(file_path: &str, section_name: Option<&str>) -> ToolResult {
    let content = load(file_path, "reading markdown sections")?;
    let sections = split_sections(&content);

    match section_name {
        None => {
            let mut result = format!("=== Sections in {} ===\n\n", file_path);
            let mut named = 0;
            for section in &sections {
                if section.is_preamble() {
                    result.push_str(&format!("[Preamble] (Lines 1-{})\n", section.end_line));
                } else {
                    named += 1;
                    let indent = "  ".repeat(section.level - 1);
                    result.push_str(&format!(
                        "{}- {} (Line {})\n",
                        indent, section.name, section.line
                    ));
                }
            }
            if named == 0 {
                result.push_str("No headers found\n");
            }
            Ok(result)
        }
        Some(name) => {
            let section = find_section(&sections, name).ok_or_else(|| {
                ToolError::not_found(format!("Error: Section '{}' not found in file", name))
            })?;
            Ok(format!(
                "=== Section: {} ===\nLine: {}, Level: {}\n\n{}",
                section.name, section.line, section.level, section.content
            ))
        }
    }
}

pub fn search_markdown_content(file_path: &str, search_term: &str, context_lines: usize) -> ToolResult {
    if search_term.is_empty() {
        return Err(ToolError::invalid("Error: search_term must not be empty"));
    }

    let content = load(file_path, "searching markdown content")?;
    let lines: Vec<&str> = content.lines().collect();
    let needle = search_term.to_lowercase();

    let mut matches = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if !line.to_lowercase().contains(&needle) {
            continue;
        }
        let start = i.saturating_sub(context_lines);
        let end = i.saturating_add(context_lines).saturating_add(1).min(lines.len());

        let mut context = String::new();
        for (j, ctx_line) in lines[start..end].iter().enumerate() {
            let marker = if start + j == i { ">>> " } else { "    " };
            context.push_str(&format!("{}{:4} | {}\n", marker, start + j + 1, ctx_line));
        }
        matches.push((i + 1, context));
    }

    if matches.is_empty() {
        return Ok(format!(
            "No matches found for '{}' in {}",
            search_term, file_path
        ));
    }

    let mut result = format!(
        "=== Search Results for '{}' in {} ===\nFound {} match{}\n\n",
        search_term,
        file_path,
        matches.len(),
        if matches.len() == 1 { "" } else { "es" }
    );
    for (n, (line, context)) in matches.iter().enumerate() {
        result.push_str(&format!("Match {} (Line {}):\n{}\n", n + 1, line, context));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TEST_DOC: &str = "# Test Document

This is a test markdown file for testing the paper tools.

## Introduction

This is the introduction section with some important content.

## Methods

Here we describe the methods used in our research.

### Data Collection

We collected data from various sources.

### Analysis

The analysis was performed using statistical methods.

## Results

Our results show significant findings.

## Conclusion

This concludes our test document.
";

    fn fixture(name: &str, content: &str) -> (TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        (dir, path.to_string_lossy().into_owned())
    }

    fn numbered_doc(lines: usize) -> String {
        (1..=lines).map(|i| format!("line {}\n", i)).collect()
    }

    #[test]
    fn test_read_markdown_file() {
        let (_dir, path) = fixture("paper.md", "# T\nbody\n");
        let out = read_markdown_file(&path).unwrap();
        assert_eq!(
            out,
            format!("=== File: {} ===\nTotal lines: 2\nFile size: 9 characters\n\n# T\nbody\n", path)
        );

        let (_dir, txt) = fixture("notes.txt", "x");
        let err = read_markdown_file(&txt).unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::NotMarkdown);
    }

    #[test]
    fn test_missing_file() {
        let err = read_markdown_lines("/no/paper.md", 1, None).unwrap_err();
        assert_eq!(err.render(), "Error: File '/no/paper.md' does not exist");
    }

    #[test]
    fn test_read_lines() {
        let (_dir, path) = fixture("paper.md", TEST_DOC);
        let out = read_markdown_lines(&path, 5, Some(7)).unwrap();
        assert!(out.starts_with(&format!("=== Lines 5-7 from {} ===\nTotal file lines: 27\n\n", path)));
        assert!(out.contains("   5 | ## Introduction\n"));
        assert!(out.ends_with("   7 | This is the introduction section with some important content.\n"));

        // end_line is clamped to the file
        let out = read_markdown_lines(&path, 26, Some(500)).unwrap();
        assert!(out.contains("=== Lines 26-27 "));

        let err = read_markdown_lines(&path, 28, None).unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::OutOfRange);
        assert!(err.render().contains("beyond file length (27 lines)"));

        let err = read_markdown_lines(&path, 10, Some(3)).unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::InvalidArgument);
    }

    #[test]
    fn test_read_page() {
        let (_dir, path) = fixture("long.md", &numbered_doc(25));
        let out = read_markdown_pages(&path, Some(2), 10).unwrap();
        assert!(out.starts_with(&format!("=== Page 2/3 from {} ===\nLines 11-20 of 25\n\n", path)));
        assert!(out.contains("  11 | line 11\n"));
        assert!(out.ends_with("  20 | line 20\n"));
        assert!(!out.contains("line 21"));
    }

    #[test]
    fn test_page_layout_and_errors() {
        let (_dir, path) = fixture("long.md", &numbered_doc(25));
        let out = read_markdown_pages(&path, None, 10).unwrap();
        assert!(out.contains("Total pages: 3\n"));
        assert!(out.ends_with("Page 1: Lines 1-10\nPage 2: Lines 11-20\nPage 3: Lines 21-25\n"));

        let err = read_markdown_pages(&path, Some(4), 10).unwrap_err();
        assert_eq!(err.render(), "Error: Page 4 is out of range. File has 3 pages.");
        assert!(read_markdown_pages(&path, Some(1), 0).is_err());
    }

    #[test]
    fn test_pages_concatenate_to_document() {
        let (_dir, path) = fixture("long.md", &numbered_doc(23));
        let mut seen = Vec::new();
        for page in 1..=5 {
            let out = read_markdown_pages(&path, Some(page), 5).unwrap();
            seen.extend(
                out.lines()
                    .filter_map(|l| l.split_once(" | ").map(|(_, text)| text.to_string())),
            );
        }
        let expected: Vec<String> = (1..=23).map(|i| format!("line {}", i)).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_section_outline() {
        let (_dir, path) = fixture("paper.md", TEST_DOC);
        let out = read_markdown_sections(&path, None).unwrap();
        assert_eq!(
            out,
            format!(
                "=== Sections in {} ===\n\n- Test Document (Line 1)\n  - Introduction (Line 5)\n  - Methods (Line 9)\n    - Data Collection (Line 13)\n    - Analysis (Line 17)\n  - Results (Line 21)\n  - Conclusion (Line 25)\n",
                path
            )
        );
    }

    #[test]
    fn test_read_section() {
        let (_dir, path) = fixture("paper.md", TEST_DOC);
        let out = read_markdown_sections(&path, Some("methods")).unwrap();
        assert_eq!(
            out,
            "=== Section: Methods ===\nLine: 9, Level: 2\n\n## Methods\n\nHere we describe the methods used in our research.\n"
        );

        let err = read_markdown_sections(&path, Some("Appendix")).unwrap_err();
        assert_eq!(err.render(), "Error: Section 'Appendix' not found in file");
    }

    #[test]
    fn test_search() {
        let (_dir, path) = fixture("paper.md", TEST_DOC);
        let out = search_markdown_content(&path, "DATA", 1).unwrap();
        assert!(out.contains("Found 2 matches\n"));
        assert!(out.contains("Match 1 (Line 13):\n      12 | \n>>>   13 | ### Data Collection\n      14 | \n"));

        let out = search_markdown_content(&path, "conclusion", 0).unwrap();
        assert!(out.contains("Found 1 match\n"));
        assert!(out.contains(">>>   25 | ## Conclusion\n"));
    }

    #[test]
    fn test_search_with_huge_context() {
        let (_dir, path) = fixture("small.md", "# A\nneedle\nz\n");
        let out = search_markdown_content(&path, "needle", usize::MAX).unwrap();
        assert!(out.contains("       1 | # A\n>>>    2 | needle\n       3 | z\n"));
    }

    #[test]
    fn test_search_without_matches() {
        let (_dir, path) = fixture("paper.md", TEST_DOC);
        let out = search_markdown_content(&path, "quantum", 3).unwrap();
        assert_eq!(out, format!("No matches found for 'quantum' in {}", path));
    }
}
