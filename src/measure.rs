use unicode_width::UnicodeWidthStr;

/// Terminal/monospace display width; wide characters count as 2.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Left-aligned pad to the given display width. Wider text is returned as is.
pub fn pad_right(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(text));
    let mut out = String::with_capacity(text.len() + fill);
    out.push_str(text);
    out.extend(std::iter::repeat_n(' ', fill));
    out
}

/// Widest cell per column across all rows.
pub fn column_widths(rows: &[Vec<String>]) -> Vec<usize> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    (0..columns)
        .map(|i| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| display_width(cell))
                .max()
                .unwrap_or(0)
        })
        .collect()
}
