pub fn underline(line: &str, column: usize) -> String {
    let mut marker = String::new();
    for _ in 1..column {
        marker.push(' ');
    }
    marker.push('^');
    format!("{}\n{}", line, marker)
}

pub fn format_parse_error(
    source_label: &str,
    source: &str,
    err: &crate::parser::ParseError,
) -> String {
    let line = source
        .lines()
        .nth(err.line.saturating_sub(1))
        .unwrap_or_default();
    format!(
        "{}\n--> {}:{}:{}\n{}",
        err,
        source_label,
        err.line,
        err.column,
        underline(line, err.column),
    )
}
