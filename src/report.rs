//! Order TODOs by age and print them.

use std::time::Duration;

use termcolor::WriteColor;

use crate::{
    console_emitter::{ColoredWriter, Style},
    todo::TodoRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending by age: the most recently written TODO comes first.
    NewestFirst,
    /// Descending by age: the longest-standing TODO comes first.
    OldestFirst,
}

/// Stable, so TODOs of equal age keep their scan order.
pub fn sort_by_age(records: &mut [TodoRecord], order: SortOrder) {
    match order {
        SortOrder::NewestFirst => records.sort_by(|a, b| a.age.cmp(&b.age)),
        SortOrder::OldestFirst => records.sort_by(|a, b| b.age.cmp(&a.age)),
    }
}

const UNITS: [(&str, u64); 5] = [
    ("week", 7 * 24 * 60 * 60),
    ("day", 24 * 60 * 60),
    ("hour", 60 * 60),
    ("minute", 60),
    ("second", 1),
];

/// Formats an age as e.g. `2 weeks, 3 days ago`, leaving out units that are
/// zero. Anything under a second is `0 seconds ago`.
pub fn humanize(age: Duration) -> String {
    let mut remaining = age.as_secs();
    let mut parts = Vec::new();

    for &(unit, seconds) in UNITS.iter() {
        let count = remaining / seconds;
        remaining %= seconds;
        if count > 0 {
            parts.push(plural(count, unit));
        }
    }

    if parts.is_empty() {
        parts.push(plural(0, "second"));
    }

    format!("{} ago", parts.join(", "))
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Writes each record as
///
/// ```text
/// path/to/file.rs:12: <author> 3 days, 5 minutes ago
///     // TODO: the original line
///
/// ```
pub fn render<W: WriteColor>(
    records: &[TodoRecord],
    out: &mut ColoredWriter<W>,
) -> std::io::Result<()> {
    for todo in records {
        out.write(
            format!("{}:{}", todo.file_path.display(), todo.line_number),
            Style::Location,
        )?;
        out.write(": <", Style::Normal)?;
        out.write(&todo.author, Style::Author)?;
        out.write("> ", Style::Normal)?;
        out.write(humanize(todo.age), Style::Age)?;
        out.write("\n", Style::Normal)?;
        out.write(format!("{}\n\n", todo.text), Style::Normal)?;
    }

    Ok(())
}
