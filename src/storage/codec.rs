//! Comma separated record format.
//!
//! ```text
//! application,title,time
//! firefox,Inbox,12
//! firefox,firefox total time,12
//! ```
//!
//! Fields containing a comma, a quote or a line break are quoted, with inner quotes doubled.

use std::num::ParseFloatError;

use thiserror::Error;

use crate::summary::{aggregate::recompute_total_time, total_time_key, Summary};

pub const HEADER: [&str; 3] = ["application", "title", "time"];

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to access record file: {0}")]
    Io(#[from] std::io::Error),
    #[error("row {row}: expected 3 fields, found {found}")]
    MalformedRow { row: usize, found: usize },
    #[error("row {row}: invalid time value {value:?}")]
    InvalidTime {
        row: usize,
        value: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("row {row}: quoted field is never closed")]
    UnterminatedQuote { row: usize },
}

/// Parses a record. Header rows are skipped, duplicate rows are summed and every total is
/// recomputed afterwards, so stale totals in the input never survive.
pub fn decode(input: &str) -> Result<Summary, RecordError> {
    let mut summary = Summary::new();

    for (row, fields) in parse_rows(input)? {
        if fields.iter().map(String::as_str).eq(HEADER) {
            continue;
        }
        let [app_name, title, time] = <[String; 3]>::try_from(fields).map_err(|fields| {
            RecordError::MalformedRow {
                row,
                found: fields.len(),
            }
        })?;
        let seconds = time
            .trim()
            .parse::<f64>()
            .map_err(|source| RecordError::InvalidTime {
                row,
                value: time.clone(),
                source,
            })?;
        summary.accumulate(&app_name, &title, seconds);
    }

    recompute_total_time(&mut summary);
    Ok(summary)
}

/// Serializes a record. An existing total-time entry is written as is. A missing one is
/// synthesized from the other entries of its application.
pub fn encode(summary: &Summary) -> String {
    let mut out = String::new();
    push_row(&mut out, HEADER);

    for (app_name, record) in summary.apps() {
        for (title, seconds) in record.iter() {
            push_row(&mut out, [app_name, title, &seconds.to_string()]);
        }
        let key = total_time_key(app_name);
        if record.get(&key).is_none() {
            push_row(&mut out, [app_name, &key, &record.sum().to_string()]);
        }
    }

    out
}

fn push_row(out: &mut String, fields: [&str; 3]) {
    for (index, field) in fields.into_iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(field));
    }
    out.push('\n');
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Splits input into rows of fields, tagging each row with its 1-based number. A trailing
/// line break does not start a new row.
fn parse_rows(input: &str) -> Result<Vec<(usize, Vec<String>)>, RecordError> {
    let mut rows = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    // A blank line has no fields at all, unlike a line holding one empty field.
    let mut row_has_content = false;
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                c => field.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                row_has_content = true;
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                row_has_content = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                if row_has_content || !field.is_empty() {
                    fields.push(std::mem::take(&mut field));
                }
                rows.push((rows.len() + 1, std::mem::take(&mut fields)));
                row_has_content = false;
            }
            c => {
                field.push(c);
                row_has_content = true;
            }
        }
    }

    if in_quotes {
        return Err(RecordError::UnterminatedQuote {
            row: rows.len() + 1,
        });
    }
    if row_has_content || !field.is_empty() {
        fields.push(field);
        rows.push((rows.len() + 1, fields));
    }

    Ok(rows)
}
