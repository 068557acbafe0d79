use std::path::Path;

use chrono::NaiveDate;
use tracing::warn;

use crate::error::{GanttError, Result};
use crate::model::task::Task;

/// Map a progress cell to a percentage. Accepts `45`, `45%`, `0.45` and a
/// few status words.
///
/// A bare number is a fraction only when it has a decimal point and lies in
/// `0..=1`, so `1` is 1% while `1.0` is 100%.
fn parse_progress(s: &str) -> Option<u8> {
    let s = s.trim();
    match s.to_lowercase().as_str() {
        "" | "not started" | "not-started" | "new" => return Some(0),
        "in progress" | "in-progress" | "active" | "started" => return Some(50),
        "finished" | "done" | "complete" | "completed" => return Some(100),
        _ => {}
    }
    let number = s.trim_end_matches('%').trim();
    if let Ok(value) = number.parse::<u32>() {
        return Some(value.min(100) as u8);
    }
    match number.parse::<f64>() {
        Ok(value)
            if (0.0..=1.0).contains(&value) && number.contains('.') && !s.ends_with('%') =>
        {
            Some((value * 100.0).round() as u8)
        }
        Ok(value) if value.is_finite() && value >= 0.0 => Some(value.round().min(100.0) as u8),
        _ => None,
    }
}

/// Try parsing a date string with several common formats.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Tabs are nesting, so only `;` and `,` are considered.
fn detect_delimiter(first_line: &str) -> u8 {
    if first_line.matches(';').count() > first_line.matches(',').count() {
        b';'
    } else {
        b','
    }
}

fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_'], "")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Name,
    Start,
    End,
    Progress,
}

fn header_to_col(normalized: &str) -> Option<Column> {
    match normalized {
        "name" | "task" | "taskname" | "tasklabel" | "label" | "title" | "activity" => {
            Some(Column::Name)
        }
        "start" | "startdate" | "from" | "begin" | "begindate" => Some(Column::Start),
        "end" | "enddate" | "to" | "finish" | "finishdate" | "due" | "duedate" => {
            Some(Column::End)
        }
        "progress" | "complete" | "percentcomplete" | "status" => Some(Column::Progress),
        _ => None,
    }
}

/// Split a raw name cell into its nesting depth and the trimmed name.
fn split_indent(raw: &str) -> (usize, &str) {
    let depth = raw.chars().take_while(|c| *c == '\t').count();
    (depth, raw.trim())
}

/// Rebuilds a forest from `(depth, task)` pairs arriving in pre-order.
#[derive(Default)]
struct TreeBuilder {
    roots: Vec<Task>,
    open: Vec<Task>,
}

impl TreeBuilder {
    fn close_to(&mut self, depth: usize) {
        while self.open.len() > depth {
            let Some(done) = self.open.pop() else { break };
            match self.open.last_mut() {
                Some(parent) => parent.children.push(done),
                None => self.roots.push(done),
            }
        }
    }

    /// A depth deeper than `open.len()` attaches to the deepest open task.
    fn push(&mut self, depth: usize, mut task: Task) {
        self.close_to(depth.min(self.open.len()));
        task.parent_id = self.open.last().map(|parent| parent.id.clone());
        self.open.push(task);
    }

    fn finish(mut self) -> Vec<Task> {
        self.close_to(0);
        self.roots
    }
}

/// Parse CSV text in the export layout back into a task tree.
///
/// Matches column headers flexibly ("Task Name", "Start", "Due Date", ...),
/// auto-detects `,` or `;` and reads nesting from leading tabs in the name.
/// Rows without a name or with an unreadable date are skipped.
/// Returns `(tasks, skipped_count)`.
pub fn parse_csv(content: &str) -> Result<(Vec<Task>, usize)> {
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let col_map: Vec<Option<Column>> = headers
        .iter()
        .map(|h| header_to_col(&normalize_header(h)))
        .collect();

    let has = |col: Column| col_map.contains(&Some(col));
    if !has(Column::Name) || !has(Column::Start) || !has(Column::End) {
        return Err(GanttError::MissingColumns {
            found: headers.iter().map(str::to_string).collect(),
        });
    }

    let mut builder = TreeBuilder::default();
    let mut imported = 0usize;
    let mut skipped = 0usize;

    for (i, result) in reader.records().enumerate() {
        let line = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(line, error = %e, "skipping unreadable CSV row");
                skipped += 1;
                continue;
            }
        };

        let mut name_val = None;
        let mut start_val = None;
        let mut end_val = None;
        let mut progress_val = None;
        for (field, col) in record.iter().zip(&col_map) {
            match col {
                Some(Column::Name) => name_val = Some(field),
                Some(Column::Start) => start_val = Some(field),
                Some(Column::End) => end_val = Some(field),
                Some(Column::Progress) => progress_val = Some(field),
                None => {}
            }
        }

        let (depth, name) = split_indent(name_val.unwrap_or(""));
        if name.is_empty() {
            warn!(line, "skipping CSV row without a task name");
            skipped += 1;
            continue;
        }

        let Some(start) = start_val.and_then(parse_date) else {
            warn!(line, value = start_val.unwrap_or(""), "skipping row, invalid start date");
            skipped += 1;
            continue;
        };
        let Some(end) = end_val.and_then(parse_date) else {
            warn!(line, value = end_val.unwrap_or(""), "skipping row, invalid end date");
            skipped += 1;
            continue;
        };

        let progress = match progress_val.map(parse_progress) {
            None => 0,
            Some(Some(p)) => p,
            Some(None) => {
                warn!(line, value = progress_val.unwrap_or(""), "unreadable progress, using 0");
                0
            }
        };

        builder.push(depth, Task::new(name, start, end).with_progress(progress));
        imported += 1;
    }

    if imported == 0 && skipped > 0 {
        return Err(GanttError::EmptyImport { skipped });
    }

    Ok((builder.finish(), skipped))
}

/// Import a task tree from a CSV file. Returns `(tasks, skipped_count)`.
pub fn import_csv(path: &Path) -> Result<(Vec<Task>, usize)> {
    let content = std::fs::read_to_string(path)?;
    let (tasks, skipped) = parse_csv(&content)?;
    tracing::info!(path = %path.display(), roots = tasks.len(), skipped, "imported CSV");
    Ok((tasks, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::csv_export::export_csv_string;
    use crate::model::tree;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn shape(tasks: &[Task]) -> Vec<(usize, String, NaiveDate, NaiveDate, u8)> {
        tree::visible_rows(tasks)
            .map(|r| (r.depth, r.task.name.clone(), r.task.start, r.task.end, r.task.progress))
            .collect()
    }

    #[test]
    fn test_reads_back_exported_tree() {
        let source = vec![
            Task::new("Alpha", date(2025, 1, 6), date(2025, 3, 28))
                .with_progress(40)
                .with_children(vec![
                    Task::new("Design, v1", date(2025, 1, 6), date(2025, 1, 17))
                        .with_progress(100)
                        .with_children(vec![Task::new(
                            "Sketches",
                            date(2025, 1, 6),
                            date(2025, 1, 8),
                        )]),
                    Task::new("Build", date(2025, 1, 20), date(2025, 3, 28)),
                ]),
            Task::new_milestone("Launch", date(2025, 4, 1)),
        ];
        let csv = export_csv_string(&source).unwrap();

        let (tasks, skipped) = parse_csv(&csv).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(shape(&tasks), shape(&source));
        let child = &tasks[0].children[0];
        assert_eq!(child.parent_id.as_ref(), Some(&tasks[0].id));
        assert_eq!(tasks[1].parent_id, None);
    }

    #[test]
    fn test_over_indented_row_attaches_to_deepest_task() {
        let csv = "Task Name,Start Date,End Date,Progress\n\
                   Root,2025-01-01,2025-01-31,0\n\
                   \t\t\tDeep,2025-01-02,2025-01-03,0\n\
                   Next,2025-02-01,2025-02-02,0\n";
        let (tasks, _) = parse_csv(csv).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].children.len(), 1);
        assert_eq!(tasks[0].children[0].name, "Deep");
    }

    #[test]
    fn test_flexible_headers_and_formats() {
        let csv = "Title;Begin;Due;Status\n\
                   Kickoff;15/01/2025;2025/01/16;45%\n\
                   Review;20.01.2025;21.01.2025;done\n";
        let (tasks, skipped) = parse_csv(csv).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].start, date(2025, 1, 15));
        assert_eq!(tasks[0].end, date(2025, 1, 16));
        assert_eq!(tasks[0].progress, 45);
        assert_eq!(tasks[1].progress, 100);
    }

    #[test]
    fn test_invalid_rows_are_skipped_and_counted() {
        let csv = "Task Name,Start Date,End Date,Progress\n\
                   Good,2025-01-01,2025-01-02,10\n\
                   ,2025-01-01,2025-01-02,10\n\
                   Bad start,someday,2025-01-02,10\n\
                   Bad end,2025-01-01,never,10\n";
        let (tasks, skipped) = parse_csv(csv).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(skipped, 3);
    }

    #[test]
    fn test_missing_columns_is_an_error() {
        let err = parse_csv("Name,When\nA,2025-01-01\n").unwrap_err();
        assert!(matches!(err, GanttError::MissingColumns { .. }));
    }

    #[test]
    fn test_all_rows_invalid_is_an_error() {
        let err = parse_csv("Name,Start,End\nA,x,y\n").unwrap_err();
        assert!(matches!(err, GanttError::EmptyImport { skipped: 1 }));
    }

    #[test]
    fn test_header_only_gives_empty_tree() {
        let (tasks, skipped) = parse_csv("Task Name,Start Date,End Date,Progress\n").unwrap();
        assert!(tasks.is_empty());
        assert_eq!(skipped, 0);
    }

    #[test]
    fn test_parse_progress() {
        assert_eq!(parse_progress("45"), Some(45));
        assert_eq!(parse_progress(" 45% "), Some(45));
        assert_eq!(parse_progress("0.3"), Some(30));
        assert_eq!(parse_progress("1"), Some(1));
        assert_eq!(parse_progress("1.0"), Some(100));
        assert_eq!(parse_progress("1.0%"), Some(1));
        assert_eq!(parse_progress("1e0"), Some(1));
        assert_eq!(parse_progress("12.6"), Some(13));
        assert_eq!(parse_progress("250"), Some(100));
        assert_eq!(parse_progress("Completed"), Some(100));
        assert_eq!(parse_progress("lots"), None);
    }

    #[test]
    fn test_import_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.csv");
        std::fs::write(&path, "Task,Start,End\nSolo,2025-03-01,2025-03-04\n").unwrap();
        let (tasks, skipped) = import_csv(&path).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(skipped, 0);
        assert_eq!(tasks[0].progress, 0);
    }
}
