use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::model::task::Task;
use crate::model::tree;

pub const CSV_HEADER: [&str; 4] = ["Task Name", "Start Date", "End Date", "Progress"];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Write the displayed rows of `tasks` as CSV.
///
/// Columns: Task Name , Start Date , End Date , Progress
/// The name is prefixed with one tab per nesting level and the children of
/// collapsed tasks are left out. Returns the number of tasks written.
pub fn write_csv<W: Write>(tasks: &[Task], writer: W) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(CSV_HEADER)?;

    let mut written = 0;
    for row in tree::visible_rows(tasks) {
        let task = row.task;
        let name = format!("{}{}", "\t".repeat(row.depth), task.name);
        wtr.write_record([
            name,
            task.start.format(DATE_FORMAT).to_string(),
            task.end.format(DATE_FORMAT).to_string(),
            task.progress.to_string(),
        ])?;
        written += 1;
    }

    wtr.flush()?;
    Ok(written)
}

pub fn export_csv_string(tasks: &[Task]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(tasks, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

/// Export to a file at `path`. Returns the number of tasks written.
pub fn export_csv(tasks: &[Task], path: &Path) -> Result<usize> {
    let file = std::fs::File::create(path)?;
    let written = write_csv(tasks, file)?;
    tracing::info!(path = %path.display(), tasks = written, "exported CSV");
    Ok(written)
}
