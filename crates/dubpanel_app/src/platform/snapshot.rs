//! Console summary and HTML mirror of the rendered page.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use chrono::Utc;
use dubpanel_core::dom::Document;
use dubpanel_core::{AppViewModel, PollState};
use tempfile::NamedTempFile;

/// Short human-readable summary of the panel.
pub(crate) fn summary_lines(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    let header = match &view.version {
        Some(version) => format!("dubpanel {version}"),
        None => "dubpanel".to_string(),
    };
    lines.push(header);
    if let Some(dir) = &view.target_dir {
        lines.push(format!("  save dir: {dir}"));
    }
    let poll = match view.poll {
        PollState::Idle => "idle",
        PollState::Polling => "polling",
        PollState::Draining => "finishing",
    };
    lines.push(format!(
        "  {} ({} done, {poll})",
        view.selection_label(),
        view.completed_count()
    ));
    for row in &view.tasks {
        lines.push(format!(
            "  [{}] {:<32} {:>3}% {:<10} {}",
            row.index,
            row.file_name,
            row.progress.percent,
            row.progress.status.badge(),
            row.progress.text
        ));
    }
    if !view.open_widgets.is_empty() {
        lines.push(format!("  open: {}", view.open_widgets.join(", ")));
    }
    lines
}

/// Writes the page as a standalone HTML file, replacing `path` atomically.
pub(crate) fn write_html(path: &Path, doc: &Document) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    writeln!(tmp, "<!DOCTYPE html>")?;
    writeln!(
        tmp,
        "<!-- rendered {} -->",
        Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    )?;
    writeln!(tmp, "<html><body>{}</body></html>", doc.to_html())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dubpanel_core::{update, AppState, FileSelection, Msg};

    fn state_with(paths: &[&str]) -> AppState {
        let (state, _) = update(
            AppState::new(),
            Msg::FilesSelected(Ok(FileSelection {
                files: paths.iter().map(|p| p.to_string()).collect(),
                target_dir: Some("/out".to_string()),
            })),
        );
        state
    }

    #[test]
    fn summary_lists_every_task() {
        let view = state_with(&["/v/a.mp4", "C:\\clips\\b.mkv"]).view();
        let lines = summary_lines(&view);

        assert_eq!(lines[1], "  save dir: /out");
        assert!(lines[2].starts_with("  2 files selected (0 done, idle)"));
        assert!(lines[3].contains("a.mp4"));
        assert!(lines[4].contains("b.mkv"));
        assert!(lines[4].contains("Waiting"));
    }

    #[test]
    fn html_snapshot_replaces_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("panel.html");

        write_html(&target, &AppState::new().render_document()).unwrap();
        write_html(&target, &state_with(&["/v/a.mp4"]).render_document()).unwrap();

        let html = fs::read_to_string(&target).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("data-path=\"/v/a.mp4\""));
        assert!(!html.contains("No tasks queued"));
    }
}
