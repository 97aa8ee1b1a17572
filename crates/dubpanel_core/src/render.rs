//! Projection of the task list into elements. Rebuilt from scratch on
//! every render; rows are addressed by their `data-uuid` and `data-index`.

use crate::dom::Element;
use crate::view_model::TaskRowView;

pub const TASK_LIST_ID: &str = "task-queue-list";
pub const REMOVE_PREFIX: &str = "task-remove-";

pub fn task_list(rows: &[TaskRowView]) -> Element {
    let mut list = Element::new("div").with_id(TASK_LIST_ID);
    if rows.is_empty() {
        list.add_class("empty");
        list.set_text("No tasks queued");
        return list;
    }
    for row in rows {
        list.push_child(task_row(row));
    }
    list
}

fn task_row(row: &TaskRowView) -> Element {
    let percent = row.progress.percent;
    let status = row.progress.status;

    let progress = Element::new("div")
        .with_class("task-item-progress-container")
        .with_child(
            Element::new("div")
                .with_class("task-item-progress-bar")
                .with_child(
                    Element::new("div")
                        .with_class("task-item-progress-fill")
                        .with_attr("style", format!("width: {percent}%")),
                ),
        )
        .with_child(
            Element::new("div")
                .with_class("task-item-progress-text")
                .with_text(format!("{percent}%")),
        );

    Element::new("div")
        .with_class("task-item")
        .with_attr("data-index", row.index.to_string())
        .with_attr("data-order", row.order.to_string())
        .with_attr("data-uuid", row.uuid.clone().unwrap_or_default())
        .with_attr("data-path", row.path.clone())
        .with_child(
            Element::new("div")
                .with_class("task-item-content")
                .with_child(
                    Element::new("div")
                        .with_class("task-item-name")
                        .with_text(row.file_name.clone()),
                )
                .with_child(
                    Element::new("div")
                        .with_class("task-item-path")
                        .with_text(row.path.clone()),
                )
                .with_child(progress)
                .with_child(
                    Element::new("div")
                        .with_class("task-item-status-text")
                        .with_text(row.progress.text.clone()),
                ),
        )
        .with_child(
            Element::new("div")
                .with_class("task-item-status")
                .with_class(status.css_class())
                .with_text(status.badge()),
        )
        .with_child(
            Element::new("button")
                .with_id(format!("{REMOVE_PREFIX}{}", row.index))
                .with_class("task-item-remove")
                .with_attr("title", "Remove")
                .with_text("x"),
        )
}
