//! Text rendering for the plan table, progress lines and conflict prompts.

use renamer_core::{ItemStatus, RenamePlan, WorkItem};
use renamer_ops::{Conflict, RenameProgress};

/// Longest file name shown in a progress line before it is shortened.
const PROGRESS_NAME_WIDTH: usize = 40;

/// Format bytes as human-readable size.
pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Status column text for one item.
pub fn status_label(item: &WorkItem) -> String {
    match item.status() {
        ItemStatus::Pending => String::new(),
        ItemStatus::Ready => "ready".to_string(),
        ItemStatus::Done => "✓ done".to_string(),
        ItemStatus::Skipped => "⏭ skipped".to_string(),
        ItemStatus::Error => match item.error_detail() {
            Some(detail) => format!("✗ {detail}"),
            None => "✗ error".to_string(),
        },
    }
}

/// One row of the plan table. `index` is zero-based; rows are numbered from 1.
pub fn item_line(index: usize, item: &WorkItem) -> String {
    let target = if item.has_blank_target() {
        "-"
    } else {
        item.target_name()
    };
    format!(
        "{:>4}  {:<32} → {:<32} {:>10}  {}",
        index + 1,
        item.original_name(),
        target,
        format_size(item.size()),
        status_label(item)
    )
    .trim_end()
    .to_string()
}

/// Render the whole plan with a header and a status footer.
pub fn plan_table(plan: &RenamePlan) -> String {
    if plan.is_empty() {
        return "No files loaded".to_string();
    }

    let mut out = format!(
        "{:>4}  {:<32}   {:<32} {:>10}  {}\n",
        "#", "Original", "New name", "Size", "Status"
    );
    for (index, item) in plan.iter().enumerate() {
        out.push_str(&item_line(index, item));
        out.push('\n');
    }
    out.push_str(&format!(
        "{} files, {} named",
        plan.len(),
        plan.named_count()
    ));
    out
}

/// Single progress line for the item about to be processed.
pub fn progress_line(progress: &RenameProgress) -> String {
    format!(
        "[{}/{}] {:>5.1}% | ✓ {} | ✗ {} | ⏭ {} | {}",
        progress.current,
        progress.total,
        progress.percentage(),
        progress.succeeded,
        progress.failed,
        progress.skipped,
        shorten(&progress.current_file, PROGRESS_NAME_WIDTH)
    )
}

/// Conflict description shown above the resolution prompt.
pub fn conflict_text(conflict: &Conflict) -> String {
    format!(
        "File already exists: {}\n  new:      {}\n  existing: {}",
        conflict.candidate_name,
        format_size(conflict.source_size),
        format_size(conflict.destination_size)
    )
}

/// Keep the end of a long name, which usually carries the distinguishing part.
fn shorten(name: &str, width: usize) -> String {
    let len = name.chars().count();
    if len <= width {
        return name.to_string();
    }
    let tail: String = name.chars().skip(len - (width - 1)).collect();
    format!("…{tail}")
}
