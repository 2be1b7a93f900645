use crate::model::{ComputedScheduleRow, MilestoneView, ScheduleSummary};

/// Counts for a single milestone's rows.
pub fn summarize_rows(rows: &[ComputedScheduleRow]) -> ScheduleSummary {
    let mut summary = ScheduleSummary::default();
    for row in rows {
        summary.record(row.status);
    }
    summary
}

/// Counts across the whole schedule. `total` is the number of calendar
/// entries, so `completed + overdue + pending == total`.
pub fn compute_summary(milestones: &[MilestoneView]) -> ScheduleSummary {
    let mut summary = ScheduleSummary::default();
    for row in milestones.iter().flat_map(|m| m.rows.iter()) {
        summary.record(row.status);
    }
    summary
}
