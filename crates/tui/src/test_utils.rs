//! Helpers shared by the crate's test modules.

use protolab_protocol::{OrderBoard, dummy};
use protolab_transition::{FailurePolicy, KanbanController, KindPolicies, RegistryController};
use ratatui::buffer::Buffer;

/// Converts a buffer to text, one line per row, trailing spaces trimmed.
#[must_use]
pub(crate) fn buffer_to_string(buf: &Buffer) -> String {
    let mut result = String::new();
    for y in 0..buf.area.height {
        for x in 0..buf.area.width {
            if let Some(cell) = buf.cell((x, y)) {
                result.push_str(cell.symbol());
            }
        }
        let trimmed = result.trim_end_matches(' ');
        result.truncate(trimmed.len());
        result.push('\n');
    }
    result
}

/// State over the sample lab: 5/4/2 orders on the board and 12 registry
/// entries.
#[must_use]
pub(crate) fn sample_state() -> crate::AppState {
    crate::AppState::new(
        KanbanController::new(
            OrderBoard::from_records(dummy::sample_orders()),
            FailurePolicy::KeepOptimistic,
        ),
        RegistryController::new(dummy::sample_registry(), KindPolicies::new(FailurePolicy::Revert)),
    )
}
