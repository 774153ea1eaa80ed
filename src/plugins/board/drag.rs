use super::reducer::Intent;
use super::types::TaskStatus;
use serde::{Deserialize, Serialize};

/// One end of a drag: the drop-zone id of a column and a slot index within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropLocation {
    pub column_id: String,
    pub index: usize,
}

impl DropLocation {
    pub fn new(column_id: impl Into<String>, index: usize) -> Self {
        Self {
            column_id: column_id.into(),
            index,
        }
    }
}

/// Drag-end event as reported by the UI. `destination` is `None` when the drop
/// was cancelled or landed outside every column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragEnd {
    pub source: DropLocation,
    pub destination: Option<DropLocation>,
}

fn column_status(location: &DropLocation) -> Option<TaskStatus> {
    match location.column_id.parse() {
        Ok(status) => Some(status),
        Err(e) => {
            tracing::warn!(target: "board", "Ignoring drop on unknown column: {}", e);
            None
        }
    }
}

/// Maps a drag-end event to the reducer intent it stands for, if any.
pub fn intent_for_drag(event: &DragEnd) -> Option<Intent> {
    let destination = event.destination.as_ref()?;
    let from = column_status(&event.source)?;
    let to = column_status(destination)?;

    if from == to {
        if event.source.index == destination.index {
            return None;
        }
        return Some(Intent::ReorderWithinColumn {
            status: from,
            from_index: event.source.index,
            to_index: destination.index,
        });
    }

    Some(Intent::MoveAcrossColumn {
        from_status: from,
        from_index: event.source.index,
        to_status: to,
        to_index: destination.index,
    })
}
