use std::fmt;

use thiserror::Error;

/// Which kind of label a sheet lookup was searching for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Anchor,
    Meeting,
    Group,
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelKind::Anchor => write!(f, "Anchor"),
            LabelKind::Meeting => write!(f, "Meeting"),
            LabelKind::Group => write!(f, "Group"),
        }
    }
}

#[derive(Error, Debug)]
pub enum RotaError {
    /// The report no longer has the shape the parser expects. Fatal.
    #[error("Malformed document ({scope}): {detail}")]
    MalformedDocument { scope: String, detail: String },

    /// An attendance cell is empty or non-numeric. Recovered by omission.
    #[error("Unparseable attendance figure for {meeting} / {group}: {text:?}")]
    UnparseableFigure {
        meeting: String,
        group: String,
        text: String,
    },

    /// A row or column label is missing from the destination grid. Recovered by skipping.
    #[error("{kind} label not found in sheet: {label:?}")]
    LabelNotFound { kind: LabelKind, label: String },

    /// The spreadsheet rejected a write or clear. Fatal.
    #[error("Write to {range} failed: {reason}")]
    DestinationWriteFailure { range: String, reason: String },
}

impl RotaError {
    pub fn malformed(scope: impl Into<String>, detail: impl Into<String>) -> Self {
        RotaError::MalformedDocument {
            scope: scope.into(),
            detail: detail.into(),
        }
    }

    pub fn label_not_found(kind: LabelKind, label: &str) -> Self {
        RotaError::LabelNotFound {
            kind,
            label: label.to_string(),
        }
    }

    /// Whether the run can continue past this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RotaError::UnparseableFigure { .. } | RotaError::LabelNotFound { .. }
        )
    }
}
