//! Operator comments and print-job details attached to an order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{ActorId, Role};

use super::OrderId;
use super::order::{MAX_COUNT, bounded_count};

/// Append-only note left by a stage operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderComment {
    #[schema(value_type = String, format = "uuid")]
    pub id: Uuid,
    pub order_id: OrderId,
    pub author_id: ActorId,
    pub author_role: Role,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl OrderComment {
    /// Build a comment from raw text, returning `None` when the text is blank.
    pub fn compose(
        order_id: OrderId,
        author_id: ActorId,
        author_role: Role,
        text: &str,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let body = text.trim();
        (!body.is_empty()).then(|| Self {
            id: Uuid::new_v4(),
            order_id,
            author_id,
            author_role,
            body: body.to_owned(),
            created_at: now,
        })
    }
}

/// Validation failures for print-job details.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LabelJobValidationError {
    #[error("number of sheets must be greater than zero")]
    NonPositiveSheets,
    #[error("number of sheets must not exceed {MAX_COUNT}")]
    TooManySheets,
    #[error("labels per sheet must be greater than zero")]
    NonPositiveLabelsPerSheet,
    #[error("labels per sheet must not exceed {MAX_COUNT}")]
    TooManyLabelsPerSheet,
    #[error("cutting type must not be blank")]
    BlankCuttingType,
}

/// Unvalidated print-job input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelJobDraft {
    pub no_of_sheets: i64,
    pub cutting_type: String,
    pub labels_per_sheet: i64,
    pub description: Option<String>,
}

/// Print-job details an administrator prepares for the printing stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabelJobDetails {
    pub order_id: OrderId,
    pub no_of_sheets: u32,
    pub cutting_type: String,
    pub labels_per_sheet: u32,
    pub description: Option<String>,
    pub updated_by: ActorId,
    pub updated_at: DateTime<Utc>,
}

impl LabelJobDetails {
    /// Validate a draft for `order_id`.
    pub fn new(
        order_id: OrderId,
        draft: LabelJobDraft,
        updated_by: ActorId,
        now: DateTime<Utc>,
    ) -> Result<Self, LabelJobValidationError> {
        let no_of_sheets = bounded_count(
            draft.no_of_sheets,
            LabelJobValidationError::NonPositiveSheets,
            LabelJobValidationError::TooManySheets,
        )?;
        let labels_per_sheet = bounded_count(
            draft.labels_per_sheet,
            LabelJobValidationError::NonPositiveLabelsPerSheet,
            LabelJobValidationError::TooManyLabelsPerSheet,
        )?;
        let cutting_type = draft.cutting_type.trim();
        if cutting_type.is_empty() {
            return Err(LabelJobValidationError::BlankCuttingType);
        }
        let description = draft
            .description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        Ok(Self {
            order_id,
            no_of_sheets,
            cutting_type: cutting_type.to_owned(),
            labels_per_sheet,
            description,
            updated_by,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn draft(no_of_sheets: i64, labels_per_sheet: i64, cutting_type: &str) -> LabelJobDraft {
        LabelJobDraft {
            no_of_sheets,
            cutting_type: cutting_type.to_owned(),
            labels_per_sheet,
            description: Some("   ".to_owned()),
        }
    }

    #[rstest]
    #[case(draft(0, 4, "die"), LabelJobValidationError::NonPositiveSheets)]
    #[case(draft(10, -1, "die"), LabelJobValidationError::NonPositiveLabelsPerSheet)]
    #[case(draft(10, 4, " "), LabelJobValidationError::BlankCuttingType)]
    #[case(draft(2_147_483_648, 4, "die"), LabelJobValidationError::TooManySheets)]
    #[case(draft(10, 3_000_000_000, "die"), LabelJobValidationError::TooManyLabelsPerSheet)]
    fn rejects_invalid_drafts(
        #[case] input: LabelJobDraft,
        #[case] expected: LabelJobValidationError,
    ) {
        let result = LabelJobDetails::new(OrderId::random(), input, ActorId::random(), Utc::now());
        assert_eq!(result, Err(expected));
    }

    #[rstest]
    fn blank_description_is_dropped() {
        let details =
            LabelJobDetails::new(OrderId::random(), draft(10, 4, "die cut"), ActorId::random(), Utc::now())
                .expect("valid draft");
        assert!(details.description.is_none());
        assert_eq!(details.cutting_type, "die cut");
    }

    #[rstest]
    fn blank_comment_is_refused() {
        let comment = OrderComment::compose(
            OrderId::random(),
            ActorId::random(),
            Role::Printing,
            " \n ",
            Utc::now(),
        );
        assert!(comment.is_none());
    }
}
