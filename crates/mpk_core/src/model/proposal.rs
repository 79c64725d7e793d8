//! Proposal and proposal membership records.

use crate::model::member_id::CanonicalId;
use serde::{Deserialize, Serialize};

/// Title given to proposals created implicitly by a membership write.
pub const STUB_PROPOSAL_TITLE: &str = "Draft";
/// Status given to proposals created implicitly by a membership write.
pub const STUB_PROPOSAL_STATUS: &str = "DRAFT";
/// Smallest member set a proposal may be saved with.
pub const MIN_PROPOSAL_MEMBERS: usize = 3;

/// Proposal header. `id` is chosen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: String,
    pub title: String,
    pub status: String,
}

impl Proposal {
    /// Builds the stub record used when a proposal is first referenced.
    pub fn stub(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: STUB_PROPOSAL_TITLE.to_string(),
            status: STUB_PROPOSAL_STATUS.to_string(),
        }
    }
}

/// Read model: one proposal with its current member set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposalMembers {
    #[serde(flatten)]
    pub proposal: Proposal,
    /// Member ids in ascending numeric order.
    #[serde(rename = "memberIds")]
    pub member_ids: Vec<CanonicalId>,
}
