//! Proposal membership ledger use-case service.
//!
//! # Responsibility
//! - Validate member id lists sent for a proposal.
//! - Ensure the proposal exists, then fully replace its member set.
//!
//! # Invariants
//! - Validation order: list shape, then each element, then the
//!   deduplicated size.
//! - A stored member set never holds fewer than `MIN_PROPOSAL_MEMBERS` ids.
//! - A failed call leaves the previously stored set untouched.
//! - Member ids are not checked against the member directory.

use crate::model::member_id::{normalize_all, CanonicalId, MemberIdError, RawMemberId};
use crate::model::proposal::{ProposalMembers, MIN_PROPOSAL_MEMBERS};
use crate::repo::proposal_repo::ProposalRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Member id list as received from a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberIdsInput {
    /// A list; elements are still unvalidated.
    List(Vec<RawMemberId>),
    /// Anything that is not a list; `found` names what was sent instead.
    NotAList { found: &'static str },
}

impl From<Vec<RawMemberId>> for MemberIdsInput {
    fn from(value: Vec<RawMemberId>) -> Self {
        Self::List(value)
    }
}

/// Successful membership write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetMembersOutcome {
    /// Number of distinct member ids now stored for the proposal.
    pub count: usize,
}

/// Service error for proposal membership use-cases.
#[derive(Debug)]
pub enum ProposalServiceError {
    /// `memberIds` was not a list.
    NotAnArray { found: &'static str },
    /// One element failed normalization.
    InvalidMemberId(MemberIdError),
    /// Fewer distinct members than `MIN_PROPOSAL_MEMBERS`.
    InsufficientMembers { distinct: usize },
    /// Persistence-layer failure, passed through as-is.
    Repo(RepoError),
}

impl ProposalServiceError {
    /// Whether the caller sent something invalid (as opposed to a storage
    /// failure).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Repo(_))
    }
}

impl Display for ProposalServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnArray { found } => write!(f, "memberIds must be an array, got {found}"),
            Self::InvalidMemberId(err) => write!(f, "{err}"),
            Self::InsufficientMembers { distinct } => write!(
                f,
                "a proposal requires at least {MIN_PROPOSAL_MEMBERS} distinct members, got {distinct}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProposalServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidMemberId(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotAnArray { .. } | Self::InsufficientMembers { .. } => None,
        }
    }
}

impl From<MemberIdError> for ProposalServiceError {
    fn from(value: MemberIdError) -> Self {
        Self::InvalidMemberId(value)
    }
}

impl From<RepoError> for ProposalServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Proposal ledger facade over repository implementations.
pub struct ProposalService<R: ProposalRepository> {
    repo: R,
}

impl<R: ProposalRepository> ProposalService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates raw member ids and replaces the member set of `proposal_id`.
    ///
    /// # Errors
    /// - `NotAnArray` before any element is looked at.
    /// - `InvalidMemberId` for the first element that fails normalization.
    /// - `InsufficientMembers` when fewer than three distinct ids remain.
    /// - `Repo` for storage failures.
    pub fn set_members(
        &mut self,
        proposal_id: &str,
        input: &MemberIdsInput,
    ) -> Result<SetMembersOutcome, ProposalServiceError> {
        let raw = match input {
            MemberIdsInput::List(raw) => raw,
            MemberIdsInput::NotAList { found } => {
                warn!(
                    "event=proposal_set_members module=proposals status=rejected reason=not_an_array found={found}"
                );
                return Err(ProposalServiceError::NotAnArray { found: *found });
            }
        };

        let normalized = normalize_all(raw).inspect_err(|err| {
            warn!(
                "event=proposal_set_members module=proposals status=rejected reason=invalid_member_id index={}",
                err.index()
            );
        })?;
        self.replace_members(proposal_id, &normalized)
    }

    /// Replaces the member set of `proposal_id` with already-normalized ids.
    ///
    /// Duplicates are removed before the size check.
    pub fn replace_members(
        &mut self,
        proposal_id: &str,
        member_ids: &[CanonicalId],
    ) -> Result<SetMembersOutcome, ProposalServiceError> {
        let unique: Vec<CanonicalId> = member_ids
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if unique.len() < MIN_PROPOSAL_MEMBERS {
            warn!(
                "event=proposal_set_members module=proposals status=rejected reason=insufficient_members distinct={}",
                unique.len()
            );
            return Err(ProposalServiceError::InsufficientMembers {
                distinct: unique.len(),
            });
        }

        self.repo.upsert_proposal_stub(proposal_id)?;
        self.repo.replace_proposal_members(proposal_id, &unique)?;

        info!(
            "event=proposal_set_members module=proposals status=ok received={} count={}",
            member_ids.len(),
            unique.len()
        );
        Ok(SetMembersOutcome {
            count: unique.len(),
        })
    }

    /// Reads back a proposal with its member ids, `None` when unknown.
    pub fn members_of(
        &self,
        proposal_id: &str,
    ) -> Result<Option<ProposalMembers>, ProposalServiceError> {
        let Some(proposal) = self.repo.get_proposal(proposal_id)? else {
            return Ok(None);
        };
        let member_ids = self.repo.list_proposal_members(proposal_id)?;
        Ok(Some(ProposalMembers {
            proposal,
            member_ids,
        }))
    }
}
