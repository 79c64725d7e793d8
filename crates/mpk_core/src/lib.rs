//! Core domain logic for the MPK member roster.
//! This crate is the single source of truth for roster and proposal
//! membership invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::member::{compare_names, Member, MemberFilter, MemberId, MemberUpsertRow};
pub use model::member_id::{
    normalize, normalize_all, CanonicalId, MemberIdError, RawMemberId, MAX_SAFE_NUMBER,
};
pub use model::proposal::{
    Proposal, ProposalMembers, MIN_PROPOSAL_MEMBERS, STUB_PROPOSAL_STATUS, STUB_PROPOSAL_TITLE,
};
pub use repo::member_repo::{MemberRepository, SqliteMemberRepository};
pub use repo::proposal_repo::{ProposalRepository, SqliteProposalRepository};
pub use repo::{RepoError, RepoResult};
pub use service::member_service::{MemberService, MemberServiceError};
pub use service::proposal_service::{
    MemberIdsInput, ProposalService, ProposalServiceError, SetMembersOutcome,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
