//! Member directory use-case service.
//!
//! # Responsibility
//! - Normalize bulk import rows and upsert them by name.
//! - Serve filtered, name-ordered member listings.
//!
//! # Invariants
//! - Rows without a usable name are skipped and not counted.
//! - Re-importing a name updates `org_unit` only.

use crate::model::member::{Member, MemberFilter, MemberId, MemberUpsertRow};
use crate::repo::member_repo::MemberRepository;
use crate::repo::RepoError;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for member directory use-cases.
#[derive(Debug)]
pub enum MemberServiceError {
    /// Persistence-layer failure, passed through as-is.
    Repo(RepoError),
}

impl Display for MemberServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MemberServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for MemberServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Member directory facade over repository implementations.
pub struct MemberService<R: MemberRepository> {
    repo: R,
}

impl<R: MemberRepository> MemberService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Upserts every usable row and returns how many were processed.
    ///
    /// Rows are written one by one; a storage failure stops the import and
    /// leaves earlier rows in place.
    pub fn bulk_upsert(&self, rows: &[MemberUpsertRow]) -> Result<usize, MemberServiceError> {
        let mut processed = 0usize;
        for (name, org_unit) in rows.iter().filter_map(MemberUpsertRow::normalized) {
            let member = self.repo.upsert_member(name, org_unit)?;
            debug!(
                "event=member_upsert module=members status=ok member_id={}",
                member.id
            );
            processed += 1;
        }

        info!(
            "event=members_bulk_upsert module=members status=ok received={} processed={} skipped={}",
            rows.len(),
            processed,
            rows.len() - processed
        );
        Ok(processed)
    }

    /// Lists members matching `filter`, ascending by name.
    pub fn list(&self, filter: &MemberFilter) -> Result<Vec<Member>, MemberServiceError> {
        Ok(self.repo.find_members(filter)?)
    }

    /// Gets one member by id.
    pub fn get(&self, id: MemberId) -> Result<Option<Member>, MemberServiceError> {
        Ok(self.repo.get_member(id)?)
    }
}
