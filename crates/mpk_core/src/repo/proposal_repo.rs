//! Proposal/membership repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Create proposal stubs on first reference.
//! - Own membership replacement with atomic delete-then-insert semantics.
//!
//! # Invariants
//! - `replace_proposal_members` runs in one `BEGIN IMMEDIATE` transaction;
//!   readers see either the old set or the new one.
//! - `upsert_proposal_stub` never modifies an existing proposal.
//! - Member ids are stored in canonical text form and are not checked
//!   against `members`.

use crate::model::member_id::CanonicalId;
use crate::model::proposal::Proposal;
use crate::repo::{ensure_tables, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

/// Persistence collaborator for the proposal membership ledger.
pub trait ProposalRepository {
    /// Inserts a stub proposal unless `proposal_id` already exists.
    fn upsert_proposal_stub(&self, proposal_id: &str) -> RepoResult<()>;
    /// Replaces the whole member set of `proposal_id` in one transaction.
    ///
    /// `member_ids` must be free of duplicates; the proposal must exist.
    fn replace_proposal_members(
        &mut self,
        proposal_id: &str,
        member_ids: &[CanonicalId],
    ) -> RepoResult<()>;
    /// Gets one proposal header.
    fn get_proposal(&self, proposal_id: &str) -> RepoResult<Option<Proposal>>;
    /// Lists member ids of one proposal in ascending numeric order.
    fn list_proposal_members(&self, proposal_id: &str) -> RepoResult<Vec<CanonicalId>>;
}

/// SQLite-backed proposal repository.
pub struct SqliteProposalRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteProposalRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["proposals", "proposal_members"])?;
        Ok(Self { conn })
    }
}

impl ProposalRepository for SqliteProposalRepository<'_> {
    fn upsert_proposal_stub(&self, proposal_id: &str) -> RepoResult<()> {
        let stub = Proposal::stub(proposal_id);
        self.conn.execute(
            "INSERT INTO proposals (id, title, status)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO NOTHING;",
            params![stub.id, stub.title, stub.status],
        )?;
        Ok(())
    }

    fn replace_proposal_members(
        &mut self,
        proposal_id: &str,
        member_ids: &[CanonicalId],
    ) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "DELETE FROM proposal_members WHERE proposal_id = ?1;",
            [proposal_id],
        )?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO proposal_members (proposal_id, member_id) VALUES (?1, ?2);",
            )?;
            for member_id in member_ids {
                insert.execute(params![proposal_id, member_id.as_str()])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn get_proposal(&self, proposal_id: &str) -> RepoResult<Option<Proposal>> {
        let proposal = self
            .conn
            .query_row(
                "SELECT id, title, status FROM proposals WHERE id = ?1;",
                [proposal_id],
                |row| {
                    Ok(Proposal {
                        id: row.get("id")?,
                        title: row.get("title")?,
                        status: row.get("status")?,
                    })
                },
            )
            .optional()?;
        Ok(proposal)
    }

    fn list_proposal_members(&self, proposal_id: &str) -> RepoResult<Vec<CanonicalId>> {
        let mut stmt = self.conn.prepare(
            "SELECT member_id
             FROM proposal_members
             WHERE proposal_id = ?1;",
        )?;
        let mut rows = stmt.query([proposal_id])?;
        let mut member_ids = Vec::new();
        while let Some(row) = rows.next()? {
            let text: String = row.get(0)?;
            member_ids.push(parse_canonical_id(text)?);
        }
        // Numeric order; text order misplaces negatives.
        member_ids.sort();
        Ok(member_ids)
    }
}

fn parse_canonical_id(text: String) -> RepoResult<CanonicalId> {
    match CanonicalId::parse_canonical(text.as_str()) {
        Some(id) => Ok(id),
        None => Err(RepoError::InvalidData(format!(
            "invalid member id `{text}` in proposal_members.member_id"
        ))),
    }
}
