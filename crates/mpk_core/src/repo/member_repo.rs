//! Member repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Upsert members by exact name and read them back.
//! - Apply list filters and name ordering.
//!
//! # Invariants
//! - Upsert never changes `id` or `name` of an existing member.
//! - `find_members` output is ordered by `compare_names`.

use crate::model::member::{compare_names, Member, MemberFilter, MemberId};
use crate::repo::{ensure_tables, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const MEMBER_SELECT_SQL: &str = "SELECT id, name, org_unit FROM members";

/// Persistence collaborator for the member directory.
pub trait MemberRepository {
    /// Creates the member or, when `name` exists, overwrites its org unit.
    ///
    /// `name` and `org_unit` are expected to be trimmed already.
    fn upsert_member(&self, name: &str, org_unit: Option<&str>) -> RepoResult<Member>;
    /// Returns members matching `filter`, ordered by name.
    fn find_members(&self, filter: &MemberFilter) -> RepoResult<Vec<Member>>;
    /// Gets one member by id.
    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["members"])?;
        Ok(Self { conn })
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn upsert_member(&self, name: &str, org_unit: Option<&str>) -> RepoResult<Member> {
        self.conn.execute(
            "INSERT INTO members (name, org_unit)
             VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET
                org_unit = excluded.org_unit,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![name, org_unit],
        )?;

        self.conn
            .query_row(
                &format!("{MEMBER_SELECT_SQL} WHERE name = ?1;"),
                [name],
                parse_member_row,
            )
            .optional()?
            .ok_or_else(|| RepoError::InvalidData("member row missing after upsert".to_string()))
    }

    fn find_members(&self, filter: &MemberFilter) -> RepoResult<Vec<Member>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} ORDER BY name ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            let member = parse_member_row(row)?;
            if filter.matches(&member) {
                members.push(member);
            }
        }

        validate_members(&members)?;
        members.sort_by(|left, right| compare_names(&left.name, &right.name));
        Ok(members)
    }

    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        let member = self
            .conn
            .query_row(
                &format!("{MEMBER_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_member_row,
            )
            .optional()?;
        if let Some(member) = member.as_ref() {
            validate_members(std::slice::from_ref(member))?;
        }
        Ok(member)
    }
}

fn parse_member_row(row: &Row<'_>) -> rusqlite::Result<Member> {
    Ok(Member {
        id: row.get("id")?,
        name: row.get("name")?,
        org_unit: row.get("org_unit")?,
    })
}

fn validate_members(members: &[Member]) -> RepoResult<()> {
    for member in members {
        if member.id <= 0 {
            return Err(RepoError::InvalidData(format!(
                "non-positive id `{}` in members.id",
                member.id
            )));
        }
        if member.name.trim() != member.name {
            return Err(RepoError::InvalidData(format!(
                "untrimmed name for member {} in members.name",
                member.id
            )));
        }
    }
    Ok(())
}
