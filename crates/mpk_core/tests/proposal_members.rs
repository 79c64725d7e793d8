use mpk_core::db::open_db_in_memory;
use mpk_core::{
    CanonicalId, MemberIdError, MemberIdsInput, ProposalRepository, ProposalService,
    ProposalServiceError, RawMemberId, SqliteProposalRepository, STUB_PROPOSAL_STATUS,
    STUB_PROPOSAL_TITLE,
};
use rusqlite::{params, Connection};

fn numbers(values: &[i64]) -> MemberIdsInput {
    MemberIdsInput::List(values.iter().copied().map(RawMemberId::from).collect())
}

fn stored_ids(conn: &mut Connection, proposal_id: &str) -> Vec<String> {
    let repo = SqliteProposalRepository::try_new(conn).unwrap();
    repo.list_proposal_members(proposal_id)
        .unwrap()
        .into_iter()
        .map(String::from)
        .collect()
}

#[test]
fn set_members_deduplicates_and_creates_stub() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let repo = SqliteProposalRepository::try_new(&mut conn).unwrap();
        let mut service = ProposalService::new(repo);
        let outcome = service.set_members("p1", &numbers(&[1, 2, 2, 3])).unwrap();
        assert_eq!(outcome.count, 3);

        let read_back = service.members_of("p1").unwrap().unwrap();
        assert_eq!(read_back.proposal.title, STUB_PROPOSAL_TITLE);
        assert_eq!(read_back.proposal.status, STUB_PROPOSAL_STATUS);
        assert_eq!(read_back.member_ids.len(), 3);
    }
    assert_eq!(stored_ids(&mut conn, "p1"), vec!["1", "2", "3"]);
}

#[test]
fn set_members_accepts_mixed_numeric_and_text_forms() {
    let mut conn = open_db_in_memory().unwrap();
    let input = MemberIdsInput::List(vec![
        RawMemberId::from("1"),
        RawMemberId::from(2),
        RawMemberId::from("  3  "),
        RawMemberId::from("4"),
        RawMemberId::from("1"),
    ]);
    {
        let repo = SqliteProposalRepository::try_new(&mut conn).unwrap();
        let outcome = ProposalService::new(repo).set_members("mixed", &input).unwrap();
        assert_eq!(outcome.count, 4);
    }
    assert_eq!(stored_ids(&mut conn, "mixed"), vec!["1", "2", "3", "4"]);
}

#[test]
fn second_write_fully_replaces_previous_set() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let repo = SqliteProposalRepository::try_new(&mut conn).unwrap();
        let mut service = ProposalService::new(repo);
        service.set_members("p1", &numbers(&[1, 2, 3, 4])).unwrap();
        service.set_members("p1", &numbers(&[10, 20, 30])).unwrap();
    }
    assert_eq!(stored_ids(&mut conn, "p1"), vec!["10", "20", "30"]);
}

#[test]
fn rejected_write_keeps_previous_set() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteProposalRepository::try_new(&mut conn).unwrap();
    let mut service = ProposalService::new(repo);
    service.set_members("p1", &numbers(&[1, 2, 3])).unwrap();

    let err = service.set_members("p1", &numbers(&[1, 2, 2])).unwrap_err();
    assert!(matches!(
        err,
        ProposalServiceError::InsufficientMembers { distinct: 2 }
    ));
    let err = service
        .set_members("p1", &MemberIdsInput::List(vec![RawMemberId::from("abc")]))
        .unwrap_err();
    assert!(matches!(
        err,
        ProposalServiceError::InvalidMemberId(MemberIdError::NonNumericIdentifier { index: 0 })
    ));

    let current = service.members_of("p1").unwrap().unwrap();
    let ids: Vec<&str> = current.member_ids.iter().map(CanonicalId::as_str).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[test]
fn rejected_write_does_not_create_stub() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteProposalRepository::try_new(&mut conn).unwrap();
    let mut service = ProposalService::new(repo);

    let err = service
        .set_members("ghost", &MemberIdsInput::NotAList { found: "object" })
        .unwrap_err();
    assert!(matches!(err, ProposalServiceError::NotAnArray { .. }));
    assert!(service.members_of("ghost").unwrap().is_none());
}

#[test]
fn existing_proposal_header_is_not_modified() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO proposals (id, title, status) VALUES (?1, ?2, ?3);",
        params!["budget", "Annual budget", "SUBMITTED"],
    )
    .unwrap();

    let repo = SqliteProposalRepository::try_new(&mut conn).unwrap();
    let mut service = ProposalService::new(repo);
    service.set_members("budget", &numbers(&[5, 6, 7])).unwrap();

    let read_back = service.members_of("budget").unwrap().unwrap();
    assert_eq!(read_back.proposal.title, "Annual budget");
    assert_eq!(read_back.proposal.status, "SUBMITTED");
}

#[test]
fn unknown_member_ids_are_accepted() {
    // No member rows exist at all; the ledger does not check references.
    let mut conn = open_db_in_memory().unwrap();
    let input = MemberIdsInput::List(vec![
        RawMemberId::from("900"),
        RawMemberId::from("901"),
        RawMemberId::from("123456789012345678901234567890"),
    ]);
    {
        let repo = SqliteProposalRepository::try_new(&mut conn).unwrap();
        let outcome = ProposalService::new(repo).set_members("p9", &input).unwrap();
        assert_eq!(outcome.count, 3);
    }
    assert_eq!(
        stored_ids(&mut conn, "p9"),
        vec!["900", "901", "123456789012345678901234567890"]
    );
}

#[test]
fn too_large_number_is_rejected_with_index() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteProposalRepository::try_new(&mut conn).unwrap();
    let input = MemberIdsInput::List(vec![
        RawMemberId::from(1),
        RawMemberId::Number(9_007_199_254_741_001.0),
    ]);
    let err = ProposalService::new(repo)
        .set_members("p1", &input)
        .unwrap_err();
    assert!(matches!(
        err,
        ProposalServiceError::InvalidMemberId(MemberIdError::IdentifierTooLarge { index: 1 })
    ));
    assert!(err.to_string().contains("too large"));
}

#[test]
fn negative_numeric_ids_are_stored_signed_and_in_numeric_order() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let repo = SqliteProposalRepository::try_new(&mut conn).unwrap();
        let outcome = ProposalService::new(repo)
            .set_members("signed", &numbers(&[3, -5, -20, 0]))
            .unwrap();
        assert_eq!(outcome.count, 4);
    }
    assert_eq!(stored_ids(&mut conn, "signed"), vec!["-20", "-5", "0", "3"]);
}
