//! Edge cases: boundary amounts, malformed inputs, idempotent role changes.

use skillforge::units::{format_amount, parse_amount};
use skillforge::{Account, EventKind, LedgerConfig, LedgerError, Role, SkillLedger};

fn admin() -> Account {
    Account::new("acct_admin")
}

fn quiz() -> Account {
    Account::new("acct_quiz")
}

fn user() -> Account {
    Account::new("acct_user")
}

fn ledger_with(config: LedgerConfig) -> SkillLedger {
    let mut ledger = SkillLedger::deploy(config, admin()).unwrap();
    ledger
        .grant_role(&admin(), &Role::quizmaster(), &quiz())
        .unwrap();
    ledger
}

fn ledger() -> SkillLedger {
    ledger_with(LedgerConfig {
        decimals: 0,
        initial_supply: 0,
        ..LedgerConfig::default()
    })
}

#[test]
fn edge_zero_amounts_rejected() {
    let mut ledger = ledger();
    assert!(matches!(
        ledger.mint(&quiz(), &user(), 0, "x"),
        Err(LedgerError::InvalidAmount)
    ));
    assert!(matches!(
        ledger.tip(&quiz(), &user(), 0, "x"),
        Err(LedgerError::InvalidAmount)
    ));
    assert!(matches!(
        ledger.burn(&quiz(), &user(), 0),
        Err(LedgerError::InvalidAmount)
    ));
    assert!(matches!(
        ledger.transfer(&user(), &admin(), 0),
        Err(LedgerError::InvalidAmount)
    ));
}

#[test]
fn edge_supply_overflow() {
    let mut ledger = ledger();
    ledger.mint(&quiz(), &user(), u128::MAX, "max").unwrap();
    assert_eq!(ledger.total_supply(), u128::MAX);
    assert!(matches!(
        ledger.mint(&quiz(), &admin(), 1, "one more"),
        Err(LedgerError::SupplyOverflow)
    ));
    assert_eq!(ledger.balance_of(&admin()), 0);
}

#[test]
fn edge_initial_supply_overflow_rejected_at_deploy() {
    let config = LedgerConfig {
        decimals: 38,
        initial_supply: 1_000,
        ..LedgerConfig::default()
    };
    assert!(SkillLedger::deploy(config, admin()).is_err());
}

#[test]
fn edge_zero_initial_supply_emits_only_role_grant() {
    let ledger = SkillLedger::deploy(
        LedgerConfig {
            initial_supply: 0,
            ..LedgerConfig::default()
        },
        admin(),
    )
    .unwrap();
    assert_eq!(ledger.total_supply(), 0);
    assert_eq!(ledger.events().len(), 1);
    assert_eq!(ledger.events()[0].event.kind(), EventKind::RoleGranted);
}

#[test]
fn edge_malformed_accounts_rejected() {
    let mut ledger = ledger();
    for bad in ["", "acct with space", "acct\ttab"] {
        assert!(matches!(
            ledger.mint(&quiz(), &Account::new(bad), 1, "x"),
            Err(LedgerError::InvalidAccount(_))
        ));
        assert!(matches!(
            ledger.mint_skill(&quiz(), &Account::new(bad), "Rust", "ipfs://r"),
            Err(LedgerError::InvalidAccount(_))
        ));
    }
    assert!(SkillLedger::deploy(LedgerConfig::default(), Account::new(" ")).is_err());
    assert_eq!(ledger.next_token_id(), 0);
}

#[test]
fn edge_idempotent_role_changes_emit_nothing() {
    let mut ledger = ledger();
    let events = ledger.events().len();

    assert!(!ledger
        .grant_role(&admin(), &Role::quizmaster(), &quiz())
        .unwrap());
    assert!(!ledger
        .revoke_role(&admin(), &Role::quizmaster(), &user())
        .unwrap());
    assert!(!ledger.renounce_role(&user(), &Role::quizmaster()).unwrap());
    assert_eq!(ledger.events().len(), events);
}

#[test]
fn edge_last_admin_protected() {
    let mut ledger = ledger();
    assert!(matches!(
        ledger.revoke_role(&admin(), &Role::admin(), &admin()),
        Err(LedgerError::LastAdmin(_))
    ));

    let second = Account::new("acct_admin_2");
    ledger.grant_role(&admin(), &Role::admin(), &second).unwrap();
    assert!(ledger.renounce_role(&admin(), &Role::admin()).unwrap());
    assert!(matches!(
        ledger.renounce_role(&second, &Role::admin()),
        Err(LedgerError::LastAdmin(_))
    ));
    assert_eq!(ledger.members(&Role::admin()), vec![second]);
}

#[test]
fn edge_admin_role_cannot_be_delegated() {
    let mut ledger = ledger();
    assert!(matches!(
        ledger.set_role_admin(&admin(), &Role::admin(), &Role::quizmaster()),
        Err(LedgerError::InvalidStateTransition(_))
    ));
    assert!(matches!(
        ledger.set_role_admin(&quiz(), &Role::quizmaster(), &Role::quizmaster()),
        Err(LedgerError::Unauthorized { .. })
    ));
}

#[test]
fn edge_unknown_tokens() {
    let mut ledger = ledger();
    assert!(matches!(ledger.owner_of(0), Err(LedgerError::TokenNotFound(0))));
    assert!(matches!(ledger.token_uri(5), Err(LedgerError::TokenNotFound(5))));
    assert!(matches!(
        ledger.skill_level(u64::MAX),
        Err(LedgerError::TokenNotFound(_))
    ));
    assert!(matches!(
        ledger.transfer_credential(&user(), &admin(), 3),
        Err(LedgerError::TokenNotFound(3))
    ));
}

#[test]
fn edge_empty_labels_are_stored_verbatim() {
    let mut ledger = ledger();
    let id = ledger.mint_skill(&quiz(), &user(), "", "").unwrap();
    assert_eq!(ledger.skill_level(id).unwrap(), "");
    assert_eq!(ledger.token_uri(id).unwrap(), "");
}

#[test]
fn edge_self_transfer_keeps_balance() {
    let mut ledger = ledger();
    ledger.mint(&quiz(), &user(), 10, "x").unwrap();
    ledger.transfer(&user(), &user(), 10).unwrap();
    assert_eq!(ledger.balance_of(&user()), 10);
    assert_eq!(ledger.total_supply(), 10);
}

#[test]
fn edge_approve_zero_clears_allowance() {
    let mut ledger = ledger();
    ledger.approve(&user(), &admin(), 25).unwrap();
    assert_eq!(ledger.allowance(&user(), &admin()), 25);
    ledger.approve(&user(), &admin(), 0).unwrap();
    assert_eq!(ledger.allowance(&user(), &admin()), 0);
}

#[test]
fn edge_amount_parsing_boundaries() {
    assert_eq!(parse_amount("1", 18).unwrap(), 1_000_000_000_000_000_000);
    assert_eq!(parse_amount("0.000000000000000001", 18).unwrap(), 1);
    assert!(parse_amount("0.0000000000000000001", 18).is_err());
    assert!(parse_amount("-1", 18).is_err());
    assert!(parse_amount("", 18).is_err());
    assert_eq!(format_amount(1_500_000_000_000_000_000, 18), "1.5");
    assert_eq!(format_amount(u128::MAX, 0), u128::MAX.to_string());
}
