//! End-to-end ledger workflow: deploy, reward, burn, pause, credentials.
//!
//! Walks one ledger through the life of a quiz platform and checks
//! balances, credentials, and the sealed event log at every step.

use skillforge::credential::CredentialCategory;
use skillforge::{Account, LedgerConfig, LedgerError, LedgerEvent, Role, SkillLedger};

const WHOLE: u128 = 1_000_000_000_000_000_000;

fn last_event(ledger: &SkillLedger) -> &LedgerEvent {
    &ledger.events().last().unwrap().event
}

#[test]
fn full_workflow_quiz_platform() {
    let admin = Account::new("acct_admin");
    let quizmaster = Account::new("acct_quiz");
    let user = Account::new("acct_user");
    let u1 = Account::new("acct_u1");
    let u2 = Account::new("acct_u2");

    // 1. Deploy: the deployer holds the whole initial supply.
    let mut ledger = SkillLedger::deploy(LedgerConfig::default(), admin.clone()).unwrap();
    assert_eq!(ledger.total_supply(), 1_000_000 * WHOLE);
    assert_eq!(ledger.balance_of(&admin), 1_000_000 * WHOLE);
    assert!(ledger.has_role(&Role::admin(), &admin));

    // 2. Grant QUIZMASTER and reward a quiz.
    assert!(ledger
        .grant_role(&admin, &Role::quizmaster(), &quizmaster)
        .unwrap());
    let supply_before = ledger.total_supply();
    ledger
        .mint(&quizmaster, &user, 100, "Quiz completed")
        .unwrap();
    assert_eq!(ledger.balance_of(&user), 100);
    assert_eq!(ledger.total_supply(), supply_before + 100);
    assert_eq!(
        last_event(&ledger),
        &LedgerEvent::XpMinted {
            to: user.clone(),
            amount: 100,
            reason: "Quiz completed".into(),
        }
    );

    // 3. Burn half of it.
    assert_eq!(ledger.burn(&quizmaster, &user, 50).unwrap(), 50);
    assert_eq!(ledger.balance_of(&user), 50);

    // 4. Pause: minting is refused and nothing moves.
    ledger.pause(&admin).unwrap();
    let events_before = ledger.events().len();
    assert!(matches!(
        ledger.mint(&quizmaster, &user, 10, "x"),
        Err(LedgerError::OperationPaused)
    ));
    assert_eq!(ledger.balance_of(&user), 50);
    assert_eq!(ledger.events().len(), events_before);
    ledger.unpause(&admin).unwrap();

    // 5. First skill credential.
    let token_id = ledger
        .mint_skill(&quizmaster, &user, "Solidity Mastery", "ipfs://uri1")
        .unwrap();
    assert_eq!(token_id, 0);
    assert_eq!(ledger.owner_of(0).unwrap(), &user);
    assert_eq!(ledger.token_uri(0).unwrap(), "ipfs://uri1");
    assert_eq!(ledger.skill_level(0).unwrap(), "Solidity Mastery");
    assert_eq!(
        last_event(&ledger),
        &LedgerEvent::SkillMinted {
            to: user.clone(),
            token_id: 0,
            skill_label: "Solidity Mastery".into(),
            metadata_uri: "ipfs://uri1".into(),
            category: CredentialCategory::Skill,
            issued_by: quizmaster.clone(),
        }
    );

    // 6. Batch issuance in input order, then a mismatched batch.
    let ids = ledger
        .batch_mint(
            &quizmaster,
            &[u1.clone(), u2.clone()],
            &["Python", "JavaScript"],
            &["uri1", "uri2"],
        )
        .unwrap();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(ledger.owner_of(1).unwrap(), &u1);
    assert_eq!(ledger.skill_level(1).unwrap(), "Python");
    assert_eq!(ledger.owner_of(2).unwrap(), &u2);
    assert_eq!(ledger.skill_level(2).unwrap(), "JavaScript");

    let err = ledger
        .batch_mint(&quizmaster, &[u1.clone()], &["Python", "JS"], &["uri1"])
        .unwrap_err();
    assert!(matches!(err, LedgerError::ArrayLengthMismatch { .. }));
    assert_eq!(ledger.next_token_id(), 3);

    // The whole history verifies.
    let report = ledger.verify_events();
    assert!(report.is_valid, "errors: {:?}", report.errors);
}

#[test]
fn full_workflow_revocation_is_immediate() {
    let admin = Account::new("acct_admin");
    let quizmaster = Account::new("acct_quiz");
    let user = Account::new("acct_user");
    let mut ledger = SkillLedger::deploy(LedgerConfig::default(), admin.clone()).unwrap();

    ledger
        .grant_role(&admin, &Role::quizmaster(), &quizmaster)
        .unwrap();
    ledger.tip(&quizmaster, &user, 5, "streak").unwrap();

    ledger
        .revoke_role(&admin, &Role::quizmaster(), &quizmaster)
        .unwrap();
    assert!(matches!(
        ledger.tip(&quizmaster, &user, 5, "streak"),
        Err(LedgerError::Unauthorized { .. })
    ));
    assert!(matches!(
        ledger.mint_skill(&quizmaster, &user, "Rust", "ipfs://rust"),
        Err(LedgerError::Unauthorized { .. })
    ));
    assert_eq!(ledger.balance_of(&user), 5);
}

#[test]
fn full_workflow_allowance_and_credential_transfer() {
    let admin = Account::new("acct_admin");
    let quizmaster = Account::new("acct_quiz");
    let alice = Account::new("acct_alice");
    let bob = Account::new("acct_bob");
    let mut ledger = SkillLedger::deploy(LedgerConfig::default(), admin.clone()).unwrap();
    ledger
        .grant_role(&admin, &Role::quizmaster(), &quizmaster)
        .unwrap();

    ledger.mint(&quizmaster, &alice, 300, "onboarding").unwrap();
    ledger.approve(&alice, &bob, 200).unwrap();
    ledger.transfer_from(&bob, &alice, &bob, 150).unwrap();
    assert_eq!(ledger.balance_of(&alice), 150);
    assert_eq!(ledger.balance_of(&bob), 150);
    assert_eq!(ledger.allowance(&alice, &bob), 50);
    assert!(matches!(
        ledger.transfer_from(&bob, &alice, &bob, 100),
        Err(LedgerError::InsufficientAllowance { .. })
    ));

    let token = ledger
        .mint_language_hero(&quizmaster, &alice, "Spanish", "ipfs://es")
        .unwrap();
    assert!(matches!(
        ledger.transfer_credential(&bob, &bob, token),
        Err(LedgerError::NotTokenOwner { .. })
    ));
    ledger.transfer_credential(&alice, &bob, token).unwrap();
    assert_eq!(ledger.owner_of(token).unwrap(), &bob);
    assert_eq!(ledger.credential(token).unwrap().category, CredentialCategory::LanguageHero);
    assert_eq!(ledger.credential_count(&alice), 0);
    assert_eq!(ledger.credential_count(&bob), 1);
}

#[test]
fn full_workflow_role_admin_delegation() {
    let admin = Account::new("acct_admin");
    let lead = Account::new("acct_lead");
    let quizmaster = Account::new("acct_quiz");
    let mut ledger = SkillLedger::deploy(LedgerConfig::default(), admin.clone()).unwrap();

    let leads = Role::new("QUIZ_LEAD");
    ledger.grant_role(&admin, &leads, &lead).unwrap();
    ledger
        .set_role_admin(&admin, &Role::quizmaster(), &leads)
        .unwrap();
    assert_eq!(ledger.role_admin(&Role::quizmaster()), leads);

    // The lead now manages quizmasters; other accounts cannot.
    assert!(ledger
        .grant_role(&lead, &Role::quizmaster(), &quizmaster)
        .unwrap());
    assert!(matches!(
        ledger.revoke_role(&quizmaster, &Role::quizmaster(), &quizmaster),
        Err(LedgerError::Unauthorized { .. })
    ));

    // ADMIN keeps authority over every role.
    assert!(ledger
        .revoke_role(&admin, &Role::quizmaster(), &quizmaster)
        .unwrap());

    // The only admin cannot walk away.
    assert!(matches!(
        ledger.renounce_role(&admin, &Role::admin()),
        Err(LedgerError::LastAdmin(_))
    ));
}
