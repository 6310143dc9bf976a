//! Stress tests: credential token ids are gapless and follow call order.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skillforge::{Account, LedgerConfig, LedgerError, LedgerEvent, Role, SkillLedger};

fn setup(max_batch_size: usize) -> (SkillLedger, Account) {
    let admin = Account::new("acct_admin");
    let quizmaster = Account::new("acct_quiz");
    let config = LedgerConfig {
        max_batch_size,
        ..LedgerConfig::default()
    };
    let mut ledger = SkillLedger::deploy(config, admin.clone()).unwrap();
    ledger
        .grant_role(&admin, &Role::quizmaster(), &quizmaster)
        .unwrap();
    (ledger, quizmaster)
}

fn minted_ids(ledger: &SkillLedger) -> Vec<u64> {
    ledger
        .events()
        .iter()
        .filter_map(|r| match &r.event {
            LedgerEvent::SkillMinted { token_id, .. } => Some(*token_id),
            _ => None,
        })
        .collect()
}

#[test]
fn stress_mixed_issuance_is_gapless() {
    let (mut ledger, quizmaster) = setup(100);
    let mut rng = StdRng::seed_from_u64(7);
    let mut expected_owners = Vec::new();

    for round in 0..400 {
        let to = Account::new(format!("acct_learner_{}", rng.gen_range(0..20)));
        match rng.gen_range(0..4) {
            0 => {
                let id = ledger
                    .mint_skill(&quizmaster, &to, "Rust", "ipfs://rust")
                    .unwrap();
                assert_eq!(id, expected_owners.len() as u64);
                expected_owners.push(to);
            }
            1 => {
                let id = ledger
                    .mint_language_hero(&quizmaster, &to, "Spanish", "ipfs://es")
                    .unwrap();
                assert_eq!(id, expected_owners.len() as u64);
                expected_owners.push(to);
            }
            2 => {
                let size = rng.gen_range(1..8);
                let recipients: Vec<Account> = (0..size)
                    .map(|i| Account::new(format!("acct_batch_{round}_{i}")))
                    .collect();
                let skills = vec!["Go"; size];
                let uris = vec!["ipfs://go"; size];
                let ids = ledger
                    .batch_mint(&quizmaster, &recipients, &skills, &uris)
                    .unwrap();
                let start = expected_owners.len() as u64;
                assert_eq!(ids, (start..start + size as u64).collect::<Vec<_>>());
                expected_owners.extend(recipients);
            }
            _ => {
                // Mismatched batch: no ids consumed.
                let before = ledger.next_token_id();
                let result = ledger.batch_mint(&quizmaster, &[to], &["a", "b"], &["u"]);
                assert!(matches!(
                    result,
                    Err(LedgerError::ArrayLengthMismatch { .. })
                ));
                assert_eq!(ledger.next_token_id(), before);
            }
        }
    }

    assert_eq!(ledger.next_token_id(), expected_owners.len() as u64);
    for (id, owner) in expected_owners.iter().enumerate() {
        assert_eq!(ledger.owner_of(id as u64).unwrap(), owner);
    }
    assert_eq!(
        minted_ids(&ledger),
        (0..expected_owners.len() as u64).collect::<Vec<_>>()
    );
}

#[test]
fn stress_oversized_batch_consumes_nothing() {
    let (mut ledger, quizmaster) = setup(16);
    let recipients: Vec<Account> = (0..17)
        .map(|i| Account::new(format!("acct_{i}")))
        .collect();
    let skills = vec!["Rust"; 17];
    let uris = vec!["ipfs://rust"; 17];

    assert!(matches!(
        ledger.batch_mint(&quizmaster, &recipients, &skills, &uris),
        Err(LedgerError::BatchTooLarge { size: 17, max: 16 })
    ));
    assert_eq!(ledger.next_token_id(), 0);

    let ids = ledger
        .batch_mint(&quizmaster, &recipients[..16], &skills[..16], &uris[..16])
        .unwrap();
    assert_eq!(ids.len(), 16);
    assert_eq!(ledger.next_token_id(), 16);
}

#[test]
fn stress_batch_with_bad_recipient_is_atomic() {
    let (mut ledger, quizmaster) = setup(100);
    ledger
        .mint_skill(&quizmaster, &Account::new("acct_first"), "Rust", "ipfs://r")
        .unwrap();
    let events = ledger.events().len();

    let recipients = vec![
        Account::new("acct_ok_1"),
        Account::new("acct_ok_2"),
        Account::new("not valid"),
    ];
    let result = ledger.batch_mint(&quizmaster, &recipients, &["a", "b", "c"], &["1", "2", "3"]);
    assert!(matches!(result, Err(LedgerError::InvalidAccount(_))));
    assert_eq!(ledger.next_token_id(), 1);
    assert_eq!(ledger.events().len(), events);
    assert_eq!(ledger.credential_count(&Account::new("acct_ok_1")), 0);
}

#[test]
fn stress_empty_batch_is_a_no_op() {
    let (mut ledger, quizmaster) = setup(100);
    ledger
        .mint_skill(&quizmaster, &Account::new("acct_first"), "Rust", "ipfs://rust")
        .unwrap();
    let events = ledger.events().len();

    let none: [&str; 0] = [];
    let ids = ledger.batch_mint(&quizmaster, &[], &none, &none).unwrap();
    assert!(ids.is_empty());
    assert_eq!(ledger.next_token_id(), 1);
    assert_eq!(ledger.events().len(), events);

    // Role and gate checks still apply to an empty batch.
    assert!(matches!(
        ledger.batch_mint(&Account::new("acct_first"), &[], &none, &none),
        Err(LedgerError::Unauthorized { .. })
    ));
    ledger.pause(&Account::new("acct_admin")).unwrap();
    assert!(matches!(
        ledger.batch_mint(&quizmaster, &[], &none, &none),
        Err(LedgerError::OperationPaused)
    ));
}
