//! Stress tests: total supply always equals the sum of all balances.
//!
//! Drives a ledger through long seeded sequences of mint, tip, burn,
//! transfer, and allowance operations, checking the invariant after
//! every call, including the failed ones.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skillforge::{Account, LedgerConfig, LedgerError, Role, SkillLedger};

const ACCOUNTS: usize = 12;
const OPERATIONS: usize = 3_000;

fn setup() -> (SkillLedger, Account, Vec<Account>) {
    let admin = Account::new("acct_admin");
    let quizmaster = Account::new("acct_quiz");
    let config = LedgerConfig {
        decimals: 0,
        initial_supply: 10_000,
        ..LedgerConfig::default()
    };
    let mut ledger = SkillLedger::deploy(config, admin.clone()).unwrap();
    ledger
        .grant_role(&admin, &Role::quizmaster(), &quizmaster)
        .unwrap();
    let users = (0..ACCOUNTS)
        .map(|i| Account::new(format!("acct_user_{i}")))
        .collect();
    (ledger, quizmaster, users)
}

fn sum_of_balances(ledger: &SkillLedger) -> u128 {
    ledger.holders().iter().map(|(_, balance)| balance).sum()
}

#[test]
fn stress_supply_matches_balances_after_every_call() {
    let (mut ledger, quizmaster, users) = setup();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut failures = 0usize;

    for _ in 0..OPERATIONS {
        let a = &users[rng.gen_range(0..ACCOUNTS)];
        let b = &users[rng.gen_range(0..ACCOUNTS)];
        let amount = rng.gen_range(0..500u128);

        let result = match rng.gen_range(0..6) {
            0 => ledger.mint(&quizmaster, a, amount, "quiz").map(|_| ()),
            1 => ledger.tip(&quizmaster, a, amount, "tip").map(|_| ()),
            2 => ledger.burn(&quizmaster, a, amount).map(|_| ()),
            3 => ledger.transfer(a, b, amount),
            4 => ledger.approve(a, b, amount),
            _ => ledger.transfer_from(b, a, b, amount),
        };
        if result.is_err() {
            failures += 1;
        }

        assert_eq!(sum_of_balances(&ledger), ledger.total_supply());
    }

    // The sequence exercises both paths.
    assert!(failures > 0);
    assert!(failures < OPERATIONS);
    assert!(ledger.verify_events().is_valid);
}

#[test]
fn stress_overdrawn_burns_leave_balance_untouched() {
    let (mut ledger, quizmaster, users) = setup();
    let mut rng = StdRng::seed_from_u64(42);

    for user in &users {
        ledger
            .mint(&quizmaster, user, rng.gen_range(1..1_000), "seed")
            .unwrap();
    }

    for _ in 0..500 {
        let user = &users[rng.gen_range(0..ACCOUNTS)];
        let balance = ledger.balance_of(user);
        let supply = ledger.total_supply();
        let events = ledger.events().len();

        let excess = balance + rng.gen_range(1..1_000u128);
        assert!(matches!(
            ledger.burn(&quizmaster, user, excess),
            Err(LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(ledger.balance_of(user), balance);
        assert_eq!(ledger.total_supply(), supply);
        assert_eq!(ledger.events().len(), events);
    }
}

#[test]
fn stress_mint_then_burn_everything_returns_to_initial_supply() {
    let (mut ledger, quizmaster, users) = setup();
    let initial = ledger.total_supply();

    for (i, user) in users.iter().enumerate() {
        ledger
            .mint(&quizmaster, user, (i as u128 + 1) * 100, "round")
            .unwrap();
    }
    for user in &users {
        let balance = ledger.balance_of(user);
        assert_eq!(ledger.burn(&quizmaster, user, balance).unwrap(), 0);
    }

    assert_eq!(ledger.total_supply(), initial);
    assert_eq!(ledger.holders().len(), 1);
}
