//! Stress tests: many callers sharing one ledger behind a mutex.
//!
//! The ledger itself is single-threaded; hosts serialize calls. These
//! tests check that serialized calls from many threads still produce a
//! gapless token sequence, a consistent supply, and a valid event log.
//! The last test shares a ledger home between independent handles, the
//! way separate `sfx` processes do.

use std::sync::{Arc, Mutex};
use std::thread;

use skillforge::{Account, LedgerConfig, LedgerEvent, LedgerHome, Role, SkillLedger};

const THREADS: usize = 8;
const CALLS_PER_THREAD: usize = 50;

fn shared_ledger() -> (Arc<Mutex<SkillLedger>>, Vec<Account>) {
    let admin = Account::new("acct_admin");
    let config = LedgerConfig {
        decimals: 0,
        initial_supply: 0,
        ..LedgerConfig::default()
    };
    let mut ledger = SkillLedger::deploy(config, admin.clone()).unwrap();
    let quizmasters: Vec<Account> = (0..THREADS)
        .map(|i| Account::new(format!("acct_quiz_{i}")))
        .collect();
    for quizmaster in &quizmasters {
        ledger
            .grant_role(&admin, &Role::quizmaster(), quizmaster)
            .unwrap();
    }
    (Arc::new(Mutex::new(ledger)), quizmasters)
}

#[test]
fn stress_concurrent_minting() {
    let (ledger, quizmasters) = shared_ledger();

    let handles: Vec<_> = quizmasters
        .into_iter()
        .enumerate()
        .map(|(t, quizmaster)| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                let learner = Account::new(format!("acct_learner_{t}"));
                let mut ids = Vec::new();
                for i in 0..CALLS_PER_THREAD {
                    let mut guard = ledger.lock().unwrap();
                    guard.mint(&quizmaster, &learner, 10, "quiz").unwrap();
                    let id = guard
                        .mint_skill(&quizmaster, &learner, &format!("skill-{i}"), "ipfs://x")
                        .unwrap();
                    ids.push(id);
                }
                ids
            })
        })
        .collect();

    let mut all_ids: Vec<u64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    all_ids.sort_unstable();

    let total = (THREADS * CALLS_PER_THREAD) as u64;
    assert_eq!(all_ids, (0..total).collect::<Vec<_>>());

    let ledger = ledger.lock().unwrap();
    assert_eq!(ledger.next_token_id(), total);
    assert_eq!(ledger.total_supply(), u128::from(total) * 10);
    for t in 0..THREADS {
        let learner = Account::new(format!("acct_learner_{t}"));
        assert_eq!(ledger.balance_of(&learner), (CALLS_PER_THREAD as u128) * 10);
        assert_eq!(ledger.credential_count(&learner), CALLS_PER_THREAD);
    }

    let report = ledger.verify_events();
    assert!(report.is_valid, "errors: {:?}", report.errors);
}

#[test]
fn stress_concurrent_pause_toggling() {
    let (ledger, quizmasters) = shared_ledger();
    let admin = Account::new("acct_admin");

    let toggler = {
        let ledger = Arc::clone(&ledger);
        thread::spawn(move || {
            for _ in 0..100 {
                let mut guard = ledger.lock().unwrap();
                if guard.is_paused() {
                    guard.unpause(&admin).unwrap();
                } else {
                    guard.pause(&admin).unwrap();
                }
            }
        })
    };

    let quizmaster = quizmasters[0].clone();
    let minter = {
        let ledger = Arc::clone(&ledger);
        thread::spawn(move || {
            let learner = Account::new("acct_learner");
            let mut succeeded = 0u128;
            for _ in 0..200 {
                if ledger
                    .lock()
                    .unwrap()
                    .mint(&quizmaster, &learner, 1, "quiz")
                    .is_ok()
                {
                    succeeded += 1;
                }
            }
            succeeded
        })
    };

    toggler.join().unwrap();
    let succeeded = minter.join().unwrap();

    let ledger = ledger.lock().unwrap();
    // 100 toggles end active.
    assert!(!ledger.is_paused());
    assert_eq!(ledger.total_supply(), succeeded);
    let minted_events = ledger
        .events()
        .iter()
        .filter(|r| matches!(r.event, LedgerEvent::XpMinted { .. }))
        .count();
    assert_eq!(minted_events as u128, succeeded);
}

#[test]
fn stress_concurrent_hosts_share_a_home() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("ledger");
    let admin = Account::new("acct_admin");
    let config = LedgerConfig {
        decimals: 0,
        initial_supply: 0,
        ..LedgerConfig::default()
    };
    let home = LedgerHome::new(root.clone());
    home.create(config, admin.clone()).unwrap();
    home.transact(|l| l.grant_role(&admin, &Role::quizmaster(), &admin))
        .unwrap();

    const HOSTS: usize = 4;
    const CALLS_PER_HOST: usize = 10;
    let handles: Vec<_> = (0..HOSTS)
        .map(|h| {
            let home = LedgerHome::new(root.clone());
            let admin = admin.clone();
            thread::spawn(move || {
                let learner = Account::new(format!("acct_learner_{h}"));
                for _ in 0..CALLS_PER_HOST {
                    home.transact(|l| l.mint(&admin, &learner, 1, "quiz"))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let ledger = home.open().unwrap();
    for h in 0..HOSTS {
        let learner = Account::new(format!("acct_learner_{h}"));
        assert_eq!(ledger.balance_of(&learner), CALLS_PER_HOST as u128);
    }
    assert_eq!(ledger.total_supply(), (HOSTS * CALLS_PER_HOST) as u128);
    // Deployment grant, the quizmaster grant, then every mint.
    assert_eq!(ledger.events().len(), 2 + HOSTS * CALLS_PER_HOST);
    assert!(ledger.verify_events().is_valid);
}
