//! Quiz Rewards — deploy a ledger, reward learners, issue credentials,
//! and audit the sealed event log.
//!
//! Run with:
//!   cargo run --example quiz_rewards -p skillforge

use skillforge::query::{EventQuery, SortOrder};
use skillforge::units::{format_amount, parse_amount};
use skillforge::{Account, EventKind, LedgerConfig, LedgerError, Role, SkillLedger};

fn main() {
    // ── 1. Deploy ───────────────────────────────────────────────────────────
    //
    // The deployer becomes the only ADMIN and receives the initial supply.
    let admin = Account::new("acct_platform");
    let mut ledger = SkillLedger::deploy(LedgerConfig::default(), admin.clone())
        .expect("default config is valid");
    println!("Deployed {} ({})", ledger.name(), ledger.symbol());
    println!(
        "  Supply: {} {}",
        format_amount(ledger.total_supply(), ledger.decimals()),
        ledger.symbol()
    );
    println!();

    // ── 2. Appoint a quizmaster ─────────────────────────────────────────────
    let quizmaster = Account::new("acct_quiz_engine");
    ledger
        .grant_role(&admin, &Role::quizmaster(), &quizmaster)
        .expect("admin administers QUIZMASTER");
    println!("Granted {} to {quizmaster}", Role::QUIZMASTER);
    println!();

    // ── 3. Reward learners ──────────────────────────────────────────────────
    let alice = Account::new("acct_alice");
    let bob = Account::new("acct_bob");
    let reward = parse_amount("12.5", ledger.decimals()).expect("valid amount");
    ledger
        .mint(&quizmaster, &alice, reward, "Quiz completed")
        .expect("quizmaster may mint");
    ledger
        .tip(&quizmaster, &bob, reward / 5, "Helpful answer")
        .expect("quizmaster may tip");
    for who in [&alice, &bob] {
        println!(
            "  {who}: {} XP",
            format_amount(ledger.balance_of(who), ledger.decimals())
        );
    }
    println!();

    // ── 4. Issue credentials ────────────────────────────────────────────────
    let first = ledger
        .mint_skill(&quizmaster, &alice, "Rust Ownership", "ipfs://rust-ownership")
        .expect("credential issued");
    let batch = ledger
        .batch_mint(
            &quizmaster,
            &[alice.clone(), bob.clone()],
            &["Async Rust", "Error Handling"],
            &["ipfs://async", "ipfs://errors"],
        )
        .expect("batch issued");
    println!("Issued credential #{first} and batch {batch:?}");

    // A learner cannot issue credentials.
    match ledger.mint_skill(&alice, &alice, "Self-awarded", "ipfs://nope") {
        Err(LedgerError::Unauthorized { role, .. }) => {
            println!("  Refused self-award: missing {role}")
        }
        other => panic!("unexpected result: {other:?}"),
    }
    println!();

    // ── 5. Pause during maintenance ─────────────────────────────────────────
    ledger.pause(&admin).expect("admin may pause");
    let paused = ledger.mint(&quizmaster, &alice, reward, "during maintenance");
    println!("Mint while paused: {}", paused.unwrap_err());
    ledger.unpause(&admin).expect("admin may unpause");
    println!();

    // ── 6. Audit ────────────────────────────────────────────────────────────
    let query = EventQuery::new()
        .kind(EventKind::SkillMinted)
        .sort(SortOrder::OldestFirst);
    for record in ledger.query_events(&query) {
        println!("  #{:<3} {} {}", record.seq, record.event.tag(), record.id);
    }

    let report = ledger.verify_events();
    println!(
        "Event log: {} records, {}",
        report.records_checked,
        if report.is_valid { "VALID" } else { "INVALID" }
    );
}
