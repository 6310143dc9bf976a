//! Resilience tests: corrupted files, wrong keys, tampered event logs.

use skillforge::crypto::keys::Ed25519KeyPair;
use skillforge::event::verify_log;
use skillforge::storage::{load_key, load_snapshot, save_snapshot};
use serde_json::{json, Value};
use skillforge::{Account, LedgerConfig, LedgerError, LedgerHome, Role};

fn deployed_home(dir: &std::path::Path) -> LedgerHome {
    let home = LedgerHome::new(dir.join("ledger"));
    let admin = Account::new("acct_admin");
    let quizmaster = Account::new("acct_quiz");
    let mut ledger = home.create(LedgerConfig::default(), admin.clone()).unwrap();
    ledger
        .grant_role(&admin, &Role::quizmaster(), &quizmaster)
        .unwrap();
    for i in 0..20u128 {
        ledger
            .mint(&quizmaster, &Account::new(format!("acct_{i}")), i + 1, "quiz")
            .unwrap();
    }
    for label in ["rust", "go", "zig"] {
        ledger
            .mint_skill(&quizmaster, &Account::new("acct_0"), label, &format!("ipfs://{label}"))
            .unwrap();
    }
    home.commit(&ledger).unwrap();
    home
}

/// Rewrite the stored snapshot without touching the event log.
fn edit_tables(home: &LedgerHome, edit: impl FnOnce(&mut Value)) {
    let text = std::fs::read_to_string(home.ledger_path()).unwrap();
    let mut file: Value = serde_json::from_str(&text).unwrap();
    edit(&mut file["snapshot"]);
    std::fs::write(
        home.ledger_path(),
        serde_json::to_string_pretty(&file).unwrap(),
    )
    .unwrap();
}

fn assert_tables_rejected(home: &LedgerHome) {
    let result = home.open();
    assert!(
        matches!(result, Err(LedgerError::InvalidFileFormat(_))),
        "edited tables should be rejected, got {:?}",
        result.err()
    );
}

#[test]
fn resilience_corrupted_ledger_file_detected() {
    let tmp = tempfile::tempdir().unwrap();
    let home = deployed_home(tmp.path());

    // Corrupt the file by flipping bytes in the middle
    {
        let mut data = std::fs::read(home.ledger_path()).unwrap();
        let mid = data.len() / 2;
        for item in data.iter_mut().skip(mid).take(10) {
            *item ^= 0xFF;
        }
        std::fs::write(home.ledger_path(), data).unwrap();
    }

    assert!(home.open().is_err(), "Corrupted file should fail to load");
}

#[test]
fn resilience_truncated_ledger_file_detected() {
    let tmp = tempfile::tempdir().unwrap();
    let home = deployed_home(tmp.path());

    {
        let data = std::fs::read(home.ledger_path()).unwrap();
        let half = data.len() / 2;
        std::fs::write(home.ledger_path(), &data[..half]).unwrap();
    }

    assert!(matches!(
        home.open(),
        Err(LedgerError::InvalidFileFormat(_))
    ));
}

#[test]
fn resilience_unknown_format_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let home = deployed_home(tmp.path());

    let text = std::fs::read_to_string(home.ledger_path()).unwrap();
    let renamed = text.replacen("skillforge-ledger", "something-else", 1);
    std::fs::write(home.ledger_path(), renamed).unwrap();

    assert!(matches!(
        load_snapshot(&home.ledger_path()),
        Err(LedgerError::InvalidFileFormat(_))
    ));
}

#[test]
fn resilience_garbage_key_file_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let home = deployed_home(tmp.path());

    std::fs::write(home.key_path(), "not hex at all").unwrap();
    assert!(matches!(load_key(&home.key_path()), Err(LedgerError::InvalidKey(_))));
    assert!(home.open().is_err());
}

#[test]
fn resilience_missing_key_file_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let home = deployed_home(tmp.path());

    std::fs::remove_file(home.key_path()).unwrap();
    assert!(home.open().is_err());
}

#[test]
fn resilience_foreign_key_signatures_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let home = deployed_home(tmp.path());
    let snapshot = load_snapshot(&home.ledger_path()).unwrap();

    let stranger = Ed25519KeyPair::generate();
    let report = verify_log(&snapshot.events, stranger.verifying_key());
    assert!(!report.is_valid);
    assert!(!report.signatures_valid);
    assert!(report.hashes_valid);
    assert!(report.chain_valid);
    assert!(matches!(
        report.into_result(),
        Err(LedgerError::SignatureInvalid)
    ));
}

#[test]
fn resilience_reordered_events_detected() {
    let tmp = tempfile::tempdir().unwrap();
    let home = deployed_home(tmp.path());

    let mut snapshot = load_snapshot(&home.ledger_path()).unwrap();
    snapshot.events.swap(5, 6);
    let key = load_key(&home.key_path()).unwrap();
    let report = verify_log(&snapshot.events, key.verifying_key());
    assert!(!report.chain_valid);

    save_snapshot(&snapshot, &home.ledger_path()).unwrap();
    assert!(matches!(home.open(), Err(LedgerError::InvalidChain(_))));
}

#[test]
fn resilience_inflated_balance_table_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let home = deployed_home(tmp.path());

    // The event log is intact but the balance table disagrees with supply.
    let text = std::fs::read_to_string(home.ledger_path()).unwrap();
    let forged = text.replacen("\"acct_0\": \"1\"", "\"acct_0\": \"1000\"", 1);
    assert_ne!(text, forged, "balance entry should be present");
    std::fs::write(home.ledger_path(), forged).unwrap();

    assert!(matches!(
        home.open(),
        Err(LedgerError::InvalidFileFormat(_))
    ));
}

#[test]
fn resilience_forged_admin_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let home = deployed_home(tmp.path());

    edit_tables(&home, |snapshot| {
        snapshot["roles"]["members"]["ADMIN"]
            .as_array_mut()
            .unwrap()
            .push(json!("acct_thief"));
    });
    assert_tables_rejected(&home);
}

#[test]
fn resilience_moved_balance_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let home = deployed_home(tmp.path());

    // Supply still adds up; only the owner changes.
    edit_tables(&home, |snapshot| {
        let balances = snapshot["xp"]["balances"].as_object_mut().unwrap();
        let stolen = balances.remove("acct_19").unwrap();
        balances.insert("acct_thief".into(), stolen);
    });
    assert_tables_rejected(&home);
}

#[test]
fn resilience_credential_id_gap_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let home = deployed_home(tmp.path());

    // Ids {0, 2} with next id 2: the next issuance would overwrite token 2.
    edit_tables(&home, |snapshot| {
        let credentials = &mut snapshot["credentials"];
        credentials["tokens"].as_object_mut().unwrap().remove("1");
        credentials["next_token_id"] = json!(2);
    });
    assert_tables_rejected(&home);
}

#[test]
fn resilience_reassigned_credential_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let home = deployed_home(tmp.path());

    edit_tables(&home, |snapshot| {
        snapshot["credentials"]["tokens"]["0"]["owner"] = json!("acct_thief");
    });
    assert_tables_rejected(&home);
}

#[test]
fn resilience_lifted_pause_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let home = deployed_home(tmp.path());
    let mut ledger = home.open().unwrap();
    ledger.pause(&Account::new("acct_admin")).unwrap();
    home.commit(&ledger).unwrap();

    edit_tables(&home, |snapshot| {
        snapshot["pause"]["state"] = json!("active");
    });
    assert_tables_rejected(&home);
}
