//! SkillForge CLI — `sfx` command.
//!
//! Provides a command-line interface for deploying a ledger, issuing XP and
//! skill credentials, managing roles and the pause gate, and auditing the
//! event log.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use skillforge::config::resolve_home;
use skillforge::event::{replay, verify_log};
use skillforge::storage::{load_key, load_snapshot};
use skillforge::units::{format_amount, parse_amount};
use skillforge::{
    Account, EventKind, EventQuery, LedgerConfig, LedgerHome, Role, SkillCredential, SkillLedger,
    SortOrder,
};

// ── Time formatting helpers ───────────────────────────────────────────────────

fn micros_to_datetime(micros: u64) -> String {
    let secs = (micros / 1_000_000) as i64;
    chrono::DateTime::from_timestamp(secs, 0)
        .unwrap_or(chrono::DateTime::UNIX_EPOCH)
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string()
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// SkillForge CLI — run a learning platform's XP ledger and skill
/// credential registry.
#[derive(Parser, Debug)]
#[command(
    name = "sfx",
    about = "SkillForge CLI",
    version,
    long_about = "sfx — SkillForge CLI\n\nIssue XP and skill credentials, manage roles and the pause gate,\nand audit the signed event log."
)]
struct Cli {
    /// Ledger directory (default: $SKILLFORGE_HOME or ~/.skillforge)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Deploy a new ledger
    Init {
        /// Account that receives ADMIN and the initial supply
        #[arg(long)]
        deployer: String,

        /// JSON config file (name, symbol, decimals, initial_supply, max_batch_size)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show ledger summary
    Status,

    /// XP balances and issuance
    Xp {
        #[command(subcommand)]
        subcommand: XpCommands,
    },

    /// Skill credentials
    Skill {
        #[command(subcommand)]
        subcommand: SkillCommands,
    },

    /// Role membership
    Role {
        #[command(subcommand)]
        subcommand: RoleCommands,
    },

    /// Halt all gated operations (ADMIN)
    Pause {
        #[arg(long)]
        caller: String,
    },

    /// Resume gated operations (ADMIN)
    Unpause {
        #[arg(long)]
        caller: String,
    },

    /// Inspect, verify, and export the event log
    Events {
        #[command(subcommand)]
        subcommand: EventCommands,
    },
}

#[derive(Subcommand, Debug)]
enum XpCommands {
    /// Mint new XP (QUIZMASTER)
    Mint {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        to: String,
        /// Amount in whole XP; fractions up to the ledger's decimals
        amount: String,
        #[arg(long, default_value = "")]
        reason: String,
    },

    /// Reward an account with new XP (QUIZMASTER)
    Tip {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        to: String,
        amount: String,
        #[arg(long, default_value = "")]
        reason: String,
    },

    /// Destroy XP held by an account (QUIZMASTER)
    Burn {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        from: String,
        amount: String,
    },

    /// Send the caller's own XP
    Transfer {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        to: String,
        amount: String,
    },

    /// Allow a spender to move the caller's XP
    Approve {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        spender: String,
        amount: String,
    },

    /// Move XP on an owner's behalf using an allowance
    TransferFrom {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        amount: String,
    },

    /// Show an account's balance
    Balance { account: String },

    /// Show total supply
    Supply,
}

#[derive(Subcommand, Debug)]
enum SkillCommands {
    /// Issue a skill credential (QUIZMASTER)
    Mint {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        skill: String,
        #[arg(long)]
        uri: String,
    },

    /// Issue a language-mastery credential (QUIZMASTER)
    Hero {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        language: String,
        #[arg(long)]
        uri: String,
    },

    /// Issue several skill credentials at once (QUIZMASTER)
    ///
    /// Repeat --to, --skill and --uri; the i-th of each form one credential.
    Batch {
        #[arg(long)]
        caller: String,
        #[arg(long = "to")]
        recipients: Vec<String>,
        #[arg(long = "skill")]
        skills: Vec<String>,
        #[arg(long = "uri")]
        uris: Vec<String>,
    },

    /// Hand a credential the caller owns to another account
    Transfer {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        to: String,
        token_id: u64,
    },

    /// Show one credential
    Show { token_id: u64 },

    /// List credentials
    List {
        /// Only credentials held by this account
        #[arg(long)]
        owner: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum RoleCommands {
    /// Grant a role
    Grant {
        #[arg(long)]
        caller: String,
        role: String,
        account: String,
    },

    /// Revoke a role
    Revoke {
        #[arg(long)]
        caller: String,
        role: String,
        account: String,
    },

    /// Drop one of the caller's own roles
    Renounce {
        #[arg(long)]
        caller: String,
        role: String,
    },

    /// Check whether an account holds a role
    Check { role: String, account: String },

    /// List a role's members
    Members { role: String },

    /// Change which role grants and revokes a role (ADMIN)
    SetAdmin {
        #[arg(long)]
        caller: String,
        role: String,
        admin_role: String,
    },
}

#[derive(Subcommand, Debug)]
enum EventCommands {
    /// List events
    List {
        /// Filter by kind (e.g. xp_minted, skill_minted, role_granted)
        #[arg(long)]
        kind: Option<String>,

        /// Filter by any account the event mentions
        #[arg(long)]
        account: Option<String>,

        /// Maximum number of events to show
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Show oldest first
        #[arg(long)]
        oldest_first: bool,
    },

    /// Verify hashes, signatures, and chain links of the stored log
    Verify,

    /// Write unexported events to the events directory
    Export,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let verbose = cli.verbose;
    let home = LedgerHome::new(resolve_home(cli.home.as_deref()));

    let result = match cli.command {
        Commands::Init { deployer, config } => cmd_init(&home, &deployer, config.as_deref(), verbose),
        Commands::Status => cmd_status(&home, verbose),
        Commands::Xp { subcommand } => match subcommand {
            XpCommands::Mint {
                caller,
                to,
                amount,
                reason,
            } => cmd_xp_issue(&home, IssueKind::Mint, &caller, &to, &amount, &reason),
            XpCommands::Tip {
                caller,
                to,
                amount,
                reason,
            } => cmd_xp_issue(&home, IssueKind::Tip, &caller, &to, &amount, &reason),
            XpCommands::Burn {
                caller,
                from,
                amount,
            } => cmd_xp_burn(&home, &caller, &from, &amount),
            XpCommands::Transfer { caller, to, amount } => {
                cmd_xp_transfer(&home, &caller, &to, &amount)
            }
            XpCommands::Approve {
                caller,
                spender,
                amount,
            } => cmd_xp_approve(&home, &caller, &spender, &amount),
            XpCommands::TransferFrom {
                caller,
                from,
                to,
                amount,
            } => cmd_xp_transfer_from(&home, &caller, &from, &to, &amount),
            XpCommands::Balance { account } => cmd_xp_balance(&home, &account),
            XpCommands::Supply => cmd_xp_supply(&home),
        },
        Commands::Skill { subcommand } => match subcommand {
            SkillCommands::Mint {
                caller,
                to,
                skill,
                uri,
            } => cmd_skill_mint(&home, &caller, &to, &skill, &uri, false),
            SkillCommands::Hero {
                caller,
                to,
                language,
                uri,
            } => cmd_skill_mint(&home, &caller, &to, &language, &uri, true),
            SkillCommands::Batch {
                caller,
                recipients,
                skills,
                uris,
            } => cmd_skill_batch(&home, &caller, &recipients, &skills, &uris),
            SkillCommands::Transfer {
                caller,
                to,
                token_id,
            } => cmd_skill_transfer(&home, &caller, &to, token_id),
            SkillCommands::Show { token_id } => cmd_skill_show(&home, token_id),
            SkillCommands::List { owner } => cmd_skill_list(&home, owner.as_deref(), verbose),
        },
        Commands::Role { subcommand } => match subcommand {
            RoleCommands::Grant {
                caller,
                role,
                account,
            } => cmd_role_grant(&home, &caller, &role, &account),
            RoleCommands::Revoke {
                caller,
                role,
                account,
            } => cmd_role_revoke(&home, &caller, &role, &account),
            RoleCommands::Renounce { caller, role } => cmd_role_renounce(&home, &caller, &role),
            RoleCommands::Check { role, account } => cmd_role_check(&home, &role, &account),
            RoleCommands::Members { role } => cmd_role_members(&home, &role),
            RoleCommands::SetAdmin {
                caller,
                role,
                admin_role,
            } => cmd_role_set_admin(&home, &caller, &role, &admin_role),
        },
        Commands::Pause { caller } => cmd_pause(&home, &caller, true),
        Commands::Unpause { caller } => cmd_pause(&home, &caller, false),
        Commands::Events { subcommand } => match subcommand {
            EventCommands::List {
                kind,
                account,
                limit,
                oldest_first,
            } => cmd_events_list(
                &home,
                kind.as_deref(),
                account.as_deref(),
                limit,
                oldest_first,
                verbose,
            ),
            EventCommands::Verify => cmd_events_verify(&home, verbose),
            EventCommands::Export => cmd_events_export(&home),
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

// ── Ledger helpers ────────────────────────────────────────────────────────────

fn open_ledger(home: &LedgerHome) -> Result<SkillLedger> {
    home.open()
        .with_context(|| format!("failed to open ledger at {}", home.root().display()))
}

/// Open the ledger, apply one mutation, and commit it under the home's lock.
fn mutate<T>(
    home: &LedgerHome,
    op: impl FnOnce(&mut SkillLedger) -> skillforge::Result<T>,
) -> Result<(SkillLedger, T)> {
    Ok(home.transact(op)?)
}

fn account(s: &str) -> Result<Account> {
    Ok(Account::parse(s)?)
}

fn role(s: &str) -> Role {
    match s.parse() {
        Ok(role) => role,
        Err(never) => match never {},
    }
}

fn show_amount(ledger: &SkillLedger, units: u128) -> String {
    format!("{} {}", format_amount(units, ledger.decimals()), ledger.symbol())
}

fn print_last_event(ledger: &SkillLedger) {
    if let Some(record) = ledger.events().last() {
        println!("  Event: #{} {} ({})", record.seq, record.event.tag(), record.id);
    }
}

fn print_credential(credential: &SkillCredential) {
    println!("Credential #{}", credential.token_id);
    println!("  Owner:     {}", credential.owner);
    println!("  Skill:     {}", credential.skill_label);
    println!("  Category:  {}", credential.category);
    println!("  URI:       {}", credential.metadata_uri);
    println!("  Issued by: {}", credential.issued_by);
    println!("  Issued at: {}", micros_to_datetime(credential.issued_at));
}

// ── Command implementations ───────────────────────────────────────────────────

/// `sfx init --deployer ACCOUNT [--config FILE]`
fn cmd_init(home: &LedgerHome, deployer: &str, config: Option<&Path>, verbose: bool) -> Result<()> {
    let config = match config {
        Some(path) => LedgerConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => LedgerConfig::default(),
    };
    let deployer = account(deployer)?;

    let ledger = home
        .create(config, deployer.clone())
        .context("failed to create ledger")?;

    println!("Deployed {} ({})", ledger.name(), ledger.symbol());
    println!("  Home:     {}", home.root().display());
    println!("  Deployer: {deployer}");
    println!("  Supply:   {}", show_amount(&ledger, ledger.total_supply()));

    if verbose {
        println!("  Sealing key: {}", ledger.sealing_key().verifying_key_base64());
        println!("  Deployed:    {}", micros_to_datetime(ledger.deployed_at()));
    }
    Ok(())
}

/// `sfx status`
fn cmd_status(home: &LedgerHome, verbose: bool) -> Result<()> {
    let ledger = open_ledger(home)?;

    println!("Ledger: {} ({})", ledger.name(), ledger.symbol());
    println!("  Home:         {}", home.root().display());
    println!("  Deployer:     {}", ledger.deployer());
    println!("  Deployed:     {}", micros_to_datetime(ledger.deployed_at()));
    println!("  State:        {}", ledger.pause_state());
    println!("  Total supply: {}", show_amount(&ledger, ledger.total_supply()));
    println!("  Holders:      {}", ledger.holders().len());
    println!("  Credentials:  {}", ledger.next_token_id());
    println!("  Events:       {}", ledger.events().len());
    for role in [Role::admin(), Role::quizmaster()] {
        let members = ledger.members(&role);
        println!("  {:<13} {}", format!("{role}:"), members.len());
        if verbose {
            for member in members {
                println!("    {member}");
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum IssueKind {
    Mint,
    Tip,
}

/// `sfx xp mint|tip --caller Q --to ACCOUNT AMOUNT [--reason TEXT]`
fn cmd_xp_issue(
    home: &LedgerHome,
    kind: IssueKind,
    caller: &str,
    to: &str,
    amount_str: &str,
    reason: &str,
) -> Result<()> {
    let caller = account(caller)?;
    let to = account(to)?;
    let (ledger, balance) = mutate(home, |ledger| {
        let units = parse_amount(amount_str, ledger.decimals())?;
        match kind {
            IssueKind::Mint => ledger.mint(&caller, &to, units, reason),
            IssueKind::Tip => ledger.tip(&caller, &to, units, reason),
        }
    })?;

    let verb = match kind {
        IssueKind::Mint => "Minted",
        IssueKind::Tip => "Tipped",
    };
    println!("{verb} {amount_str} {} to {to}", ledger.symbol());
    println!("  Balance: {}", show_amount(&ledger, balance));
    print_last_event(&ledger);
    Ok(())
}

/// `sfx xp burn --caller Q --from ACCOUNT AMOUNT`
fn cmd_xp_burn(home: &LedgerHome, caller: &str, from: &str, amount_str: &str) -> Result<()> {
    let caller = account(caller)?;
    let from = account(from)?;
    let (ledger, remaining) = mutate(home, |ledger| {
        let units = parse_amount(amount_str, ledger.decimals())?;
        ledger.burn(&caller, &from, units)
    })?;

    println!("Burned {amount_str} {} from {from}", ledger.symbol());
    println!("  Balance: {}", show_amount(&ledger, remaining));
    print_last_event(&ledger);
    Ok(())
}

/// `sfx xp transfer --caller FROM --to TO AMOUNT`
fn cmd_xp_transfer(home: &LedgerHome, caller: &str, to: &str, amount_str: &str) -> Result<()> {
    let caller = account(caller)?;
    let to = account(to)?;
    let (ledger, ()) = mutate(home, |ledger| {
        let units = parse_amount(amount_str, ledger.decimals())?;
        ledger.transfer(&caller, &to, units)
    })?;

    println!("Transferred {amount_str} {} from {caller} to {to}", ledger.symbol());
    print_last_event(&ledger);
    Ok(())
}

/// `sfx xp approve --caller OWNER --spender SPENDER AMOUNT`
fn cmd_xp_approve(home: &LedgerHome, caller: &str, spender: &str, amount_str: &str) -> Result<()> {
    let caller = account(caller)?;
    let spender = account(spender)?;
    let (ledger, ()) = mutate(home, |ledger| {
        let units = parse_amount(amount_str, ledger.decimals())?;
        ledger.approve(&caller, &spender, units)
    })?;

    println!(
        "Approved {spender} to spend {} of {caller}'s {}",
        amount_str,
        ledger.symbol()
    );
    print_last_event(&ledger);
    Ok(())
}

/// `sfx xp transfer-from --caller SPENDER --from OWNER --to TO AMOUNT`
fn cmd_xp_transfer_from(
    home: &LedgerHome,
    caller: &str,
    from: &str,
    to: &str,
    amount_str: &str,
) -> Result<()> {
    let caller = account(caller)?;
    let from = account(from)?;
    let to = account(to)?;
    let (ledger, ()) = mutate(home, |ledger| {
        let units = parse_amount(amount_str, ledger.decimals())?;
        ledger.transfer_from(&caller, &from, &to, units)
    })?;

    println!("Transferred {amount_str} {} from {from} to {to}", ledger.symbol());
    println!(
        "  Remaining allowance: {}",
        show_amount(&ledger, ledger.allowance(&from, &caller))
    );
    print_last_event(&ledger);
    Ok(())
}

/// `sfx xp balance ACCOUNT`
fn cmd_xp_balance(home: &LedgerHome, account_str: &str) -> Result<()> {
    let ledger = open_ledger(home)?;
    let who = account(account_str)?;
    println!("{who}: {}", show_amount(&ledger, ledger.balance_of(&who)));
    Ok(())
}

/// `sfx xp supply`
fn cmd_xp_supply(home: &LedgerHome) -> Result<()> {
    let ledger = open_ledger(home)?;
    println!("Total supply: {}", show_amount(&ledger, ledger.total_supply()));
    Ok(())
}

/// `sfx skill mint|hero --caller Q --to ACCOUNT --skill|--language LABEL --uri URI`
fn cmd_skill_mint(
    home: &LedgerHome,
    caller: &str,
    to: &str,
    label: &str,
    uri: &str,
    hero: bool,
) -> Result<()> {
    let caller = account(caller)?;
    let to = account(to)?;
    let (ledger, token_id) = mutate(home, |ledger| {
        if hero {
            ledger.mint_language_hero(&caller, &to, label, uri)
        } else {
            ledger.mint_skill(&caller, &to, label, uri)
        }
    })?;

    println!("Issued credential #{token_id} to {to}");
    println!("  Skill: {label}");
    println!("  URI:   {uri}");
    print_last_event(&ledger);
    Ok(())
}

/// `sfx skill batch --caller Q (--to A --skill S --uri U)...`
fn cmd_skill_batch(
    home: &LedgerHome,
    caller: &str,
    recipients: &[String],
    skills: &[String],
    uris: &[String],
) -> Result<()> {
    let caller = account(caller)?;
    let recipients: Vec<Account> = recipients.iter().map(|r| Account::new(r.as_str())).collect();
    let (_, ids) = mutate(home, |ledger| {
        ledger.batch_mint(&caller, &recipients, skills, uris)
    })?;

    println!("Issued {} credentials:", ids.len());
    for (id, to) in ids.iter().zip(&recipients) {
        println!("  #{id} -> {to}");
    }
    Ok(())
}

/// `sfx skill transfer --caller OWNER --to ACCOUNT TOKEN_ID`
fn cmd_skill_transfer(home: &LedgerHome, caller: &str, to: &str, token_id: u64) -> Result<()> {
    let caller = account(caller)?;
    let to = account(to)?;
    let (ledger, ()) = mutate(home, |ledger| ledger.transfer_credential(&caller, &to, token_id))?;

    println!("Transferred credential #{token_id} from {caller} to {to}");
    print_last_event(&ledger);
    Ok(())
}

/// `sfx skill show TOKEN_ID`
fn cmd_skill_show(home: &LedgerHome, token_id: u64) -> Result<()> {
    let ledger = open_ledger(home)?;
    print_credential(ledger.credential(token_id)?);
    Ok(())
}

/// `sfx skill list [--owner ACCOUNT]`
fn cmd_skill_list(home: &LedgerHome, owner: Option<&str>, verbose: bool) -> Result<()> {
    let ledger = open_ledger(home)?;
    let credentials: Vec<&SkillCredential> = match owner {
        Some(owner) => ledger.credentials_of(&account(owner)?),
        None => ledger.all_credentials().collect(),
    };

    println!("Credentials ({}):", credentials.len());
    if credentials.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    println!("  {:<6} {:<14} {:<25} SKILL", "ID", "CATEGORY", "OWNER");
    println!("  {}", "-".repeat(70));
    for credential in credentials {
        println!(
            "  {:<6} {:<14} {:<25} {}",
            credential.token_id,
            credential.category.as_tag(),
            credential.owner,
            credential.skill_label
        );
        if verbose {
            println!("    URI: {}", credential.metadata_uri);
        }
    }
    Ok(())
}

/// `sfx role grant --caller ADMIN ROLE ACCOUNT`
fn cmd_role_grant(home: &LedgerHome, caller: &str, role_str: &str, account_str: &str) -> Result<()> {
    let caller = account(caller)?;
    let role = role(role_str);
    let who = account(account_str)?;
    let (_, granted) = mutate(home, |ledger| ledger.grant_role(&caller, &role, &who))?;

    if granted {
        println!("Granted {role} to {who}");
    } else {
        println!("{who} already holds {role}");
    }
    Ok(())
}

/// `sfx role revoke --caller ADMIN ROLE ACCOUNT`
fn cmd_role_revoke(home: &LedgerHome, caller: &str, role_str: &str, account_str: &str) -> Result<()> {
    let caller = account(caller)?;
    let role = role(role_str);
    let who = account(account_str)?;
    let (_, revoked) = mutate(home, |ledger| ledger.revoke_role(&caller, &role, &who))?;

    if revoked {
        println!("Revoked {role} from {who}");
    } else {
        println!("{who} does not hold {role}");
    }
    Ok(())
}

/// `sfx role renounce --caller ACCOUNT ROLE`
fn cmd_role_renounce(home: &LedgerHome, caller: &str, role_str: &str) -> Result<()> {
    let caller = account(caller)?;
    let role = role(role_str);
    let (_, renounced) = mutate(home, |ledger| ledger.renounce_role(&caller, &role))?;

    if renounced {
        println!("{caller} renounced {role}");
    } else {
        println!("{caller} does not hold {role}");
    }
    Ok(())
}

/// `sfx role check ROLE ACCOUNT`
fn cmd_role_check(home: &LedgerHome, role_str: &str, account_str: &str) -> Result<()> {
    let ledger = open_ledger(home)?;
    let role = role(role_str);
    let who = account(account_str)?;
    if ledger.has_role(&role, &who) {
        println!("{who} holds {role}");
    } else {
        println!("{who} does not hold {role}");
    }
    Ok(())
}

/// `sfx role members ROLE`
fn cmd_role_members(home: &LedgerHome, role_str: &str) -> Result<()> {
    let ledger = open_ledger(home)?;
    let role = role(role_str);
    let members = ledger.members(&role);

    println!("{role} ({} members, admin role {}):", members.len(), ledger.role_admin(&role));
    for member in members {
        println!("  {member}");
    }
    Ok(())
}

/// `sfx role set-admin --caller ADMIN ROLE ADMIN_ROLE`
fn cmd_role_set_admin(
    home: &LedgerHome,
    caller: &str,
    role_str: &str,
    admin_role_str: &str,
) -> Result<()> {
    let caller = account(caller)?;
    let target = role(role_str);
    let admin_role = role(admin_role_str);
    mutate(home, |ledger| ledger.set_role_admin(&caller, &target, &admin_role))?;

    println!("{admin_role} now administers {target}");
    Ok(())
}

/// `sfx pause|unpause --caller ADMIN`
fn cmd_pause(home: &LedgerHome, caller: &str, pause: bool) -> Result<()> {
    let caller = account(caller)?;
    let (ledger, ()) = mutate(home, |ledger| {
        if pause {
            ledger.pause(&caller)
        } else {
            ledger.unpause(&caller)
        }
    })?;

    println!("Ledger {}", ledger.pause_state());
    print_last_event(&ledger);
    Ok(())
}

/// `sfx events list [--kind KIND] [--account ACCOUNT] [--limit N] [--oldest-first]`
fn cmd_events_list(
    home: &LedgerHome,
    kind: Option<&str>,
    account_filter: Option<&str>,
    limit: usize,
    oldest_first: bool,
    verbose: bool,
) -> Result<()> {
    let ledger = open_ledger(home)?;

    let mut query = EventQuery::new().limit(limit).sort(if oldest_first {
        SortOrder::OldestFirst
    } else {
        SortOrder::NewestFirst
    });
    if let Some(tag) = kind {
        let kind = EventKind::from_tag(tag).ok_or_else(|| anyhow!("unknown event kind '{tag}'"))?;
        query = query.kind(kind);
    }
    if let Some(a) = account_filter {
        query = query.account(account(a)?);
    }

    let records = ledger.query_events(&query);
    println!(
        "Events ({} shown, {} total):",
        records.len(),
        ledger.events().len()
    );
    if records.is_empty() {
        println!("  (none match filters)");
        return Ok(());
    }
    println!("  {:<6} {:<24} {:<25} ID", "SEQ", "KIND", "TIME");
    println!("  {}", "-".repeat(90));
    for record in records {
        println!(
            "  {:<6} {:<24} {:<25} {}",
            record.seq,
            record.event.tag(),
            micros_to_datetime(record.recorded_at),
            record.id
        );
        if verbose {
            let json = serde_json::to_string(&record.event).unwrap_or_default();
            println!("    {json}");
        }
    }
    Ok(())
}

/// `sfx events verify`
///
/// Reads the snapshot directly so that a damaged log is reported rather
/// than refused at load time. The stored tables are checked against a
/// replay of the log.
fn cmd_events_verify(home: &LedgerHome, verbose: bool) -> Result<()> {
    let snapshot = load_snapshot(&home.ledger_path()).context("failed to read ledger file")?;
    let key = load_key(&home.key_path()).context("failed to read sealing key")?;

    let report = verify_log(&snapshot.events, key.verifying_key());
    let tables_valid = replay(&snapshot.events).is_ok_and(|tables| {
        tables.roles == snapshot.roles
            && tables.gate == snapshot.pause
            && tables.xp == snapshot.xp
            && tables.credentials == snapshot.credentials
    });
    let mark = |ok: bool| if ok { "VALID" } else { "INVALID" };

    println!("Event log: {} records", report.records_checked);
    println!("  Hashes:     {}", mark(report.hashes_valid));
    println!("  Signatures: {}", mark(report.signatures_valid));
    println!("  Chain:      {}", mark(report.chain_valid));
    println!("  Tables:     {}", mark(tables_valid));
    for error in &report.errors {
        println!("  - {error}");
    }
    if verbose {
        println!("  Verified at: {}", micros_to_datetime(report.verified_at));
    }

    println!();
    if report.is_valid && tables_valid {
        println!("Result: VALID");
        Ok(())
    } else {
        println!("Result: INVALID");
        Err(anyhow!("event log failed verification"))
    }
}

/// `sfx events export`
fn cmd_events_export(home: &LedgerHome) -> Result<()> {
    let ledger = open_ledger(home)?;
    let written = home
        .export_events(&ledger)
        .context("failed to export events")?;
    println!(
        "Exported {written} new events to {}",
        home.events_dir().display()
    );
    Ok(())
}
