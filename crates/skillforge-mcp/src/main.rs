//! SkillForge MCP Server.
//!
//! Implements a stdio-based Model Context Protocol server that exposes
//! SkillForge ledger operations to AI agents via JSON-RPC 2.0.
//!
//! # Protocol
//!
//! Reads newline-delimited JSON-RPC 2.0 requests from stdin and writes
//! responses to stdout. Each request and response is a single line.
//!
//! # State
//!
//! Every tool call loads the ledger from the home directory, applies at
//! most one mutation, and commits it before responding. Mutations hold the
//! home's lock from load to commit, so this server and any `sfx` process
//! sharing the home apply their calls in one total order.
//! Ledger failures are reported as tool errors whose text starts with the
//! error kind (e.g. `unauthorized: ...`).

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use serde_json::{json, Value};

use skillforge::config::resolve_home;
use skillforge::units::{format_amount, parse_amount};
use skillforge::{
    Account, EventKind, EventQuery, LedgerConfig, LedgerError, LedgerHome, Role, SkillCredential,
    SkillLedger, SortOrder,
};

// ── Constants ─────────────────────────────────────────────────────────────────

/// MCP protocol version supported.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// Default number of events returned by `events_list`.
const DEFAULT_EVENT_LIMIT: usize = 20;

// ── JSON-RPC helpers ──────────────────────────────────────────────────────────

fn ok_result(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

fn tool_ok(id: Value, text: impl Into<String>) -> Value {
    ok_result(
        id,
        json!({
            "content": [{"type": "text", "text": text.into()}]
        }),
    )
}

fn tool_error(id: Value, text: impl Into<String>) -> Value {
    ok_result(
        id,
        json!({
            "content": [{"type": "text", "text": text.into()}],
            "isError": true
        }),
    )
}

fn rpc_error(id: Value, code: i64, message: impl Into<String>) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message.into()
        }
    })
}

// ── Argument helpers ──────────────────────────────────────────────────────────

/// Text of a successful tool call, or the text of a tool error.
type ToolResult = Result<String, String>;

fn ledger_error(e: LedgerError) -> String {
    format!("{}: {e}", e.kind())
}

fn arg_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, String> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing required argument '{key}'"))
}

fn arg_account(args: &Value, key: &str) -> Result<Account, String> {
    Account::parse(arg_str(args, key)?).map_err(ledger_error)
}

fn arg_role(args: &Value, key: &str) -> Result<Role, String> {
    Ok(Role::new(arg_str(args, key)?.trim().to_ascii_uppercase()))
}

fn arg_u64(args: &Value, key: &str) -> Result<u64, String> {
    args.get(key)
        .and_then(Value::as_u64)
        .ok_or_else(|| format!("missing or invalid integer argument '{key}'"))
}

/// Amounts arrive as decimal strings (`"1.5"`) or JSON numbers.
fn arg_amount(args: &Value, key: &str) -> Result<String, String> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(format!("missing required argument '{key}'")),
    }
}

fn arg_strings(args: &Value, key: &str) -> Result<Vec<String>, String> {
    let items = args
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| format!("missing required array argument '{key}'"))?;
    items
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| format!("'{key}' must contain only strings"))
        })
        .collect()
}

fn show_amount(ledger: &SkillLedger, units: u128) -> String {
    format!("{} {}", format_amount(units, ledger.decimals()), ledger.symbol())
}

fn last_event_line(ledger: &SkillLedger) -> String {
    ledger
        .events()
        .last()
        .map(|r| format!("\nEvent:   #{} {} ({})", r.seq, r.event.tag(), r.id))
        .unwrap_or_default()
}

fn credential_json(credential: &SkillCredential) -> Value {
    json!({
        "token_id": credential.token_id,
        "owner": credential.owner.as_str(),
        "skill_label": credential.skill_label,
        "metadata_uri": credential.metadata_uri,
        "category": credential.category.as_tag(),
        "issued_by": credential.issued_by.as_str(),
        "issued_at": skillforge::time::micros_to_rfc3339(credential.issued_at),
    })
}

// ── CLI arguments ─────────────────────────────────────────────────────────────

/// SkillForge MCP server (JSON-RPC 2.0 over stdio).
#[derive(Parser, Debug)]
#[command(name = "skillforge-mcp", version)]
struct Args {
    /// Ledger directory (default: $SKILLFORGE_HOME or ~/.skillforge)
    #[arg(long)]
    home: Option<PathBuf>,
}

// ── MCP Server ────────────────────────────────────────────────────────────────

struct McpServer {
    home: LedgerHome,
}

impl McpServer {
    fn new(home: LedgerHome) -> Self {
        Self { home }
    }

    /// Route a JSON-RPC request to the appropriate handler.
    fn handle_request(&self, request: Value) -> Value {
        let id = request.get("id").cloned().unwrap_or(Value::Null);
        let method = match request.get("method").and_then(|m| m.as_str()) {
            Some(m) => m.to_string(),
            None => return rpc_error(id, -32600, "missing method"),
        };
        let params = request
            .get("params")
            .cloned()
            .unwrap_or(Value::Object(Default::default()));

        match method.as_str() {
            "initialize" => self.handle_initialize(id),
            // Notification; no response.
            "initialized" | "notifications/initialized" => Value::Null,
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, &params),
            "resources/list" => self.handle_resources_list(id),
            "resources/read" => self.handle_resources_read(id, &params),
            "ping" => ok_result(id, json!({})),
            _ => rpc_error(id, -32601, format!("method not found: {method}")),
        }
    }

    // ── initialize ────────────────────────────────────────────────────────────

    fn handle_initialize(&self, id: Value) -> Value {
        ok_result(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {},
                    "resources": {}
                },
                "serverInfo": {
                    "name": "skillforge-mcp",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    // ── tools/list ────────────────────────────────────────────────────────────

    fn handle_tools_list(&self, id: Value) -> Value {
        let caller = json!({"type": "string", "description": "Account performing the call"});
        let account = json!({"type": "string", "description": "Target account"});
        let amount = json!({
            "type": "string",
            "description": "Amount in whole XP, fractions allowed up to the ledger's decimals"
        });
        let role = json!({"type": "string", "description": "Role name (ADMIN, QUIZMASTER, ...)"});

        let tool = |name: &str, description: &str, required: &[&str], properties: Value| {
            json!({
                "name": name,
                "description": description,
                "inputSchema": {
                    "type": "object",
                    "required": required,
                    "properties": properties
                }
            })
        };

        let tools = vec![
            tool(
                "ledger_init",
                "Deploy a new ledger. The deployer receives ADMIN and the initial supply.",
                &["deployer"],
                json!({
                    "deployer": account,
                    "name": {"type": "string", "description": "Token name (default: Skill XP)"},
                    "symbol": {"type": "string", "description": "Token symbol (default: XP)"},
                    "decimals": {"type": "integer", "description": "Decimal places (default: 18)"},
                    "initial_supply": {"type": "string", "description": "Initial supply in whole units (default: 1000000)"},
                    "max_batch_size": {"type": "integer", "description": "Largest allowed batch mint (default: 100)"}
                }),
            ),
            tool(
                "ledger_status",
                "Summarize the ledger: supply, pause state, credentials, roles, events.",
                &[],
                json!({}),
            ),
            tool(
                "xp_mint",
                "Mint new XP to an account (QUIZMASTER).",
                &["caller", "to", "amount"],
                json!({"caller": caller, "to": account, "amount": amount,
                       "reason": {"type": "string", "description": "Recorded verbatim in the event"}}),
            ),
            tool(
                "xp_tip",
                "Reward an account with new XP (QUIZMASTER).",
                &["caller", "to", "amount"],
                json!({"caller": caller, "to": account, "amount": amount,
                       "reason": {"type": "string", "description": "Recorded verbatim in the event"}}),
            ),
            tool(
                "xp_burn",
                "Destroy XP held by an account (QUIZMASTER).",
                &["caller", "from", "amount"],
                json!({"caller": caller, "from": account, "amount": amount}),
            ),
            tool(
                "xp_transfer",
                "Send the caller's own XP to another account.",
                &["caller", "to", "amount"],
                json!({"caller": caller, "to": account, "amount": amount}),
            ),
            tool(
                "xp_approve",
                "Allow a spender to move up to an amount of the caller's XP.",
                &["caller", "spender", "amount"],
                json!({"caller": caller, "spender": account, "amount": amount}),
            ),
            tool(
                "xp_transfer_from",
                "Move XP from an owner to a recipient using the caller's allowance.",
                &["caller", "from", "to", "amount"],
                json!({"caller": caller, "from": account, "to": account, "amount": amount}),
            ),
            tool(
                "xp_balance",
                "Show an account's XP balance.",
                &["account"],
                json!({"account": account}),
            ),
            tool(
                "xp_allowance",
                "Show how much a spender may still move on an owner's behalf.",
                &["owner", "spender"],
                json!({"owner": account, "spender": account}),
            ),
            tool(
                "skill_mint",
                "Issue a skill credential (QUIZMASTER).",
                &["caller", "to", "skill", "uri"],
                json!({"caller": caller, "to": account,
                       "skill": {"type": "string", "description": "Skill label"},
                       "uri": {"type": "string", "description": "Metadata URI"}}),
            ),
            tool(
                "skill_hero",
                "Issue a language-mastery credential (QUIZMASTER).",
                &["caller", "to", "language", "uri"],
                json!({"caller": caller, "to": account,
                       "language": {"type": "string", "description": "Language mastered"},
                       "uri": {"type": "string", "description": "Metadata URI"}}),
            ),
            tool(
                "skill_batch",
                "Issue one skill credential per index of three equal-length arrays (QUIZMASTER).",
                &["caller", "recipients", "skills", "uris"],
                json!({"caller": caller,
                       "recipients": {"type": "array", "items": {"type": "string"}},
                       "skills": {"type": "array", "items": {"type": "string"}},
                       "uris": {"type": "array", "items": {"type": "string"}}}),
            ),
            tool(
                "skill_transfer",
                "Hand a credential the caller owns to another account.",
                &["caller", "to", "token_id"],
                json!({"caller": caller, "to": account,
                       "token_id": {"type": "integer", "description": "Credential token id"}}),
            ),
            tool(
                "skill_show",
                "Show one credential.",
                &["token_id"],
                json!({"token_id": {"type": "integer", "description": "Credential token id"}}),
            ),
            tool(
                "skill_list",
                "List credentials, optionally only those held by one owner.",
                &[],
                json!({"owner": account}),
            ),
            tool(
                "role_grant",
                "Grant a role (caller needs the role's admin role).",
                &["caller", "role", "account"],
                json!({"caller": caller, "role": role, "account": account}),
            ),
            tool(
                "role_revoke",
                "Revoke a role (caller needs the role's admin role).",
                &["caller", "role", "account"],
                json!({"caller": caller, "role": role, "account": account}),
            ),
            tool(
                "role_renounce",
                "Drop one of the caller's own roles.",
                &["caller", "role"],
                json!({"caller": caller, "role": role}),
            ),
            tool(
                "role_check",
                "Check whether an account holds a role.",
                &["role", "account"],
                json!({"role": role, "account": account}),
            ),
            tool(
                "role_members",
                "List the members of a role.",
                &["role"],
                json!({"role": role}),
            ),
            tool(
                "role_set_admin",
                "Change which role grants and revokes a role (ADMIN).",
                &["caller", "role", "admin_role"],
                json!({"caller": caller, "role": role, "admin_role": role}),
            ),
            tool(
                "pause",
                "Halt all XP and credential operations (ADMIN).",
                &["caller"],
                json!({"caller": caller}),
            ),
            tool(
                "unpause",
                "Resume XP and credential operations (ADMIN).",
                &["caller"],
                json!({"caller": caller}),
            ),
            tool(
                "events_list",
                "List committed events, newest first unless oldest_first is set.",
                &[],
                json!({
                    "kind": {"type": "string", "description": "Event kind (xp_minted, skill_minted, role_granted, ...)"},
                    "account": {"type": "string", "description": "Any account the event mentions"},
                    "limit": {"type": "integer", "description": "Maximum events (default: 20)"},
                    "oldest_first": {"type": "boolean"}
                }),
            ),
            tool(
                "events_verify",
                "Verify hashes, signatures, and chain links of the event log.",
                &[],
                json!({}),
            ),
        ];

        ok_result(id, json!({ "tools": tools }))
    }

    // ── tools/call ────────────────────────────────────────────────────────────

    fn handle_tools_call(&self, id: Value, params: &Value) -> Value {
        let tool_name = match params.get("name").and_then(|n| n.as_str()) {
            Some(n) => n.to_string(),
            None => return rpc_error(id, -32602, "missing tool name"),
        };
        let args = params.get("arguments").cloned().unwrap_or(json!({}));
        tracing::debug!(tool = %tool_name, "tools/call");

        let result = match tool_name.as_str() {
            "ledger_init" => self.tool_ledger_init(&args),
            "ledger_status" => self.tool_ledger_status(),
            "xp_mint" => self.tool_xp_issue(&args, false),
            "xp_tip" => self.tool_xp_issue(&args, true),
            "xp_burn" => self.tool_xp_burn(&args),
            "xp_transfer" => self.tool_xp_transfer(&args),
            "xp_approve" => self.tool_xp_approve(&args),
            "xp_transfer_from" => self.tool_xp_transfer_from(&args),
            "xp_balance" => self.tool_xp_balance(&args),
            "xp_allowance" => self.tool_xp_allowance(&args),
            "skill_mint" => self.tool_skill_mint(&args, false),
            "skill_hero" => self.tool_skill_mint(&args, true),
            "skill_batch" => self.tool_skill_batch(&args),
            "skill_transfer" => self.tool_skill_transfer(&args),
            "skill_show" => self.tool_skill_show(&args),
            "skill_list" => self.tool_skill_list(&args),
            "role_grant" => self.tool_role_change(&args, true),
            "role_revoke" => self.tool_role_change(&args, false),
            "role_renounce" => self.tool_role_renounce(&args),
            "role_check" => self.tool_role_check(&args),
            "role_members" => self.tool_role_members(&args),
            "role_set_admin" => self.tool_role_set_admin(&args),
            "pause" => self.tool_pause(&args, true),
            "unpause" => self.tool_pause(&args, false),
            "events_list" => self.tool_events_list(&args),
            "events_verify" => self.tool_events_verify(),
            _ => return rpc_error(id, -32602, format!("unknown tool: {tool_name}")),
        };

        match result {
            Ok(text) => tool_ok(id, text),
            Err(text) => {
                tracing::warn!(tool = %tool_name, error = %text, "tool failed");
                tool_error(id, text)
            }
        }
    }

    // ── Ledger access ─────────────────────────────────────────────────────────

    fn open(&self) -> Result<SkillLedger, String> {
        self.home.open().map_err(ledger_error)
    }

    /// Load, apply one mutation, commit; the home stays locked throughout.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut SkillLedger) -> skillforge::Result<T>,
    ) -> Result<(SkillLedger, T), String> {
        self.home.transact(op).map_err(ledger_error)
    }

    // ── Tool: ledger_init ─────────────────────────────────────────────────────

    fn tool_ledger_init(&self, args: &Value) -> ToolResult {
        let deployer = arg_account(args, "deployer")?;
        let mut config = LedgerConfig::default();
        if let Some(name) = args.get("name").and_then(Value::as_str) {
            config.name = name.to_string();
        }
        if let Some(symbol) = args.get("symbol").and_then(Value::as_str) {
            config.symbol = symbol.to_string();
        }
        if let Some(decimals) = args.get("decimals").and_then(Value::as_u64) {
            config.decimals =
                u8::try_from(decimals).map_err(|_| "decimals must fit in u8".to_string())?;
        }
        if args.get("initial_supply").is_some() {
            config.initial_supply = arg_amount(args, "initial_supply")?
                .parse()
                .map_err(|_| "initial_supply must be a whole number".to_string())?;
        }
        if let Some(max) = args.get("max_batch_size").and_then(Value::as_u64) {
            config.max_batch_size = max as usize;
        }

        let ledger = self
            .home
            .create(config, deployer.clone())
            .map_err(ledger_error)?;
        tracing::info!(home = %self.home.root().display(), "ledger deployed");

        Ok(format!(
            "Deployed {} ({})\n\
             Deployer: {deployer}\n\
             Supply:   {}\n\
             Home:     {}",
            ledger.name(),
            ledger.symbol(),
            show_amount(&ledger, ledger.total_supply()),
            self.home.root().display()
        ))
    }

    // ── Tool: ledger_status ───────────────────────────────────────────────────

    fn tool_ledger_status(&self) -> ToolResult {
        let ledger = self.open()?;
        let status = status_json(&ledger);
        serde_json::to_string_pretty(&status).map_err(|e| format!("serialization error: {e}"))
    }

    // ── Tools: XP ─────────────────────────────────────────────────────────────

    fn tool_xp_issue(&self, args: &Value, tip: bool) -> ToolResult {
        let caller = arg_account(args, "caller")?;
        let to = arg_account(args, "to")?;
        let amount = arg_amount(args, "amount")?;
        let reason = args.get("reason").and_then(Value::as_str).unwrap_or("");

        let (ledger, balance) = self.mutate(|ledger| {
            let units = parse_amount(&amount, ledger.decimals())?;
            if tip {
                ledger.tip(&caller, &to, units, reason)
            } else {
                ledger.mint(&caller, &to, units, reason)
            }
        })?;

        Ok(format!(
            "{} {amount} {} to {to}\nBalance: {}{}",
            if tip { "Tipped" } else { "Minted" },
            ledger.symbol(),
            show_amount(&ledger, balance),
            last_event_line(&ledger)
        ))
    }

    fn tool_xp_burn(&self, args: &Value) -> ToolResult {
        let caller = arg_account(args, "caller")?;
        let from = arg_account(args, "from")?;
        let amount = arg_amount(args, "amount")?;

        let (ledger, remaining) = self.mutate(|ledger| {
            let units = parse_amount(&amount, ledger.decimals())?;
            ledger.burn(&caller, &from, units)
        })?;

        Ok(format!(
            "Burned {amount} {} from {from}\nBalance: {}{}",
            ledger.symbol(),
            show_amount(&ledger, remaining),
            last_event_line(&ledger)
        ))
    }

    fn tool_xp_transfer(&self, args: &Value) -> ToolResult {
        let caller = arg_account(args, "caller")?;
        let to = arg_account(args, "to")?;
        let amount = arg_amount(args, "amount")?;

        let (ledger, ()) = self.mutate(|ledger| {
            let units = parse_amount(&amount, ledger.decimals())?;
            ledger.transfer(&caller, &to, units)
        })?;

        Ok(format!(
            "Transferred {amount} {} from {caller} to {to}{}",
            ledger.symbol(),
            last_event_line(&ledger)
        ))
    }

    fn tool_xp_approve(&self, args: &Value) -> ToolResult {
        let caller = arg_account(args, "caller")?;
        let spender = arg_account(args, "spender")?;
        let amount = arg_amount(args, "amount")?;

        let (ledger, ()) = self.mutate(|ledger| {
            let units = parse_amount(&amount, ledger.decimals())?;
            ledger.approve(&caller, &spender, units)
        })?;

        Ok(format!(
            "Approved {spender} to spend {amount} {} of {caller}'s balance{}",
            ledger.symbol(),
            last_event_line(&ledger)
        ))
    }

    fn tool_xp_transfer_from(&self, args: &Value) -> ToolResult {
        let caller = arg_account(args, "caller")?;
        let from = arg_account(args, "from")?;
        let to = arg_account(args, "to")?;
        let amount = arg_amount(args, "amount")?;

        let (ledger, ()) = self.mutate(|ledger| {
            let units = parse_amount(&amount, ledger.decimals())?;
            ledger.transfer_from(&caller, &from, &to, units)
        })?;

        Ok(format!(
            "Transferred {amount} {} from {from} to {to}\nRemaining allowance: {}{}",
            ledger.symbol(),
            show_amount(&ledger, ledger.allowance(&from, &caller)),
            last_event_line(&ledger)
        ))
    }

    fn tool_xp_balance(&self, args: &Value) -> ToolResult {
        let who = arg_account(args, "account")?;
        let ledger = self.open()?;
        Ok(format!(
            "{who}: {}",
            show_amount(&ledger, ledger.balance_of(&who))
        ))
    }

    fn tool_xp_allowance(&self, args: &Value) -> ToolResult {
        let owner = arg_account(args, "owner")?;
        let spender = arg_account(args, "spender")?;
        let ledger = self.open()?;
        Ok(format!(
            "{spender} may spend {} of {owner}'s balance",
            show_amount(&ledger, ledger.allowance(&owner, &spender))
        ))
    }

    // ── Tools: credentials ────────────────────────────────────────────────────

    fn tool_skill_mint(&self, args: &Value, hero: bool) -> ToolResult {
        let caller = arg_account(args, "caller")?;
        let to = arg_account(args, "to")?;
        let label = arg_str(args, if hero { "language" } else { "skill" })?;
        let uri = arg_str(args, "uri")?;

        let (ledger, token_id) = self.mutate(|ledger| {
            if hero {
                ledger.mint_language_hero(&caller, &to, label, uri)
            } else {
                ledger.mint_skill(&caller, &to, label, uri)
            }
        })?;

        Ok(format!(
            "Issued credential #{token_id} to {to}\nSkill:   {label}\nURI:     {uri}{}",
            last_event_line(&ledger)
        ))
    }

    fn tool_skill_batch(&self, args: &Value) -> ToolResult {
        let caller = arg_account(args, "caller")?;
        let recipients: Vec<Account> = arg_strings(args, "recipients")?
            .into_iter()
            .map(Account::new)
            .collect();
        let skills = arg_strings(args, "skills")?;
        let uris = arg_strings(args, "uris")?;

        let (_, ids) =
            self.mutate(|ledger| ledger.batch_mint(&caller, &recipients, &skills, &uris))?;

        let lines: Vec<String> = ids
            .iter()
            .zip(&recipients)
            .map(|(id, to)| format!("  #{id} -> {to}"))
            .collect();
        Ok(format!(
            "Issued {} credentials:\n{}",
            ids.len(),
            lines.join("\n")
        ))
    }

    fn tool_skill_transfer(&self, args: &Value) -> ToolResult {
        let caller = arg_account(args, "caller")?;
        let to = arg_account(args, "to")?;
        let token_id = arg_u64(args, "token_id")?;

        let (ledger, ()) =
            self.mutate(|ledger| ledger.transfer_credential(&caller, &to, token_id))?;

        Ok(format!(
            "Transferred credential #{token_id} from {caller} to {to}{}",
            last_event_line(&ledger)
        ))
    }

    fn tool_skill_show(&self, args: &Value) -> ToolResult {
        let token_id = arg_u64(args, "token_id")?;
        let ledger = self.open()?;
        let credential = ledger.credential(token_id).map_err(ledger_error)?;
        serde_json::to_string_pretty(&credential_json(credential))
            .map_err(|e| format!("serialization error: {e}"))
    }

    fn tool_skill_list(&self, args: &Value) -> ToolResult {
        let ledger = self.open()?;
        let credentials: Vec<&SkillCredential> = match args.get("owner").and_then(Value::as_str) {
            Some(owner) => ledger.credentials_of(&Account::parse(owner).map_err(ledger_error)?),
            None => ledger.all_credentials().collect(),
        };
        let items: Vec<Value> = credentials.into_iter().map(credential_json).collect();
        serde_json::to_string_pretty(&items).map_err(|e| format!("serialization error: {e}"))
    }

    // ── Tools: roles ──────────────────────────────────────────────────────────

    fn tool_role_change(&self, args: &Value, grant: bool) -> ToolResult {
        let caller = arg_account(args, "caller")?;
        let role = arg_role(args, "role")?;
        let who = arg_account(args, "account")?;

        let (_, changed) = self.mutate(|ledger| {
            if grant {
                ledger.grant_role(&caller, &role, &who)
            } else {
                ledger.revoke_role(&caller, &role, &who)
            }
        })?;

        Ok(match (grant, changed) {
            (true, true) => format!("Granted {role} to {who}"),
            (true, false) => format!("{who} already holds {role}"),
            (false, true) => format!("Revoked {role} from {who}"),
            (false, false) => format!("{who} does not hold {role}"),
        })
    }

    fn tool_role_renounce(&self, args: &Value) -> ToolResult {
        let caller = arg_account(args, "caller")?;
        let role = arg_role(args, "role")?;
        let (_, renounced) = self.mutate(|ledger| ledger.renounce_role(&caller, &role))?;
        Ok(if renounced {
            format!("{caller} renounced {role}")
        } else {
            format!("{caller} does not hold {role}")
        })
    }

    fn tool_role_check(&self, args: &Value) -> ToolResult {
        let role = arg_role(args, "role")?;
        let who = arg_account(args, "account")?;
        let ledger = self.open()?;
        let holds = ledger.has_role(&role, &who);
        Ok(format!(
            "{who} {} {role}",
            if holds { "holds" } else { "does not hold" }
        ))
    }

    fn tool_role_members(&self, args: &Value) -> ToolResult {
        let role = arg_role(args, "role")?;
        let ledger = self.open()?;
        let members = ledger.members(&role);
        let body = json!({
            "role": role.0,
            "admin_role": ledger.role_admin(&role).0,
            "members": members.iter().map(Account::as_str).collect::<Vec<_>>(),
        });
        serde_json::to_string_pretty(&body).map_err(|e| format!("serialization error: {e}"))
    }

    fn tool_role_set_admin(&self, args: &Value) -> ToolResult {
        let caller = arg_account(args, "caller")?;
        let role = arg_role(args, "role")?;
        let admin_role = arg_role(args, "admin_role")?;
        self.mutate(|ledger| ledger.set_role_admin(&caller, &role, &admin_role))?;
        Ok(format!("{admin_role} now administers {role}"))
    }

    // ── Tools: pause gate ─────────────────────────────────────────────────────

    fn tool_pause(&self, args: &Value, pause: bool) -> ToolResult {
        let caller = arg_account(args, "caller")?;
        let (ledger, ()) = self.mutate(|ledger| {
            if pause {
                ledger.pause(&caller)
            } else {
                ledger.unpause(&caller)
            }
        })?;
        Ok(format!(
            "Ledger {}{}",
            ledger.pause_state(),
            last_event_line(&ledger)
        ))
    }

    // ── Tools: events ─────────────────────────────────────────────────────────

    fn tool_events_list(&self, args: &Value) -> ToolResult {
        let mut query = EventQuery::new().limit(
            args.get("limit")
                .and_then(Value::as_u64)
                .map_or(DEFAULT_EVENT_LIMIT, |n| n as usize),
        );
        if args
            .get("oldest_first")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            query = query.sort(SortOrder::OldestFirst);
        }
        if let Some(tag) = args.get("kind").and_then(Value::as_str) {
            let kind = EventKind::from_tag(tag).ok_or_else(|| format!("unknown event kind '{tag}'"))?;
            query = query.kind(kind);
        }
        if let Some(account) = args.get("account").and_then(Value::as_str) {
            query = query.account(Account::parse(account).map_err(ledger_error)?);
        }

        let ledger = self.open()?;
        let records = ledger.query_events(&query);
        serde_json::to_string_pretty(&records).map_err(|e| format!("serialization error: {e}"))
    }

    fn tool_events_verify(&self) -> ToolResult {
        let ledger = self.open()?;
        let report = ledger.verify_events();
        let body = json!({
            "records_checked": report.records_checked,
            "hashes_valid": report.hashes_valid,
            "signatures_valid": report.signatures_valid,
            "chain_valid": report.chain_valid,
            "is_valid": report.is_valid,
            "errors": report.errors,
        });
        serde_json::to_string_pretty(&body).map_err(|e| format!("serialization error: {e}"))
    }

    // ── resources/list ────────────────────────────────────────────────────────

    fn handle_resources_list(&self, id: Value) -> Value {
        ok_result(
            id,
            json!({
                "resources": [
                    {
                        "uri": "sfx://ledger/status",
                        "name": "Ledger Status",
                        "description": "Supply, pause state, roles, and counts",
                        "mimeType": "application/json"
                    },
                    {
                        "uri": "sfx://events/recent",
                        "name": "Recent Events",
                        "description": "Most recent sealed events (up to 20)",
                        "mimeType": "application/json"
                    },
                    {
                        "uri": "sfx://credentials",
                        "name": "Skill Credentials",
                        "description": "Every issued credential",
                        "mimeType": "application/json"
                    }
                ]
            }),
        )
    }

    // ── resources/read ────────────────────────────────────────────────────────

    fn handle_resources_read(&self, id: Value, params: &Value) -> Value {
        let uri = match params.get("uri").and_then(|v| v.as_str()) {
            Some(u) => u.to_string(),
            None => return rpc_error(id, -32602, "missing resource uri"),
        };

        let ledger = match self.home.open() {
            Ok(l) => l,
            Err(e) => return rpc_error(id, -32602, format!("failed to open ledger: {e}")),
        };

        let body = if uri == "sfx://ledger/status" {
            status_json(&ledger)
        } else if uri == "sfx://events/recent" {
            let query = EventQuery::new().limit(DEFAULT_EVENT_LIMIT);
            json!(ledger.query_events(&query))
        } else if uri == "sfx://credentials" {
            json!(ledger
                .all_credentials()
                .map(credential_json)
                .collect::<Vec<_>>())
        } else if let Some(rest) = uri.strip_prefix("sfx://credential/") {
            let credential = rest
                .parse::<u64>()
                .map_err(|_| LedgerError::InvalidFileFormat(format!("bad token id '{rest}'")))
                .and_then(|token_id| ledger.credential(token_id));
            match credential {
                Ok(c) => credential_json(c),
                Err(e) => return rpc_error(id, -32602, ledger_error(e)),
            }
        } else {
            return rpc_error(id, -32602, format!("unknown resource URI: {uri}"));
        };

        let text =
            serde_json::to_string_pretty(&body).unwrap_or_else(|e| format!("serialization error: {e}"));
        ok_result(
            id,
            json!({
                "contents": [{
                    "uri": uri,
                    "mimeType": "application/json",
                    "text": text
                }]
            }),
        )
    }
}

fn status_json(ledger: &SkillLedger) -> Value {
    let members = |role: Role| -> Vec<String> {
        ledger
            .members(&role)
            .into_iter()
            .map(|a| a.0)
            .collect()
    };
    json!({
        "name": ledger.name(),
        "symbol": ledger.symbol(),
        "decimals": ledger.decimals(),
        "total_supply": ledger.total_supply().to_string(),
        "state": ledger.pause_state().as_str(),
        "deployer": ledger.deployer().as_str(),
        "deployed_at": skillforge::time::micros_to_rfc3339(ledger.deployed_at()),
        "holders": ledger.holders().len(),
        "next_token_id": ledger.next_token_id(),
        "events": ledger.events().len(),
        "admins": members(Role::admin()),
        "quizmasters": members(Role::quizmaster()),
    })
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() {
    // Log to stderr (stdout is reserved for JSON-RPC responses).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();

    let args = Args::parse();
    let server = McpServer::new(LedgerHome::new(resolve_home(args.home.as_deref())));
    tracing::info!(home = %server.home.root().display(), "skillforge-mcp started");

    let stdin = io::stdin();
    let stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::error!("stdin read error: {e}");
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let request: Value = match serde_json::from_str(trimmed) {
            Ok(v) => v,
            Err(e) => {
                // Emit a parse error response with null id.
                let err = rpc_error(Value::Null, -32700, format!("parse error: {e}"));
                let mut out = stdout.lock();
                let _ = serde_json::to_writer(&mut out, &err);
                let _ = out.write_all(b"\n");
                let _ = out.flush();
                continue;
            }
        };

        let response = server.handle_request(request);

        // Notifications return Value::Null; don't write a response.
        if response.is_null() {
            continue;
        }

        let mut out = stdout.lock();
        if let Err(e) = serde_json::to_writer(&mut out, &response) {
            tracing::error!("failed to write response: {e}");
            break;
        }
        if let Err(e) = out.write_all(b"\n") {
            tracing::error!("failed to write newline: {e}");
            break;
        }
        if let Err(e) = out.flush() {
            tracing::error!("failed to flush stdout: {e}");
            break;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
