use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use hv_config::AppConfig;
use hv_console::{ConsoleOptions, OrderConsole, OrderDetail};
use hv_gateway::HttpOrderApi;
use hv_schemas::{
    AdminIdentity, ApprovalChecks, CheckKind, PaymentStatus, PaymentType, RoleSet, TransferMode,
};
use hv_store::JsonFileFilterStore;

#[derive(Parser)]
#[command(name = "hv")]
#[command(about = "HerdVest back-office CLI", long_about = None)]
struct Cli {
    /// Layered config paths in merge order (base -> overlay)
    #[arg(long = "config", global = true)]
    config_paths: Vec<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash,

    /// Order verification commands
    Orders {
        #[command(subcommand)]
        cmd: OrdersCmd,
    },

    /// List active farms (filter dropdown source)
    Farms,
}

#[derive(Subcommand)]
enum OrdersCmd {
    /// List orders with the given filters
    List {
        /// Status tab, e.g. PENDING_ADMIN_VERIFICATION
        #[arg(long)]
        status: Option<String>,

        /// Payment type, e.g. BANK_TRANSFER
        #[arg(long)]
        payment_type: Option<String>,

        /// Transfer mode, e.g. NEFT
        #[arg(long)]
        transfer_mode: Option<String>,

        #[arg(long)]
        farm: Option<String>,

        /// Free-text search (order id / investor name / mobile)
        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Print the status-bucket counts for the active non-status filters
    Counts,

    /// Show one order in full (detail aggregation)
    Show {
        order_id: String,
    },

    /// Approve an order. Checks are tri-state: pass true/false, or omit.
    Approve {
        order_id: String,

        #[arg(long)]
        units: Option<bool>,

        #[arg(long)]
        proof: Option<bool>,

        #[arg(long)]
        received: Option<bool>,

        #[arg(long)]
        coins: Option<bool>,

        #[arg(long, default_value = "")]
        remarks: String,
    },

    /// Reject an order. Requires a failed check and remarks.
    Reject {
        order_id: String,

        #[arg(long)]
        units: Option<bool>,

        #[arg(long)]
        proof: Option<bool>,

        #[arg(long)]
        received: Option<bool>,

        #[arg(long)]
        coins: Option<bool>,

        #[arg(long, default_value = "")]
        remarks: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let session_id = Uuid::new_v4();
    let span = tracing::info_span!("hv", %session_id);
    let _guard = span.enter();

    let config_paths: Vec<&str> = if cli.config_paths.is_empty() {
        vec!["herdvest.yaml"]
    } else {
        cli.config_paths.iter().map(String::as_str).collect()
    };

    match cli.cmd {
        Commands::ConfigHash => {
            let loaded = hv_config::load_layered_yaml(&config_paths)?;
            println!("config_hash: {}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
            Ok(())
        }
        Commands::Farms => {
            let console = build_console(&config_paths)?;
            let farms = console.farms().context("farm listing failed")?;
            for farm in farms {
                println!(
                    "{:<12} {:<24} {}",
                    farm.id,
                    farm.name,
                    farm.location.as_deref().unwrap_or("—")
                );
            }
            Ok(())
        }
        Commands::Orders { cmd } => run_orders(cmd, &config_paths),
    }
}

type Console = OrderConsole<HttpOrderApi, JsonFileFilterStore>;

fn build_console(config_paths: &[&str]) -> Result<Console> {
    let loaded = hv_config::load_layered_yaml(config_paths)?;
    let app: AppConfig = loaded.app_config()?;
    tracing::debug!(config_hash = %loaded.config_hash, "config loaded");

    let roles = RoleSet::parse_csv(&app.operator.roles_csv);
    if roles.is_empty() {
        bail!("operator has no recognized role; check /operator/roles");
    }
    let identity = AdminIdentity::new(app.operator.mobile, app.operator.name, roles);

    let api = HttpOrderApi::new(
        app.api.base_url,
        Duration::from_secs(app.api.timeout_secs),
    )
    .context("building http client")?;

    let view_store = JsonFileFilterStore::new(&app.persist.view_path);
    let options = ConsoleOptions {
        page_size: app.list.page_size,
        search_debounce: Duration::from_millis(app.list.search_debounce_ms),
    };
    Ok(OrderConsole::new(api, view_store, identity, options))
}

fn run_orders(cmd: OrdersCmd, config_paths: &[&str]) -> Result<()> {
    let mut console = build_console(config_paths)?;
    match cmd {
        OrdersCmd::List {
            status,
            payment_type,
            transfer_mode,
            farm,
            search,
            page,
            page_size,
        } => {
            let now = Instant::now();
            if let Some(page_size) = page_size {
                console.set_page_size(page_size, now);
            }
            if let Some(raw) = status {
                console.set_status(Some(parse_status(&raw)?), now);
            }
            if let Some(raw) = payment_type {
                console.set_payment_type(Some(parse_payment_type(&raw)?), now);
            }
            if let Some(raw) = transfer_mode {
                console.set_transfer_mode(Some(TransferMode::from(raw)), now);
            }
            if let Some(farm_id) = farm {
                console.set_farm(Some(farm_id), now);
            }
            if let Some(text) = search {
                console.set_search(text, now);
                // One-shot invocation: jump the debounce clock forward.
                console.poll_search(now + Duration::from_secs(60));
            }
            if let Some(page) = page {
                console.set_page(page, now);
            }
            // Nothing set means nothing fetched yet.
            if console.store().items.is_empty() && console.store().error.is_none() {
                console.refresh();
            }
            print_list(&console);
            if let Some(error) = &console.store().error {
                bail!("order fetch failed: {error}");
            }
            Ok(())
        }
        OrdersCmd::Counts => {
            console.refresh();
            if let Some(error) = &console.store().error {
                bail!("order fetch failed: {error}");
            }
            print_counts(&console);
            Ok(())
        }
        OrdersCmd::Show { order_id } => {
            let detail = console
                .detail(&order_id)
                .with_context(|| format!("loading order {order_id}"))?;
            print_detail(&detail);
            Ok(())
        }
        OrdersCmd::Approve {
            order_id,
            units,
            proof,
            received,
            coins,
            remarks,
        } => {
            let checks = build_checks(units, proof, received, coins);
            console
                .approve(&order_id, checks, &remarks)
                .with_context(|| format!("approve {order_id}"))?;
            println!("approved: {order_id}");
            if let Some(error) = &console.store().error {
                // The decision committed; only the follow-up refresh failed.
                tracing::warn!(%error, "list refresh failed after approval");
            }
            Ok(())
        }
        OrdersCmd::Reject {
            order_id,
            units,
            proof,
            received,
            coins,
            remarks,
        } => {
            let checks = build_checks(units, proof, received, coins);
            console
                .reject(&order_id, checks, &remarks)
                .with_context(|| format!("reject {order_id}"))?;
            println!("rejected: {order_id}");
            Ok(())
        }
    }
}

fn build_checks(
    units: Option<bool>,
    proof: Option<bool>,
    received: Option<bool>,
    coins: Option<bool>,
) -> ApprovalChecks {
    // Only flags the operator passed become part of the payload.
    let mut checks = ApprovalChecks::none();
    if let Some(v) = units {
        checks.set(CheckKind::UnitsChecked, v);
    }
    if let Some(v) = proof {
        checks.set(CheckKind::PaymentProof, v);
    }
    if let Some(v) = received {
        checks.set(CheckKind::PaymentReceived, v);
    }
    if let Some(v) = coins {
        checks.set(CheckKind::CoinsChecked, v);
    }
    checks
}

fn parse_status(raw: &str) -> Result<PaymentStatus> {
    let canonical = raw.trim().to_ascii_uppercase();
    for status in [
        PaymentStatus::PendingPayment,
        PaymentStatus::PendingAdminVerification,
        PaymentStatus::PendingSuperAdminVerification,
        PaymentStatus::PendingSuperAdminRejection,
        PaymentStatus::Paid,
        PaymentStatus::Rejected,
    ] {
        if status.as_str() == canonical {
            return Ok(status);
        }
    }
    bail!("unknown status: {raw}");
}

fn parse_payment_type(raw: &str) -> Result<PaymentType> {
    let canonical = raw.trim().to_ascii_uppercase();
    for payment_type in [
        PaymentType::BankTransfer,
        PaymentType::Cheque,
        PaymentType::Online,
        PaymentType::CashPayment,
        PaymentType::Cash,
        PaymentType::CoinsRedeem,
    ] {
        if payment_type.as_str() == canonical {
            return Ok(payment_type);
        }
    }
    bail!("unknown payment type: {raw}");
}

fn print_list(console: &Console) {
    let store = console.store();
    println!(
        "page {} · {} of {} orders ({} total in system)",
        store.filters().page,
        store.items.len(),
        store.total_count,
        store.total_all_orders,
    );
    for order in &store.items {
        println!(
            "{:<12} {:<10} {:>3} units  {:<32} {}",
            order.id,
            order.farm_id,
            order.unit_count,
            hv_approval::derive_status(order).as_str(),
            order.payment_type(),
        );
    }
}

fn print_counts(console: &Console) {
    let counts = console.store().counts;
    println!("payment due:                  {}", counts.payment_due);
    println!("pending admin approval:       {}", counts.pending_admin_approval);
    println!(
        "pending super-admin approval: {}",
        counts.pending_super_admin_approval
    );
    println!(
        "pending super-admin rejection: {}",
        counts.pending_super_admin_rejection
    );
    println!("paid:                         {}", counts.paid);
    println!("rejected:                     {}", counts.rejected);
}

fn print_detail(detail: &OrderDetail) {
    let order = &detail.order;
    println!("order:    {}", order.id);
    println!("status:   {}", detail.derived_status);
    println!(
        "farm:     {} ({})",
        order.farm_id,
        order.farm_location.as_deref().unwrap_or("—")
    );
    println!(
        "units:    {} ({} buffalo, {} calves)",
        order.unit_count, order.buffalo_count, order.calf_count
    );
    println!("payment:  {}", detail.payment_label());
    println!("ref:      {}", detail.reference_label());
    println!("investor: {}", detail.investor_label());
    if let Some(reason) = &order.rejected_reason {
        println!("rejected: {reason}");
    }
    if !detail.history().is_empty() {
        println!("history:");
        for entry in detail.history() {
            println!(
                "  {} {} by {} ({}) {}",
                entry.at.format("%Y-%m-%d %H:%M"),
                entry.action,
                entry.actor_name,
                entry.role,
                if entry.comments.is_empty() {
                    String::new()
                } else {
                    format!(": {}", entry.comments)
                }
            );
        }
    }
}
