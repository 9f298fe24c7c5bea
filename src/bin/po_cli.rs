use std::sync::Arc;

use amas_procurement::{
    config::{self, AppConfig},
    db::{self, DbPool},
    handlers::AppServices,
    models::{OrderSummary, PurchaseOrder},
    services::{parse_approval, procurement::LineageView},
};
use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize().await?;

    match cli.command {
        Commands::Migrate => {
            db::run_migrations(&context.db)
                .await
                .context("failed to run migrations")?;
            println!("Migrations applied");
        }
        Commands::List(args) => handle_list(&context, args, cli.json).await?,
        Commands::Show(args) => handle_show(&context, args, cli.json).await?,
        Commands::Lineage(args) => handle_lineage(&context, args, cli.json).await?,
        Commands::Receive(args) => {
            context.services.procurement.mark_received(args.id).await?;
            println!("Purchase order {} marked as received", args.id);
        }
        Commands::Accept(args) => {
            match context.services.procurement.accept(args.id).await? {
                Some(new_id) => println!("Purchase order {} accepted as {}", args.id, new_id),
                None => return Err(anyhow!("purchase order {} not found", args.id)),
            }
        }
        Commands::Decline(args) => {
            context.services.procurement.decline(args.id).await?;
            println!("Purchase order {} declined", args.id);
        }
        Commands::Approve(args) => {
            let approval = parse_approval(&args.approval)?;
            context
                .services
                .approvals
                .set_order_approval(args.id, approval)
                .await?;
            println!("Purchase order {} approval set to {}", args.id, approval);
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(name = "po-cli", about = "Purchase order lifecycle operations", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,
    /// List active (default) or archived purchase orders
    List(ListArgs),
    /// Show one purchase order with its lines
    Show(OrderIdArgs),
    /// Show the amendment history of a purchase order
    Lineage(OrderIdArgs),
    /// Mark a purchase order as received
    Receive(OrderIdArgs),
    /// Accept the supplier's proposal
    Accept(OrderIdArgs),
    /// Decline the supplier's proposal
    Decline(OrderIdArgs),
    /// Set the order-level approval
    Approve(ApproveArgs),
}

#[derive(Args)]
struct ListArgs {
    #[arg(long, action = ArgAction::SetTrue, help = "List archived orders instead of active ones")]
    archived: bool,
}

#[derive(Args)]
struct OrderIdArgs {
    #[arg(help = "Purchase order id")]
    id: i64,
}

#[derive(Args)]
struct ApproveArgs {
    #[arg(help = "Purchase order id")]
    id: i64,
    #[arg(help = "pending, approved or rejected")]
    approval: String,
}

async fn handle_list(context: &CliContext, args: ListArgs, json: bool) -> Result<()> {
    let procurement = &context.services.procurement;
    let orders = if args.archived {
        procurement.list_archived().await?
    } else {
        procurement.list_active().await?
    };

    if json {
        return print_json(&orders);
    }
    if orders.is_empty() {
        println!("No purchase orders");
    }
    for summary in &orders {
        render_summary(summary);
    }
    Ok(())
}

async fn handle_show(context: &CliContext, args: OrderIdArgs, json: bool) -> Result<()> {
    let summary = context
        .services
        .procurement
        .get_order(args.id)
        .await?
        .ok_or_else(|| anyhow!("purchase order {} not found", args.id))?;

    if json {
        return print_json(&summary);
    }
    render_summary(&summary);
    for line in &summary.items {
        println!(
            "  • item {} ({}) • ordered {} • received {} • est. price {} • approval {}",
            line.line.item_id,
            line.item_name.as_deref().unwrap_or("?"),
            display_opt(line.line.ordered_quantity),
            line.line.received_quantity,
            display_opt(line.line.estimated_price),
            line.line.approval
        );
    }
    Ok(())
}

async fn handle_lineage(context: &CliContext, args: OrderIdArgs, json: bool) -> Result<()> {
    let lineage: LineageView = context.services.procurement.lineage(args.id).await?;

    if json {
        return print_json(&lineage);
    }
    for order in &lineage.orders {
        render_version(order, lineage.head == Some(order.id));
    }
    if let Some(anomaly) = &lineage.anomaly {
        println!("Warning: {}", anomaly);
    }
    Ok(())
}

struct CliContext {
    db: Arc<DbPool>,
    services: AppServices,
}

impl CliContext {
    async fn initialize() -> Result<Self> {
        let config: AppConfig =
            config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let db_pool = db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?;
        let db = Arc::new(db_pool);
        let services = AppServices::from_config(db.clone(), &config);

        Ok(Self { db, services })
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn display_opt<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn render_summary(summary: &OrderSummary) {
    let order = &summary.order;
    println!(
        "- PO {} • {} • status {} • ordered {} • expected {} • approval {} • {} line(s)",
        order.id,
        summary.supplier_name.as_deref().unwrap_or("unknown supplier"),
        order.status,
        order.order_date.format("%Y-%m-%d"),
        display_opt(order.expected_delivery.map(|d| d.format("%Y-%m-%d"))),
        order.approval,
        summary.items.len()
    );
}

fn render_version(order: &PurchaseOrder, is_head: bool) {
    println!(
        "{} PO {} • status {} • amends {}",
        if is_head { "*" } else { " " },
        order.id,
        order.status,
        display_opt(order.original_id)
    );
}
