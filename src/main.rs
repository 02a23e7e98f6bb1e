use agent_offers::api::{ApiClient, MarketId, OfferId, Product, ProductId};
use agent_offers::catalog::{search_query, ProductForm};
use agent_offers::config::Config;
use agent_offers::state::{MarketContext, Pager, PaymentMethod, ValidationMode};
use agent_offers::submission::{CommentOutcome, OfferDraftManager};
use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "agent-offers", about = "Sales-agent ordering client")]
struct Cli {
    /// Path to the TOML config
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List markets
    Markets,
    /// List one page of the product catalog
    Products {
        #[arg(default_value_t = 1)]
        page: u32,
    },
    /// Look up products by barcode or name
    Search { query: String },
    /// Add a product to the catalog
    AddProduct {
        #[arg(long)]
        name: String,
        #[arg(long)]
        sale_type: String,
        #[arg(long)]
        packaging: String,
        #[arg(long)]
        price: String,
        #[arg(long, default_value = "")]
        barcode: String,
    },
    /// Remove a product from the catalog
    DeleteProduct { id: u64 },
    /// List offers for a market
    Offers {
        market: String,
        #[arg(default_value_t = 1)]
        page: u32,
    },
    /// Show one offer
    Offer { offer: String },
    /// Compose and send a new offer
    Send {
        #[arg(long)]
        market: String,
        /// `productId:quantity`, repeatable
        #[arg(long = "item", required = true)]
        items: Vec<String>,
        #[arg(long)]
        payment: PaymentMethod,
        /// YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Send a password reset to a phone number
    ResetPassword { phone: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.general.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let client = ApiClient::new(&cfg.api.base_url, cfg.timeout())?;

    if !matches!(cli.command, Command::ResetPassword { .. }) {
        if cfg.credentials.phone.is_empty() || cfg.credentials.password.is_empty() {
            bail!("phone and password are required (config or AGENT_PHONE / AGENT_PASSWORD)");
        }
        client
            .login(&cfg.credentials.phone, &cfg.credentials.password)
            .await?;
    }

    match cli.command {
        Command::ResetPassword { phone } => {
            client.reset_password(&phone).await?;
            println!("Reset instructions sent to {phone}");
        }
        Command::Markets => {
            for market in client.list_markets().await? {
                println!("{:>6}  {}", market.id, market.name);
            }
        }
        Command::Products { page } => {
            let listing = client.list_products(page, cfg.paging.products_limit).await?;
            for p in &listing.data {
                println!(
                    "{:>6}  {} | {} | {} | {}",
                    p.id, p.name, p.packaging, p.sale_type, p.purchase_price
                );
            }
            println!("page {}/{}", page, listing.page_count(cfg.paging.products_limit));
        }
        Command::Search { query } => {
            let query = search_query(&query).ok_or_else(|| anyhow!("search query is empty"))?;
            for p in client.search_products(&query).await? {
                println!("{:>6}  {} | {}", p.id, p.name, p.barcode.as_deref().unwrap_or("-"));
            }
        }
        Command::AddProduct {
            name,
            sale_type,
            packaging,
            price,
            barcode,
        } => {
            let form = ProductForm {
                name,
                sale_type,
                packaging,
                purchase_price: price,
                barcode,
            };
            let product = form.validate()?;
            client.add_product(&product).await?;
            println!("Product {} added", product.name);
        }
        Command::DeleteProduct { id } => {
            client.delete_product(ProductId(id)).await?;
            println!("Product {id} deleted");
        }
        Command::Offers { market, page } => {
            let listing = client
                .list_offers(&MarketId::new(market), page, cfg.paging.offers_limit)
                .await?;
            for o in &listing.data {
                let total = o.total_price.map(|t| t.to_string()).unwrap_or_default();
                let status = o.status.as_deref().unwrap_or("-");
                println!("{}  {}  {}  refunded: {}", o.offer_id, total, status, o.refunded);
            }
            println!("page {}/{}", page, listing.page_count(cfg.paging.offers_limit));
        }
        Command::Offer { offer } => {
            let details = client.get_offer(&OfferId::new(offer)).await?;
            println!("{details:#?}");
        }
        Command::Send {
            market,
            items,
            payment,
            date,
            comment,
        } => {
            let wanted = parse_items(&items)?;
            let products = find_products(&client, &wanted, cfg.paging.products_limit).await?;

            let mut manager = OfferDraftManager::new();
            let draft = manager.open(MarketContext::new(MarketId::new(market)));
            for product in &products {
                draft.toggle_product(product);
                if let Some(&qty) = wanted.get(&product.id) {
                    draft.set_quantity_to(product.id, qty);
                }
            }
            draft.set_payment_method(payment);
            draft.set_delivery_date(date);
            draft.set_comment(comment);
            info!(total = ?draft.compute_total(), lines = draft.selections().len(), "sending offer");

            let receipt = manager.submit(&client, ValidationMode::Strict).await?;
            println!("Offer {} created", receipt.offer_id);
            if let CommentOutcome::Failed(e) = &receipt.comment {
                warn!(error = %e, "comment was not attached");
                println!("Comment could not be attached: {e}");
            }
        }
    }

    if client.is_logged_in().await {
        if let Err(e) = client.logout().await {
            warn!(error = %e, "logout failed");
        }
    }

    Ok(())
}

/// Parse `id:qty` pairs.
fn parse_items(items: &[String]) -> Result<HashMap<ProductId, u32>> {
    items
        .iter()
        .map(|item| -> Result<(ProductId, u32)> {
            let (id, qty) = item
                .split_once(':')
                .ok_or_else(|| anyhow!("expected productId:quantity, got {item}"))?;
            let qty: u32 = qty.trim().parse()?;
            if qty == 0 {
                bail!("quantity must be at least 1: {item}");
            }
            Ok((ProductId(id.trim().parse()?), qty))
        })
        .collect()
}

/// Page through the catalog until every wanted product is found.
async fn find_products(
    client: &ApiClient,
    wanted: &HashMap<ProductId, u32>,
    limit: u32,
) -> Result<Vec<Product>> {
    let mut pager = Pager::new(limit);
    let mut found = Vec::new();

    loop {
        let listing = client.list_products(pager.page(), pager.limit()).await?;
        pager.set_total_pages(listing.page_count(pager.limit()));
        found.extend(listing.data.into_iter().filter(|p| wanted.contains_key(&p.id)));

        if found.len() == wanted.len() || !pager.next() {
            break;
        }
    }

    if let Some(missing) = wanted.keys().find(|id| !found.iter().any(|p| p.id == **id)) {
        bail!("product {missing} not found in catalog");
    }
    Ok(found)
}
