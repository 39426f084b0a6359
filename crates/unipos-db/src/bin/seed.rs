//! # Development Database Seeder
//!
//! Creates (or opens) a database file, applies migrations, and seeds the
//! default accounts and the seven-size catalog.
//!
//! ## Usage
//! ```bash
//! # Default path (./unipos_dev.db)
//! cargo run -p unipos-db --bin seed
//!
//! # Specify database path
//! cargo run -p unipos-db --bin seed -- --db ./data/unipos.db
//!
//! # Give every size some opening stock
//! cargo run -p unipos-db --bin seed -- --stock 50
//! ```
//!
//! Seeding follows the store's own idempotence rules: re-running against
//! a populated database changes nothing.

use std::env;

use tracing_subscriber::EnvFilter;

use unipos_db::repository::item::ItemPatch;
use unipos_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./unipos_dev.db");
    let mut opening_stock: i64 = 0;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--stock" | "-s" => {
                if i + 1 < args.len() {
                    opening_stock = args[i + 1].parse().unwrap_or(0);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Unipos Development Database Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>     Database file path (default: ./unipos_dev.db)");
                println!("  -s, --stock <N>     Opening stock per size (default: 0)");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Unipos Development Database Seeder");
    println!("=====================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    db.initialize().await?;

    let items = db.items().list().await?;
    let users = db.users().list().await?;
    println!("✓ Catalog: {} size variants", items.len());
    println!("✓ Accounts: {} users", users.len());

    if opening_stock > 0 {
        let mut stocked = 0;
        for item in &items {
            if item.stock > 0 {
                continue; // don't overwrite a populated store
            }
            db.items()
                .update(
                    item.id,
                    &ItemPatch {
                        stock: Some(opening_stock),
                        ..Default::default()
                    },
                )
                .await?;
            stocked += 1;
        }
        println!("✓ Opening stock of {} set on {} sizes", opening_stock, stocked);
    }

    println!();
    println!("Low stock sizes:");
    for item in db.items().list_low_stock().await? {
        println!(
            "  {:<8} stock {:>3} (threshold {})",
            item.label, item.stock, item.low_stock_threshold
        );
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
