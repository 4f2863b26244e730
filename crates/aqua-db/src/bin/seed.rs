//! # Seed Data Generator
//!
//! Populates the database with demo data for development: kasirs, the
//! wash menu, the product shelf, a handful of customers, and a few
//! memberships to exercise the entitlement flow.
//!
//! ## Usage
//! ```bash
//! # Seed the default development database
//! cargo run -p aqua-db --bin seed
//!
//! # Specify database path
//! cargo run -p aqua-db --bin seed -- --db ./data/aquapos.db
//! ```

use std::env;

use aqua_core::{MembershipType, Money};
use aqua_db::repository::catalog::{NewProduct, NewService};
use aqua_db::repository::customer::NewCustomer;
use aqua_db::{Database, DbConfig};

const KASIRS: &[&str] = &["Budi Santoso", "Siti Rahayu", "Agus Wijaya"];

/// (name, price rupiah, duration minutes, category)
const SERVICES: &[(&str, i64, i64, &str)] = &[
    ("Cuci Motor", 15_000, 15, "motor"),
    ("Cuci Express", 25_000, 20, "cuci"),
    ("Cuci Standard", 35_000, 30, "cuci"),
    ("Cuci Premium", 50_000, 45, "cuci"),
    ("Cuci + Wax", 75_000, 60, "detailing"),
    ("Poles Body", 150_000, 90, "detailing"),
    ("Full Detailing", 350_000, 180, "detailing"),
];

/// (name, category, price rupiah, stock, min stock, unit)
const PRODUCTS: &[(&str, &str, i64, i64, i64, &str)] = &[
    ("Shampoo Mobil 1L", "perawatan", 45_000, 24, 6, "botol"),
    ("Wax Carnauba", "perawatan", 85_000, 12, 3, "pcs"),
    ("Semir Ban", "perawatan", 35_000, 18, 5, "botol"),
    ("Parfum Mobil Lemon", "aksesoris", 25_000, 30, 10, "pcs"),
    ("Parfum Mobil Kopi", "aksesoris", 25_000, 28, 10, "pcs"),
    ("Lap Microfiber", "aksesoris", 20_000, 40, 10, "pcs"),
    ("Air Minum 600ml", "minuman", 5_000, 48, 12, "botol"),
    ("Kopi Kaleng", "minuman", 10_000, 24, 6, "kaleng"),
];

/// (name, phone, plate, vehicle)
const CUSTOMERS: &[(&str, &str, &str, &str)] = &[
    ("Andi Pratama", "081234567001", "B 1234 ABC", "Avanza"),
    ("Dewi Lestari", "081234567002", "B 5678 DEF", "HR-V"),
    ("Rudi Hartono", "081234567003", "D 9012 GHI", "Pajero"),
    ("Maya Putri", "081234567004", "B 3456 JKL", "Brio"),
];

/// (customer index, package, price rupiah)
const MEMBERSHIPS: &[(usize, MembershipType, i64)] = &[
    (0, MembershipType::Regular, 0),
    (1, MembershipType::Monthly, 150_000),
    (2, MembershipType::Annual, 1_400_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./aquapos_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("AquaPOS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./aquapos_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 AquaPOS Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.kasirs().list_active().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} kasirs", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding kasirs...");
    for name in KASIRS {
        let kasir = db.kasirs().create(name).await?;
        println!("  + {} ({})", kasir.name, kasir.id);
    }

    println!("Seeding services...");
    for (name, price, duration, category) in SERVICES {
        db.catalog()
            .create_service(NewService {
                name: (*name).to_string(),
                description: None,
                price_rupiah: *price,
                duration_minutes: *duration,
                category: Some((*category).to_string()),
            })
            .await?;
        println!("  + {} (Rp {})", name, price);
    }

    println!("Seeding products...");
    for (name, category, price, stock, min_stock, unit) in PRODUCTS {
        db.catalog()
            .create_product(NewProduct {
                name: (*name).to_string(),
                category: Some((*category).to_string()),
                price_rupiah: *price,
                current_stock: *stock,
                min_stock: *min_stock,
                unit: Some((*unit).to_string()),
            })
            .await?;
        println!("  + {} (stock {})", name, stock);
    }

    println!("Seeding customers...");
    let mut customers = Vec::with_capacity(CUSTOMERS.len());
    for (name, phone, plate, vehicle) in CUSTOMERS {
        let customer = db
            .customers()
            .create(NewCustomer {
                name: (*name).to_string(),
                phone: (*phone).to_string(),
                email: None,
                vehicle_number: Some((*plate).to_string()),
                vehicle_type: Some((*vehicle).to_string()),
            })
            .await?;
        println!("  + {} ({})", customer.name, customer.phone);
        customers.push(customer);
    }

    println!("Seeding memberships...");
    for (customer_idx, membership_type, price) in MEMBERSHIPS {
        let customer = &customers[*customer_idx];
        let membership = db
            .memberships()
            .create(
                &customer.id,
                *membership_type,
                Money::from_rupiah(*price),
                None,
            )
            .await?;
        println!(
            "  + {} for {} (ends {})",
            match membership.membership_type {
                MembershipType::Regular => "regular",
                MembershipType::Monthly => "monthly",
                MembershipType::Quarterly => "quarterly",
                MembershipType::Biannual => "biannual",
                MembershipType::Annual => "annual",
            },
            customer.name,
            membership.end_date.format("%Y-%m-%d")
        );
    }

    println!();
    println!("✓ Seed complete!");
    println!("  {} kasirs, {} services, {} products", KASIRS.len(), SERVICES.len(), PRODUCTS.len());
    println!("  {} customers, {} memberships", CUSTOMERS.len(), MEMBERSHIPS.len());

    Ok(())
}
