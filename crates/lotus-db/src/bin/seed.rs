//! # Development Seed
//!
//! Populates a database with development data: categories, products,
//! services, staff users, customers, and promotions.
//!
//! ## Usage
//! ```bash
//! # Seed with defaults (250 products)
//! cargo run -p lotus-db --bin seed
//!
//! # Generate a custom product count
//! cargo run -p lotus-db --bin seed -- --count 400
//!
//! # Point at a specific database file
//! cargo run -p lotus-db --bin seed -- --db ./data/lotus.db
//! ```
//!
//! ## Generated Data
//! Products span the clinic dispensary shelves:
//! - Medicines (analgesics, antibiotics, syrups)
//! - First Aid (dressings, antiseptics)
//! - Supplements (vitamins, minerals)
//! - Equipment (consumables, diagnostics)
//! - Baby Care
//!
//! Prices, costs, and stock levels are derived from the item index, so a
//! reseed produces the same rows. User rows carry a placeholder password
//! hash; tokens are issued by the identity service, not this backend.

use chrono::{Duration, Utc};
use std::env;

use lotus_core::Role;
use lotus_db::{
    Database, DbConfig, NewCustomer, NewProduct, NewPromotion, NewService, NewUser,
};

/// Product categories with base item names.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Medicines",
        &[
            "Paracetamol 500mg",
            "Ibuprofen 200mg",
            "Amoxicillin 250mg",
            "Cetirizine 10mg",
            "Omeprazole 20mg",
            "ORS Sachet",
            "Cough Syrup",
            "Antacid Suspension",
            "Antibiotic Eye Drops",
            "Saline Nasal Spray",
        ],
    ),
    (
        "First Aid",
        &[
            "Bandage Roll",
            "Gauze Pads",
            "Adhesive Tape",
            "Antiseptic Solution",
            "Cotton Wool",
            "Burn Cream",
            "Elastic Bandage",
            "Sterile Gloves",
            "Plasters",
            "Instant Cold Pack",
        ],
    ),
    (
        "Supplements",
        &[
            "Vitamin C 500mg",
            "Vitamin D3 Drops",
            "Multivitamin Syrup",
            "Calcium Tablets",
            "Iron Tablets",
            "Zinc Supplement",
            "Folic Acid",
            "Omega-3 Capsules",
            "B-Complex",
            "Glucose Powder",
        ],
    ),
    (
        "Equipment",
        &[
            "Digital Thermometer",
            "BP Monitor Cuff",
            "Nebulizer Mask",
            "Glucometer Strips",
            "Syringe 5ml",
            "Syringe 10ml",
            "IV Cannula",
            "Surgical Masks",
            "Pulse Oximeter",
            "Hot Water Bottle",
        ],
    ),
    (
        "Baby Care",
        &[
            "Baby Wipes",
            "Diaper Rash Cream",
            "Infant Formula",
            "Teething Gel",
            "Baby Shampoo",
            "Nasal Aspirator",
            "Baby Lotion",
            "Gripe Water",
            "Baby Powder",
            "Feeding Bottle",
        ],
    ),
];

/// Pack variants with price addons in cents.
const PACKS: &[(&str, i64)] = &[
    ("Strip of 10", 0),
    ("Strip of 20", 1500),
    ("Bottle 60ml", 2000),
    ("Bottle 120ml", 3500),
    ("Pack of 5", 1000),
    ("Pack of 12", 2500),
    ("Box of 20", 4000),
    ("Box of 50", 8000),
    ("Jar 100g", 3000),
    ("Tube 30g", 1200),
];

/// Clinic services with prices in cents.
const SERVICES: &[(&str, i64)] = &[
    ("General Consultation", 150000),
    ("Follow-up Visit", 80000),
    ("Blood Pressure Check", 20000),
    ("Blood Glucose Test", 30000),
    ("Wound Dressing", 50000),
    ("Injection Administration", 25000),
    ("Nebulization Session", 60000),
    ("Ear Syringing", 70000),
];

/// Walk-in customers.
const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("Amina", "Khan", "0300-1234567"),
    ("Bilal", "Ahmed", "0321-2345678"),
    ("Fatima", "Malik", "0333-3456789"),
    ("Hassan", "Raza", "0345-4567890"),
    ("Sana", "Iqbal", "0301-5678901"),
    ("Usman", "Sheikh", "0322-6789012"),
    ("Zainab", "Hussain", "0334-7890123"),
    ("Imran", "Qureshi", "0346-8901234"),
];

struct SeedArgs {
    count: usize,
    db_path: String,
}

/// Hand-rolled flag parsing; the binary takes two options and a help flag.
fn parse_args() -> Option<SeedArgs> {
    let mut parsed = SeedArgs {
        count: 250,
        db_path: "./lotus_dev.db".to_string(),
    };

    let mut args = env::args().skip(1);
    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--count" | "-c" => {
                if let Some(n) = args.next().and_then(|v| v.parse().ok()) {
                    parsed.count = n;
                }
            }
            "--db" | "-d" => {
                if let Some(path) = args.next() {
                    parsed.db_path = path;
                }
            }
            "--help" | "-h" => {
                print_usage();
                return None;
            }
            other => eprintln!("Ignoring unknown flag: {}", other),
        }
    }

    Some(parsed)
}

fn print_usage() {
    println!("Seeds a development database with catalog, staff, and customer rows.");
    println!();
    println!("Usage: seed [--count <N>] [--db <PATH>]");
    println!();
    println!("  -c, --count <N>    Products to generate (default 250)");
    println!("  -d, --db <PATH>    SQLite file to seed (default ./lotus_dev.db)");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Some(args) = parse_args() else {
        return Ok(());
    };

    println!("🌱 Lotus POS seed");
    println!("Database: {}", args.db_path);
    println!("Products: {}", args.count);
    println!();

    let db = Database::new(DbConfig::new(&args.db_path)).await?;
    println!("✓ Database ready, schema current");

    // Refuse to mix generated rows into a store that already has data
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Found {} products already; delete the file and rerun to reseed.", existing);
        return Ok(());
    }

    // Categories first so products can reference them
    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (category_name, _) in CATEGORIES {
        category_ids.push(db.products().create_category(category_name).await?);
    }
    println!("✓ Created {} categories", category_ids.len());

    println!("Generating products...");
    let started = std::time::Instant::now();
    let mut generated = 0usize;

    'shelves: for (category_idx, (_, names)) in CATEGORIES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for (pack_idx, (pack, price_addon)) in PACKS.iter().enumerate() {
                if generated == args.count {
                    break 'shelves;
                }

                let seed = category_idx * 1000 + name_idx * 20 + pack_idx;
                let input =
                    build_product(name, pack, *price_addon, category_ids[category_idx], seed);
                db.products().create(&input).await?;
                generated += 1;

                if generated % 100 == 0 {
                    println!("  {} so far...", generated);
                }
            }
        }
    }

    println!("✓ {} products in {:.2?}", generated, started.elapsed());

    // Services
    for (service_name, price_cents) in SERVICES {
        db.services()
            .create(&NewService {
                name: service_name.to_string(),
                description: None,
                price_cents: *price_cents,
            })
            .await?;
    }
    println!("✓ Created {} services", SERVICES.len());

    // Staff
    for (username, name, role) in [
        ("admin", "Clinic Admin", Role::Admin),
        ("reception", "Front Desk", Role::Employee),
    ] {
        db.users()
            .create(&NewUser {
                username: username.to_string(),
                password_hash: "$seed$placeholder".to_string(),
                name: name.to_string(),
                role,
            })
            .await?;
    }
    println!("✓ Created 2 staff users (admin, reception)");

    // Customers
    for (first, last, phone) in CUSTOMERS {
        db.customers()
            .create(&NewCustomer {
                first_name: first.to_string(),
                last_name: last.to_string(),
                phone: phone.to_string(),
                address: None,
            })
            .await?;
    }
    println!("✓ Created {} customers", CUSTOMERS.len());

    // Promotions: one live, one already over
    let now = Utc::now();
    db.promotions()
        .create(&NewPromotion {
            name: "Monsoon Wellness 10%".to_string(),
            discount_value: 1000,
            is_percent: true,
            start_date: now - Duration::days(7),
            end_date: now + Duration::days(21),
            is_active: true,
        })
        .await?;
    db.promotions()
        .create(&NewPromotion {
            name: "Eid Special Rs 50 Off".to_string(),
            discount_value: 5000,
            is_percent: false,
            start_date: now - Duration::days(60),
            end_date: now - Duration::days(30),
            is_active: true,
        })
        .await?;
    println!("✓ Created 2 promotions (1 currently effective)");

    // Spot checks
    let khans = db.customers().search("khan", 10).await?;
    let effective = db.promotions().list_effective(Utc::now()).await?;
    println!();
    println!(
        "Spot check: 'khan' matches {} customers, {} promotion(s) effective",
        khans.len(),
        effective.len()
    );
    println!("✓ Seed complete");

    Ok(())
}

/// Index-derived pricing and stock so a reseed writes identical rows.
fn build_product(
    name: &str,
    pack: &str,
    price_addon: i64,
    category_id: i64,
    seed: usize,
) -> NewProduct {
    // 25.00 to 225.00 before the pack addon
    let price_cents = 2500 + ((seed * 73) % 20000) as i64 + price_addon;
    // Margin between 21% and 45% of the shelf price
    let cost_price_cents = price_cents * (55 + (seed % 25) as i64) / 100;

    NewProduct {
        name: format!("{} {}", name, pack),
        description: None,
        price_cents,
        cost_price_cents,
        stock: (seed % 120) as i64,
        min_stock: 5,
        category_id: Some(category_id),
    }
}
