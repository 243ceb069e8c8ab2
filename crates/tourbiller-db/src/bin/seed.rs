//! # Seed Data Generator
//!
//! Populates the database with a sample fleet and tour catalogue for
//! development.
//!
//! ## Usage
//! ```bash
//! # Seed the database named by TOURBILLER_DATABASE_PATH (default ./tourbiller.db)
//! cargo run -p tourbiller-db --bin seed
//!
//! # Specify database path
//! cargo run -p tourbiller-db --bin seed -- --db ./data/tourbiller.db
//! ```
//!
//! ## Generated Data
//! - Business profile (default letterhead)
//! - Vehicles: cars, vans and SUVs with day and kilometre rates
//! - Customers
//! - Three tour schedules with day-by-day itineraries
//! - One draft quotation per tour

use std::env;
use std::path::PathBuf;

use tourbiller_core::{
    Distance, Money, NewCustomer, NewDayItem, NewQuotation, NewTourSchedule, NewVehicle,
    Percentage, PricingMode,
};
use tourbiller_db::{AppConfig, Database};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (vehicle_no, model, category, km rate, excess km rate, day rate, km per day)
const VEHICLES: &[(&str, &str, &str, i64, i64, i64, i64)] = &[
    ("CAB-1234", "Toyota Axio", "CAR", 60, 60, 9_000, 100),
    ("CBA-5678", "Suzuki Wagon R", "CAR", 50, 50, 7_500, 100),
    ("PH-4521", "Toyota KDH", "VAN", 85, 80, 14_000, 150),
    ("NB-7788", "Nissan Caravan", "VAN", 80, 75, 13_000, 150),
    ("CAR-3390", "Toyota Prado", "SUV", 120, 110, 22_000, 120),
    ("KV-2211", "Mitsubishi Montero", "SUV", 115, 100, 20_000, 120),
];

/// (name, mobile, email)
const CUSTOMERS: &[(&str, &str, Option<&str>)] = &[
    ("Nimal Perera", "0771234567", Some("nimal@example.com")),
    ("Kamala Silva", "0719876543", None),
    ("Hans Mueller", "+4915112345678", Some("hans.mueller@example.de")),
    ("Emma Clarke", "+447700900123", Some("emma.clarke@example.co.uk")),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = AppConfig::load()?;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("TourBiller Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: TOURBILLER_DATABASE_PATH or ./tourbiller.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(database = %config.database_path.display(), "Seeding database");

    let db = Database::new(config.db_config()).await?;

    let existing = db.vehicles().list("").await?;
    if !existing.is_empty() {
        warn!(
            vehicles = existing.len(),
            "Database already has vehicles, skipping seed. Delete the database file to regenerate."
        );
        return Ok(());
    }

    let profile = db.business_profile().get_or_create().await?;
    info!(company = %profile.company_name, "Business profile ready");

    for &(vehicle_no, model, category, rate, excess, per_day, km_per_day) in VEHICLES {
        db.vehicles()
            .create(&NewVehicle {
                vehicle_no: vehicle_no.to_string(),
                model: Some(model.to_string()),
                category: category.to_string(),
                default_rate: Money::from_major(rate),
                excess_km_rate: Money::from_major(excess),
                rate_per_day: Money::from_major(per_day),
                km_per_day: Distance::from_km(km_per_day),
                extra_hour_rate: Money::from_major(500),
                ..NewVehicle::default()
            })
            .await?;
    }
    info!(count = VEHICLES.len(), "Vehicles created");

    for &(name, mobile, email) in CUSTOMERS {
        db.customers()
            .create(&NewCustomer {
                name: name.to_string(),
                mobile: mobile.to_string(),
                email: email.map(str::to_string),
                address: None,
            })
            .await?;
    }
    info!(count = CUSTOMERS.len(), "Customers created");

    let tours = [cultural_triangle(), southern_coast(), hill_country()];
    for (tour, customer) in tours.iter().zip(CUSTOMERS.iter().skip(1)) {
        let schedule = db.tour_schedules().create(tour).await?;

        let quotation = db
            .quotations()
            .generate(&NewQuotation {
                tour_schedule_id: schedule.schedule.id.clone(),
                customer_name: customer.0.to_string(),
                number_of_persons: 2,
                pricing_mode: PricingMode::PerDay,
                hire_rate_per_day: Money::from_major(15_000),
                driver_cost_per_day: Money::from_major(3_500),
                markup: Percentage::from_bps(1_000),
                ..NewQuotation::default()
            })
            .await?;

        info!(
            tour = %schedule.schedule.name,
            quotation_number = quotation.quotation_number,
            total = %quotation.total_amount,
            "Tour and quotation created"
        );
    }

    info!("Seed complete");
    Ok(())
}

fn day(day_number: i64, title: &str, km: i64, accommodation: i64, meals: i64, activities: i64) -> NewDayItem {
    NewDayItem {
        day_number,
        title: title.to_string(),
        distance: Distance::from_km(km),
        accommodation: Money::from_major(accommodation),
        meals: Money::from_major(meals),
        activities: Money::from_major(activities),
        ..NewDayItem::default()
    }
}

fn cultural_triangle() -> NewTourSchedule {
    NewTourSchedule {
        name: "Cultural Triangle Explorer".to_string(),
        description: Some("Ancient cities, rock fortresses and cave temples".to_string()),
        days: 5,
        base_price_per_person: Money::from_major(95_000),
        vehicle_category: "SUV".to_string(),
        items: vec![
            day(1, "Colombo to Anuradhapura", 205, 18_000, 4_000, 0),
            day(2, "Anuradhapura sacred city", 40, 18_000, 4_000, 7_500),
            day(3, "Anuradhapura to Sigiriya", 75, 22_000, 4_500, 9_000),
            day(4, "Polonnaruwa and Minneriya safari", 110, 22_000, 4_500, 14_000),
            day(5, "Dambulla cave temple to Colombo", 150, 0, 3_000, 3_000),
        ],
    }
}

fn southern_coast() -> NewTourSchedule {
    NewTourSchedule {
        name: "Southern Coast & Wildlife".to_string(),
        description: Some("Galle Fort, whale watching and Yala".to_string()),
        days: 4,
        base_price_per_person: Money::from_major(80_000),
        vehicle_category: "VAN".to_string(),
        items: vec![
            day(1, "Colombo to Galle", 130, 20_000, 4_000, 2_000),
            day(2, "Mirissa whale watching", 35, 16_000, 4_000, 12_000),
            day(3, "Mirissa to Yala", 140, 25_000, 4_500, 15_000),
            day(4, "Yala to Colombo", 260, 0, 3_000, 0),
        ],
    }
}

fn hill_country() -> NewTourSchedule {
    NewTourSchedule {
        name: "Hill Country Tea Trail".to_string(),
        description: Some("Kandy, Nuwara Eliya and the Ella rail line".to_string()),
        days: 4,
        base_price_per_person: Money::from_major(85_000),
        vehicle_category: "SUV".to_string(),
        items: vec![
            day(1, "Colombo to Kandy", 120, 15_000, 3_500, 2_500),
            day(2, "Kandy to Nuwara Eliya via tea estates", 80, 19_000, 4_000, 3_000),
            day(3, "Nuwara Eliya to Ella", 90, 14_000, 3_500, 2_000),
            day(4, "Ella to Colombo", 230, 0, 3_000, 0),
        ],
    }
}
