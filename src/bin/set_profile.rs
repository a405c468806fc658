//! Utility to set a user profile in the database
//!
//! Usage: set_profile <user_id> <age> <height_cm> <weight_kg> <male|female> [activity_level] [body_fat_percent]

use macrotrack::config;
use macrotrack::db::{migrations::run_migrations, Database, DbError};
use macrotrack::models::{ActivityLevel, AnthropometricProfile, Gender};
use macrotrack::tools::profiles;

const USAGE: &str =
    "usage: set_profile <user_id> <age> <height_cm> <weight_kg> <male|female> [activity_level] [body_fat_percent]";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 5 {
        return Err(USAGE.into());
    }

    let user_id: i64 = args[0].parse()?;
    let profile = AnthropometricProfile {
        age: args[1].parse()?,
        height_cm: args[2].parse()?,
        weight_kg: args[3].parse()?,
        gender: Gender::parse(&args[4]).ok_or("gender must be male or female")?,
        activity_level: match args.get(5) {
            Some(level) => ActivityLevel::parse(level).ok_or("unknown activity level")?,
            None => ActivityLevel::default(),
        },
        body_fat_percent: args.get(6).map(|bf| bf.parse()).transpose()?,
    };

    let db_path = config::database_path();
    println!("Database path: {}", db_path.display());
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::new(&db_path)?;
    database.with_conn(|conn| {
        run_migrations(conn)?;
        Ok::<_, DbError>(())
    })?;

    let stored = profiles::set_profile(&database, user_id, profile)?;
    println!("Profile set for user {}:", user_id);
    println!("  Age: {}", stored.profile.profile.age);
    println!("  Height: {} cm", stored.profile.profile.height_cm);
    println!("  Weight: {} kg", stored.profile.profile.weight_kg);
    match stored.profile.profile.body_fat_percent {
        Some(bf) => println!("  Body fat: {}%", bf),
        None => println!("  Body fat: not set (lean_mass model unavailable)"),
    }
    println!("  Updated: {}", stored.profile.updated_at);

    Ok(())
}
