use anyhow::{Context, Result};
use chrono::NaiveDate;
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    auth::password,
    config::AppConfig,
    db::PgPool,
    models::{Account, NewAccount, NewProfile, NewSpecies, Profile, Species},
    schema::{accounts, profiles, species},
};

const SEED_SPECIES: &[&str] = &["Perro", "Gato"];

/// Idempotent bootstrap: the admin account with its profile plus the two
/// starter species. Invoked explicitly from `main` when `SEED_ON_START` is
/// set; safe to run on every boot.
pub fn run(pool: &PgPool, config: &AppConfig) -> Result<()> {
    let mut conn = pool.get().context("failed to get database connection")?;

    let admin_email = config.admin_email.trim().to_lowercase();

    let account: Account = match accounts::table
        .filter(accounts::email.eq(&admin_email))
        .first(&mut conn)
        .optional()?
    {
        Some(existing) => existing,
        None => {
            let new_account = NewAccount {
                id: Uuid::new_v4(),
                email: admin_email.clone(),
                password_hash: password::hash_password(&config.admin_password)?,
            };
            diesel::insert_into(accounts::table)
                .values(&new_account)
                .execute(&mut conn)?;
            tracing::info!(email = %admin_email, "seeded admin account");
            accounts::table.find(new_account.id).first(&mut conn)?
        }
    };

    let profile: Option<Profile> = profiles::table
        .filter(profiles::account_id.eq(account.id))
        .first(&mut conn)
        .optional()?;
    if profile.is_none() {
        let new_profile = NewProfile {
            id: Uuid::new_v4(),
            account_id: account.id,
            name: "Admin".to_string(),
            lastname: "Admin".to_string(),
            birthday: NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid date"),
            picture: None,
            admin: true,
            college: "-".to_string(),
            review: "-".to_string(),
        };
        diesel::insert_into(profiles::table)
            .values(&new_profile)
            .execute(&mut conn)?;
        tracing::info!("seeded admin profile");
    }

    for name in SEED_SPECIES {
        let existing: Option<Species> = species::table
            .filter(species::parent_species_id.is_null())
            .filter(species::name.eq(name))
            .first(&mut conn)
            .optional()?;
        if existing.is_none() {
            let new_species = NewSpecies {
                id: Uuid::new_v4(),
                name: name.to_string(),
                parent_species_id: None,
            };
            diesel::insert_into(species::table)
                .values(&new_species)
                .execute(&mut conn)?;
            tracing::info!(species = name, "seeded species");
        }
    }

    Ok(())
}
