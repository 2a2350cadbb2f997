use std::io::Read;
use std::path::Path;

use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::entity::account;
use crate::utils::hash;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read accounts file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to hash password for {email}: {message}")]
    Hash { email: String, message: String },
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// One row of the accounts CSV (`first_name,last_name,email,password`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Parse the accounts CSV. Malformed rows and rows without an email or
/// password are skipped with a warning.
pub fn parse_accounts_csv<R: Read>(reader: R) -> Vec<AccountRecord> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, row) in csv_reader.deserialize::<AccountRecord>().enumerate() {
        // Line 1 is the header.
        let line = index + 2;
        match row {
            Ok(record) if record.email.is_empty() || record.password.is_empty() => {
                warn!(line, "Skipping account row without email or password");
            }
            Ok(record) => records.push(record),
            Err(e) => warn!(line, error = %e, "Skipping malformed account row"),
        }
    }
    records
}

/// Create an account for every CSV row whose email is not registered yet.
///
/// Returns the number of accounts created. A missing file is not an error.
pub async fn bootstrap_accounts(db: &DatabaseConnection, path: &Path) -> Result<u32, SeedError> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Accounts file not found, skipping bootstrap");
            return Ok(0);
        }
        Err(source) => {
            return Err(SeedError::Io {
                path: path.display().to_string(),
                source,
            });
        }
    };

    let records = parse_accounts_csv(file);
    let mut inserted = 0u32;

    for record in records {
        let exists = account::Entity::find()
            .filter(account::Column::Email.eq(record.email.as_str()))
            .count(db)
            .await?
            > 0;
        if exists {
            info!(email = %record.email, "Account already exists, skipping");
            continue;
        }

        let password_hash =
            hash::hash_password(&record.password).map_err(|e| SeedError::Hash {
                email: record.email.clone(),
                message: e.to_string(),
            })?;

        let now = chrono::Utc::now();
        let model = account::ActiveModel {
            first_name: Set(record.first_name),
            last_name: Set(record.last_name),
            email: Set(record.email.clone()),
            password: Set(password_hash),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = account::Entity::insert(model)
            .on_conflict(
                OnConflict::column(account::Column::Email)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(rows) if rows > 0 => inserted += 1,
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e.into()),
        }
    }

    if inserted > 0 {
        info!("Bootstrapped {} new accounts", inserted);
    }

    Ok(inserted)
}
