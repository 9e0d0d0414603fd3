//! Admin account commands.
//!
//! # Usage
//!
//! ```bash
//! bb-cli admin create -e owner@bloombouquet.id -n "Shop Owner" -r super_admin
//! bb-cli admin reset-password -e owner@bloombouquet.id -p 'new-password'
//! ```

use bloom_bouquet_admin::services::AuthService;
use bloom_bouquet_admin::services::auth::generate_password;
use bloom_bouquet_core::AdminRole;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminCommandError {
    #[error("Invalid role: {0}. Valid roles: super_admin, admin")]
    InvalidRole(String),
}

/// Print a generated password once; it is never logged.
#[allow(clippy::print_stdout)]
fn show_generated(email: &str, password: &str) {
    println!("Generated password for {email}: {password}");
    println!("Store it now; it cannot be shown again.");
}

/// Create an admin account.
///
/// # Errors
///
/// Returns an error for an unknown role, an invalid email or password, an
/// email that is already taken, or a database failure.
pub async fn create(
    email: &str,
    name: &str,
    role: &str,
    password: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let role: AdminRole = role
        .parse()
        .map_err(|_| AdminCommandError::InvalidRole(role.to_owned()))?;

    let generated = password.is_none().then(generate_password);
    let password = password.or(generated.as_deref()).unwrap_or_default();

    let pool = super::connect().await?;
    let admin = AuthService::new(&pool)
        .create_admin(email, name, role, password)
        .await?;

    tracing::info!(
        admin_id = %admin.id,
        email = %admin.email.as_str(),
        role = %role,
        "Admin created"
    );
    if let Some(generated) = generated {
        show_generated(admin.email.as_str(), &generated);
    }
    Ok(())
}

/// Replace an admin's password.
///
/// # Errors
///
/// Returns an error if no admin has this email, the password is too short,
/// or the database fails.
pub async fn reset_password(
    email: &str,
    password: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let new_password = AuthService::new(&pool)
        .reset_password(email, password)
        .await?;

    tracing::info!(email, "Admin password reset");
    if password.is_none() {
        show_generated(email, &new_password);
    }
    Ok(())
}
