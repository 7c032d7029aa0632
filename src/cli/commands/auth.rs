//! Auth command handlers.

use anyhow::Result;

use crate::cli::App;
use crate::store::{KEY_ACCESS_TOKEN, mask_token};

pub async fn login(app: &mut App, email: &str, password: &str) -> Result<()> {
    validate_email(email)?;
    validate_password(password)?;

    match app.session.login(&mut app.auth, email, password).await {
        Ok(()) => {
            let name = app
                .auth
                .user
                .as_ref()
                .map_or("you", |u| u.name.as_str());
            println!("Logged in as {name}.");
            Ok(())
        }
        Err(message) => anyhow::bail!(message),
    }
}

pub async fn signup(app: &mut App, name: &str, email: &str, password: &str) -> Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("Name is required");
    }
    validate_email(email)?;
    validate_password(password)?;

    match app.session.signup(&mut app.auth, name, email, password).await {
        Ok(()) => {
            println!("Account created. Welcome, {name}!");
            Ok(())
        }
        Err(message) => anyhow::bail!(message),
    }
}

pub async fn logout(app: &mut App) -> Result<()> {
    // Never fails: local cleanup happens regardless of the server call.
    let _ = app.session.logout(&mut app.auth).await;
    println!("Logged out.");
    Ok(())
}

pub fn status(app: &App) -> Result<()> {
    match &app.auth.user {
        Some(user) if app.auth.is_authenticated => {
            println!("Signed in as {} <{}>", user.name, user.email);
            if let Ok(Some(token)) = app.store.get(KEY_ACCESS_TOKEN) {
                println!("Access token: {}", mask_token(&token));
            }
        }
        _ if app.auth.is_guest() => {
            println!("Not signed in (browsing as guest).");
        }
        _ => {
            println!("Not signed in.");
        }
    }
    Ok(())
}

/// Client-side validation: blocks submission before anything reaches the
/// network.
fn validate_email(email: &str) -> Result<()> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        anyhow::bail!("Email is required");
    }
    // Cheap shape check only; the backend does the real validation.
    let Some((local, domain)) = trimmed.split_once('@') else {
        anyhow::bail!("Email address looks malformed");
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        anyhow::bail!("Email address looks malformed");
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        anyhow::bail!("Password is required");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: malformed emails are rejected before any network call.
    #[test]
    fn test_email_validation() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("nodomain").is_err());
        assert!(validate_email("@b.com").is_err());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("a@nodot").is_err());
    }

    /// Test: empty passwords are rejected.
    #[test]
    fn test_password_validation() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("").is_err());
    }
}
