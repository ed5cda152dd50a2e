use anyhow::{Context, Result};
use mastery_db::KvBackend;
use mastery_tracker::Tracker;

pub async fn login<B: KvBackend>(tracker: &Tracker<B>, username: &str) -> Result<()> {
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;

    match tracker.session().login(username.trim(), &password).await? {
        Some(user) => {
            println!("👋 Welcome, {} ({})", user.name, user.role);
            Ok(())
        }
        None => anyhow::bail!("Invalid username or password"),
    }
}

pub async fn logout<B: KvBackend>(tracker: &Tracker<B>) -> Result<()> {
    tracker.session().logout().await?;
    println!("Logged out");
    Ok(())
}

pub async fn whoami<B: KvBackend>(tracker: &Tracker<B>) -> Result<()> {
    match tracker.session().current_user().await? {
        Some(user) => {
            println!("Current Session:");
            println!("  User: {} ({})", user.name, user.id);
            println!("  Role: {}", user.role);
        }
        None => println!("Not logged in"),
    }
    Ok(())
}
