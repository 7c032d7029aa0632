//! Community and profile command handlers.

use anyhow::{Context, Result};

use crate::cli::App;
use crate::community::{self, LeaderboardState};
use crate::models::BasicProfileUpdate;

pub async fn profile_show(app: &App) -> Result<()> {
    let profile = app.backend.profile().await.context("load profile")?;

    println!("{} <{}>", profile.name, profile.email);
    if let Some(level) = profile.level {
        println!("Level: {level:?}");
    }
    if let Some(bio) = &profile.profile.bio {
        println!("Bio: {bio}");
    }
    if !profile.profile.skills.is_empty() {
        println!("Skills: {}", profile.profile.skills.join(", "));
    }
    Ok(())
}

pub async fn profile_update(
    app: &App,
    name: Option<String>,
    bio: Option<String>,
    skills: Vec<String>,
) -> Result<()> {
    if name.is_none() && bio.is_none() && skills.is_empty() {
        anyhow::bail!("Nothing to update; pass --name, --bio, or --skill");
    }

    let update = BasicProfileUpdate {
        name,
        bio,
        skills: if skills.is_empty() { None } else { Some(skills) },
    };
    let profile = app
        .backend
        .update_profile(&update)
        .await
        .context("update profile")?;

    println!("Profile updated for {}.", profile.name);
    Ok(())
}

pub async fn check_in(app: &App) -> Result<()> {
    match app.backend.check_in().await {
        Ok(result) => {
            println!("{}", result.message);
            println!(
                "XP: {}  Level: {:?}  Stars: {}",
                result.xp, result.level, result.stars
            );
            println!(
                "Streak: {} (longest {})",
                result.streak.current, result.streak.longest
            );
            Ok(())
        }
        // Check-in failures are transient notices, not hard errors.
        Err(e) => {
            println!("{}", e.user_message());
            Ok(())
        }
    }
}

pub async fn leaderboard(app: &App, limit: u32, pages: u32) -> Result<()> {
    let mut state = LeaderboardState::default();
    for _ in 0..pages.max(1) {
        if !community::load_more(&mut state, &app.backend, limit)
            .await
            .context("load leaderboard")?
        {
            break;
        }
    }

    for (rank, user) in state.users.iter().enumerate() {
        let skills = if user.profile.skills.is_empty() {
            String::new()
        } else {
            format!("  [{}]", user.profile.skills.join(", "))
        };
        println!("{:>3}. {}  ({:?}){}", rank + 1, user.name, user.level, skills);
    }
    if state.has_more {
        println!("(more entries available; pass --pages to fetch them)");
    }
    Ok(())
}
