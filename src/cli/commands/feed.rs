//! Feed command handlers.

use anyhow::{Context, Result};

use crate::api::retry_fixed;
use crate::cli::App;
use crate::feed::{self, FeedState};
use crate::models::Post;

pub async fn list(
    app: &App,
    pages: u32,
    category: Option<u64>,
    search: Option<&str>,
) -> Result<()> {
    let per_page = app.config.page_size();

    let mut state = FeedState::default();
    feed::load_initial(&mut state, &app.content, per_page, app.config.fresh_limit())
        .await
        .context("load posts")?;

    while state.page < pages {
        if !feed::load_more(&mut state, &app.content, per_page)
            .await
            .context("load more posts")?
        {
            break;
        }
    }

    for post in feed::filter_posts(&state.posts, category, search) {
        print_post_line(post);
    }
    print_more_hint(&state);
    Ok(())
}

pub async fn show(app: &App, id: u64) -> Result<()> {
    let post = retry_fixed(|| app.content.get_post(id))
        .await
        .context("load post")?;

    println!("{}", post.title.rendered);
    println!("{}", post.date.format("%Y-%m-%d %H:%M"));
    if let Some(author) = post.author_name() {
        println!("by {author}");
    }
    println!();
    println!("{}", post.content.rendered);
    Ok(())
}

pub async fn categories(app: &App) -> Result<()> {
    let categories = retry_fixed(|| app.content.list_categories())
        .await
        .context("load categories")?;

    for category in categories {
        println!("{:>5}  {}", category.id, category.name);
    }
    Ok(())
}

pub async fn home(app: &App) -> Result<()> {
    if app.store.take_just_completed_onboarding() {
        println!("You're all set. Here's your first look at the feed.");
        println!();
    }

    let mut state = FeedState::default();
    feed::load_initial(
        &mut state,
        &app.content,
        app.config.page_size(),
        app.config.fresh_limit(),
    )
    .await
    .context("load home feed")?;

    println!("Fresh");
    println!("-----");
    for post in &state.fresh {
        print_post_line(post);
    }

    println!();
    println!("Latest");
    println!("------");
    for post in state.latest_posts() {
        print_post_line(post);
    }
    Ok(())
}

fn print_post_line(post: &Post) {
    println!(
        "{:>6}  {}  {}",
        post.id,
        post.date.format("%Y-%m-%d"),
        post.title.rendered
    );
}

fn print_more_hint(state: &FeedState) {
    if state.has_more {
        println!("(more pages available; pass --pages to fetch them)");
    }
}
