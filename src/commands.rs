//! Command-line interface and command handlers.
//!
//! Each subcommand is a variant of [`Command`]; handlers receive the
//! explicit [`App`] context. Commands that act on behalf of a user
//! resolve the logged-in user up front.

use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::app::App;
use crate::db::{
    FeedFollowRepository, FeedRepository, NewFeed, PostRepository, UserRepository,
};
use crate::error::{FeedloopError, Result};
use crate::rss::Aggregator;

/// Default number of posts shown by `browse`.
const DEFAULT_BROWSE_LIMIT: i64 = 2;

/// Multi-user RSS feed aggregator.
#[derive(Debug, Parser)]
#[command(name = "feedloop", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in as an existing user.
    Login {
        /// User name.
        name: String,
    },
    /// Register a new user and log in as them.
    Register {
        /// User name.
        name: String,
    },
    /// Delete all users (feeds, follows and posts cascade).
    Reset,
    /// List all users.
    Users,
    /// Run the aggregation loop until interrupted.
    Agg {
        /// Poll interval, e.g. "30s" or "1m".
        #[arg(value_parser = parse_duration)]
        every: Duration,
    },
    /// Register a feed and follow it.
    Addfeed {
        /// Display name for the feed.
        name: String,
        /// Feed URL.
        url: String,
    },
    /// List all registered feeds.
    Feeds,
    /// Follow a feed by URL.
    Follow {
        /// Feed URL.
        url: String,
    },
    /// List the feeds you follow.
    Following,
    /// Unfollow a feed by URL.
    Unfollow {
        /// Feed URL.
        url: String,
    },
    /// Show recent posts from the feeds you follow.
    Browse {
        /// Maximum number of posts to show.
        limit: Option<i64>,
    },
}

fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

/// Dispatch a parsed command against the application context.
pub async fn dispatch(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::Login { name } => login(app, &name).await,
        Command::Register { name } => register(app, &name).await,
        Command::Reset => reset(app).await,
        Command::Users => users(app).await,
        Command::Agg { every } => agg(app, every).await,
        Command::Addfeed { name, url } => add_feed(app, &name, &url).await,
        Command::Feeds => feeds(app).await,
        Command::Follow { url } => follow(app, &url).await,
        Command::Following => following(app).await,
        Command::Unfollow { url } => unfollow(app, &url).await,
        Command::Browse { limit } => browse(app, limit).await,
    }
}

async fn login(app: &mut App, name: &str) -> Result<()> {
    let user = UserRepository::new(app.db.pool())
        .get_by_name(name)
        .await?
        .ok_or_else(|| FeedloopError::NotFound(format!("user '{}'", name)))?;

    app.config.set_user(&user.name)?;
    println!("logged in as {}", user.name);
    Ok(())
}

async fn register(app: &mut App, name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FeedloopError::Usage("user name must not be empty".into()));
    }

    let user = UserRepository::new(app.db.pool()).create(trimmed).await?;
    app.config.set_user(&user.name)?;
    println!("registered and logged in as {}", user.name);
    Ok(())
}

async fn reset(app: &App) -> Result<()> {
    let deleted = UserRepository::new(app.db.pool()).delete_all().await?;
    println!("deleted {} user(s)", deleted);
    Ok(())
}

async fn users(app: &App) -> Result<()> {
    app.require_login().await?;

    let users = UserRepository::new(app.db.pool()).list().await?;
    let current = app.config.current_user_name.as_deref();

    for user in users {
        if Some(user.name.as_str()) == current {
            println!("* {} (current)", user.name);
        } else {
            println!("* {}", user.name);
        }
    }
    Ok(())
}

async fn agg(app: &App, every: Duration) -> Result<()> {
    app.require_login().await?;

    let aggregator = Aggregator::new(app.db.pool().clone(), every)?;
    println!(
        "Collecting feeds every {}",
        humantime::format_duration(every)
    );

    // The loop only stops on a shutdown signal; dropping the future
    // aborts any in-flight fetch.
    tokio::select! {
        _ = aggregator.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received, stopping aggregation");
        }
    }
    Ok(())
}

/// Check that a feed URL is well-formed and uses http or https.
fn validate_feed_url(raw: &str) -> Result<()> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| FeedloopError::Usage(format!("invalid feed URL: {}", e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(FeedloopError::Usage(format!(
            "unsupported URL scheme: {}",
            scheme
        ))),
    }
}

async fn add_feed(app: &App, name: &str, url: &str) -> Result<()> {
    let user = app.require_login().await?;
    validate_feed_url(url)?;

    let feed = FeedRepository::new(app.db.pool())
        .create(&NewFeed::new(name, url, user.id))
        .await?;
    // The creator follows their own feed automatically.
    FeedFollowRepository::new(app.db.pool())
        .create(user.id, feed.id)
        .await?;

    println!("added feed {} ({})", feed.name, feed.url);
    Ok(())
}

async fn feeds(app: &App) -> Result<()> {
    app.require_login().await?;

    for entry in FeedRepository::new(app.db.pool()).list_all().await? {
        println!("* {} | {} | {}", entry.feed.name, entry.feed.url, entry.owner_name);
    }
    Ok(())
}

async fn follow(app: &App, url: &str) -> Result<()> {
    let user = app.require_login().await?;

    let feed = FeedRepository::new(app.db.pool())
        .get_by_url(url)
        .await?
        .ok_or_else(|| FeedloopError::NotFound(format!("feed with url {}", url)))?;

    let followed = FeedFollowRepository::new(app.db.pool())
        .create(user.id, feed.id)
        .await?;

    println!("{} now follows {}", followed.user_name, followed.feed_name);
    Ok(())
}

async fn following(app: &App) -> Result<()> {
    let user = app.require_login().await?;

    for followed in FeedFollowRepository::new(app.db.pool())
        .list_for_user(user.id)
        .await?
    {
        println!("* {}", followed.feed_name);
    }
    Ok(())
}

async fn unfollow(app: &App, url: &str) -> Result<()> {
    let user = app.require_login().await?;

    let feed = FeedRepository::new(app.db.pool())
        .get_by_url(url)
        .await?
        .ok_or_else(|| FeedloopError::NotFound(format!("feed with url {}", url)))?;

    let removed = FeedFollowRepository::new(app.db.pool())
        .delete(user.id, feed.id)
        .await?;
    if !removed {
        return Err(FeedloopError::NotFound(format!("follow for {}", url)));
    }

    println!("unfollowed {}", feed.name);
    Ok(())
}

async fn browse(app: &App, limit: Option<i64>) -> Result<()> {
    let user = app.require_login().await?;
    let limit = limit.unwrap_or(DEFAULT_BROWSE_LIMIT);
    if limit < 1 {
        return Err(FeedloopError::Usage("limit must be at least 1".into()));
    }

    for post in PostRepository::new(app.db.pool())
        .list_for_user(user.id, limit)
        .await?
    {
        println!("* {} ({})", post.title, post.published_at.format("%Y-%m-%d"));
        println!("  {}", post.url);
        if !post.description.is_empty() {
            println!("  {}", post.description);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use clap::CommandFactory;

    async fn test_app(current_user: Option<&str>) -> App {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let user = match current_user {
            Some(name) => format!(r#", "current_user_name": "{}""#, name),
            None => String::new(),
        };
        std::fs::write(
            &path,
            format!(r#"{{"db_url": "sqlite::memory:"{}}}"#, user),
        )
        .unwrap();
        let config = Config::load_from(&path).unwrap();
        App::new(config).await.unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_agg_duration() {
        let cli = Cli::try_parse_from(["feedloop", "agg", "30s"]).unwrap();
        match cli.command {
            Command::Agg { every } => assert_eq!(every, Duration::from_secs(30)),
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from(["feedloop", "agg", "1m"]).unwrap();
        match cli.command {
            Command::Agg { every } => assert_eq!(every, Duration::from_secs(60)),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_duration_is_usage_error() {
        assert!(Cli::try_parse_from(["feedloop", "agg", "soon"]).is_err());
    }

    #[test]
    fn test_parse_addfeed() {
        let cli =
            Cli::try_parse_from(["feedloop", "addfeed", "Blog", "https://example.com/rss"])
                .unwrap();
        match cli.command {
            Command::Addfeed { name, url } => {
                assert_eq!(name, "Blog");
                assert_eq!(url, "https://example.com/rss");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_browse_default_limit() {
        let cli = Cli::try_parse_from(["feedloop", "browse"]).unwrap();
        match cli.command {
            Command::Browse { limit } => assert!(limit.is_none()),
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from(["feedloop", "browse", "5"]).unwrap();
        match cli.command {
            Command::Browse { limit } => assert_eq!(limit, Some(5)),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["feedloop", "frobnicate"]).is_err());
    }

    #[tokio::test]
    async fn test_users_requires_login() {
        let mut app = test_app(None).await;
        assert!(matches!(
            dispatch(&mut app, Command::Users).await,
            Err(FeedloopError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_users_lists_when_logged_in() {
        let mut app = test_app(Some("alice")).await;
        UserRepository::new(app.db.pool())
            .create("alice")
            .await
            .unwrap();

        dispatch(&mut app, Command::Users).await.unwrap();
    }

    #[test]
    fn test_validate_feed_url() {
        assert!(validate_feed_url("https://example.com/feed.xml").is_ok());
        assert!(validate_feed_url("http://example.com/feed.xml").is_ok());
        assert!(validate_feed_url("ftp://example.com/feed.xml").is_err());
        assert!(validate_feed_url("not a url").is_err());
    }
}
