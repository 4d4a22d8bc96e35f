//! Database schema migrations for feedloop.

/// Ordered list of schema migrations. Each entry is applied in its own
/// transaction and recorded in `schema_version`.
pub const MIGRATIONS: &[&str] = &[
    // v1: subscription model (users, feeds, follows, posts)
    r#"
    CREATE TABLE users (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL UNIQUE,
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL
    );

    CREATE TABLE feeds (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        name             TEXT NOT NULL,
        url              TEXT NOT NULL UNIQUE,
        user_id          INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        last_fetched_at  TEXT,
        created_at       TEXT NOT NULL,
        updated_at       TEXT NOT NULL
    );
    CREATE INDEX idx_feeds_user_id ON feeds(user_id);
    CREATE INDEX idx_feeds_last_fetched_at ON feeds(last_fetched_at);

    CREATE TABLE feed_follows (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        feed_id     INTEGER NOT NULL REFERENCES feeds(id) ON DELETE CASCADE,
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL,
        UNIQUE(user_id, feed_id)
    );

    CREATE TABLE posts (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        feed_id       INTEGER NOT NULL REFERENCES feeds(id) ON DELETE CASCADE,
        title         TEXT NOT NULL,
        description   TEXT NOT NULL,
        url           TEXT NOT NULL UNIQUE,
        published_at  TEXT NOT NULL,
        created_at    TEXT NOT NULL,
        updated_at    TEXT NOT NULL
    );
    CREATE INDEX idx_posts_feed_id ON posts(feed_id);
    CREATE INDEX idx_posts_published_at ON posts(published_at);
    "#,
];
