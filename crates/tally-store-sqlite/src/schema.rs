//! SQL schema for the Tally SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Rows are never deleted; status = 'deleted' hides them from reads while
-- keeping the number reserved.
CREATE TABLE IF NOT EXISTS ideas (
    idea_id       TEXT PRIMARY KEY,
    tenant_id     TEXT NOT NULL,
    number        INTEGER NOT NULL,
    slug          TEXT NOT NULL,
    title         TEXT NOT NULL,
    description   TEXT NOT NULL,
    author_id     TEXT NOT NULL,
    created_at    TEXT NOT NULL,   -- RFC 3339 UTC, fixed precision
    status        TEXT NOT NULL DEFAULT 'open',
    response_text TEXT,
    responder_id  TEXT,
    responded_at  TEXT,
    original_id   TEXT REFERENCES ideas(idea_id),
    UNIQUE (tenant_id, number),
    CHECK  ((response_text IS NULL) = (responded_at IS NULL)),
    CHECK  ((responder_id  IS NULL) = (responded_at IS NULL)),
    CHECK  ((original_id IS NULL) OR status = 'duplicate')
);

CREATE TABLE IF NOT EXISTS supporters (
    idea_id    TEXT NOT NULL REFERENCES ideas(idea_id),
    user_id    TEXT NOT NULL,
    tenant_id  TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (idea_id, user_id)
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id TEXT PRIMARY KEY,
    idea_id    TEXT NOT NULL REFERENCES ideas(idea_id),
    tenant_id  TEXT NOT NULL,
    author_id  TEXT NOT NULL,
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    editor_id  TEXT,
    edited_at  TEXT,
    CHECK ((editor_id IS NULL) = (edited_at IS NULL))
);

CREATE TABLE IF NOT EXISTS tags (
    tag_id     TEXT PRIMARY KEY,
    tenant_id  TEXT NOT NULL,
    name       TEXT NOT NULL,
    slug       TEXT NOT NULL,
    color      TEXT NOT NULL,
    is_public  INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (tenant_id, slug)
);

CREATE TABLE IF NOT EXISTS idea_tags (
    tag_id     TEXT NOT NULL REFERENCES tags(tag_id) ON DELETE CASCADE,
    idea_id    TEXT NOT NULL REFERENCES ideas(idea_id),
    tenant_id  TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (tag_id, idea_id)
);

CREATE INDEX IF NOT EXISTS ideas_slug_idx       ON ideas(tenant_id, slug);
CREATE INDEX IF NOT EXISTS ideas_original_idx   ON ideas(original_id);
CREATE INDEX IF NOT EXISTS supporters_user_idx  ON supporters(tenant_id, user_id);
CREATE INDEX IF NOT EXISTS comments_idea_idx    ON comments(idea_id, created_at);
CREATE INDEX IF NOT EXISTS idea_tags_idea_idx   ON idea_tags(idea_id);

PRAGMA user_version = 1;
";
