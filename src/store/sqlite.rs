use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{LampstandError, Result};
use crate::domain::{Analysis, ArticleRecord, Favorite};
use crate::store::ArticleCache;

const ARTICLE_COLUMNS: &str = "a.id, a.url, a.category, a.title, a.content, a.description, \
     a.published_at, a.source_name, a.fetched_at, a.full_content, a.extraction_failed, a.image_url";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;

        conn.execute("PRAGMA foreign_keys = ON", [])?;
        migrations
            .to_latest(&mut conn)
            .map_err(|_| LampstandError::Database(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            LampstandError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
    }

    /// Map a row selected with `ARTICLE_COLUMNS`, starting at `offset`.
    fn article_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<ArticleRecord> {
        Ok(ArticleRecord {
            id: row.get(offset)?,
            url: row.get(offset + 1)?,
            category: row.get(offset + 2)?,
            title: row.get(offset + 3)?,
            content: row.get(offset + 4)?,
            description: row.get(offset + 5)?,
            published_at: row
                .get::<_, Option<String>>(offset + 6)?
                .and_then(|s| Self::parse_datetime(&s)),
            source_name: row.get(offset + 7)?,
            fetched_at: row
                .get::<_, Option<String>>(offset + 8)?
                .and_then(|s| Self::parse_datetime(&s)),
            full_content: row.get(offset + 9)?,
            extraction_failed: row.get::<_, i32>(offset + 10)? != 0,
            image_url: row.get(offset + 11)?,
        })
    }
}

impl ArticleCache for SqliteStore {
    fn get_article_by_url(&self, url: &str) -> Result<Option<ArticleRecord>> {
        let conn = self.lock()?;

        let result = conn
            .query_row(
                &format!("SELECT {} FROM articles a WHERE a.url = ?1", ARTICLE_COLUMNS),
                params![url],
                |row| Self::article_from_row(row, 0),
            )
            .optional()?;

        Ok(result)
    }

    fn upsert_article(&self, article: &ArticleRecord) -> Result<i64> {
        let conn = self.lock()?;

        let fetched_at = article.fetched_at.unwrap_or_else(Utc::now);

        conn.execute(
            "INSERT INTO articles (url, category, title, content, description, published_at,
                                   source_name, fetched_at, full_content, extraction_failed, image_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(url) DO UPDATE SET
                category = excluded.category,
                title = excluded.title,
                content = COALESCE(excluded.content, content),
                description = COALESCE(excluded.description, description),
                published_at = COALESCE(excluded.published_at, published_at),
                source_name = COALESCE(excluded.source_name, source_name),
                fetched_at = excluded.fetched_at,
                full_content = COALESCE(excluded.full_content, full_content),
                extraction_failed = excluded.extraction_failed,
                image_url = COALESCE(excluded.image_url, image_url)",
            params![
                article.url,
                article.category,
                article.title,
                article.content,
                article.description,
                article.published_at.map(|dt| dt.to_rfc3339()),
                article.source_name,
                fetched_at.to_rfc3339(),
                article.full_content,
                article.extraction_failed as i32,
                article.image_url,
            ],
        )?;

        // last_insert_rowid is stale when the statement took the update path
        let id = conn.query_row(
            "SELECT id FROM articles WHERE url = ?1",
            params![article.url],
            |row| row.get(0),
        )?;

        Ok(id)
    }

    fn update_image(&self, url: &str, image_url: &str) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "UPDATE articles SET image_url = ?1 WHERE url = ?2",
            params![image_url, url],
        )?;

        Ok(())
    }

    fn save_analysis(&self, article_id: i64, response: &str) -> Result<i64> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO analyses (article_id, response, created_at) VALUES (?1, ?2, ?3)",
            params![article_id, response, Utc::now().to_rfc3339()],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn latest_analysis(&self, article_id: i64) -> Result<Option<Analysis>> {
        let conn = self.lock()?;

        let result = conn
            .query_row(
                "SELECT id, article_id, response, created_at FROM analyses
                 WHERE article_id = ?1 ORDER BY created_at DESC, id DESC LIMIT 1",
                params![article_id],
                |row| {
                    Ok(Analysis {
                        id: row.get(0)?,
                        article_id: row.get(1)?,
                        response: row.get(2)?,
                        created_at: row
                            .get::<_, String>(3)
                            .ok()
                            .and_then(|s| Self::parse_datetime(&s))
                            .unwrap_or_else(Utc::now),
                    })
                },
            )
            .optional()?;

        Ok(result)
    }

    fn add_favorite(&self, article_id: i64, note: Option<&str>) -> Result<i64> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO favorites (article_id, user_note, created_at) VALUES (?1, ?2, ?3)",
            params![article_id, note, Utc::now().to_rfc3339()],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn favorites(&self) -> Result<Vec<Favorite>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT f.id, f.user_note, f.created_at, {}
             FROM favorites f JOIN articles a ON a.id = f.article_id
             ORDER BY f.created_at DESC, f.id DESC",
            ARTICLE_COLUMNS
        ))?;

        let favorites = stmt
            .query_map([], |row| {
                Ok(Favorite {
                    id: row.get(0)?,
                    user_note: row.get(1)?,
                    created_at: row
                        .get::<_, String>(2)
                        .ok()
                        .and_then(|s| Self::parse_datetime(&s))
                        .unwrap_or_else(Utc::now),
                    article: Self::article_from_row(row, 3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(favorites)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(url: &str) -> ArticleRecord {
        let mut record = ArticleRecord::new(url, "science", "A Title");
        record.content = Some("feed summary".into());
        record
    }

    #[test]
    fn test_upsert_and_get_article() {
        let store = SqliteStore::in_memory().unwrap();
        let id = store.upsert_article(&article("https://example.com/a")).unwrap();

        let retrieved = store.get_article_by_url("https://example.com/a").unwrap().unwrap();
        assert_eq!(retrieved.id, id);
        assert_eq!(retrieved.title, "A Title");
        assert_eq!(retrieved.content.as_deref(), Some("feed summary"));
        assert!(!retrieved.extraction_failed);
        assert!(retrieved.fetched_at.is_some());
    }

    #[test]
    fn test_missing_article() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.get_article_by_url("https://nowhere.example").unwrap().is_none());
    }

    #[test]
    fn test_upsert_is_keyed_by_url() {
        let store = SqliteStore::in_memory().unwrap();
        let mut record = article("https://example.com/a");
        record.image_url = Some("https://img.example/a.jpg".into());
        let first = store.upsert_article(&record).unwrap();

        let mut update = ArticleRecord::new("https://example.com/a", "science", "New Title");
        update.full_content = Some("full text".into());
        let second = store.upsert_article(&update).unwrap();

        assert_eq!(first, second);
        let stored = store.get_article_by_url("https://example.com/a").unwrap().unwrap();
        assert_eq!(stored.title, "New Title");
        assert_eq!(stored.full_content.as_deref(), Some("full text"));
        // absent fields keep their stored values
        assert_eq!(stored.content.as_deref(), Some("feed summary"));
        assert_eq!(stored.image_url.as_deref(), Some("https://img.example/a.jpg"));
    }

    #[test]
    fn test_extraction_failure_flag_persists() {
        let store = SqliteStore::in_memory().unwrap();
        let mut record = article("https://example.com/paywalled");
        record.extraction_failed = true;
        store.upsert_article(&record).unwrap();

        let stored = store
            .get_article_by_url("https://example.com/paywalled")
            .unwrap()
            .unwrap();
        assert!(stored.extraction_failed);
        assert!(!stored.has_full_content());
    }

    #[test]
    fn test_update_image() {
        let store = SqliteStore::in_memory().unwrap();
        store.upsert_article(&article("https://example.com/a")).unwrap();

        store
            .update_image("https://example.com/a", "https://img.example/new.png")
            .unwrap();

        let stored = store.get_article_by_url("https://example.com/a").unwrap().unwrap();
        assert_eq!(stored.image_url.as_deref(), Some("https://img.example/new.png"));
    }

    #[test]
    fn test_latest_analysis() {
        let store = SqliteStore::in_memory().unwrap();
        let id = store.upsert_article(&article("https://example.com/a")).unwrap();
        assert!(store.latest_analysis(id).unwrap().is_none());

        store.save_analysis(id, "first").unwrap();
        store.save_analysis(id, "second").unwrap();

        let latest = store.latest_analysis(id).unwrap().unwrap();
        assert_eq!(latest.article_id, id);
        assert_eq!(latest.response, "second");
    }

    #[test]
    fn test_analysis_requires_article() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.save_analysis(42, "orphan").is_err());
    }

    #[test]
    fn test_favorites_join_articles() {
        let store = SqliteStore::in_memory().unwrap();
        let a = store.upsert_article(&article("https://example.com/a")).unwrap();
        let b = store.upsert_article(&article("https://example.com/b")).unwrap();

        store.add_favorite(a, Some("read later")).unwrap();
        store.add_favorite(b, None).unwrap();

        let favorites = store.favorites().unwrap();
        assert_eq!(favorites.len(), 2);
        assert_eq!(favorites[0].article.url, "https://example.com/b");
        assert_eq!(favorites[1].user_note.as_deref(), Some("read later"));
    }

    #[test]
    fn test_on_disk_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("lampstand.db");

        {
            let store = SqliteStore::new(&path).unwrap();
            store.upsert_article(&article("https://example.com/a")).unwrap();
        }

        let reopened = SqliteStore::new(&path).unwrap();
        assert!(reopened.get_article_by_url("https://example.com/a").unwrap().is_some());
    }
}
