//! SQLite-backed implementation of the repository contracts.
//!
//! One database file holds items, progress, resources and goals. List
//! fields (translations, links, per-level card maps) are stored as JSON
//! text; timestamps as RFC 3339 text. The current level's due timestamp
//! is denormalized into its own column so due queries stay in SQL.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};
use std::path::Path;
use tracing::info;

use crate::domain::{Goal, ItemId, ItemKind, LearningItem, ProgressRecord, Resource};
use crate::repo::{GoalRepo, ItemRepo, ProgressRepo, RepoError, RepoResult, ResourceRepo};

impl From<rusqlite::Error> for RepoError {
  fn from(e: rusqlite::Error) -> Self {
    RepoError::Storage(e.to_string())
  }
}

pub struct SqliteStore {
  conn: Connection,
}

impl SqliteStore {
  pub fn open(path: &Path) -> RepoResult<Self> {
    let conn = Connection::open(path)?;
    run_migrations(&conn)?;
    info!(path = %path.display(), "opened learning database");
    Ok(Self { conn })
  }

  pub fn open_in_memory() -> RepoResult<Self> {
    let conn = Connection::open_in_memory()?;
    run_migrations(&conn)?;
    Ok(Self { conn })
  }
}

fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS items (
      uid TEXT PRIMARY KEY,
      language TEXT NOT NULL,
      kind TEXT NOT NULL,
      content TEXT NOT NULL,
      translations TEXT NOT NULL DEFAULT '[]',
      notes TEXT,
      links TEXT NOT NULL DEFAULT '[]',
      priority INTEGER NOT NULL DEFAULT 1,
      do_not_practice INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS progress (
      item TEXT PRIMARY KEY,
      level INTEGER NOT NULL,
      streak INTEGER NOT NULL DEFAULT 0,
      cards TEXT NOT NULL DEFAULT '{}',
      -- Due timestamp of the current level's card, kept in sync on every
      -- upsert so due queries need no JSON parsing
      current_due TEXT
    );

    CREATE TABLE IF NOT EXISTS resources (
      uid TEXT PRIMARY KEY,
      title TEXT NOT NULL,
      language TEXT NOT NULL,
      vocab TEXT NOT NULL DEFAULT '[]',
      fact_cards TEXT NOT NULL DEFAULT '[]',
      finished INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS goals (
      uid TEXT PRIMARY KEY,
      title TEXT NOT NULL,
      language TEXT NOT NULL,
      vocab TEXT NOT NULL DEFAULT '[]',
      completed INTEGER NOT NULL DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS idx_items_language ON items(language);
    CREATE INDEX IF NOT EXISTS idx_progress_due ON progress(current_due);
    "#,
  )
}

fn json_column<T: serde::de::DeserializeOwned>(raw: &str, column: &str) -> RepoResult<T> {
  serde_json::from_str(raw).map_err(|e| RepoError::Corrupt(format!("{}: {}", column, e)))
}

fn row_to_item(row: &Row<'_>) -> RepoResult<LearningItem> {
  let kind_tag: String = row.get("kind")?;
  let kind = ItemKind::from_str(&kind_tag)
    .ok_or_else(|| RepoError::Corrupt(format!("unknown item kind: {}", kind_tag)))?;
  let translations: String = row.get("translations")?;
  let links: String = row.get("links")?;
  Ok(LearningItem {
    uid: row.get("uid")?,
    language: row.get("language")?,
    kind,
    content: row.get("content")?,
    translations: json_column(&translations, "translations")?,
    notes: row.get("notes")?,
    links: json_column(&links, "links")?,
    priority: row.get("priority")?,
    do_not_practice: row.get("do_not_practice")?,
  })
}

const ITEM_COLUMNS: &str =
  "uid, language, kind, content, translations, notes, links, priority, do_not_practice";

impl SqliteStore {
  fn query_items(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> RepoResult<Vec<LearningItem>> {
    let mut stmt = self.conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
      items.push(row_to_item(row)?);
    }
    Ok(items)
  }
}

impl ItemRepo for SqliteStore {
  fn get_all(&self) -> RepoResult<Vec<LearningItem>> {
    self.query_items(&format!("SELECT {} FROM items", ITEM_COLUMNS), &[])
  }

  fn get_by_id(&self, uid: &str) -> RepoResult<Option<LearningItem>> {
    let mut items = self.query_items(
      &format!("SELECT {} FROM items WHERE uid = ?1", ITEM_COLUMNS),
      &[&uid],
    )?;
    Ok(items.pop())
  }

  fn get_by_ids(&self, uids: &[ItemId]) -> RepoResult<Vec<LearningItem>> {
    let mut items = Vec::new();
    for uid in uids {
      if let Some(item) = ItemRepo::get_by_id(self, uid)? {
        items.push(item);
      }
    }
    Ok(items)
  }

  fn add(&self, item: &LearningItem) -> RepoResult<()> {
    let translations = serde_json::to_string(&item.translations)
      .map_err(|e| RepoError::Corrupt(e.to_string()))?;
    let links =
      serde_json::to_string(&item.links).map_err(|e| RepoError::Corrupt(e.to_string()))?;
    self.conn.execute(
      r#"
      INSERT INTO items (uid, language, kind, content, translations, notes, links, priority, do_not_practice)
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
      "#,
      params![
        item.uid,
        item.language,
        item.kind.as_str(),
        item.content,
        translations,
        item.notes,
        links,
        item.priority,
        item.do_not_practice,
      ],
    )?;
    Ok(())
  }

  fn update(&self, item: &LearningItem) -> RepoResult<()> {
    let translations = serde_json::to_string(&item.translations)
      .map_err(|e| RepoError::Corrupt(e.to_string()))?;
    let links =
      serde_json::to_string(&item.links).map_err(|e| RepoError::Corrupt(e.to_string()))?;
    let changed = self.conn.execute(
      r#"
      UPDATE items
      SET language = ?2, kind = ?3, content = ?4, translations = ?5, notes = ?6,
          links = ?7, priority = ?8, do_not_practice = ?9
      WHERE uid = ?1
      "#,
      params![
        item.uid,
        item.language,
        item.kind.as_str(),
        item.content,
        translations,
        item.notes,
        links,
        item.priority,
        item.do_not_practice,
      ],
    )?;
    if changed == 0 {
      return Err(RepoError::Storage(format!("no such item: {}", item.uid)));
    }
    Ok(())
  }

  fn delete(&self, uid: &str) -> RepoResult<()> {
    self.conn.execute("DELETE FROM items WHERE uid = ?1", params![uid])?;
    self.conn.execute("DELETE FROM progress WHERE item = ?1", params![uid])?;
    Ok(())
  }

  fn get_all_due(&self, now: DateTime<Utc>) -> RepoResult<Vec<LearningItem>> {
    self.query_items(
      &format!(
        r#"
        SELECT {} FROM items
        JOIN progress ON progress.item = items.uid
        WHERE progress.level >= 0 AND progress.current_due <= ?1
        "#,
        ITEM_COLUMNS
      ),
      &[&now.to_rfc3339()],
    )
  }

  fn get_random_unseen(
    &self,
    n: usize,
    languages: &[String],
    block: &[ItemId],
  ) -> RepoResult<Vec<LearningItem>> {
    let candidates = self.query_items(
      &format!(
        r#"
        SELECT {} FROM items
        LEFT JOIN progress ON progress.item = items.uid
        WHERE progress.item IS NULL OR progress.level < 0
        ORDER BY RANDOM()
        "#,
        ITEM_COLUMNS
      ),
      &[],
    )?;
    Ok(
      candidates
        .into_iter()
        .filter(|item| languages.contains(&item.language) && !block.contains(&item.uid))
        .take(n)
        .collect(),
    )
  }

  fn get_random_already_seen_due(
    &self,
    n: usize,
    languages: &[String],
    block: &[ItemId],
    now: DateTime<Utc>,
  ) -> RepoResult<Vec<LearningItem>> {
    let candidates = self.query_items(
      &format!(
        r#"
        SELECT {} FROM items
        JOIN progress ON progress.item = items.uid
        WHERE progress.level >= 0 AND progress.current_due <= ?1
        ORDER BY RANDOM()
        "#,
        ITEM_COLUMNS
      ),
      &[&now.to_rfc3339()],
    )?;
    Ok(
      candidates
        .into_iter()
        .filter(|item| languages.contains(&item.language) && !block.contains(&item.uid))
        .take(n)
        .collect(),
    )
  }

  fn get_due_in_language(
    &self,
    language: &str,
    now: DateTime<Utc>,
  ) -> RepoResult<Vec<LearningItem>> {
    self.query_items(
      &format!(
        r#"
        SELECT {} FROM items
        JOIN progress ON progress.item = items.uid
        WHERE items.language = ?1 AND progress.level >= 0 AND progress.current_due <= ?2
        "#,
        ITEM_COLUMNS
      ),
      &[&language, &now.to_rfc3339()],
    )
  }
}

impl ProgressRepo for SqliteStore {
  fn get(&self, item: &str) -> RepoResult<Option<ProgressRecord>> {
    let mut stmt = self
      .conn
      .prepare("SELECT item, level, streak, cards FROM progress WHERE item = ?1")?;
    let mut rows = stmt.query(params![item])?;
    match rows.next()? {
      Some(row) => {
        let cards: String = row.get("cards")?;
        Ok(Some(ProgressRecord {
          item: row.get("item")?,
          level: row.get("level")?,
          streak: row.get("streak")?,
          cards: json_column(&cards, "cards")?,
        }))
      }
      None => Ok(None),
    }
  }

  fn upsert(&self, record: &ProgressRecord) -> RepoResult<()> {
    let cards =
      serde_json::to_string(&record.cards).map_err(|e| RepoError::Corrupt(e.to_string()))?;
    let current_due = record
      .card_at(record.level.max(0) as u8)
      .map(|card| card.due.to_rfc3339());
    self.conn.execute(
      r#"
      INSERT INTO progress (item, level, streak, cards, current_due)
      VALUES (?1, ?2, ?3, ?4, ?5)
      ON CONFLICT(item) DO UPDATE
      SET level = excluded.level, streak = excluded.streak,
          cards = excluded.cards, current_due = excluded.current_due
      "#,
      params![record.item, record.level, record.streak, cards, current_due],
    )?;
    Ok(())
  }

  fn get_all(&self) -> RepoResult<Vec<ProgressRecord>> {
    let mut stmt = self.conn.prepare("SELECT item, level, streak, cards FROM progress")?;
    let mut rows = stmt.query([])?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
      let cards: String = row.get("cards")?;
      records.push(ProgressRecord {
        item: row.get("item")?,
        level: row.get("level")?,
        streak: row.get("streak")?,
        cards: json_column(&cards, "cards")?,
      });
    }
    Ok(records)
  }

  fn clear(&self) -> RepoResult<()> {
    self.conn.execute("DELETE FROM progress", [])?;
    Ok(())
  }
}

fn row_to_resource(row: &Row<'_>) -> RepoResult<Resource> {
  let vocab: String = row.get("vocab")?;
  let fact_cards: String = row.get("fact_cards")?;
  Ok(Resource {
    uid: row.get("uid")?,
    title: row.get("title")?,
    language: row.get("language")?,
    vocab: json_column(&vocab, "vocab")?,
    fact_cards: json_column(&fact_cards, "fact_cards")?,
    finished: row.get("finished")?,
  })
}

impl SqliteStore {
  pub fn add_resource(&self, resource: &Resource) -> RepoResult<()> {
    let vocab =
      serde_json::to_string(&resource.vocab).map_err(|e| RepoError::Corrupt(e.to_string()))?;
    let fact_cards = serde_json::to_string(&resource.fact_cards)
      .map_err(|e| RepoError::Corrupt(e.to_string()))?;
    self.conn.execute(
      r#"
      INSERT INTO resources (uid, title, language, vocab, fact_cards, finished)
      VALUES (?1, ?2, ?3, ?4, ?5, ?6)
      "#,
      params![
        resource.uid,
        resource.title,
        resource.language,
        vocab,
        fact_cards,
        resource.finished,
      ],
    )?;
    Ok(())
  }

  pub fn add_goal(&self, goal: &Goal) -> RepoResult<()> {
    let vocab =
      serde_json::to_string(&goal.vocab).map_err(|e| RepoError::Corrupt(e.to_string()))?;
    self.conn.execute(
      "INSERT INTO goals (uid, title, language, vocab, completed) VALUES (?1, ?2, ?3, ?4, ?5)",
      params![goal.uid, goal.title, goal.language, vocab, goal.completed],
    )?;
    Ok(())
  }

  fn query_resources(
    &self,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
  ) -> RepoResult<Vec<Resource>> {
    let mut stmt = self.conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut resources = Vec::new();
    while let Some(row) = rows.next()? {
      resources.push(row_to_resource(row)?);
    }
    Ok(resources)
  }

  /// How many of a resource's linked items are not yet due.
  fn count_not_due(&self, resource: &Resource, now: DateTime<Utc>) -> RepoResult<usize> {
    let due_uids: Vec<ItemId> = self
      .get_all_due(now)?
      .into_iter()
      .map(|item| item.uid)
      .collect();
    Ok(resource.linked_items().filter(|uid| !due_uids.contains(uid)).count())
  }
}

impl ResourceRepo for SqliteStore {
  fn get_by_id(&self, uid: &str) -> RepoResult<Option<Resource>> {
    let mut resources = self.query_resources(
      "SELECT uid, title, language, vocab, fact_cards, finished FROM resources WHERE uid = ?1",
      &[&uid],
    )?;
    Ok(resources.pop())
  }

  fn get_valid_immersion_resources(&self, languages: &[String]) -> RepoResult<Vec<Resource>> {
    let resources = self.query_resources(
      "SELECT uid, title, language, vocab, fact_cards, finished FROM resources WHERE finished = 0",
      &[],
    )?;
    Ok(
      resources
        .into_iter()
        .filter(|r| languages.contains(&r.language) && r.linked_items().next().is_some())
        .collect(),
    )
  }

  fn get_almost_ready(
    &self,
    languages: &[String],
    now: DateTime<Utc>,
  ) -> RepoResult<Vec<Resource>> {
    let candidates = self.get_valid_immersion_resources(languages)?;
    let mut ready = Vec::new();
    for resource in candidates {
      if self.count_not_due(&resource, now)? <= crate::config::RESOURCE_ALMOST_READY_THRESHOLD {
        ready.push(resource);
      }
    }
    Ok(ready)
  }
}

impl GoalRepo for SqliteStore {
  fn get_incomplete(&self, languages: &[String]) -> RepoResult<Vec<Goal>> {
    let mut stmt = self.conn.prepare(
      "SELECT uid, title, language, vocab, completed FROM goals WHERE completed = 0",
    )?;
    let mut rows = stmt.query([])?;
    let mut goals = Vec::new();
    while let Some(row) = rows.next()? {
      let vocab: String = row.get("vocab")?;
      let goal = Goal {
        uid: row.get("uid")?,
        title: row.get("title")?,
        language: row.get("language")?,
        vocab: json_column(&vocab, "vocab")?,
        completed: row.get("completed")?,
      };
      if languages.contains(&goal.language) {
        goals.push(goal);
      }
    }
    Ok(goals)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Rating;
  use crate::srs::progress_model::apply_rating;
  use tempfile::TempDir;

  fn word(uid: &str, content: &str) -> LearningItem {
    let mut item =
      LearningItem::new(uid, "es", ItemKind::Word, content).with_translations(&["dog", "hound"]);
    item.notes = Some("common".to_string());
    item.links = vec!["s1".to_string()];
    item
  }

  #[test]
  fn test_item_round_trip() {
    let store = SqliteStore::open_in_memory().unwrap();
    let item = word("v1", "perro");
    store.add(&item).unwrap();

    let loaded = ItemRepo::get_by_id(&store, "v1").unwrap().unwrap();
    assert_eq!(loaded.content, "perro");
    assert_eq!(loaded.translations, vec!["dog", "hound"]);
    assert_eq!(loaded.links, vec!["s1"]);
    assert_eq!(loaded.notes.as_deref(), Some("common"));
    assert_eq!(loaded.kind, ItemKind::Word);
  }

  #[test]
  fn test_get_by_ids_resolves_items_not_resources() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.add(&word("v1", "perro")).unwrap();
    store.add(&word("v2", "gato")).unwrap();
    // A resource sharing a uid with no item must not leak into the result
    store
      .add_resource(&Resource {
        uid: "r1".to_string(),
        title: "podcast".to_string(),
        language: "es".to_string(),
        vocab: vec!["v1".to_string()],
        fact_cards: vec![],
        finished: false,
      })
      .unwrap();

    let found = store
      .get_by_ids(&["v1".to_string(), "r1".to_string(), "v2".to_string()])
      .unwrap();
    let uids: Vec<&str> = found.iter().map(|i| i.uid.as_str()).collect();
    assert_eq!(uids, vec!["v1", "v2"]);
  }

  #[test]
  fn test_progress_round_trip_preserves_card_map() {
    let store = SqliteStore::open_in_memory().unwrap();
    let now = Utc::now();
    let record = apply_rating(None, &"v1".to_string(), 0, Rating::Doable, now);
    let record = apply_rating(Some(record), &"v1".to_string(), 1, Rating::Easy, now);
    store.upsert(&record).unwrap();

    let loaded = ProgressRepo::get(&store, "v1").unwrap().unwrap();
    assert_eq!(loaded.level, record.level);
    assert_eq!(loaded.streak, 2);
    assert_eq!(loaded.cards.len(), 2);
    assert_eq!(loaded.cards, record.cards);
  }

  #[test]
  fn test_due_query_uses_current_level_card() {
    let store = SqliteStore::open_in_memory().unwrap();
    let now = Utc::now();
    store.add(&word("v1", "perro")).unwrap();
    store.add(&word("v2", "gato")).unwrap();

    // v1 rated a year ago: long overdue. v2 rated just now: not due.
    let old = apply_rating(None, &"v1".to_string(), 0, Rating::Doable, now - chrono::Duration::days(365));
    store.upsert(&old).unwrap();
    let fresh = apply_rating(None, &"v2".to_string(), 0, Rating::Doable, now);
    store.upsert(&fresh).unwrap();

    let due = store.get_all_due(now).unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].uid, "v1");
  }

  #[test]
  fn test_unseen_query_excludes_practiced_items() {
    let store = SqliteStore::open_in_memory().unwrap();
    let now = Utc::now();
    store.add(&word("v1", "perro")).unwrap();
    store.add(&word("v2", "gato")).unwrap();
    let record = apply_rating(None, &"v1".to_string(), 0, Rating::Doable, now);
    store.upsert(&record).unwrap();

    let langs = vec!["es".to_string()];
    let unseen = store.get_random_unseen(10, &langs, &[]).unwrap();
    assert_eq!(unseen.len(), 1);
    assert_eq!(unseen[0].uid, "v2");
  }

  #[test]
  fn test_resource_round_trip() {
    let store = SqliteStore::open_in_memory().unwrap();
    let resource = Resource {
      uid: "r1".to_string(),
      title: "podcast".to_string(),
      language: "es".to_string(),
      vocab: vec!["v1".to_string()],
      fact_cards: vec!["f1".to_string()],
      finished: false,
    };
    store.add_resource(&resource).unwrap();

    let loaded = ResourceRepo::get_by_id(&store, "r1").unwrap().unwrap();
    assert_eq!(loaded.title, "podcast");
    assert_eq!(loaded.linked_items().count(), 2);
  }

  #[test]
  fn test_goal_completed_filter() {
    let store = SqliteStore::open_in_memory().unwrap();
    store
      .add_goal(&Goal {
        uid: "g1".to_string(),
        title: "animals".to_string(),
        language: "es".to_string(),
        vocab: vec![],
        completed: true,
      })
      .unwrap();
    store
      .add_goal(&Goal {
        uid: "g2".to_string(),
        title: "food".to_string(),
        language: "es".to_string(),
        vocab: vec![],
        completed: false,
      })
      .unwrap();

    let langs = vec!["es".to_string()];
    let incomplete = store.get_incomplete(&langs).unwrap();
    assert_eq!(incomplete.len(), 1);
    assert_eq!(incomplete[0].uid, "g2");
  }

  #[test]
  fn test_open_on_disk_persists_across_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("learning.db");
    {
      let store = SqliteStore::open(&path).unwrap();
      store.add(&word("v1", "perro")).unwrap();
    }
    let store = SqliteStore::open(&path).unwrap();
    assert!(ItemRepo::get_by_id(&store, "v1").unwrap().is_some());
  }

  #[test]
  fn test_corrupt_json_surfaces_as_corrupt_error() {
    let store = SqliteStore::open_in_memory().unwrap();
    store
      .conn
      .execute(
        "INSERT INTO items (uid, language, kind, content, translations) VALUES ('v1', 'es', 'word', 'perro', 'not json')",
        [],
      )
      .unwrap();
    let err = ItemRepo::get_by_id(&store, "v1").unwrap_err();
    assert!(matches!(err, RepoError::Corrupt(_)));
  }
}
