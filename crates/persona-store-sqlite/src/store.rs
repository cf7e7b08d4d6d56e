//! [`SqliteStore`], the SQLite implementation of [`PersonStore`].

use std::path::Path;

use chrono::Utc;
use persona_core::{
  person::{NewPerson, Person, PersonId},
  store::{PersonFilter, PersonStore, StoredPage},
};
use rusqlite::{OptionalExtension as _, types::Value};

use crate::{
  Result,
  encode::{PERSON_COLUMNS, RawPerson, contains_pattern, encode_dt, encode_gender},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A person store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Owned column values for the writable fields, in insert order.
///
/// SQLite's `LIKE` only folds ASCII, so name filters match against
/// Unicode-lowercased copies kept alongside the originals.
struct Columns {
  name:           String,
  surname:        String,
  name_folded:    String,
  surname_folded: String,
  patronymic:     Option<String>,
  age:            Option<u32>,
  gender:         Option<&'static str>,
  nationality:    Option<String>,
}

impl From<NewPerson> for Columns {
  fn from(p: NewPerson) -> Self {
    Self {
      name_folded:    p.name.to_lowercase(),
      surname_folded: p.surname.to_lowercase(),
      name:           p.name,
      surname:        p.surname,
      patronymic:     p.patronymic,
      age:            p.age,
      gender:         p.gender.map(encode_gender),
      nationality:    p.nationality,
    }
  }
}

// ─── Listing SQL ─────────────────────────────────────────────────────────────

/// Build the `WHERE` clause and its positional arguments for `filter`.
fn where_clause(filter: &PersonFilter) -> (String, Vec<Value>) {
  let mut conds: Vec<String> = vec![];
  let mut args: Vec<Value> = vec![];

  let mut push = |cond: &str, value: Value| {
    args.push(value);
    conds.push(cond.replace('?', &format!("?{}", args.len())));
  };

  if let Some(n) = &filter.name_contains {
    push(
      "name_folded LIKE ? ESCAPE '\\'",
      Value::Text(contains_pattern(&n.to_lowercase())),
    );
  }
  if let Some(s) = &filter.surname_contains {
    push(
      "surname_folded LIKE ? ESCAPE '\\'",
      Value::Text(contains_pattern(&s.to_lowercase())),
    );
  }
  if let Some(min) = filter.min_age {
    push("age >= ?", Value::Integer(i64::from(min)));
  }
  if let Some(max) = filter.max_age {
    push("age <= ?", Value::Integer(i64::from(max)));
  }
  if let Some(g) = filter.gender {
    push("gender = ?", Value::Text(encode_gender(g).to_owned()));
  }
  if let Some(code) = &filter.nationality {
    push("nationality = ?", Value::Text(code.clone()));
  }

  let clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };
  (clause, args)
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SqliteStore {
  type Error = crate::Error;

  async fn create(&self, person: NewPerson) -> Result<Person> {
    let c = Columns::from(person);
    let now = encode_dt(Utc::now());

    let raw: RawPerson = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!(
            "INSERT INTO persons (
               name, surname, patronymic, age, gender, nationality,
               created_at, updated_at, name_folded, surname_folded
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, ?8, ?9)
             RETURNING {PERSON_COLUMNS}"
          ),
          rusqlite::params![
            c.name,
            c.surname,
            c.patronymic,
            c.age,
            c.gender,
            c.nationality,
            now,
            c.name_folded,
            c.surname_folded,
          ],
          RawPerson::from_row,
        )?)
      })
      .await?;

    raw.into_person()
  }

  async fn get(&self, id: PersonId) -> Result<Option<Person>> {
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ?1"),
            rusqlite::params![id.0],
            RawPerson::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn update(&self, id: PersonId, person: NewPerson) -> Result<Option<Person>> {
    let c = Columns::from(person);
    let now = encode_dt(Utc::now());

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "UPDATE persons SET
                 name        = ?2,
                 surname     = ?3,
                 patronymic  = ?4,
                 age         = ?5,
                 gender      = ?6,
                 nationality = ?7,
                 updated_at  = ?8,
                 name_folded    = ?9,
                 surname_folded = ?10
               WHERE id = ?1
               RETURNING {PERSON_COLUMNS}"
            ),
            rusqlite::params![
              id.0,
              c.name,
              c.surname,
              c.patronymic,
              c.age,
              c.gender,
              c.nationality,
              now,
              c.name_folded,
              c.surname_folded,
            ],
            RawPerson::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn delete(&self, id: PersonId) -> Result<bool> {
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM persons WHERE id = ?1", rusqlite::params![id.0])?)
      })
      .await?;
    Ok(affected > 0)
  }

  async fn list(&self, filter: PersonFilter) -> Result<StoredPage> {
    let (where_sql, mut args) = where_clause(&filter);
    let count_sql = format!("SELECT COUNT(*) FROM persons {where_sql}");
    let filter_args = args.len();

    args.push(Value::Integer(i64::try_from(filter.limit).unwrap_or(i64::MAX)));
    args.push(Value::Integer(i64::try_from(filter.offset).unwrap_or(i64::MAX)));
    let page_sql = format!(
      "SELECT {PERSON_COLUMNS} FROM persons {where_sql}
       ORDER BY id
       LIMIT ?{} OFFSET ?{}",
      filter_args + 1,
      filter_args + 2,
    );

    let (total, raws): (i64, Vec<RawPerson>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          &count_sql,
          rusqlite::params_from_iter(&args[..filter_args]),
          |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(&page_sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(&args), RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    Ok(StoredPage {
      persons: raws.into_iter().map(RawPerson::into_person).collect::<Result<_>>()?,
      total:   u64::try_from(total).unwrap_or_default(),
    })
  }
}
