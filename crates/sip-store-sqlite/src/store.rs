//! [`SqliteStore`]: the SQLite implementation of [`RankingStore`].

use std::{path::Path, time::Duration};

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use sip_core::{
  Tier, elo,
  item::{Item, ItemPublicScore},
  rating::{
    Initialized, NewPreference, Opponent, PersonalRating, PreferenceOutcome,
    PreferenceRecord,
  },
  selection,
  store::RankingStore,
};

use crate::{
  Error, Result,
  encode::{
    RawItem, RawPreference, RawRating, RawScore, encode_dt, encode_tier,
    encode_uuid,
  },
  schema::SCHEMA,
};

/// Default number of attempts for a write that keeps hitting a locked
/// database before it is reported as a conflict.
pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 5;

/// Base delay between write attempts; multiplied by the attempt number.
const RETRY_BACKOFF: Duration = Duration::from_millis(20);

/// How long SQLite itself waits on a held lock before reporting busy. Zero,
/// so that `write_for_user`'s retry loop is the only wait.
const BUSY_TIMEOUT: Duration = Duration::ZERO;

/// Outcome of one write attempt: the outer error is a database failure
/// (possibly retryable), the inner one a domain failure (never retried).
type Attempt<T> = tokio_rusqlite::Result<sip_core::Result<T>>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A sip ranking store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
///
/// Every clone shares that one connection, so writes are serialised across
/// all users and not only within one user's ratings. Different users never
/// conflict, but they do queue behind each other; each write is a single
/// short transaction, which keeps that wait small.
#[derive(Clone)]
pub struct SqliteStore {
  conn:               tokio_rusqlite::Connection,
  max_write_attempts: u32,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::from_connection(conn).await
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::from_connection(conn).await
  }

  async fn from_connection(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let store = Self {
      conn,
      max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
    };
    store.init_schema().await?;
    Ok(store)
  }

  /// Override how many times a per-user write is attempted while the
  /// database is locked by another writer. Values below 1 are treated as 1.
  pub fn with_max_write_attempts(mut self, attempts: u32) -> Self {
    self.max_write_attempts = attempts.max(1);
    self
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `op` against the database, retrying with fresh reads while another
  /// writer holds the lock. Surfaces [`sip_core::Error::Conflict`] once the
  /// attempts are used up.
  ///
  /// `op` must open its own `IMMEDIATE` transaction so that the whole
  /// read-modify-write of the user's rows is serialised.
  async fn write_for_user<T, F>(&self, user_id: Uuid, op: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut rusqlite::Connection) -> Attempt<T> + Clone + Send + 'static,
  {
    let mut attempt = 0;
    loop {
      attempt += 1;
      match self.conn.call(op.clone()).await {
        Ok(outcome) => return outcome.map_err(Error::from),
        Err(e) if is_busy(&e) && attempt < self.max_write_attempts => {
          tracing::warn!(%user_id, attempt, "ratings locked by another writer, retrying");
          tokio::time::sleep(RETRY_BACKOFF * attempt).await;
        }
        Err(e) if is_busy(&e) => {
          return Err(
            sip_core::Error::Conflict {
              user_id,
              attempts: attempt,
            }
            .into(),
          );
        }
        Err(e) => return Err(e.into()),
      }
    }
  }
}

fn is_busy(err: &tokio_rusqlite::Error) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
      if matches!(
        e.code,
        rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
      )
  )
}

// ─── Synchronous row helpers (run on the connection thread) ──────────────────

fn item_exists(conn: &rusqlite::Connection, item_id: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM items WHERE item_id = ?1",
        rusqlite::params![item_id],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

fn rating_row(
  conn:    &rusqlite::Connection,
  user_id: &str,
  item_id: &str,
) -> rusqlite::Result<Option<RawRating>> {
  conn
    .query_row(
      &format!(
        "SELECT {} FROM personal_ratings WHERE user_id = ?1 AND item_id = ?2",
        RawRating::COLUMNS
      ),
      rusqlite::params![user_id, item_id],
      RawRating::from_row,
    )
    .optional()
}

/// Like [`rating_row`], but only matches a row in `tier`.
fn rating_row_in_tier(
  conn:    &rusqlite::Connection,
  user_id: &str,
  item_id: &str,
  tier:    &str,
) -> rusqlite::Result<Option<RawRating>> {
  Ok(rating_row(conn, user_id, item_id)?.filter(|raw| raw.tier == tier))
}

/// Write new rating values for one row and bump its comparison count.
fn apply_rating(
  conn:       &rusqlite::Connection,
  raw:        &mut RawRating,
  new_rating: f64,
  at:         &str,
) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE personal_ratings
        SET rating = ?1, comparisons = comparisons + 1, updated_at = ?2
      WHERE user_id = ?3 AND item_id = ?4",
    rusqlite::params![new_rating, at, raw.user_id, raw.item_id],
  )?;
  raw.rating = new_rating;
  raw.comparisons += 1;
  raw.updated_at = at.to_owned();
  Ok(())
}

/// Recompute an item's public score by full reduction over every user's
/// rating of it, replacing any stored value. Removes the stored score when
/// nobody rates the item.
fn refresh_score(
  conn:    &rusqlite::Connection,
  item_id: Uuid,
  at:      DateTime<Utc>,
) -> rusqlite::Result<Option<ItemPublicScore>> {
  let item_str = encode_uuid(item_id);

  let ratings: Vec<f64> = {
    let mut stmt =
      conn.prepare("SELECT rating FROM personal_ratings WHERE item_id = ?1")?;
    stmt
      .query_map(rusqlite::params![item_str], |row| row.get(0))?
      .collect::<rusqlite::Result<_>>()?
  };

  let Some(score) = ItemPublicScore::reduce(item_id, ratings, at) else {
    conn.execute(
      "DELETE FROM public_scores WHERE item_id = ?1",
      rusqlite::params![item_str],
    )?;
    return Ok(None);
  };

  conn.execute(
    "INSERT INTO public_scores (item_id, average_rating, total_ratings, refreshed_at)
     VALUES (?1, ?2, ?3, ?4)
     ON CONFLICT (item_id) DO UPDATE SET
       average_rating = excluded.average_rating,
       total_ratings  = excluded.total_ratings,
       refreshed_at   = excluded.refreshed_at",
    rusqlite::params![
      item_str,
      score.average_rating,
      score.total_ratings,
      encode_dt(score.refreshed_at),
    ],
  )?;

  Ok(Some(score))
}

// ─── RankingStore impl ───────────────────────────────────────────────────────

impl RankingStore for SqliteStore {
  type Error = Error;

  // ── Catalog ───────────────────────────────────────────────────────────────

  async fn add_item(&self, name: String) -> Result<Item> {
    let item = Item {
      item_id: Uuid::new_v4(),
      name,
      created_at: Utc::now(),
    };

    let id_str = encode_uuid(item.item_id);
    let name   = item.name.clone();
    let at_str = encode_dt(item.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO items (item_id, name, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(item)
  }

  async fn get_item(&self, item_id: Uuid) -> Result<Option<Item>> {
    let id_str = encode_uuid(item_id);

    let raw: Option<RawItem> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM items WHERE item_id = ?1", RawItem::COLUMNS),
              rusqlite::params![id_str],
              RawItem::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawItem::into_item).transpose()
  }

  // ── Personal ratings ──────────────────────────────────────────────────────

  async fn initialize(
    &self,
    user_id: Uuid,
    item_id: Uuid,
    tier:    Tier,
  ) -> Result<Initialized> {
    let user_str = encode_uuid(user_id);
    let item_str = encode_uuid(item_id);
    let tier_str = encode_tier(tier);
    let now_str  = encode_dt(Utc::now());

    let (raw, created) = self
      .write_for_user(user_id, move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !item_exists(&tx, &item_str)? {
          return Ok(Err(sip_core::Error::ItemNotFound(item_id)));
        }
        if let Some(existing) = rating_row(&tx, &user_str, &item_str)? {
          return Ok(Ok((existing, false)));
        }

        let tier_count: i64 = tx.query_row(
          "SELECT COUNT(*) FROM personal_ratings WHERE user_id = ?1 AND tier = ?2",
          rusqlite::params![user_str, tier_str],
          |row| row.get(0),
        )?;
        let rating = elo::initial_rating(usize::try_from(tier_count).unwrap_or(0));

        // A concurrent initialise may have won the race; the existing row
        // is then returned as-is.
        let inserted = tx.execute(
          "INSERT OR IGNORE INTO personal_ratings (
             user_id, item_id, tier, rating, comparisons, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)",
          rusqlite::params![user_str, item_str, tier_str, rating, now_str],
        )?;

        let row = rating_row(&tx, &user_str, &item_str)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(Ok((row, inserted == 1)))
      })
      .await?;

    let rating = raw.into_rating()?;
    tracing::debug!(
      %user_id,
      %item_id,
      tier = %rating.tier,
      rating = rating.rating,
      created,
      "initialised personal rating"
    );
    Ok(Initialized { rating, created })
  }

  async fn get_rating(
    &self,
    user_id: Uuid,
    item_id: Uuid,
  ) -> Result<Option<PersonalRating>> {
    let user_str = encode_uuid(user_id);
    let item_str = encode_uuid(item_id);

    let raw = self
      .conn
      .call(move |conn| Ok(rating_row(conn, &user_str, &item_str)?))
      .await?;

    raw.map(RawRating::into_rating).transpose()
  }

  async fn list_ratings(
    &self,
    user_id: Uuid,
    tier:    Option<Tier>,
  ) -> Result<Vec<PersonalRating>> {
    let user_str = encode_uuid(user_id);
    let tier_str = tier.map(encode_tier);

    let raws: Vec<RawRating> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM personal_ratings
            WHERE user_id = ?1 AND (?2 IS NULL OR tier = ?2)
            ORDER BY rating DESC, rowid ASC",
          RawRating::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![user_str, tier_str], RawRating::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRating::into_rating).collect()
  }

  async fn select_opponent(
    &self,
    user_id:       Uuid,
    focal_item_id: Uuid,
    tier:          Tier,
  ) -> Result<Opponent> {
    let user_str = encode_uuid(user_id);
    let tier_str = encode_tier(tier);

    let (raws, ranked_total): (Vec<RawRating>, i64) = self
      .conn
      .call(move |conn| {
        let rows = {
          let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM personal_ratings
              WHERE user_id = ?1 AND tier = ?2
              ORDER BY rowid",
            RawRating::COLUMNS
          ))?;
          stmt
            .query_map(rusqlite::params![user_str, tier_str], RawRating::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        let total: i64 = conn.query_row(
          "SELECT COUNT(*) FROM personal_ratings WHERE user_id = ?1",
          rusqlite::params![user_str],
          |row| row.get(0),
        )?;
        Ok((rows, total))
      })
      .await?;

    let (focal, pool): (Vec<PersonalRating>, Vec<PersonalRating>) = raws
      .into_iter()
      .map(RawRating::into_rating)
      .collect::<Result<Vec<_>>>()?
      .into_iter()
      .partition(|r| r.item_id == focal_item_id);

    if focal.is_empty() {
      return Err(
        sip_core::Error::RatingNotFound {
          user_id,
          item_id: focal_item_id,
          tier,
        }
        .into(),
      );
    }

    let chosen = {
      let mut rng = rand::rng();
      selection::choose_opponent(&pool, tier, &mut rng).cloned()
    };
    let rating = chosen.ok_or(sip_core::Error::NoCandidates { user_id, tier })?;

    tracing::debug!(
      %user_id,
      focal = %focal_item_id,
      opponent = %rating.item_id,
      pool = pool.len(),
      "selected comparison opponent"
    );

    Ok(Opponent {
      rating,
      ranked_total: usize::try_from(ranked_total).unwrap_or(0),
    })
  }

  async fn record_preference(
    &self,
    input: NewPreference,
  ) -> Result<PreferenceOutcome> {
    input.validate()?;

    let preference = PreferenceRecord {
      preference_id:     Uuid::new_v4(),
      user_id:           input.user_id,
      preferred_item_id: input.preferred_item_id,
      rejected_item_id:  input.rejected_item_id,
      tier:              input.tier,
      recorded_at:       Utc::now(),
    };

    let NewPreference {
      user_id,
      preferred_item_id,
      rejected_item_id,
      tier,
    } = input;
    let recorded_at   = preference.recorded_at;
    let pref_id_str   = encode_uuid(preference.preference_id);
    let user_str      = encode_uuid(user_id);
    let preferred_str = encode_uuid(preferred_item_id);
    let rejected_str  = encode_uuid(rejected_item_id);
    let tier_str      = encode_tier(tier);
    let at_str        = encode_dt(recorded_at);

    let (winner, loser) = self
      .write_for_user(user_id, move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let missing = |item_id| sip_core::Error::RatingNotFound { user_id, item_id, tier };
        let Some(mut winner) = rating_row_in_tier(&tx, &user_str, &preferred_str, tier_str)?
        else {
          return Ok(Err(missing(preferred_item_id)));
        };
        let Some(mut loser) = rating_row_in_tier(&tx, &user_str, &rejected_str, tier_str)?
        else {
          return Ok(Err(missing(rejected_item_id)));
        };

        let update = elo::update_pair(
          winner.rating,
          loser.rating,
          winner.comparisons,
          loser.comparisons,
          tier,
        );
        apply_rating(&tx, &mut winner, update.winner, &at_str)?;
        apply_rating(&tx, &mut loser, update.loser, &at_str)?;

        tx.execute(
          "INSERT INTO preferences (
             preference_id, user_id, preferred_item_id, rejected_item_id, tier, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            pref_id_str,
            user_str,
            preferred_str,
            rejected_str,
            tier_str,
            at_str,
          ],
        )?;

        refresh_score(&tx, preferred_item_id, recorded_at)?;
        refresh_score(&tx, rejected_item_id, recorded_at)?;

        tx.commit()?;
        Ok(Ok((winner, loser)))
      })
      .await?;

    let winner = winner.into_rating()?;
    let loser  = loser.into_rating()?;

    tracing::info!(
      %user_id,
      %tier,
      winner = %winner.item_id,
      winner_rating = winner.rating,
      loser = %loser.item_id,
      loser_rating = loser.rating,
      "recorded preference"
    );

    Ok(PreferenceOutcome { winner, loser, preference })
  }

  // ── Ledger ────────────────────────────────────────────────────────────────

  async fn list_preferences(&self, user_id: Uuid) -> Result<Vec<PreferenceRecord>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<RawPreference> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM preferences WHERE user_id = ?1 ORDER BY rowid",
          RawPreference::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], RawPreference::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPreference::into_preference).collect()
  }

  // ── Public scores ─────────────────────────────────────────────────────────

  async fn refresh_public_score(
    &self,
    item_id: Uuid,
  ) -> Result<Option<ItemPublicScore>> {
    let item_str = encode_uuid(item_id);
    let now      = Utc::now();

    let score = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !item_exists(&tx, &item_str)? {
          return Ok(Err(sip_core::Error::ItemNotFound(item_id)));
        }
        let score = refresh_score(&tx, item_id, now)?;
        tx.commit()?;
        Ok(Ok(score))
      })
      .await??;

    tracing::debug!(
      %item_id,
      average = ?score.as_ref().map(|s| s.average_rating),
      total = score.as_ref().map_or(0, |s| s.total_ratings),
      "refreshed public score"
    );
    Ok(score)
  }

  async fn get_public_score(
    &self,
    item_id: Uuid,
  ) -> Result<Option<ItemPublicScore>> {
    let item_str = encode_uuid(item_id);

    let raw: Option<RawScore> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM public_scores WHERE item_id = ?1",
                RawScore::COLUMNS
              ),
              rusqlite::params![item_str],
              RawScore::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawScore::into_score).transpose()
  }
}
