use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::session::parse_uuid;
use crate::db::DatabaseError;
use crate::models::{AccessToken, RefreshToken};

pub fn insert_refresh_token(conn: &Connection, token: &RefreshToken) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, created_at, revoked)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            token.id.to_string(),
            token.user_id.to_string(),
            token.token_hash,
            token.expires_at,
            token.created_at,
            token.revoked as i32,
        ],
    )?;
    Ok(())
}

pub fn get_refresh_token_by_hash(
    conn: &Connection,
    token_hash: &str,
) -> Result<Option<RefreshToken>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, user_id, token_hash, expires_at, created_at, revoked
         FROM refresh_tokens WHERE token_hash = ?1",
        params![token_hash],
        |row| {
            Ok(RefreshTokenRow {
                id: row.get(0)?,
                user_id: row.get(1)?,
                token_hash: row.get(2)?,
                expires_at: row.get(3)?,
                created_at: row.get(4)?,
                revoked: row.get(5)?,
            })
        },
    );
    match result {
        Ok(row) => Ok(Some(RefreshToken {
            id: parse_uuid(&row.id)?,
            user_id: parse_uuid(&row.user_id)?,
            token_hash: row.token_hash,
            expires_at: row.expires_at,
            created_at: row.created_at,
            revoked: row.revoked != 0,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn revoke_refresh_token(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE refresh_tokens SET revoked = 1 WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(())
}

struct RefreshTokenRow {
    id: String,
    user_id: String,
    token_hash: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    revoked: i32,
}

pub fn insert_access_token(conn: &Connection, token: &AccessToken) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO access_tokens (token_hash, user_id, expires_at, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            token.token_hash,
            token.user_id.to_string(),
            token.expires_at,
            token.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_access_token(
    conn: &Connection,
    token_hash: &str,
) -> Result<Option<AccessToken>, DatabaseError> {
    let result = conn.query_row(
        "SELECT token_hash, user_id, expires_at, created_at
         FROM access_tokens WHERE token_hash = ?1",
        params![token_hash],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, DateTime<Utc>>(2)?,
                row.get::<_, DateTime<Utc>>(3)?,
            ))
        },
    );
    match result {
        Ok((token_hash, user_id, expires_at, created_at)) => Ok(Some(AccessToken {
            token_hash,
            user_id: parse_uuid(&user_id)?,
            expires_at,
            created_at,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Drop expired access tokens and expired or revoked refresh tokens.
/// Called opportunistically on login and refresh.
pub fn prune_expired_tokens(conn: &Connection, now: DateTime<Utc>) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM access_tokens WHERE expires_at < ?1",
        params![now],
    )?;
    conn.execute(
        "DELETE FROM refresh_tokens WHERE expires_at < ?1 OR revoked = 1",
        params![now],
    )?;
    Ok(())
}
