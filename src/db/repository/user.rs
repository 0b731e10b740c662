use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::session::parse_uuid;
use crate::db::DatabaseError;
use crate::models::User;

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users
         (id, email, hashed_password, first_name, last_name, clinic_name, order_number,
          specialty, is_student, school_name, is_verified, verification_token,
          verification_token_expires, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            user.id.to_string(),
            user.email,
            user.hashed_password,
            user.first_name,
            user.last_name,
            user.clinic_name,
            user.order_number,
            user.specialty,
            user.is_student as i32,
            user.school_name,
            user.is_verified as i32,
            user.verification_token,
            user.verification_token_expires,
            user.created_at,
            user.updated_at,
        ],
    )?;
    Ok(())
}

pub fn update_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE users
         SET email = ?2, hashed_password = ?3, first_name = ?4, last_name = ?5,
             clinic_name = ?6, order_number = ?7, specialty = ?8, is_student = ?9,
             school_name = ?10, is_verified = ?11, verification_token = ?12,
             verification_token_expires = ?13, updated_at = ?14
         WHERE id = ?1",
        params![
            user.id.to_string(),
            user.email,
            user.hashed_password,
            user.first_name,
            user.last_name,
            user.clinic_name,
            user.order_number,
            user.specialty,
            user.is_student as i32,
            user.school_name,
            user.is_verified as i32,
            user.verification_token,
            user.verification_token_expires,
            user.updated_at,
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::not_found("User", user.id));
    }
    Ok(())
}

pub fn get_user(conn: &Connection, id: &Uuid) -> Result<Option<User>, DatabaseError> {
    query_user(conn, "WHERE id = ?1", &id.to_string())
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    query_user(conn, "WHERE email = ?1", email)
}

pub fn get_user_by_verification_token(
    conn: &Connection,
    token: &str,
) -> Result<Option<User>, DatabaseError> {
    query_user(conn, "WHERE verification_token = ?1", token)
}

pub fn email_exists(conn: &Connection, email: &str) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE email = ?1",
        params![email],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn query_user(conn: &Connection, filter: &str, key: &str) -> Result<Option<User>, DatabaseError> {
    let sql = format!(
        "SELECT id, email, hashed_password, first_name, last_name, clinic_name, order_number,
                specialty, is_student, school_name, is_verified, verification_token,
                verification_token_expires, created_at, updated_at
         FROM users {filter}"
    );
    let result = conn.query_row(&sql, params![key], user_row);
    match result {
        Ok(row) => Ok(Some(user_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

struct UserRow {
    id: String,
    email: String,
    hashed_password: String,
    first_name: String,
    last_name: String,
    clinic_name: Option<String>,
    order_number: Option<String>,
    specialty: Option<String>,
    is_student: i32,
    school_name: Option<String>,
    is_verified: i32,
    verification_token: Option<String>,
    verification_token_expires: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        hashed_password: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        clinic_name: row.get(5)?,
        order_number: row.get(6)?,
        specialty: row.get(7)?,
        is_student: row.get(8)?,
        school_name: row.get(9)?,
        is_verified: row.get(10)?,
        verification_token: row.get(11)?,
        verification_token_expires: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

fn user_from_row(row: UserRow) -> Result<User, DatabaseError> {
    Ok(User {
        id: parse_uuid(&row.id)?,
        email: row.email,
        hashed_password: row.hashed_password,
        first_name: row.first_name,
        last_name: row.last_name,
        clinic_name: row.clinic_name,
        order_number: row.order_number,
        specialty: row.specialty,
        is_student: row.is_student != 0,
        school_name: row.school_name,
        is_verified: row.is_verified != 0,
        verification_token: row.verification_token,
        verification_token_expires: row.verification_token_expires,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
