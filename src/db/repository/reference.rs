use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::reference::{CONSULTATION_REASONS, DOG_BREEDS};
use crate::models::{ConsultationReason, DogBreed};

/// Idempotently load the bundled breed and consultation-reason lists.
/// Runs at startup; existing rows are left alone.
pub fn seed_reference_data(conn: &Connection) -> Result<(), DatabaseError> {
    for breed in DOG_BREEDS {
        conn.execute(
            "INSERT OR IGNORE INTO dog_breeds (name) VALUES (?1)",
            params![breed],
        )?;
    }
    for reason in CONSULTATION_REASONS {
        conn.execute(
            "INSERT OR IGNORE INTO consultation_reasons (name, description) VALUES (?1, NULL)",
            params![reason],
        )?;
    }
    Ok(())
}

pub fn list_dog_breeds(conn: &Connection) -> Result<Vec<DogBreed>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, name FROM dog_breeds ORDER BY name ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok(DogBreed {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;

    let mut breeds = Vec::new();
    for row in rows {
        breeds.push(row?);
    }
    Ok(breeds)
}

pub fn list_consultation_reasons(
    conn: &Connection,
) -> Result<Vec<ConsultationReason>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT id, name, description FROM consultation_reasons ORDER BY id ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok(ConsultationReason {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
        })
    })?;

    let mut reasons = Vec::new();
    for row in rows {
        reasons.push(row?);
    }
    Ok(reasons)
}
