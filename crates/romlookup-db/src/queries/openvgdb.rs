//! OpenVGDB queries.
//!
//! A ROM may have several releases; each release becomes its own row. Rows
//! from the USA region (regionID 21) sort first.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use romlookup_common::{Error, Result};

use super::{collect_rows, like_pattern, placeholders, with_in_list};
use crate::models::OpenVgdbRow;

/// OpenVGDB region id for USA releases.
pub const USA_REGION_ID: i64 = 21;

const SELECT_ROWS: &str = "SELECT r.romID, r.systemID, g.regionID, g.regionName,
        r.romHashCRC, r.romHashMD5, r.romFileName, r.romSerial,
        rel.releaseID, rel.releaseTitleName, rel.releaseCoverFront, rel.releaseCoverBack,
        rel.releaseDescription, rel.releaseDeveloper, rel.releasePublisher, rel.releaseGenre,
        rel.releaseDate, rel.releaseReferenceURL
     FROM ROMs r
     LEFT JOIN RELEASES rel ON rel.romID = r.romID
     LEFT JOIN REGIONS g ON g.regionID = COALESCE(rel.regionLocalizedID, r.regionID)";

const ORDER_BY_REGION: &str =
    "ORDER BY CASE WHEN g.regionID = 21 THEN 0 ELSE 1 END, r.romID, rel.releaseID";

fn parse_row(row: &rusqlite::Row) -> rusqlite::Result<OpenVgdbRow> {
    Ok(OpenVgdbRow {
        rom_id: row.get(0)?,
        system_id: row.get(1)?,
        region_id: row.get(2)?,
        region_name: row.get(3)?,
        crc: row.get(4)?,
        md5: row.get(5)?,
        file_name: row.get(6)?,
        serial: row.get(7)?,
        release_id: row.get(8)?,
        title: row.get(9)?,
        cover_front: row.get(10)?,
        cover_back: row.get(11)?,
        description: row.get(12)?,
        developer: row.get(13)?,
        publisher: row.get(14)?,
        genre: row.get(15)?,
        release_date: row.get(16)?,
        reference_url: row.get(17)?,
    })
}

/// Find ROMs by MD5.
///
/// # Arguments
///
/// * `conn` - Database connection
/// * `md5` - Hash to match, any case
/// * `system_ids` - OpenVGDB system ids to accept; empty means any
///
/// # Returns
///
/// * `Ok(Vec<OpenVgdbRow>)` - Matching rows, USA releases first
/// * `Err(Error)` - If a database error occurs
pub fn find_by_md5(
    conn: &Connection,
    md5: &str,
    system_ids: &[i64],
) -> Result<Vec<OpenVgdbRow>> {
    let mut sql = format!("{SELECT_ROWS} WHERE r.romHashMD5 = ?1 COLLATE NOCASE");
    if !system_ids.is_empty() {
        sql.push_str(&format!(
            " AND r.systemID IN ({})",
            placeholders(2, system_ids.len())
        ));
    }
    sql.push(' ');
    sql.push_str(ORDER_BY_REGION);

    let values = with_in_list(vec![Value::Text(md5.to_string())], system_ids);
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;
    collect_rows(&mut stmt, params_from_iter(values), parse_row)
}

/// Find ROMs whose file name contains `term`.
///
/// An empty `system_ids` slice means no system filter. Names starting with
/// `term` sort before names that merely contain it.
pub fn find_by_file_name(
    conn: &Connection,
    term: &str,
    system_ids: &[i64],
) -> Result<Vec<OpenVgdbRow>> {
    let mut sql = format!(
        "{SELECT_ROWS}
         WHERE r.romFileName LIKE ?1 ESCAPE '\\'"
    );
    if !system_ids.is_empty() {
        sql.push_str(&format!(
            " AND r.systemID IN ({})",
            placeholders(3, system_ids.len())
        ));
    }
    sql.push_str(
        " ORDER BY CASE WHEN r.romFileName LIKE ?2 ESCAPE '\\' THEN 0 ELSE 1 END,
                   CASE WHEN g.regionID = 21 THEN 0 ELSE 1 END, r.romID, rel.releaseID",
    );

    let pattern = like_pattern(term);
    let prefix = format!("{}%", &pattern[1..pattern.len() - 1]);
    let values = with_in_list(
        vec![Value::Text(pattern), Value::Text(prefix)],
        system_ids,
    );

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;
    collect_rows(&mut stmt, params_from_iter(values), parse_row)
}

/// Find releases whose title contains `title`. Empty `system_ids` means
/// no filter.
pub fn find_by_title(
    conn: &Connection,
    title: &str,
    system_ids: &[i64],
) -> Result<Vec<OpenVgdbRow>> {
    let mut sql = format!("{SELECT_ROWS} WHERE rel.releaseTitleName LIKE ?1 ESCAPE '\\'");
    if !system_ids.is_empty() {
        sql.push_str(&format!(
            " AND r.systemID IN ({})",
            placeholders(2, system_ids.len())
        ));
    }
    sql.push(' ');
    sql.push_str(ORDER_BY_REGION);

    let values = with_in_list(vec![Value::Text(like_pattern(title))], system_ids);
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;
    collect_rows(&mut stmt, params_from_iter(values), parse_row)
}

/// Get a single release by `releaseID`.
///
/// # Returns
///
/// * `Ok(Some(OpenVgdbRow))` - If the release exists
/// * `Ok(None)` - If no release has that id
/// * `Err(Error)` - If a database error occurs
pub fn find_by_release_id(conn: &Connection, release_id: i64) -> Result<Option<OpenVgdbRow>> {
    let sql = format!("{SELECT_ROWS} WHERE rel.releaseID = ?1");
    let result = conn.query_row(&sql, [release_id], parse_row);

    match result {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Every ROM that has a hash, for building the artwork mapping.
pub fn all_hashed(conn: &Connection) -> Result<Vec<OpenVgdbRow>> {
    let sql = format!(
        "{SELECT_ROWS}
         WHERE r.romHashMD5 IS NOT NULL AND r.romHashMD5 != ''
         ORDER BY r.romID, CASE WHEN g.regionID = 21 THEN 1 ELSE 0 END, rel.releaseID"
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;
    collect_rows(&mut stmt, [], parse_row)
}
