//! libretro-database queries.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use romlookup_common::{Error, Result};

use super::{collect_rows, like_pattern, placeholders, with_in_list};
use crate::models::LibretroRow;

const SELECT_ROWS: &str = "SELECT r.id, g.id, r.name, r.md5, r.crc,
        g.display_name, g.full_name, g.platform_id, rg.name, ge.name, d.name, p.name,
        g.release_year, g.release_month, g.serial
     FROM roms r
     LEFT JOIN games g ON g.id = r.game_id
     LEFT JOIN regions rg ON rg.id = g.region_id
     LEFT JOIN genres ge ON ge.id = g.genre_id
     LEFT JOIN developers d ON d.id = g.developer_id
     LEFT JOIN publishers p ON p.id = g.publisher_id";

fn parse_row(row: &rusqlite::Row) -> rusqlite::Result<LibretroRow> {
    Ok(LibretroRow {
        rom_id: row.get(0)?,
        game_id: row.get(1)?,
        file_name: row.get(2)?,
        md5: row.get(3)?,
        crc: row.get(4)?,
        display_name: row.get(5)?,
        full_name: row.get(6)?,
        platform_id: row.get(7)?,
        region: row.get(8)?,
        genre: row.get(9)?,
        developer: row.get(10)?,
        publisher: row.get(11)?,
        release_year: row.get(12)?,
        release_month: row.get(13)?,
        serial: row.get(14)?,
    })
}

/// Find ROMs by MD5. Empty `platform_ids` means no filter.
pub fn find_by_md5(
    conn: &Connection,
    md5: &str,
    platform_ids: &[i64],
) -> Result<Vec<LibretroRow>> {
    let mut sql = format!("{SELECT_ROWS} WHERE r.md5 = ?1 COLLATE NOCASE");
    if !platform_ids.is_empty() {
        sql.push_str(&format!(
            " AND g.platform_id IN ({})",
            placeholders(2, platform_ids.len())
        ));
    }
    sql.push_str(" ORDER BY r.id");

    let values = with_in_list(vec![Value::Text(md5.to_string())], platform_ids);
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;
    collect_rows(&mut stmt, params_from_iter(values), parse_row)
}

/// Find ROMs whose file name contains `term`. Empty `platform_ids` means
/// no filter.
pub fn find_by_file_name(
    conn: &Connection,
    term: &str,
    platform_ids: &[i64],
) -> Result<Vec<LibretroRow>> {
    let mut sql = format!("{SELECT_ROWS} WHERE r.name LIKE ?1 ESCAPE '\\'");
    if !platform_ids.is_empty() {
        sql.push_str(&format!(
            " AND g.platform_id IN ({})",
            placeholders(2, platform_ids.len())
        ));
    }
    sql.push_str(" ORDER BY r.id");

    let values = with_in_list(vec![Value::Text(like_pattern(term))], platform_ids);
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;
    collect_rows(&mut stmt, params_from_iter(values), parse_row)
}

/// Find ROMs whose game name (display or full) contains `name`. Empty
/// `platform_ids` means no filter.
pub fn find_by_game_name(
    conn: &Connection,
    name: &str,
    platform_ids: &[i64],
) -> Result<Vec<LibretroRow>> {
    let mut sql = format!(
        "{SELECT_ROWS}
         WHERE (g.display_name LIKE ?1 ESCAPE '\\' OR g.full_name LIKE ?1 ESCAPE '\\')"
    );
    if !platform_ids.is_empty() {
        sql.push_str(&format!(
            " AND g.platform_id IN ({})",
            placeholders(2, platform_ids.len())
        ));
    }
    sql.push_str(" ORDER BY g.id, r.id");

    let values = with_in_list(vec![Value::Text(like_pattern(name))], platform_ids);
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;
    collect_rows(&mut stmt, params_from_iter(values), parse_row)
}

/// All ROMs of one game.
pub fn find_by_game_id(conn: &Connection, game_id: i64) -> Result<Vec<LibretroRow>> {
    let sql = format!("{SELECT_ROWS} WHERE g.id = ?1 ORDER BY r.id");
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;
    collect_rows(&mut stmt, [game_id], parse_row)
}

/// Every ROM that has a hash.
pub fn all_hashed(conn: &Connection) -> Result<Vec<LibretroRow>> {
    let sql = format!("{SELECT_ROWS} WHERE r.md5 IS NOT NULL AND r.md5 != '' ORDER BY r.id");
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;
    collect_rows(&mut stmt, [], parse_row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{insert_libretro_rom, memory_database, LibretroFixture};
    use romlookup_common::SourceKind;

    fn seed(conn: &Connection) {
        insert_libretro_rom(
            conn,
            &LibretroFixture {
                rom_id: 10,
                game_id: 100,
                platform_id: 12,
                md5: Some("AA11BB22CC33DD44EE55FF6600112233"),
                file_name: "Pitfall - The Mayan Adventure (USA).sfc",
                full_name: "Pitfall - The Mayan Adventure (USA)",
                display_name: "Pitfall - The Mayan Adventure",
                genre: Some("Platform"),
                developer: Some("Activision"),
            },
        );
        insert_libretro_rom(
            conn,
            &LibretroFixture {
                rom_id: 11,
                game_id: 101,
                platform_id: 26,
                md5: None,
                file_name: "Sonic The Hedgehog (USA, Europe).md",
                full_name: "Sonic The Hedgehog (USA, Europe)",
                display_name: "Sonic The Hedgehog",
                genre: None,
                developer: None,
            },
        );
    }

    #[test]
    fn test_find_by_md5() {
        let conn = memory_database(SourceKind::Libretro).unwrap();
        seed(&conn);

        let rows = find_by_md5(&conn, "aa11bb22cc33dd44ee55ff6600112233", &[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].platform_id, Some(12));
        assert_eq!(rows[0].genre.as_deref(), Some("Platform"));
        assert_eq!(rows[0].developer.as_deref(), Some("Activision"));

        assert!(find_by_md5(&conn, "aa11bb22cc33dd44ee55ff6600112233", &[26])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_find_by_file_name() {
        let conn = memory_database(SourceKind::Libretro).unwrap();
        seed(&conn);

        assert_eq!(find_by_file_name(&conn, "(USA", &[]).unwrap().len(), 2);
        let rows = find_by_file_name(&conn, "(USA", &[26]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].game_id, Some(101));
    }

    #[test]
    fn test_find_by_game_name_and_id() {
        let conn = memory_database(SourceKind::Libretro).unwrap();
        seed(&conn);

        let rows = find_by_game_name(&conn, "sonic", &[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(find_by_game_id(&conn, 100).unwrap().len(), 1);
        assert!(find_by_game_id(&conn, 555).unwrap().is_empty());
    }

    #[test]
    fn test_all_hashed_skips_unhashed() {
        let conn = memory_database(SourceKind::Libretro).unwrap();
        seed(&conn);
        assert_eq!(all_hashed(&conn).unwrap().len(), 1);
    }
}
