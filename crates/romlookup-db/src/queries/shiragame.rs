//! ShiraGame queries.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use romlookup_common::{Error, Result};

use super::{collect_rows, like_pattern, placeholders, with_in_list};
use crate::models::ShiraGameRow;

const SELECT_ROWS: &str = "SELECT g.game_id, g.platform_id, g.entry_name, g.release_title, g.region,
        r.file_name, r.md5, r.crc, r.size,
        (SELECT s.serial FROM serial s WHERE s.game_id = g.game_id LIMIT 1)
     FROM rom r
     JOIN game g ON g.game_id = r.game_id";

fn parse_row(row: &rusqlite::Row) -> rusqlite::Result<ShiraGameRow> {
    Ok(ShiraGameRow {
        game_id: row.get(0)?,
        platform_id: row.get(1)?,
        entry_name: row.get(2)?,
        release_title: row.get(3)?,
        region: row.get(4)?,
        file_name: row.get(5)?,
        md5: row.get(6)?,
        crc: row.get(7)?,
        size: row.get(8)?,
        serial: row.get(9)?,
    })
}

/// Find ROMs by MD5. Empty `platform_ids` means no filter.
pub fn find_by_md5(
    conn: &Connection,
    md5: &str,
    platform_ids: &[String],
) -> Result<Vec<ShiraGameRow>> {
    let mut sql = format!("{SELECT_ROWS} WHERE r.md5 = ?1 COLLATE NOCASE");
    if !platform_ids.is_empty() {
        sql.push_str(&format!(
            " AND g.platform_id IN ({})",
            placeholders(2, platform_ids.len())
        ));
    }
    sql.push_str(" ORDER BY g.game_id");

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
    platform_ids: &[String],
) -> Result<Vec<ShiraGameRow>> {
    let mut sql = format!("{SELECT_ROWS} WHERE r.file_name LIKE ?1 ESCAPE '\\'");
    if !platform_ids.is_empty() {
        sql.push_str(&format!(
            " AND g.platform_id IN ({})",
            placeholders(2, platform_ids.len())
        ));
    }
    sql.push_str(" ORDER BY g.game_id, r.file_name");

    let values = with_in_list(vec![Value::Text(like_pattern(term))], platform_ids);
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;
    collect_rows(&mut stmt, params_from_iter(values), parse_row)
}

/// Every ROM row, for building the artwork mapping.
pub fn all_roms(conn: &Connection) -> Result<Vec<ShiraGameRow>> {
    let sql = format!("{SELECT_ROWS} ORDER BY g.game_id, r.file_name");
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;
    collect_rows(&mut stmt, [], parse_row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{insert_shiragame_rom, memory_database};
    use romlookup_common::SourceKind;

    fn seed(conn: &Connection) {
        insert_shiragame_rom(
            conn,
            1,
            "ATARI_2600",
            "Pitfall! (USA)",
            "Pitfall! (USA).a26",
            "3e90cf23106f2e08b2781e41299de556",
        );
        insert_shiragame_rom(
            conn,
            2,
            "NINTENDO_SNES",
            "Pitfall - The Mayan Adventure (USA)",
            "Pitfall - The Mayan Adventure (USA).sfc",
            "aa11bb22cc33dd44ee55ff6600112233",
        );
    }

    #[test]
    fn test_find_by_md5() {
        let conn = memory_database(SourceKind::ShiraGame).unwrap();
        seed(&conn);

        let rows = find_by_md5(&conn, "3E90CF23106F2E08B2781E41299DE556", &[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].platform_id, "ATARI_2600");
        assert_eq!(rows[0].entry_name, "Pitfall! (USA)");

        let snes = ["NINTENDO_SNES".to_string()];
        assert!(find_by_md5(&conn, "3e90cf23106f2e08b2781e41299de556", &snes)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_find_by_md5_matches_any_listed_platform() {
        let conn = memory_database(SourceKind::ShiraGame).unwrap();
        seed(&conn);
        insert_shiragame_rom(
            &conn,
            3,
            "NINTENDO_DSI",
            "Flipnote Studio (USA)",
            "Flipnote Studio (USA).nds",
            "0f1e2d3c4b5a69788796a5b4c3d2e1f0",
        );

        let ds = ["NINTENDO_DS".to_string(), "NINTENDO_DSI".to_string()];
        let rows = find_by_md5(&conn, "0f1e2d3c4b5a69788796a5b4c3d2e1f0", &ds).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].platform_id, "NINTENDO_DSI");
    }

    #[test]
    fn test_find_by_file_name() {
        let conn = memory_database(SourceKind::ShiraGame).unwrap();
        seed(&conn);

        assert_eq!(find_by_file_name(&conn, "pitfall", &[]).unwrap().len(), 2);
        let rows = find_by_file_name(&conn, "pitfall", &["NINTENDO_SNES".to_string()]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].game_id, 2);
    }

    #[test]
    fn test_all_roms() {
        let conn = memory_database(SourceKind::ShiraGame).unwrap();
        seed(&conn);
        assert_eq!(all_roms(&conn).unwrap().len(), 2);
    }
}
