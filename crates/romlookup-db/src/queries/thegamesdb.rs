//! TheGamesDB mirror queries.
//!
//! The mirror has no ROM hashes or file names, so every lookup goes through
//! the game title.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use romlookup_common::{Error, Result};

use super::{collect_rows, like_pattern, placeholders, with_in_list};
use crate::models::{TheGamesDbArtworkRow, TheGamesDbGameRow};

const SELECT_GAMES: &str = "SELECT id, game_title, release_date, platform, region, overview,
        developers, publishers, genres
     FROM games";

const SELECT_ARTWORK: &str = "SELECT a.game_id, g.platform, a.type, a.side, a.filename, a.resolution
     FROM artwork a
     JOIN games g ON g.id = a.game_id";

fn parse_game_row(row: &rusqlite::Row) -> rusqlite::Result<TheGamesDbGameRow> {
    Ok(TheGamesDbGameRow {
        id: row.get(0)?,
        title: row.get(1)?,
        release_date: row.get(2)?,
        platform: row.get(3)?,
        region: row.get(4)?,
        overview: row.get(5)?,
        developers: row.get(6)?,
        publishers: row.get(7)?,
        genres: row.get(8)?,
    })
}

fn parse_artwork_row(row: &rusqlite::Row) -> rusqlite::Result<TheGamesDbArtworkRow> {
    Ok(TheGamesDbArtworkRow {
        game_id: row.get(0)?,
        platform: row.get(1)?,
        kind: row.get(2)?,
        side: row.get(3)?,
        filename: row.get(4)?,
        resolution: row.get(5)?,
    })
}

/// Find games whose title contains `title`. Empty `platforms` means no
/// filter.
pub fn find_games_by_title(
    conn: &Connection,
    title: &str,
    platforms: &[i64],
) -> Result<Vec<TheGamesDbGameRow>> {
    let mut sql = format!("{SELECT_GAMES} WHERE game_title LIKE ?1 ESCAPE '\\'");
    if !platforms.is_empty() {
        sql.push_str(&format!(
            " AND platform IN ({})",
            placeholders(2, platforms.len())
        ));
    }
    sql.push_str(" ORDER BY id");

    let values = with_in_list(vec![Value::Text(like_pattern(title))], platforms);
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;
    collect_rows(&mut stmt, params_from_iter(values), parse_game_row)
}

/// Get a game by id.
pub fn find_game_by_id(conn: &Connection, id: i64) -> Result<Option<TheGamesDbGameRow>> {
    let sql = format!("{SELECT_GAMES} WHERE id = ?1");
    match conn.query_row(&sql, [id], parse_game_row) {
        Ok(game) => Ok(Some(game)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// All artwork of one game.
pub fn artwork_for_game(conn: &Connection, game_id: i64) -> Result<Vec<TheGamesDbArtworkRow>> {
    let sql = format!("{SELECT_ARTWORK} WHERE a.game_id = ?1 ORDER BY a.id");
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;
    collect_rows(&mut stmt, [game_id], parse_artwork_row)
}

/// Artwork of every game whose title contains `title`. Empty `platforms`
/// means no filter.
pub fn artwork_by_title(
    conn: &Connection,
    title: &str,
    platforms: &[i64],
) -> Result<Vec<TheGamesDbArtworkRow>> {
    let mut sql = format!("{SELECT_ARTWORK} WHERE g.game_title LIKE ?1 ESCAPE '\\'");
    if !platforms.is_empty() {
        sql.push_str(&format!(
            " AND g.platform IN ({})",
            placeholders(2, platforms.len())
        ));
    }
    sql.push_str(" ORDER BY g.id, a.id");

    let values = with_in_list(vec![Value::Text(like_pattern(title))], platforms);
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;
    collect_rows(&mut stmt, params_from_iter(values), parse_artwork_row)
}
