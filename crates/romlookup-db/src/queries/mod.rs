//! Database query modules, one per source.
//!
//! - openvgdb: ROMs joined with releases and regions
//! - libretro: ROMs joined with games and lookup tables
//! - thegamesdb: games and artwork (no ROM hashes)
//! - shiragame: ROMs joined with games and serials
//!
//! Hash comparisons use `COLLATE NOCASE`; filename and title searches are
//! case-insensitive substring matches with `%` and `_` escaped. SQLite folds
//! case for ASCII only, so "POKÉMON" does not find "Pokémon".

pub mod libretro;
pub mod openvgdb;
pub mod shiragame;
pub mod thegamesdb;

use romlookup_common::{Error, Result};
use rusqlite::types::Value;
use rusqlite::{Params, Row, Statement};

/// Build a `LIKE ... ESCAPE '\'` pattern matching `term` anywhere.
///
/// SQLite's `LIKE` ignores case for ASCII letters only; other characters
/// must match exactly.
///
/// ```
/// use romlookup_db::queries::like_pattern;
///
/// assert_eq!(like_pattern("100%_done"), "%100\\%\\_done%");
/// ```
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// `?N, ?N+1, ...` for `count` positional parameters starting at `first`.
pub(crate) fn placeholders(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Positional values: the leading parameters followed by an `IN` list.
pub(crate) fn with_in_list<T>(leading: Vec<Value>, list: &[T]) -> Vec<Value>
where
    T: Clone + Into<Value>,
{
    let mut values = leading;
    values.extend(list.iter().cloned().map(Into::into));
    values
}

pub(crate) fn collect_rows<T, P, F>(stmt: &mut Statement<'_>, params: P, f: F) -> Result<Vec<T>>
where
    P: Params,
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    stmt.query_map(params, f)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))
}
