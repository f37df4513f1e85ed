//! Parser for engine-reported per-level statistics tables.
//!
//! Engines in the LevelDB family expose a human-readable table with a few
//! header lines followed by one row per level, e.g. for `leveldb.stats`:
//!
//! ```text
//!                                Compactions
//! Level  Files Size(MB) Time(sec) Read(MB) Write(MB)
//! --------------------------------------------------
//!   0        2        4         0        0        4
//!   1        5       10         1        8       10
//! ```
//!
//! The size column position and the number of header lines differ between
//! engines and versions, so both are carried by a [`StatsLayout`].

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsLayout {
    /// Lines ignored before the first level row.
    pub header_lines: usize,
    /// Non-empty tokens skipped on each row before the size token.
    pub skip_tokens: usize,
}

impl StatsLayout {
    /// `leveldb.stats`: title, column names, rule.
    pub const LEVELDB: StatsLayout = StatsLayout {
        header_lines: 3,
        skip_tokens: 2,
    };

    /// `rocksdb.levelstats`: column names, rule.
    pub const ROCKSDB_LEVELSTATS: StatsLayout = StatsLayout {
        header_lines: 2,
        skip_tokens: 2,
    };
}

/// Sum the size column of every level row in `text`.
///
/// Rows are split on single spaces with empty tokens ignored. At most one
/// token per row is summed; rows too short to reach the size column add
/// nothing.
pub fn parse_level_sizes(text: &str, layout: StatsLayout) -> Result<u64> {
    let mut total = 0u64;

    for (lineno, line) in text.lines().enumerate().skip(layout.header_lines) {
        let token = match line
            .split(' ')
            .filter(|t| !t.is_empty())
            .nth(layout.skip_tokens)
        {
            Some(t) => t,
            None => continue,
        };

        let size: u64 = token.parse().map_err(|_| Error::StatsParse {
            line: lineno + 1,
            token: token.to_string(),
        })?;
        total += size;
    }

    Ok(total)
}

/// Parse a single integer byte count property, such as a blob file total.
pub fn parse_byte_count(text: &str) -> Result<u64> {
    let token = text.trim();
    token.parse().map_err(|_| Error::StatsParse {
        line: 1,
        token: token.to_string(),
    })
}

/// Render a LevelDB-layout table for `(level, files, size)` rows.
pub fn render_leveldb_table(levels: &[(usize, usize, u64)]) -> String {
    let mut out = String::new();
    out.push_str("                               Compactions\n");
    out.push_str("Level  Files Size(MB) Time(sec) Read(MB) Write(MB)\n");
    out.push_str("--------------------------------------------------\n");
    for (level, files, size) in levels {
        out.push_str(&format!(
            "{:3} {:8} {:8} {:9} {:8} {:9}\n",
            level, files, size, 0, 0, size
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVELDB_SAMPLE: &str = "                               Compactions\n\
        Level  Files Size(MB) Time(sec) Read(MB) Write(MB)\n\
        --------------------------------------------------\n  \
        0        2        4         0        0        4\n  \
        1        5       10         1        8       10\n  \
        2       51      102         3       40       97\n";

    #[test]
    fn sums_size_column_of_leveldb_table() {
        assert_eq!(
            parse_level_sizes(LEVELDB_SAMPLE, StatsLayout::LEVELDB).unwrap(),
            116
        );
    }

    #[test]
    fn header_lines_are_ignored_even_if_numeric() {
        let text = "1 1 1000\n2 2 2000\n3 3 3000\n  0  1  7\n";
        assert_eq!(parse_level_sizes(text, StatsLayout::LEVELDB).unwrap(), 7);
    }

    #[test]
    fn only_one_token_per_row_is_summed() {
        let text = "h\nh\nh\n0 1 5 6 7 8\n";
        assert_eq!(parse_level_sizes(text, StatsLayout::LEVELDB).unwrap(), 5);
    }

    #[test]
    fn short_and_empty_rows_add_nothing() {
        let text = "h\nh\nh\n\n0 1\n   \n0 1 9\n";
        assert_eq!(parse_level_sizes(text, StatsLayout::LEVELDB).unwrap(), 9);
    }

    #[test]
    fn empty_text_is_zero() {
        assert_eq!(parse_level_sizes("", StatsLayout::LEVELDB).unwrap(), 0);
    }

    #[test]
    fn rocksdb_levelstats_layout() {
        let text = "Level Files Size(MB)\n\
            --------------------\n  \
            0        1        3\n  \
            1        0        0\n  \
            2        4       12\n";
        assert_eq!(
            parse_level_sizes(text, StatsLayout::ROCKSDB_LEVELSTATS).unwrap(),
            15
        );
    }

    #[test]
    fn wrong_layout_reports_offending_line() {
        let text = "Level Files Size(MB)\n--------------------\n  0 1 3\n";
        let layout = StatsLayout {
            header_lines: 0,
            skip_tokens: 2,
        };
        let err = parse_level_sizes(text, layout).unwrap_err();
        match err {
            Error::StatsParse { line, token } => {
                assert_eq!(line, 1);
                assert_eq!(token, "Size(MB)");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn byte_count_tolerates_surrounding_whitespace() {
        assert_eq!(parse_byte_count(" 3145728\n").unwrap(), 3_145_728);
        assert!(matches!(
            parse_byte_count("n/a"),
            Err(Error::StatsParse { line: 1, .. })
        ));
    }

    #[test]
    fn rendered_table_parses_back() {
        let text = render_leveldb_table(&[(0, 3, 17), (1, 9, 250)]);
        assert_eq!(text.lines().count(), 5);
        assert_eq!(parse_level_sizes(&text, StatsLayout::LEVELDB).unwrap(), 267);
    }
}
