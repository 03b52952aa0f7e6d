//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! | Code | Description                                        |
//! |------|----------------------------------------------------|
//! | 0    | Success, ledgers reconcile                         |
//! | 1    | Discrepancies found (like `diff(1)`)               |
//! | 2    | CLI usage error (bad args, handled by clap)        |
//! | 3    | Ingestion or config error (bad file, bad column)   |
//! | 4    | Output error (cannot write the result workbook)    |

/// Success - both ledgers reconcile at both grains.
pub const EXIT_SUCCESS: u8 = 0;

/// Discrepancies found (overall or date-localized).
/// Like `diff(1)`, exit 1 means "the ledgers differ."
pub const EXIT_MISMATCH: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Ingestion error - unreadable file, bad config, missing column,
/// malformed banner, unparsable amount.
pub const EXIT_INGEST: u8 = 3;

/// Output error - result workbook could not be written.
pub const EXIT_OUTPUT: u8 = 4;
