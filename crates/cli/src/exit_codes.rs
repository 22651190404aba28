//! CLI Exit Code Registry
//!
//! Single source of truth for `tmirror` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                             |
//! |------|-----------------------------------------------------|
//! | 0    | Success, tables reconcile                           |
//! | 1    | Divergences found (like `diff(1)`)                  |
//! | 2    | Usage error (bad args, unreadable config file)      |
//! | 3    | Invalid configuration                               |
//! | 4    | Data source error (open, query, missing column)     |
//! | 5    | Output error (CSV/JSON report could not be written) |

use tablemirror::MirrorError;

/// Success: the run completed and found nothing.
pub const EXIT_SUCCESS: u8 = 0;

/// At least one diagnostic was recorded.
pub const EXIT_DIVERGENCES: u8 = 1;

/// Bad arguments or a config file that cannot be read.
pub const EXIT_USAGE: u8 = 2;

/// Config parsed badly or failed validation (links, normalizers, sources).
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// A data source could not be opened or queried.
pub const EXIT_SOURCE: u8 = 4;

/// A report file could not be written.
pub const EXIT_OUTPUT: u8 = 5;

pub fn mirror_exit_code(err: &MirrorError) -> u8 {
    match err {
        MirrorError::ConfigParse(_) | MirrorError::InvalidConfiguration(_) => EXIT_INVALID_CONFIG,
        MirrorError::Source { .. } | MirrorError::MissingColumn { .. } | MirrorError::RowShape { .. } => {
            EXIT_SOURCE
        }
        MirrorError::Io(_) => EXIT_OUTPUT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablemirror::Side;

    #[test]
    fn mirror_errors_map_to_codes() {
        assert_eq!(mirror_exit_code(&MirrorError::ConfigParse("x".into())), EXIT_INVALID_CONFIG);
        assert_eq!(
            mirror_exit_code(&MirrorError::MissingColumn { side: Side::B, column: "id".into() }),
            EXIT_SOURCE
        );
        assert_eq!(mirror_exit_code(&MirrorError::Io("disk full".into())), EXIT_OUTPUT);
    }
}
