//! Process exit codes. Scripts depend on these.

use stockpilot_core::InventoryError;
use stockpilot_media::MediaError;

pub const EXIT_SUCCESS: i32 = 0;
/// Product (or bucket) not found; missing media configuration.
pub const EXIT_NOT_FOUND: i32 = 1;
/// Bad id, field, quantity or argument.
pub const EXIT_INVALID_INPUT: i32 = 2;
/// Stock would go negative; storage rejected our credentials.
pub const EXIT_CONFLICT: i32 = 3;
/// Product database unreadable or corrupt.
pub const EXIT_STORE_ERROR: i32 = 4;
/// Object storage unreachable or rate limited.
pub const EXIT_UPSTREAM_ERROR: i32 = 5;
/// Anything else.
pub const EXIT_INTERNAL_ERROR: i32 = 6;

/// Exit code for an error that escaped a command.
pub fn for_error(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<InventoryError>() {
        return e.exit_code();
    }
    if let Some(e) = err.downcast_ref::<MediaError>() {
        return e.exit_code();
    }
    EXIT_INTERNAL_ERROR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_codes_line_up() {
        let not_found = anyhow::Error::new(InventoryError::NotFound { id: "x".into() });
        assert_eq!(for_error(&not_found), EXIT_NOT_FOUND);

        let underflow = anyhow::Error::new(InventoryError::StockUnderflow {
            id: "x".into(),
            current: 0,
            delta: -1,
        });
        assert_eq!(for_error(&underflow), EXIT_CONFLICT);

        let upstream = anyhow::Error::new(MediaError::Network {
            message: "reset".into(),
        });
        assert_eq!(for_error(&upstream), EXIT_UPSTREAM_ERROR);

        let other = anyhow::anyhow!("boom");
        assert_eq!(for_error(&other), EXIT_INTERNAL_ERROR);
    }

    #[test]
    fn test_context_does_not_hide_code() {
        let err = anyhow::Error::new(InventoryError::InvalidQuantity { quantity: 0 })
            .context("restock failed");
        assert_eq!(for_error(&err), EXIT_INVALID_INPUT);
    }
}
