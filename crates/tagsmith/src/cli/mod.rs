//! Command implementations.

pub mod config;
pub mod edit;
pub mod tag;
pub mod tags;
pub mod theme;

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
///
/// Wraps `interact_text()` / `interact()` calls that lack an `_opt` variant
/// so an interrupt ends the current prompt instead of the process.
pub(crate) fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_interrupt_maps_interrupted_to_none() {
        let interrupted: dialoguer::Result<u8> = Err(dialoguer::Error::IO(std::io::Error::new(
            std::io::ErrorKind::Interrupted,
            "ctrl-c",
        )));
        assert!(handle_interrupt(interrupted).unwrap().is_none());
    }

    #[test]
    fn test_handle_interrupt_passes_values_and_errors() {
        assert_eq!(handle_interrupt(Ok(3u8)).unwrap(), Some(3));
        let broken: dialoguer::Result<u8> = Err(dialoguer::Error::IO(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "gone",
        )));
        assert!(handle_interrupt(broken).is_err());
    }
}
