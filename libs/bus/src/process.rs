//! Process-wide identity: a lazily computed process name.
//!
//! Initialized at most once; every reader after initialization sees the
//! cached value without synchronization. Used to label connect handshakes
//! and log lines.

use once_cell::sync::OnceCell;

static PROCESS_NAME: OnceCell<String> = OnceCell::new();

/// The short name of the current executable, computed on first use.
pub fn process_name() -> &'static str {
    PROCESS_NAME.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|path| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| String::from("unknown"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_stable_across_calls() {
        let first = process_name();
        assert!(!first.is_empty());
        // same cached pointer on every subsequent call
        assert!(std::ptr::eq(first, process_name()));
    }
}
