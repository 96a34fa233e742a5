//! Default owner-id helper.
//!
//! Lease owners are opaque ids chosen by the caller (usually an agent or
//! task id). Callers that have no richer identity can use
//! [`process_owner`], which identifies the acquiring OS process.

/// Build a `user@host#pid` owner string for the current process.
pub fn process_owner() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}#{}", user, host, std::process::id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_owner_has_expected_shape() {
        let owner = process_owner();
        assert!(owner.contains('@'));
        assert!(owner.contains('#'));
        assert!(owner.ends_with(&std::process::id().to_string()));
    }
}
