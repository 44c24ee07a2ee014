use std::cell::Cell;
use std::fs;

use jobmail::auth::{FileTokenStore, TokenSet, TokenStore, load_usable_token};
use jobmail::config::AppPaths;
use jobmail::error::AppResult;

struct CorruptStore {
    cleared: Cell<bool>,
}

impl TokenStore for CorruptStore {
    fn load(&self, _profile: &str) -> AppResult<Option<TokenSet>> {
        let err = serde_json::from_str::<TokenSet>("{broken").expect_err("must not parse");
        Err(err.into())
    }

    fn save(&self, _profile: &str, _token: &TokenSet) -> AppResult<()> {
        Ok(())
    }

    fn clear(&self, _profile: &str) -> AppResult<()> {
        self.cleared.set(true);
        Ok(())
    }
}

#[test]
fn corrupt_token_is_discarded_and_lookup_continues() {
    let store = CorruptStore {
        cleared: Cell::new(false),
    };

    let token = load_usable_token(&store, "default").expect("lookup should not error");

    assert!(token.is_none(), "corrupt token must read as no token");
    assert!(store.cleared.get(), "corrupt token must be cleared");
}

#[test]
fn corrupt_token_file_is_removed_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = AppPaths::rooted(dir.path().join("config"), dir.path().join("data"))
        .expect("paths should build");
    let store = FileTokenStore::new(paths.clone());

    let token_path = paths.token_file("default");
    fs::write(&token_path, "{not json").expect("write corrupt token");

    let token = load_usable_token(&store, "default").expect("lookup should not error");

    assert!(token.is_none());
    assert!(!token_path.exists(), "corrupt token file must be deleted");
}

#[test]
fn stored_token_round_trips_through_the_file_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = AppPaths::rooted(dir.path().join("config"), dir.path().join("data"))
        .expect("paths should build");
    let store = FileTokenStore::new(paths);

    let token = TokenSet {
        access_token: "access".to_string(),
        refresh_token: Some("refresh".to_string()),
        expires_at_unix: Some(4_102_444_800),
        token_type: Some("Bearer".to_string()),
        scope: Some("https://www.googleapis.com/auth/gmail.send".to_string()),
        email: Some("jane@example.com".to_string()),
    };

    store.save("default", &token).expect("save should work");
    let loaded = load_usable_token(&store, "default")
        .expect("lookup should not error")
        .expect("token should be present");

    assert_eq!(loaded.access_token, "access");
    assert_eq!(loaded.refresh_token.as_deref(), Some("refresh"));
    assert!(loaded.has_refresh_token());
}
