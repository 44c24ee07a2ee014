pub mod oauth;
pub mod token;
pub mod token_store;

pub use oauth::{AuthService, AuthStatus, acquire_for_send, load_usable_token};
pub use token::TokenSet;
pub use token_store::{FileTokenStore, TokenStore};
