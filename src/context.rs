use crate::ai::GeminiClient;
use crate::api::GmailClient;
use crate::auth::FileTokenStore;
use crate::config::{self, AppPaths, Settings};
use crate::error::AppResult;
use crate::output::Output;

/// Everything a command needs, resolved once per invocation. No hidden
/// process-wide state: the token store and settings travel through here.
#[derive(Debug)]
pub struct AppContext {
    pub profile: String,
    pub paths: AppPaths,
    pub settings: Settings,
    pub token_store: FileTokenStore,
    pub gmail_client: GmailClient,
    pub output: Output,
}

impl AppContext {
    pub fn bootstrap(profile: String, json: bool) -> AppResult<Self> {
        let profile = config::resolve_profile(&profile);
        let paths = AppPaths::discover()?;
        let settings = config::load_settings(&paths, &profile)?;
        let token_store = FileTokenStore::new(paths.clone());
        let gmail_client = GmailClient::new();
        let output = Output::new(json);

        Ok(Self {
            profile,
            paths,
            settings,
            token_store,
            gmail_client,
            output,
        })
    }

    pub fn gemini_client(&self) -> AppResult<GeminiClient> {
        let api_key = self.settings.gemini_api_key()?.to_string();
        Ok(GeminiClient::new(api_key))
    }
}
