use crate::agents::GeminiAgent;
use crate::config::Config;
use crate::pretalx::PretalxClient;
use std::sync::Arc;
use tera::Tera;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pretalx: PretalxClient,
    pub gemini: GeminiAgent,
    pub tera: Arc<Tera>,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let pretalx = PretalxClient::new(&config)?;
        let gemini = GeminiAgent::new(config.gemini.clone())?;
        let tera = Arc::new(crate::templates::build_tera()?);

        Ok(Self {
            config,
            pretalx,
            gemini,
            tera,
        })
    }
}
