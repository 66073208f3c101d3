use std::{path::Path, sync::Arc};

use aikotoba_domain::lexicon::Lexicon;
use aikotoba_service::DiagnoseService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<DiagnoseService>,
}
impl AppState {
	pub fn new(config: aikotoba_config::Config) -> color_eyre::Result<Self> {
		let lexicon = Lexicon::load(Path::new(&config.lexicon.path))?;

		tracing::info!(words = lexicon.words().len(), "Lexicon loaded.");

		Ok(Self::from_service(DiagnoseService::new(config, lexicon)))
	}

	pub fn from_service(service: DiagnoseService) -> Self {
		Self { service: Arc::new(service) }
	}
}
