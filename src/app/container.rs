use std::sync::Arc;

use tracing::debug;

use crate::adapters::toml_config::AppConfig;
use crate::adapters::FfmpegProcessAdapter;
use crate::app::batch_interactor::BatchInteractor;
use crate::engine::TransformInvoker;
use crate::ports::TranscoderPort;
use crate::probe::DurationProbe;

pub trait AppContainer: Send + Sync {
    fn batch_interactor(&self) -> Arc<BatchInteractor>;
    fn probe(&self) -> DurationProbe;
}

pub struct DefaultAppContainer {
    transcoder: Arc<dyn TranscoderPort>,
    batch_interactor: Arc<BatchInteractor>,
}

impl DefaultAppContainer {
    /// Wire the application around the transcoder named in `config`
    pub fn new(config: &AppConfig) -> Self {
        debug!("Using transcoder {}", config.transcoder.display());
        Self::with_transcoder(Arc::new(FfmpegProcessAdapter::new(config.transcoder.clone())))
    }

    /// Wire the application around any transcoder implementation
    pub fn with_transcoder(transcoder: Arc<dyn TranscoderPort>) -> Self {
        let invoker = TransformInvoker::new(Arc::clone(&transcoder));
        let batch_interactor = Arc::new(BatchInteractor::new(invoker));

        Self {
            transcoder,
            batch_interactor,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn batch_interactor(&self) -> Arc<BatchInteractor> {
        Arc::clone(&self.batch_interactor)
    }

    fn probe(&self) -> DurationProbe {
        DurationProbe::new(Arc::clone(&self.transcoder))
    }
}
