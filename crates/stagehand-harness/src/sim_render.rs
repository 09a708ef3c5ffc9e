//! Recording renderer.

use async_trait::async_trait;
use stagehand_core::{
    app::{RenderFrame, Renderer},
    error::BoxError,
};

use crate::recorder::EventLog;

/// Per-application [`Renderer`] recording each frame it is handed.
///
/// Events: `render:{app}:loading` while the loading indicator is set,
/// `render:{app}:done` once content is displayed, `render:{app}:cleared`
/// when unmount empties the stage.
pub struct RecordingRenderer {
    log: EventLog,
    app: String,
}

impl RecordingRenderer {
    /// A renderer for `app` recording into `log`.
    #[must_use]
    pub fn new(log: EventLog, app: impl Into<String>) -> Self {
        Self { log, app: app.into() }
    }
}

#[async_trait]
impl Renderer for RecordingRenderer {
    async fn render(&self, frame: RenderFrame<'_>) -> Result<(), BoxError> {
        let state = if frame.content.is_empty() {
            "cleared"
        } else if frame.loading {
            "loading"
        } else {
            "done"
        };
        self.log.record(format!("render:{}:{state}", self.app));
        Ok(())
    }
}
