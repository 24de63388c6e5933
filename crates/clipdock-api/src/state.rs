use std::sync::Arc;

use clipdock_core::Config;
use clipdock_db::VideoStore;

use crate::services::upload::UploadPipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub videos: Arc<dyn VideoStore>,
    pub uploader: UploadPipeline,
}
