//! Server state shared by the handlers.

use std::sync::Arc;

use crate::usecase::GetMessageHistoryUseCase;

use super::trigger::Triggers;

/// Shared application state
pub struct AppState {
    pub triggers: Arc<Triggers>,
    pub get_message_history_usecase: Arc<GetMessageHistoryUseCase>,
}
