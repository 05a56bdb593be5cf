// atelier_server/src/state.rs
use atelier::{CachedRates, OrderSubmissionService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub submission_service: Arc<OrderSubmissionService>,
  pub rates: Arc<CachedRates>,
}
