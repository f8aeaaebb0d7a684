//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on the engine's driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::AccessEngine;
use crate::domain::ports::{EntitlementQuery, SharingScopeQuery, TeamContextQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub context: Arc<dyn TeamContextQuery>,
    pub scope: Arc<dyn SharingScopeQuery>,
    pub entitlement: Arc<dyn EntitlementQuery>,
}

impl HttpState {
    /// Construct state from individual driving ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use access_engine::domain::AccessEngine;
    /// use access_engine::inbound::http::state::HttpState;
    /// use access_engine::test_support::InMemoryDirectory;
    ///
    /// let engine = AccessEngine::new(Arc::new(InMemoryDirectory::new()).ports());
    /// let state = HttpState::new(
    ///     engine.context_query(),
    ///     engine.scope_query(),
    ///     engine.entitlement_query(),
    /// );
    /// let _scope = state.scope.clone();
    /// ```
    pub fn new(
        context: Arc<dyn TeamContextQuery>,
        scope: Arc<dyn SharingScopeQuery>,
        entitlement: Arc<dyn EntitlementQuery>,
    ) -> Self {
        Self {
            context,
            scope,
            entitlement,
        }
    }
}

impl From<&AccessEngine> for HttpState {
    fn from(engine: &AccessEngine) -> Self {
        Self::new(
            engine.context_query(),
            engine.scope_query(),
            engine.entitlement_query(),
        )
    }
}
