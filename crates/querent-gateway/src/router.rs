use querent_agent::{AssistantFactory, QueryProcessor, ResponseStrategy, StrategySelector};
use querent_core::QueryResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Body of the query routes.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// The user's question.
    pub query: String,
}

/// Body of the strategy routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyBody {
    /// Default strategy for `POST /api/query`.
    pub strategy: ResponseStrategy,
}

/// Which entry point a query arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryRoute {
    /// Uses the selector's current default.
    Default,
    /// Always single-shot, regardless of the default.
    Invoke,
    /// Always streaming, regardless of the default.
    Stream,
}

/// Routes queries to a processor bound to the right strategy.
pub struct QueryRouter {
    factory: Arc<dyn AssistantFactory>,
    selector: StrategySelector,
}

impl QueryRouter {
    /// Router whose default route starts on `default_strategy`.
    pub fn new(factory: Arc<dyn AssistantFactory>, default_strategy: ResponseStrategy) -> Self {
        Self {
            factory,
            selector: StrategySelector::new(default_strategy),
        }
    }

    /// The shared default-strategy selector.
    pub fn selector(&self) -> &StrategySelector {
        &self.selector
    }

    /// A fresh processor for `route`. The default route reads the selector once.
    pub fn processor(&self, route: QueryRoute) -> QueryProcessor {
        let strategy = match route {
            QueryRoute::Default => self.selector.current(),
            QueryRoute::Invoke => ResponseStrategy::Invoke,
            QueryRoute::Stream => ResponseStrategy::Stream,
        };
        QueryProcessor::new(self.factory.clone(), strategy)
    }

    /// Answer `request` on `route`.
    pub async fn handle(&self, route: QueryRoute, request: QueryRequest) -> QueryResult {
        let processor = self.processor(route);
        info!(route = ?route, strategy = %processor.strategy(), "Routing query");
        processor.process(&request.query).await
    }
}
