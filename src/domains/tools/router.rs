//! Tool Router - builds the rmcp ToolRouter from the registry.
//!
//! Every registered tool becomes one dynamic route that forwards the call
//! back into [`ToolRegistry::invoke`], so validation and dispatch behave the
//! same on every transport.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter},
};

use super::registry::ToolRegistry;

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(registry: Arc<ToolRegistry>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    registry
        .list_tools()
        .into_iter()
        .fold(ToolRouter::new(), |router, tool| {
            let name = tool.name.to_string();
            let registry = registry.clone();

            router.with_route(ToolRoute::new_dyn(
                tool,
                move |ctx: ToolCallContext<'_, S>| {
                    let arguments = ctx
                        .arguments
                        .clone()
                        .map(serde_json::Value::Object)
                        .unwrap_or(serde_json::Value::Null);
                    let registry = registry.clone();
                    let name = name.clone();
                    async move { registry.invoke(&name, arguments).map_err(McpError::from) }.boxed()
                },
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ToolsConfig;

    struct TestServer {}

    fn test_registry() -> Arc<ToolRegistry> {
        Arc::new(ToolRegistry::with_defaults(&ToolsConfig::default()).unwrap())
    }

    #[test]
    fn test_build_router() {
        let router: ToolRouter<TestServer> = build_tool_router(test_registry());
        let tools = router.list_all();
        assert_eq!(tools.len(), 3);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert!(names.contains(&"add"));
        assert!(names.contains(&"calculate"));
        assert!(names.contains(&"randomBase64Image"));
    }

    #[test]
    fn test_registry_matches_router() {
        let registry = test_registry();
        let router: ToolRouter<TestServer> = build_tool_router(registry.clone());
        let router_tools = router.list_all();
        let router_names: Vec<_> = router_tools.iter().map(|t| t.name.as_ref()).collect();

        assert_eq!(registry.len(), router_names.len());
        for name in registry.tool_names() {
            assert!(router_names.contains(&name));
        }
    }
}
