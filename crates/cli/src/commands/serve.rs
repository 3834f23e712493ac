//! `chefai serve`: Start the HTTP API server.

use crate::runtime::Runtime;
use chefai_gateway::GatewayState;
use std::sync::Arc;

pub async fn run(port_override: Option<u16>, host_override: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = Runtime::load().await?;
    runtime.spawn_event_logger();

    let port = port_override.unwrap_or(runtime.config.gateway.port);
    let host = host_override.unwrap_or_else(|| runtime.config.gateway.host.clone());

    println!("ChefAI Gateway");
    println!("   Listening: {host}:{port}");
    println!("   Model: {}", runtime.agent.model());
    println!("   Tools: {}", runtime.agent.tools().names().join(", "));

    let state = Arc::new(GatewayState {
        agent: runtime.agent.clone(),
        history: runtime.history.clone(),
        recipes: runtime.recipes.clone(),
    });
    chefai_gateway::start(state, &host, port).await?;

    Ok(())
}
