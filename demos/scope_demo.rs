//! Resolves a scope against a live Neo4j store
//!
//! Usage:
//!   cargo run --example scope_demo -- <org_id> [selection ...]
//!
//! Selections use the `kb:<kbId>`, `kb:<kbId>:folder:<folderId>` and
//! `kb:<kbId>:file:<fileId>` forms. With no selections every live record
//! of the organization is listed.

use kb_scope::{
    CollectionNames, Neo4jClient, ScopeFilter, ScopeResolver, ScopeStrategy, StoreConfig,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let org_id = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: scope_demo <org_id> [selection ...]"))?;
    let selections: Vec<String> = args.collect();

    let config = StoreConfig::from_env()?;
    println!("Connecting to Neo4j at {}...", config.uri);
    let client = Neo4jClient::connect(&config).await?;
    client.health_check().await?;
    println!("✓ Connected to Neo4j\n");

    let scope = ScopeFilter::from_selections(&selections);
    println!("Scope:");
    println!("   kb_ids:     {:?}", scope.kb_ids);
    println!("   folder_ids: {:?}", scope.folder_ids);
    println!("   file_ids:   {:?}", scope.file_ids);
    println!("   strategy:   {}\n", ScopeStrategy::select(&scope));

    let resolver = ScopeResolver::new(Arc::new(client), CollectionNames::default())?;
    let records = resolver.resolve("scope-demo", &org_id, Some(&scope)).await?;

    println!("Found {} records:", records.len());
    for record in &records {
        println!("   {}", record.id);
    }

    Ok(())
}
