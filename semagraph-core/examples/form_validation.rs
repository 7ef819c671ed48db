//! Two-field form with a guarded submit effect.
//!
//! Run with diagnostics visible:
//!
//! ```sh
//! RUST_LOG=debug cargo run --example form_validation
//! ```

use semagraph_core::{EffectConfig, Graph, NodeConfig, Result};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut form: Graph<String> = Graph::with_debug(true);

    form.binding("email", NodeConfig::new(String::new()))?
        .binding("password", NodeConfig::new(String::new()))?;

    form.effect(
        &["email", "password"],
        EffectConfig::run(|values: Vec<String>, _| async move {
            println!("SUBMIT: email={:?} password={:?}", values[0], values[1]);
            Ok(values[0].clone())
        })
        .when(|values: Vec<String>, _| async move {
            Ok(!values[0].is_empty() && values[1].len() >= 8)
        }),
    )?;

    println!("--- Test 1: Empty values ---");
    form.update("email", String::new()).await?;
    form.update("password", String::new()).await?;

    println!("--- Test 2: Only email ---");
    form.update("email", "a@b.com".into()).await?;

    println!("--- Test 3: Valid email + password ---");
    form.update("password", "12345678".into()).await?;

    Ok(())
}
