//! Per-field error derivation feeding an aggregate validity flag.
//!
//! Each raw field drives a derived error node; the error nodes drive a
//! `form_valid` flag; a submit effect fires once every error is clear.
//!
//! ```sh
//! RUST_LOG=debug cargo run --example derived_state
//! ```

use serde_json::{json, Value};

use semagraph_core::projection::{from, Rule};
use semagraph_core::{EffectConfig, Graph, NodeConfig, Result};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut form: Graph<Value> = Graph::with_debug(true);

    form.binding("email", NodeConfig::new(json!("")))?
        .binding("first_name", NodeConfig::new(json!("")))?
        .binding("age", NodeConfig::new(json!("")))?
        .binding("email_error", NodeConfig::new(Value::Null))?
        .binding("first_name_error", NodeConfig::new(Value::Null))?
        .binding("age_error", NodeConfig::new(Value::Null))?
        .binding("form_valid", NodeConfig::new(json!(false)))?;

    // Per-field validation.
    form.define(
        "email_error",
        &from(
            ["email"],
            vec![Rule::map(|values: Vec<Value>, _| async move {
                let ok = values[0].as_str().is_some_and(|s| s.contains('@'));
                Ok(if ok { Value::Null } else { json!("Invalid email") })
            })],
        ),
    )?;

    form.define(
        "first_name_error",
        &from(
            ["first_name"],
            vec![Rule::map(|values: Vec<Value>, _| async move {
                let ok = values[0].as_str().is_some_and(|s| !s.is_empty());
                Ok(if ok {
                    Value::Null
                } else {
                    json!("First name required")
                })
            })],
        ),
    )?;

    form.define(
        "age_error",
        &from(
            ["age"],
            vec![Rule::map(|values: Vec<Value>, _| async move {
                let ok = values[0]
                    .as_str()
                    .is_some_and(|s| s.parse::<u32>().is_ok_and(|n| n >= 18));
                Ok(if ok { Value::Null } else { json!("Must be 18+") })
            })],
        ),
    )?;

    // All fields must be valid.
    form.define(
        "form_valid",
        &from(
            ["email_error", "first_name_error", "age_error"],
            vec![Rule::map(|values: Vec<Value>, _| async move {
                Ok(json!(values.iter().all(Value::is_null)))
            })],
        ),
    )?;

    // Submission effect.
    form.effect(
        &["form_valid", "email", "first_name", "age"],
        EffectConfig::run(|values: Vec<Value>, _| async move {
            println!(
                "SUBMIT: email={} first_name={} age={}",
                values[1], values[2], values[3]
            );
            Ok(values[0].clone())
        })
        .when(|values: Vec<Value>, _| async move { Ok(values[0] == json!(true)) }),
    )?;

    println!("--- Test 1: All empty ---");
    form.update("email", json!("")).await?;
    form.update("first_name", json!("")).await?;
    form.update("age", json!("")).await?;

    println!("--- Test 2: Partial valid ---");
    form.update("first_name", json!("Alan")).await?;
    form.update("age", json!("41")).await?;

    println!("--- Test 3: Fix email ---");
    form.update("email", json!("alan@bletchley.park")).await?;

    println!(
        "final: form_valid={} age_error={}",
        form.value("form_valid")?,
        form.value("age_error")?
    );

    Ok(())
}
