//! Store commands: `get`, `set`, `remove`, `raw-set`, `password`, `status`.

use std::collections::BTreeMap;

use anyhow::Context as _;
use securedefaults::{Defaults, Value};
use url::Url;

use super::Context;

/// How `set` interprets its value argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ValueType {
    String,
    Integer,
    Float,
    Double,
    Bool,
    Url,
    /// Any JSON document; numbers become integers when they fit, doubles
    /// otherwise.
    Json,
}

/// Parse a command-line argument into a value of the requested type.
pub fn parse_value(kind: ValueType, raw: &str) -> anyhow::Result<Value> {
    let value = match kind {
        ValueType::String => Value::from(raw),
        ValueType::Integer => Value::Integer(
            raw.trim()
                .parse()
                .with_context(|| format!("Not an integer: {raw}"))?,
        ),
        ValueType::Float => Value::Float(
            raw.trim()
                .parse()
                .with_context(|| format!("Not a float: {raw}"))?,
        ),
        ValueType::Double => Value::Double(
            raw.trim()
                .parse()
                .with_context(|| format!("Not a double: {raw}"))?,
        ),
        ValueType::Bool => match raw.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Value::Bool(true),
            "false" | "no" | "0" | "off" => Value::Bool(false),
            _ => anyhow::bail!("Not a bool: {raw}"),
        },
        ValueType::Url => Value::Url(Url::parse(raw.trim()).with_context(|| format!("Not a URL: {raw}"))?),
        ValueType::Json => {
            let json: serde_json::Value =
                serde_json::from_str(raw).with_context(|| format!("Not valid JSON: {raw}"))?;
            from_json(json)?
        }
    };
    Ok(value)
}

fn from_json(json: serde_json::Value) -> anyhow::Result<Value> {
    Ok(match json {
        serde_json::Value::Null => anyhow::bail!("null cannot be stored; use `remove`"),
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Double(n.as_f64().context("Number out of range")?),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(from_json)
                .collect::<anyhow::Result<_>>()?,
        ),
        serde_json::Value::Object(map) => Value::Dictionary(
            map.into_iter()
                .map(|(k, v)| Ok((k, from_json(v)?)))
                .collect::<anyhow::Result<BTreeMap<_, _>>>()?,
        ),
    })
}

/// Human-readable rendering; scalars print bare, containers as tagged JSON.
pub fn render_value(value: &Value) -> anyhow::Result<String> {
    Ok(match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Double(d) => d.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Url(url) => url.to_string(),
        Value::Data(_) | Value::Array(_) | Value::Dictionary(_) => {
            serde_json::to_string_pretty(value)?
        }
    })
}

/// Run `get`.
pub fn get(ctx: &Context, name: &str, raw: bool) -> anyhow::Result<()> {
    let store = ctx.open()?;
    let Some(bytes) = store.raw_get(name) else {
        anyhow::bail!("No value stored for '{}'", name);
    };
    if raw {
        println!("{}", hex::encode(bytes));
        return Ok(());
    }
    if !store.is_key_materialized() {
        anyhow::bail!("No key material for this suite; '{}' cannot be decrypted", name);
    }

    match store.try_object(name).context("Failed to read value")? {
        Some(value) => println!("{}", render_value(&value)?),
        None => anyhow::bail!("No value stored for '{}'", name),
    }
    Ok(())
}

/// Run `set`.
pub fn set(ctx: &Context, name: &str, raw: &str, kind: ValueType) -> anyhow::Result<()> {
    let value = parse_value(kind, raw)?;
    let store = ctx.open_for_write()?;
    store
        .try_set(name, Some(&value))
        .context("Failed to store value")?;
    store.persist()?;
    println!("Stored '{}' ({}).", name, value.kind());
    Ok(())
}

/// Run `remove`.
pub fn remove(ctx: &Context, name: &str) -> anyhow::Result<()> {
    let store = ctx.open()?;
    if store.raw_get(name).is_none() {
        anyhow::bail!("No value stored for '{}'", name);
    }
    store.remove(name);
    store.persist()?;
    println!("Removed '{}'.", name);
    Ok(())
}

/// Run `raw-set`.
pub fn raw_set(ctx: &Context, name: &str, value: &str) -> anyhow::Result<()> {
    let store = ctx.open()?;
    store.raw_set(name, Some(value.as_bytes()));
    store.persist()?;
    println!("Stored '{}' unencrypted.", name);
    Ok(())
}

/// Run `password`.
pub fn password(ctx: &Context) -> anyhow::Result<()> {
    let mut store = ctx.open()?;
    let had_key = store.is_key_materialized();
    store
        .set_password(ctx.password()?)
        .context("Failed to clear key material")?;
    store
        .ensure_key_material()
        .context("Failed to derive key material")?;

    println!("New key material derived ({}).", store.key_fingerprint()?);
    if had_key {
        println!("  Values written under the previous key can no longer be read.");
    }
    Ok(())
}

/// Run `status`.
pub fn status(ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.config();
    let store = ctx.open()?;

    println!("Config:        {}", ctx.config_path().display());
    println!("Suite:         {}", store.suite().unwrap_or("(none)"));
    println!("Storage:       {}", store.plain_store().path().display());
    println!("Records:       {}", store.plain_store().keys().len());
    println!("Vault backend: {:?}", config.vault.backend);
    println!("Accessibility: {}", store.vault().accessibility().name());
    if let Some(group) = store.vault().access_group() {
        println!("Access group:  {}", group);
    }
    println!("Key entry:     {}", store.key_entry_name());
    println!("IV entry:      {}", store.iv_entry_name());
    if store.is_key_materialized() {
        println!("Key material:  present ({})", store.key_fingerprint()?);
    } else {
        println!("Key material:  not yet derived");
    }
    Ok(())
}
