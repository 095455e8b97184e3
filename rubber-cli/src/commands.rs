//! Command implementations.

use colored::Colorize;
use rubber_core::{Body, Client, Envelope, Record, SearchEnvelope};
use serde_json::Value;

use crate::error::{CliError, CliResult};

/// Parse an optional JSON argument into a request body.
pub fn parse_body(arg: Option<&str>) -> CliResult<Body<'static>> {
    match arg {
        None => Ok(Body::Empty),
        Some(json) => Ok(serde_json::from_str::<Value>(json)?.into()),
    }
}

/// Fetch a document.
pub async fn get(client: &Client, id: &str) -> CliResult<()> {
    let response = client.get(id).await?;
    print_envelope(&expect("GET", &client.makepath(id), response)?);
    Ok(())
}

/// Index a document.
pub async fn put(client: &Client, id: &str, json: &str) -> CliResult<()> {
    let body = parse_body(Some(json))?;
    let response = client.put(id, body).await?;
    print_envelope(&expect("PUT", &client.makepath(id), response)?);
    Ok(())
}

/// Delete a document.
pub async fn delete(client: &Client, id: &str) -> CliResult<()> {
    let response = client.delete(id).await?;
    print_envelope(&expect("DELETE", &client.makepath(id), response)?);
    Ok(())
}

/// Run a search and list its hits.
pub async fn search(client: &Client, query: Option<&str>) -> CliResult<()> {
    let resource = client.search();
    let response = resource.get(parse_body(query)?).await?;
    print_search(&expect("GET", resource.path(), response)?);
    Ok(())
}

/// Count matching documents.
pub async fn count(client: &Client, query: Option<&str>) -> CliResult<()> {
    let resource = client.count();
    let response = resource.get(parse_body(query)?).await?;
    print_envelope(&expect("GET", resource.path(), response)?);
    Ok(())
}

/// Show the mapping, or replace it when `put` is given.
pub async fn mapping(client: &Client, put: Option<&str>) -> CliResult<()> {
    let resource = client.mapping();
    let (method, response) = match put {
        Some(json) => ("PUT", resource.put(parse_body(Some(json))?).await?),
        None => ("GET", resource.call(()).await?),
    };
    print_envelope(&expect(method, resource.path(), response)?);
    Ok(())
}

fn expect<T>(method: &str, path: &str, response: Option<T>) -> CliResult<T> {
    response.ok_or_else(|| CliError::RequestFailed {
        method: method.to_string(),
        path: path.to_string(),
    })
}

fn print_status(envelope: &Envelope) {
    let status = envelope.status();
    let label = status.to_string();
    if status.is_success() {
        println!("{}", label.green().bold());
    } else {
        println!("{}", label.red().bold());
    }
}

fn print_envelope(envelope: &Envelope) {
    print_status(envelope);
    match envelope.json() {
        Some(json) => println!(
            "{}",
            serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string())
        ),
        None => println!("{}", envelope.text()),
    }
}

fn print_search(response: &SearchEnvelope) {
    print_status(response);
    let results = response.results();

    let total = results
        .total()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "?".to_string());
    let took = response
        .took()
        .map(|t| format!("{}ms", t))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  {} {} of {} hits in {}",
        "Results:".bright_white().bold(),
        results.len(),
        total,
        took
    );

    for hit in results {
        println!("  {}", hit_line(hit));
    }
}

fn hit_line(hit: &Record) -> String {
    let id = hit
        .get("id")
        .ok()
        .and_then(|f| f.as_str().map(str::to_string))
        .unwrap_or_else(|| "-".to_string());
    let score = hit
        .get("score")
        .ok()
        .and_then(|f| f.as_f64())
        .map(|s| format!("{:.3}", s))
        .unwrap_or_else(|| "-".to_string());
    format!("{} {}", id.cyan(), score.dimmed())
}
