// CLI client for testing a running Xentral MCP server.
//
//   xmcp list-tools
//   xmcp call search_customers --arg name=Miller --arg city=Berlin
//   xmcp health

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};

#[derive(Parser, Debug)]
#[command(name = "xmcp")]
#[command(about = "CLI client for a Xentral MCP server", long_about = None)]
struct Cli {
    /// MCP server base URL
    #[arg(long, env = "MCP_SERVER_URL", default_value = "http://localhost:8888")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the tools the server advertises
    ListTools,
    /// Call a tool
    Call {
        /// Tool name, e.g. search_customers
        name: String,
        /// Tool argument as KEY=VALUE (repeatable)
        #[arg(long = "arg", value_name = "KEY=VALUE")]
        args: Vec<String>,
        /// Print the full JSON-RPC result instead of the text content
        #[arg(long)]
        raw: bool,
    },
    /// Check server health
    Health,
    /// Show server information
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let server = cli.server.trim_end_matches('/').to_string();

    match cli.command {
        Command::ListTools => {
            let result = rpc(&client, &server, "tools/list", json!({})).await?;
            let tools = result["tools"].as_array().cloned().unwrap_or_default();
            println!("{} tool(s):", tools.len());
            for tool in tools {
                println!(
                    "  {} - {}",
                    tool["name"].as_str().unwrap_or("?"),
                    tool["description"].as_str().unwrap_or("")
                );
            }
        }
        Command::Call { name, args, raw } => {
            let arguments = parse_arguments(&args)?;
            let result = rpc(
                &client,
                &server,
                "tools/call",
                json!({"name": name, "arguments": arguments}),
            )
            .await?;

            if raw {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                match result["content"][0]["text"].as_str() {
                    Some(text) => println!("{text}"),
                    None => println!("{}", serde_json::to_string_pretty(&result)?),
                }
            }
        }
        Command::Health => {
            print_get(&client, &format!("{server}/health")).await?;
        }
        Command::Info => {
            print_get(&client, &format!("{server}/info")).await?;
        }
    }

    Ok(())
}

/// One JSON-RPC exchange with the server; JSON-RPC errors become failures.
async fn rpc(client: &reqwest::Client, server: &str, method: &str, params: Value) -> Result<Value> {
    let payload = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params,
    });

    let response: Value = client
        .post(format!("{server}/mcp"))
        .json(&payload)
        .send()
        .await
        .context("request failed, is the server running?")?
        .json()
        .await
        .context("server returned a non-JSON response")?;

    if let Some(error) = response.get("error") {
        bail!(
            "server error {}: {}",
            error["code"],
            error["message"].as_str().unwrap_or("unknown")
        );
    }

    Ok(response.get("result").cloned().unwrap_or(Value::Null))
}

async fn print_get(client: &reqwest::Client, url: &str) -> Result<()> {
    let body: Value = client
        .get(url)
        .send()
        .await
        .context("request failed, is the server running?")?
        .json()
        .await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

/// Turn repeated `--arg key=value` flags into a JSON argument object.
/// Values that look like numbers or booleans are sent typed.
fn parse_arguments(args: &[String]) -> Result<Map<String, Value>> {
    let mut map = Map::new();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .with_context(|| format!("argument '{arg}' is not KEY=VALUE"))?;
        map.insert(key.to_string(), parse_value(value));
    }
    Ok(map)
}

fn parse_value(text: &str) -> Value {
    if let Ok(n) = text.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = text.parse::<f64>() {
        return Value::from(f);
    }
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(text.to_string()),
    }
}
