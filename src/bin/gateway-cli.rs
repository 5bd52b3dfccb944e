use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use session_gateway::session::SessionCodec;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the session gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway liveness
    Health,
    /// Decode a session token the way the gateway would
    Inspect {
        token: String,
        /// Shared HMAC secret. Required unless --structural is given.
        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        secret: Option<String>,
        /// Skip signature verification.
        #[arg(long)]
        structural: bool,
    },
    /// Exchange credentials through the gateway and print the access token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "GATEWAY_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let url = cli.url.trim_end_matches('/');
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{url}/health")).send().await?;
            print_response(res).await?;
        }
        Commands::Inspect {
            token,
            secret,
            structural,
        } => {
            let codec = match (structural, secret) {
                (true, _) => SessionCodec::structural(),
                (false, Some(secret)) => SessionCodec::with_secret(secret.as_bytes()),
                (false, None) => {
                    return Err("a secret is required unless --structural is given".into());
                }
            };
            match codec.decode(&token) {
                Some(session) => println!("{}", serde_json::to_string_pretty(&session)?),
                None => {
                    eprintln!("Token rejected: malformed, badly signed, or expired");
                    std::process::exit(1);
                }
            }
        }
        Commands::Login { email, password } => {
            let res = client
                .post(format!("{url}/api/auth/login"))
                .json(&json!({ "email": email, "password": password }))
                .send()
                .await?;
            if !res.status().is_success() {
                return print_response(res).await;
            }
            let body: Value = res.json().await?;
            match body.get("accessToken").and_then(Value::as_str) {
                Some(token) => println!("{token}"),
                None => eprintln!("Error: response carried no access token"),
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
