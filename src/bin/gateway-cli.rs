use clap::{Parser, Subcommand};
use serde_json::Value;

use jwt_gateway::identity::{TokenIssuer, DEFAULT_SIGNING_SECRET};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the JWT gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Signing secret used by the token commands
    #[arg(
        short,
        long,
        env = "GATEWAY_JWT_SECRET",
        hide_env_values = true,
        default_value = DEFAULT_SIGNING_SECRET,
        hide_default_value = true
    )]
    secret: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show gateway uptime and request count
    Status,
    /// Issue a token the way the gateway does
    Token {
        #[arg(default_value = "username")]
        subject: String,
    },
    /// Check a token signature and print its claims
    VerifyToken { token: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => {
            let client = reqwest::Client::new();
            let res = client.get(format!("{}/status", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Token { subject } => {
            let issuer = TokenIssuer::new(&cli.secret, subject.clone());
            println!("{}", issuer.issue(&subject)?);
        }
        Commands::VerifyToken { token } => {
            let issuer = TokenIssuer::new(&cli.secret, "username");
            let claims = issuer.verify(&token)?;
            println!("{}", serde_json::to_string_pretty(&claims)?);
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
