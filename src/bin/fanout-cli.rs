use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

#[derive(Parser)]
#[command(name = "fanout-cli")]
#[command(about = "Management CLI for the fan-out proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Reserved path of the update endpoint.
    #[arg(short, long, default_value = "/-update-backends")]
    path: String,

    /// API key, if the proxy requires one.
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the proxy's backend set
    UpdateBackends {
        /// Backend base addresses, e.g. http://10.0.0.5:8000
        #[arg(required = true, num_args = 1..)]
        backends: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {key}"))?);
    }

    match cli.command {
        Commands::UpdateBackends { backends } => {
            let res = client
                .post(format!("{}{}", cli.url.trim_end_matches('/'), cli.path))
                .query(&[("backends", backends.join(","))])
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if status.is_success() {
        println!("{}", text.trim_end());
    } else {
        eprintln!("Error: proxy returned status {}", status);
        eprintln!("Response: {}", text.trim_end());
        std::process::exit(1);
    }
    Ok(())
}
