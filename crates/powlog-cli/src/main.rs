use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "powlog-cli")]
#[command(about = "CLI client for the powlog node")]
struct Cli {
    /// Node base URL (e.g. http://127.0.0.1:8080)
    #[arg(long, global = true, default_value = "http://127.0.0.1:8080")]
    node: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new user
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Check a username/password pair
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Mine and append a block
    Append {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// Block payload
        #[arg(long)]
        data: String,
        /// Fee recorded with the block
        #[arg(long, default_value_t = 0.0)]
        fee: f64,
    },
    /// Ask the node to verify the whole chain
    Verify,
    /// Print every block
    Show,
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct AddBlock<'a> {
    username: &'a str,
    password: &'a str,
    data: &'a str,
    fee: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let node = cli.node.trim_end_matches('/');
    let client = reqwest::Client::new();

    let res = match &cli.cmd {
        Command::Register { username, password } => {
            let form = Credentials { username, password };
            client.post(format!("{node}/register")).form(&form).send().await?
        }
        Command::Login { username, password } => {
            let form = Credentials { username, password };
            client.post(format!("{node}/login")).form(&form).send().await?
        }
        Command::Append {
            username,
            password,
            data,
            fee,
        } => {
            let form = AddBlock {
                username,
                password,
                data,
                fee: *fee,
            };
            client.post(format!("{node}/add_block")).form(&form).send().await?
        }
        Command::Verify => client.get(format!("{node}/verify_chain")).send().await?,
        Command::Show => client.get(format!("{node}/chain")).send().await?,
    };

    let status = res.status();
    let text = res.text().await?;
    debug!("node answered {status} with {} bytes", text.len());
    println!("status: {}", status);
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(body) => println!("{}", serde_json::to_string_pretty(&body)?),
        Err(_) => println!("{text}"),
    }
    Ok(())
}
