use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "flight-cli")]
#[command(about = "Command-line client for the flight booking bridge", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:4000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy and register a flight contract
    DeployFlight {
        #[arg(long)]
        account: String,
        #[arg(long)]
        flight_number: String,
        /// Departure, e.g. 2030-01-01T10:00:00Z
        #[arg(long)]
        flight_time: String,
        #[arg(long)]
        model: String,
    },
    /// Book a seat on a registered flight
    Book {
        #[arg(long)]
        account: String,
        #[arg(long)]
        flight_number: String,
        /// Seat category name, e.g. economy
        #[arg(long)]
        seat_category: String,
    },
    /// Read a flight's on-chain state
    Read {
        #[arg(long)]
        flight_number: String,
    },
    /// Show a booked ticket
    Ticket {
        #[arg(long)]
        account: String,
        #[arg(long)]
        confirmation_id: String,
    },
    /// Cancel a booked ticket
    Cancel {
        #[arg(long)]
        account: String,
        #[arg(long)]
        confirmation_id: String,
        /// Gas limit override
        #[arg(long)]
        gas: Option<u64>,
    },
    /// Claim a booked ticket
    Claim {
        #[arg(long)]
        account: String,
        #[arg(long)]
        confirmation_id: String,
    },
    /// Collect the money paid for a ticket
    Collect {
        #[arg(long)]
        account: String,
        #[arg(long)]
        confirmation_id: String,
    },
    /// Check bridge and chain status
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let url = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::DeployFlight {
            account,
            flight_number,
            flight_time,
            model,
        } => {
            client
                .post(format!("{}/deployFlight", url))
                .json(&json!({
                    "account": account,
                    "flightNumber": flight_number,
                    "flightTime": flight_time,
                    "flightModel": model,
                }))
                .send()
                .await?
        }
        Commands::Book {
            account,
            flight_number,
            seat_category,
        } => {
            client
                .post(format!("{}/bookTicket", url))
                .json(&json!({
                    "account": account,
                    "flightNumber": flight_number,
                    "seatCategory": seat_category,
                }))
                .send()
                .await?
        }
        Commands::Read { flight_number } => {
            client
                .get(format!("{}/read", url))
                .query(&[("flightNumber", flight_number)])
                .send()
                .await?
        }
        Commands::Ticket {
            account,
            confirmation_id,
        } => ticket_query(&client, url, "ticketDetails", account, confirmation_id).await?,
        Commands::Cancel {
            account,
            confirmation_id,
            gas,
        } => {
            client
                .post(format!("{}/cancelTicket", url))
                .json(&json!({
                    "account": account,
                    "confirmationId": confirmation_id,
                    "gas": gas,
                }))
                .send()
                .await?
        }
        Commands::Claim {
            account,
            confirmation_id,
        } => ticket_query(&client, url, "claim", account, confirmation_id).await?,
        Commands::Collect {
            account,
            confirmation_id,
        } => ticket_query(&client, url, "collectMoney", account, confirmation_id).await?,
        Commands::Health => client.get(format!("{}/health", url)).send().await?,
    };

    print_response(res).await
}

async fn ticket_query(
    client: &reqwest::Client,
    url: &str,
    route: &str,
    account: String,
    confirmation_id: String,
) -> Result<reqwest::Response, reqwest::Error> {
    client
        .get(format!("{}/{}", url, route))
        .query(&[("account", account), ("confirmationId", confirmation_id)])
        .send()
        .await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: bridge returned status {}", status);
        eprintln!("Response: {}", text);
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
