use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "leilao-cli",
    about = "console client for the leilao auction backend with live sse notifications",
    version
)]
pub struct Args {
    /// Backend base URL
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    pub base_url: String,

    /// Client identifier; generated from the clock plus a random suffix when omitted
    #[arg(long)]
    pub client_id: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Output logs in JSON format
    #[arg(long)]
    pub json_logs: bool,

    /// Output format: table, json, minimal
    #[arg(long, default_value = "table")]
    pub format: String,

    /// Disable colored output (useful for piping to files)
    #[arg(long)]
    pub no_color: bool,

    /// Request timeout for one-shot API calls, in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Base reconnection delay for the event stream, in seconds
    #[arg(long, default_value = "5")]
    pub reconnect_delay: u64,

    /// Maximum number of reconnection attempts (0 for unlimited)
    #[arg(long, default_value = "0")]
    pub max_reconnects: u32,

    /// Interval between stream health snapshots, in seconds
    #[arg(long, default_value = "30")]
    pub health_interval: u64,

    /// Enable the Prometheus metrics exporter
    #[arg(long)]
    pub metrics: bool,

    /// Metrics exporter port
    #[arg(long, default_value = "9090")]
    pub metrics_port: u16,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Follow the notification stream for this client id
    Listen,

    /// Create a new auction
    CreateAuction {
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: String,

        #[arg(long)]
        starting_bid: f64,

        /// RFC 3339 start time; give both times or neither (defaults: now+5s / now+10s)
        #[arg(long)]
        starts_at: Option<String>,

        /// RFC 3339 end time
        #[arg(long)]
        ends_at: Option<String>,
    },

    /// Place a bid on an auction
    Bid {
        #[arg(long)]
        auction_id: i64,

        #[arg(long)]
        amount: f64,
    },

    /// List known auctions
    List,

    /// Subscribe to notifications for an auction
    RegisterInterest {
        #[arg(long)]
        auction_id: i64,
    },

    /// Cancel a notification subscription
    CancelInterest {
        #[arg(long)]
        auction_id: i64,
    },

    /// Pay for a won auction through its payment link
    Pay {
        /// Payment link received over the stream; not the auction backend
        #[arg(long)]
        link: String,

        #[arg(long)]
        amount: f64,

        #[arg(long, default_value = "BRL")]
        currency: String,
    },
}
