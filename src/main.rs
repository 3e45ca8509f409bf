use anyhow::Result;
use clap::Parser;
use leilao_cli::{
    api::{parse_rfc3339, ApiClient, NewAuction},
    cli::{Args, Command},
    client_state::{SharedStreamState, StreamState},
    config::Config,
    events::create_event_channel,
    formatter::{AuctionFormatter, OutputFormat},
    monitoring::setup_metrics,
    stream::EventStreamClient,
    tracing_setup::setup_tracing,
    ui::UiController,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_tracing(&args.log_level, args.json_logs)?;

    let config = Arc::new(Config::from_args(&args)?);
    info!(
        client_id = %config.client_id,
        base_url = %config.base_url,
        "leilao-cli v{}",
        env!("CARGO_PKG_VERSION")
    );

    let api = ApiClient::new(config.clone())?;

    match &args.command {
        Command::Listen => listen(config, &args).await?,

        Command::CreateAuction {
            name,
            description,
            starting_bid,
            starts_at,
            ends_at,
        } => {
            let auction = NewAuction {
                name: name.clone(),
                description: description.clone(),
                starting_bid: *starting_bid,
                starts_at: starts_at.as_deref().map(parse_rfc3339).transpose()?,
                ends_at: ends_at.as_deref().map(parse_rfc3339).transpose()?,
            };
            let created = api.create_auction(auction).await?;
            println!("Leilão criado com sucesso (ID: {})", created.id);
        }

        Command::Bid { auction_id, amount } => {
            let ack = api.place_bid(*auction_id, *amount).await?;
            println!(
                "Lance enviado. Resposta: {}",
                ack.message.unwrap_or_else(|| "ok".into())
            );
        }

        Command::List => {
            let auctions = api.list_auctions().await?;
            AuctionFormatter::new(OutputFormat::from(args.format.as_str()), !args.no_color)
                .print_auctions(&auctions);
        }

        Command::RegisterInterest { auction_id } => {
            api.register_interest(*auction_id).await?;
            println!("Interesse registrado.");
        }

        Command::CancelInterest { auction_id } => {
            api.cancel_interest(*auction_id).await?;
            println!("Interesse cancelado.");
        }

        Command::Pay {
            link,
            amount,
            currency,
        } => {
            let ack = api.submit_payment(link, *amount, currency).await?;
            println!(
                "Pagamento enviado. Resposta: {}",
                ack.message.unwrap_or_else(|| "ok".into())
            );
        }
    }

    Ok(())
}

async fn listen(config: Arc<Config>, args: &Args) -> Result<()> {
    if config.metrics.enabled {
        setup_metrics(config.metrics.port).await?;
        info!("metrics exporter enabled on port {}", config.metrics.port);
    }

    let (event_sender, event_receiver) = create_event_channel();
    let state: SharedStreamState = Arc::new(Mutex::new(StreamState::new()));
    let client = EventStreamClient::new(config.clone(), event_sender, state)?;

    let mut ui = UiController::new(event_receiver, !args.no_color, config.client_id);
    let ui_task = tokio::spawn(async move { ui.run().await });

    tokio::select! {
        result = client.run() => {
            if let Err(e) = &result {
                error!("event stream client error: {}", e);
            }
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested");
            client.detach().await;
        }
    }

    // Dropping the client closes the event channel, ending the UI loop.
    drop(client);
    let _ = ui_task.await;
    Ok(())
}
