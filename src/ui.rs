/// file: src/ui.rs
/// description: presentation layer consuming client events from the stream
use crate::{
    events::{ClientEvent, EventReceiver},
    formatter::{money, Colors},
    types::{ClientId, ServerNotification},
};
use tracing::info;

pub struct UiController {
    event_receiver: EventReceiver,
    colored: bool,
    client_id: ClientId,
}

impl UiController {
    pub fn new(event_receiver: EventReceiver, colored: bool, client_id: ClientId) -> Self {
        Self {
            event_receiver,
            colored,
            client_id,
        }
    }

    pub async fn run(&mut self) {
        self.print_banner();
        while let Some(event) = self.event_receiver.recv().await {
            self.handle_event(event);
        }
    }

    fn handle_event(&self, event: ClientEvent) {
        match event {
            ClientEvent::Starting => {
                info!("client starting");
            }
            ClientEvent::Connecting { url } => {
                self.print_status("CONNECTING", &url);
            }
            ClientEvent::Connected { connection_id } => {
                self.print_status("CONNECTED", &format!("conexão {}", connection_id));
            }
            ClientEvent::Notification(notification) => {
                self.print_notification(&notification);
            }
            ClientEvent::Reconnecting { attempt, delay_secs } => {
                self.print_status(
                    "RECONNECTING",
                    &format!("tentativa {} em {}s", attempt, delay_secs),
                );
            }
            ClientEvent::Disconnected => {
                self.print_status("DISCONNECTED", "conexão encerrada");
            }
            ClientEvent::Stopping => {
                self.print_status("STOPPING", "cliente finalizando");
            }
        }
    }

    fn print_banner(&self) {
        println!();
        println!(
            "{}LEILÃO — notificações em tempo real{}",
            self.color(Colors::BOLD),
            self.color(Colors::RESET)
        );
        println!(
            "Seu ID de Cliente: {}{}{}",
            self.color(Colors::BRIGHT_CYAN),
            self.client_id,
            self.color(Colors::RESET)
        );
        println!();
    }

    fn print_status(&self, status: &str, message: &str) {
        let color = match status {
            "CONNECTING" | "RECONNECTING" => Colors::BRIGHT_YELLOW,
            "CONNECTED" => Colors::BRIGHT_GREEN,
            "DISCONNECTED" => Colors::BRIGHT_RED,
            "STOPPING" => Colors::BRIGHT_MAGENTA,
            _ => Colors::WHITE,
        };
        println!(
            "{}{}[{}]{} {}",
            self.color(Colors::BOLD),
            self.color(color),
            status,
            self.color(Colors::RESET),
            message
        );
    }

    fn print_notification(&self, notification: &ServerNotification) {
        match notification {
            ServerNotification::BidValidated(bid) => {
                self.print_card(
                    Colors::BRIGHT_GREEN,
                    "LANCE VALIDADO",
                    &format!(
                        "leilão {} · cliente {} · lance {}",
                        bid.auction_id,
                        bid.client_id,
                        money(bid.amount)
                    ),
                );
            }
            ServerNotification::BidInvalidated(bid) => {
                self.print_card(
                    Colors::BRIGHT_RED,
                    "LANCE INVÁLIDO",
                    &format!(
                        "leilão {} · cliente {} · lance {}",
                        bid.auction_id,
                        bid.client_id,
                        money(bid.amount)
                    ),
                );
            }
            ServerNotification::AuctionWinner(winner) => {
                self.print_card(
                    Colors::BRIGHT_MAGENTA,
                    "LEILÃO FINALIZADO",
                    &format!(
                        "{} (ID {}) · {} · vencedor {} · valor {}",
                        winner.name,
                        winner.auction_id,
                        winner.description,
                        winner.client_id,
                        money(winner.amount)
                    ),
                );
            }
            ServerNotification::PaymentLink(link) => {
                self.print_card(
                    Colors::BRIGHT_CYAN,
                    "LINK PARA PAGAMENTO",
                    &format!(
                        "leilão {} · cliente {} · {}",
                        link.auction_id, link.client_id, link.payment_link
                    ),
                );
            }
            ServerNotification::PaymentStatus(status) => {
                self.print_card(
                    Colors::BRIGHT_YELLOW,
                    "STATUS DE PAGAMENTO",
                    &format!(
                        "leilão {} · cliente {} · {}",
                        status.auction_id, status.client_id, status.status
                    ),
                );
            }
            ServerNotification::Opaque(value) => {
                self.print_card(Colors::GRAY, "MENSAGEM", &value.to_string());
            }
            ServerNotification::Raw(text) => {
                self.print_card(Colors::GRAY, "MENSAGEM", text);
            }
        }
    }

    fn print_card(&self, color: &'static str, title: &str, body: &str) {
        println!(
            "{}{}{:<20}{} {}",
            self.color(Colors::BOLD),
            self.color(color),
            title,
            self.color(Colors::RESET),
            body
        );
    }

    fn color(&self, code: &'static str) -> &'static str {
        if self.colored {
            code
        } else {
            ""
        }
    }
}
