use crate::types::{AuctionStatus, AuctionSummary};

// ANSI color codes
pub struct Colors;

impl Colors {
    pub const RESET: &'static str = "\x1b[0m";
    pub const BOLD: &'static str = "\x1b[1m";
    pub const DIM: &'static str = "\x1b[2m";

    pub const RED: &'static str = "\x1b[31m";
    pub const GREEN: &'static str = "\x1b[32m";
    pub const YELLOW: &'static str = "\x1b[33m";
    pub const CYAN: &'static str = "\x1b[36m";
    pub const WHITE: &'static str = "\x1b[37m";
    pub const GRAY: &'static str = "\x1b[90m";

    pub const BRIGHT_RED: &'static str = "\x1b[91m";
    pub const BRIGHT_GREEN: &'static str = "\x1b[92m";
    pub const BRIGHT_YELLOW: &'static str = "\x1b[93m";
    pub const BRIGHT_BLUE: &'static str = "\x1b[94m";
    pub const BRIGHT_MAGENTA: &'static str = "\x1b[95m";
    pub const BRIGHT_CYAN: &'static str = "\x1b[96m";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Minimal,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "minimal" => OutputFormat::Minimal,
            _ => OutputFormat::Table,
        }
    }
}

pub fn money(value: f64) -> String {
    format!("R$ {:.2}", value)
}

pub struct AuctionFormatter {
    format: OutputFormat,
    colored: bool,
}

impl AuctionFormatter {
    pub fn new(format: OutputFormat, colored: bool) -> Self {
        Self { format, colored }
    }

    pub fn print_auctions(&self, auctions: &[AuctionSummary]) {
        print!("{}", self.render_auctions(auctions));
    }

    pub fn render_auctions(&self, auctions: &[AuctionSummary]) -> String {
        if auctions.is_empty() && self.format != OutputFormat::Json {
            return "Nenhum leilão encontrado.\n".to_string();
        }

        match self.format {
            OutputFormat::Table => self.render_table(auctions),
            OutputFormat::Json => {
                let mut out =
                    serde_json::to_string_pretty(auctions).unwrap_or_else(|_| "[]".to_string());
                out.push('\n');
                out
            }
            OutputFormat::Minimal => self.render_minimal(auctions),
        }
    }

    fn render_table(&self, auctions: &[AuctionSummary]) -> String {
        let mut out = String::new();
        out.push_str(&self.header_line(&format!(
            "{:>6}  {:<20} {:<14} {:>14}  {:<19} {:<19}",
            "ID", "NOME", "STATUS", "LANCE INICIAL", "INICIO", "FIM"
        )));

        for auction in auctions {
            let status = self.status_cell(&auction.status);
            out.push_str(&format!(
                "{:>6}  {:<20} {} {:>14}  {:<19} {:<19}\n",
                auction.id,
                truncate(&auction.name, 20),
                status,
                money(auction.starting_bid),
                local_time(auction.starts_at_local()),
                local_time(auction.ends_at_local()),
            ));
            if self.colored {
                out.push_str(&format!(
                    "        {}{}{}\n",
                    Colors::DIM,
                    truncate(&auction.description, 70),
                    Colors::RESET
                ));
            } else {
                out.push_str(&format!("        {}\n", truncate(&auction.description, 70)));
            }
        }
        out
    }

    fn render_minimal(&self, auctions: &[AuctionSummary]) -> String {
        let mut out = String::new();
        for auction in auctions {
            out.push_str(&format!(
                "{} {} {} {}\n",
                auction.id,
                auction.name,
                auction.status.label(),
                money(auction.starting_bid)
            ));
        }
        out
    }

    fn header_line(&self, text: &str) -> String {
        if self.colored {
            format!("{}{}{}{}\n", Colors::BOLD, Colors::GRAY, text, Colors::RESET)
        } else {
            format!("{}\n", text)
        }
    }

    // Each lifecycle state gets its own color: scheduled yellow, active
    // green, finished red.
    fn status_cell(&self, status: &AuctionStatus) -> String {
        let label = format!("{:<14}", status.label());
        if !self.colored {
            return label;
        }
        let color = match status {
            AuctionStatus::Scheduled => Colors::BRIGHT_YELLOW,
            AuctionStatus::InProgress => Colors::BRIGHT_GREEN,
            AuctionStatus::Finished => Colors::BRIGHT_RED,
            AuctionStatus::Other(_) => Colors::WHITE,
        };
        format!("{}{}{}", color, label, Colors::RESET)
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn local_time(value: Option<chrono::DateTime<chrono::Local>>) -> String {
    match value {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auction() -> AuctionSummary {
        AuctionSummary {
            id: 12,
            name: "Relogio de bolso".into(),
            description: "Relogio antigo em bom estado".into(),
            starting_bid: 150.0,
            status: AuctionStatus::InProgress,
            starts_at: 1700000000,
            ends_at: 1700000600,
        }
    }

    #[test]
    fn empty_list_renders_not_found_state() {
        let formatter = AuctionFormatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.render_auctions(&[]), "Nenhum leilão encontrado.\n");
    }

    #[test]
    fn table_contains_id_name_and_status() {
        let formatter = AuctionFormatter::new(OutputFormat::Table, false);
        let out = formatter.render_auctions(&[auction()]);
        assert!(out.contains("12"));
        assert!(out.contains("Relogio de bolso"));
        assert!(out.contains("em andamento"));
        assert!(out.contains("R$ 150.00"));
    }

    #[test]
    fn json_output_keeps_wire_names() {
        let formatter = AuctionFormatter::new(OutputFormat::Json, false);
        let out = formatter.render_auctions(&[auction()]);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["lei_id"], 12);
        assert_eq!(value[0]["lance_inic"], 150.0);
    }

    #[test]
    fn minimal_output_is_one_line_per_auction() {
        let formatter = AuctionFormatter::new(OutputFormat::Minimal, false);
        let out = formatter.render_auctions(&[auction(), auction()]);
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn money_uses_two_decimal_places() {
        assert_eq!(money(42.0), "R$ 42.00");
        assert_eq!(money(0.5), "R$ 0.50");
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate("abc", 5), "abc");
        let cut = truncate("abcdefghij", 5);
        assert!(cut.chars().count() <= 5);
        assert!(cut.ends_with('…'));
    }
}
