//! RaktBank Console
//!
//! Drives one client session from a line-oriented command stream (stdin or
//! a script file). Every line is one user action. Saves and predictions run
//! in the background; a prediction's result is printed when it arrives.
//! At end of input outstanding work is drained; `quit` skips pending
//! predictions.
//!
//! Usage:
//!   raktbank [--api-url <url>] [--script <file>]
//!
//! Commands:
//!   donor <name> <blood-group> [--email <email>] [--phone <phone>]
//!   appointment <donor-name> <YYYY-MM-DD> [--time <HH:MM>]
//!   predict [--age <n>] [--fever] [--cough] [--fatigue]
//!   inventory [--refresh]
//!   donors | appointments | result | quit

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use raktbank_client::config::parse_api_url;
use raktbank_client::{
    view, AppointmentDraft, ClientConfig, DonorDraft, PersistTask, PredictionReply,
    PredictionRequest, Session,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "raktbank")]
#[command(version = "0.1.0")]
#[command(about = "Blood bank front-desk session: donors, appointments, inventory, prediction", long_about = None)]
struct Cli {
    /// Collaborator base URL (overrides RAKTBANK_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Read commands from a file instead of stdin
    #[arg(short, long)]
    script: Option<PathBuf>,
}

/// One session command line
#[derive(Parser)]
#[command(no_binary_name = true)]
struct CommandLine {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Register a donor
    Donor {
        name: String,
        blood_group: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
    },

    /// Schedule a donation appointment
    Appointment {
        donor_name: String,
        /// YYYY-MM-DD
        date: String,
        /// HH:MM
        #[arg(long, default_value = "")]
        time: String,
    },

    /// Submit symptoms to the prediction service
    Predict {
        #[arg(long, default_value = "")]
        age: String,
        #[arg(long)]
        fever: bool,
        #[arg(long)]
        cough: bool,
        #[arg(long)]
        fatigue: bool,
    },

    /// Show inventory, optionally refreshing it first
    Inventory {
        #[arg(long)]
        refresh: bool,
    },

    /// List recent donors
    Donors,

    /// List appointments
    Appointments,

    /// Show the latest prediction result
    #[command(name = "result")]
    Outcome,

    /// End the session
    #[command(alias = "exit")]
    Quit,
}

enum Flow {
    Continue,
    Quit,
}

/// Session plus the background work it has started
struct Console {
    session: Session,
    saves: Vec<PersistTask>,
    replies: mpsc::UnboundedSender<PredictionReply>,
    predictions_in_flight: usize,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config.api_url = parse_api_url(url)?;
    }
    let session = Session::from_config(&config)?;
    info!(api_url = %config.api_url, "session started");

    let input: Box<dyn AsyncBufRead + Unpin> = match &cli.script {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening script {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let (replies, mut reply_rx) = mpsc::unbounded_channel();
    let mut console = Console {
        session,
        saves: Vec::new(),
        replies,
        predictions_in_flight: 0,
    };

    // Prediction answers are applied as they arrive; input keeps flowing
    let mut lines = input.lines();
    let input_ended = loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break true };
                if let Flow::Quit = console.handle_line(&line).await? {
                    break false;
                }
            }
            Some(reply) = reply_rx.recv() => console.settle(reply),
        }
    };

    if input_ended {
        while console.predictions_in_flight > 0 {
            match reply_rx.recv().await {
                Some(reply) => console.settle(reply),
                None => break,
            }
        }
    }
    console.drain_saves().await;
    Ok(())
}

impl Console {
    async fn handle_line(&mut self, line: &str) -> anyhow::Result<Flow> {
        let tokens = match split_line(line) {
            Ok(tokens) => tokens,
            Err(e) => {
                eprintln!("error: {e}");
                return Ok(Flow::Continue);
            }
        };
        if tokens.is_empty() || tokens[0].starts_with('#') {
            return Ok(Flow::Continue);
        }

        let command = match CommandLine::try_parse_from(&tokens) {
            Ok(command) => command,
            Err(e) => {
                e.print()?;
                return Ok(Flow::Continue);
            }
        };

        let flow = self.dispatch(command.action).await;
        self.saves.retain(|task| !task.is_finished());
        Ok(flow)
    }

    async fn dispatch(&mut self, action: Action) -> Flow {
        let session = &mut self.session;
        match action {
            Action::Donor {
                name,
                blood_group,
                email,
                phone,
            } => {
                let draft = DonorDraft::new(name, blood_group)
                    .with_email(email)
                    .with_phone(phone);
                match session.register_donor(draft) {
                    Ok(task) => {
                        self.saves.push(task);
                        if let Some(donor) = session.store().latest_donor() {
                            println!("registered {}", view::donor_line(donor));
                        }
                    }
                    Err(e) => println!("error: {e}"),
                }
            }
            Action::Appointment {
                donor_name,
                date,
                time,
            } => match session.schedule_appointment(AppointmentDraft::new(donor_name, date).at(time)) {
                Ok(task) => {
                    self.saves.push(task);
                    if let Some(appointment) = session.store().latest_appointment() {
                        println!("scheduled {}", view::appointment_line(appointment));
                    }
                }
                Err(e) => println!("error: {e}"),
            },
            Action::Predict {
                age,
                fever,
                cough,
                fatigue,
            } => match PredictionRequest::new(age, fever, cough, fatigue) {
                Ok(request) => {
                    let call = session.start_prediction(request);
                    let replies = self.replies.clone();
                    self.predictions_in_flight += 1;
                    tokio::spawn(async move {
                        // The receiver only goes away when the console exits
                        let _ = replies.send(call.send().await);
                    });
                    print_lines(&view::prediction_lines(session.prediction().state()));
                }
                Err(e) => println!("error: {e}"),
            },
            Action::Inventory { refresh } => {
                if refresh {
                    if let Err(e) = session.refresh_inventory().await {
                        println!("inventory refresh failed: {e}");
                    }
                }
                print_lines(&view::inventory_lines(session.store().inventory()));
            }
            Action::Donors => print_lines(&view::donor_lines(session.store())),
            Action::Appointments => print_lines(&view::appointment_lines(session.store())),
            Action::Outcome => print_lines(&view::prediction_lines(session.prediction().state())),
            Action::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Apply a prediction answer; stale answers print nothing.
    fn settle(&mut self, reply: PredictionReply) {
        self.predictions_in_flight = self.predictions_in_flight.saturating_sub(1);
        if self.session.finish_prediction(reply) {
            print_lines(&view::prediction_lines(self.session.prediction().state()));
        }
    }

    async fn drain_saves(self) {
        if !self.saves.is_empty() {
            info!(outstanding = self.saves.len(), "waiting for background saves");
        }
        for task in self.saves {
            task.finished().await;
        }
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("RAKTBANK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Whitespace-separated tokens; double quotes group words.
fn split_line(line: &str) -> anyhow::Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut in_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_quotes {
        bail!("unterminated quote");
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_line_quotes() {
        assert_eq!(
            split_line(r#"donor "Asha Rao" O+ --email asha@example.org"#).unwrap(),
            vec!["donor", "Asha Rao", "O+", "--email", "asha@example.org"]
        );
        assert_eq!(split_line(r#"donor "" O+"#).unwrap(), vec!["donor", "", "O+"]);
        assert!(split_line("   ").unwrap().is_empty());
        assert!(split_line(r#"donor "Asha"#).is_err());
    }

    #[test]
    fn test_command_line_parses() {
        let command = CommandLine::try_parse_from(["predict", "--age", "30", "--fever"]).unwrap();
        assert!(matches!(
            command.action,
            Action::Predict { ref age, fever: true, cough: false, fatigue: false } if age == "30"
        ));

        let command = CommandLine::try_parse_from(["appointment", "Ravi", "2026-05-03"]).unwrap();
        assert!(matches!(command.action, Action::Appointment { ref time, .. } if time.is_empty()));

        assert!(CommandLine::try_parse_from(["donor", "Asha"]).is_err());
    }

    fn offline_console() -> (Console, mpsc::UnboundedReceiver<PredictionReply>) {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let config = ClientConfig::new(parse_api_url(&url).unwrap());
        let (replies, reply_rx) = mpsc::unbounded_channel();
        let console = Console {
            session: Session::from_config(&config).unwrap(),
            saves: Vec::new(),
            replies,
            predictions_in_flight: 0,
        };
        (console, reply_rx)
    }

    #[tokio::test]
    async fn test_predict_does_not_hold_the_console() {
        let (mut console, mut reply_rx) = offline_console();

        console.handle_line("predict --age 30 --fever").await.unwrap();
        assert_eq!(console.predictions_in_flight, 1);
        assert!(console.session.prediction().state().is_pending());

        console.handle_line(r#"donor "Asha Rao" O+"#).await.unwrap();
        assert_eq!(console.session.store().donors().len(), 1);
        assert!(console.session.prediction().state().is_pending());

        let reply = reply_rx.recv().await.unwrap();
        console.settle(reply);
        assert_eq!(console.predictions_in_flight, 0);
        assert_eq!(
            console.session.prediction().outcome().and_then(|o| o.error()),
            Some(raktbank_client::PREDICTION_FAILED)
        );
    }
}
