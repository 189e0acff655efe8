use std::{io, time::Duration};

use anyhow::{Context, Result};
use clap::{App, Arg, ArgMatches};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use powergrid::{
    api::{GameApi, HttpApi},
    game::{PollIntervals, Scheduler, Tick, TokioScheduler},
    view::GameView,
};

use crate::{
    commands::{Command, HELP},
    display::Screen,
};

mod commands;
mod display;

/// Settings read from the command line and environment.
struct ClientConfig {
    server: Url,
    game: String,
    player: String,
    token: Option<String>,
    intervals: PollIntervals,
}

impl ClientConfig {
    fn from_matches(matches: &ArgMatches) -> Result<Self> {
        // Required or defaulted, so always present.
        let value = |name: &str| matches.value_of(name).unwrap_or_default();
        let millis = |name: &str| -> Result<Duration> {
            let raw = value(name);
            let ms = raw
                .parse()
                .with_context(|| format!("--{} must be a number of milliseconds, got {:?}", name, raw))?;
            Ok(Duration::from_millis(ms))
        };
        Ok(Self {
            server: value("server")
                .parse()
                .with_context(|| format!("invalid server address {:?}", value("server")))?,
            game: value("game").to_owned(),
            player: value("player").to_owned(),
            token: matches.value_of("token").map(str::to_owned),
            intervals: PollIntervals {
                pending: millis("pending-poll-ms")?,
                active: millis("active-poll-ms")?,
            },
        })
    }
}

fn app() -> App<'static, 'static> {
    App::new("Power Grid")
        .version("1.0")
        .author("Zachary Stewart <zachary@zstewart.com>")
        .about("Command line client for the power-plant strike game.")
        .arg(
            Arg::with_name("server")
                .short("s")
                .long("server")
                .value_name("URL")
                .env("POWERGRID_SERVER")
                .default_value("http://localhost:8080")
                .help("address of the game server"),
        )
        .arg(
            Arg::with_name("game")
                .short("g")
                .long("game")
                .value_name("GAME_ID")
                .env("POWERGRID_GAME")
                .required(true)
                .help("id of the game to play"),
        )
        .arg(
            Arg::with_name("player")
                .short("p")
                .long("player")
                .value_name("NAME")
                .env("POWERGRID_PLAYER")
                .required(true)
                .help("your player name in the game"),
        )
        .arg(
            Arg::with_name("token")
                .short("t")
                .long("token")
                .value_name("TOKEN")
                .env("POWERGRID_TOKEN")
                .help("token the server issued when you joined the game"),
        )
        .arg(
            Arg::with_name("pending-poll-ms")
                .long("pending-poll-ms")
                .value_name("MS")
                .default_value("3000")
                .help("polling interval while the game is pending"),
        )
        .arg(
            Arg::with_name("active-poll-ms")
                .long("active-poll-ms")
                .value_name("MS")
                .default_value("1000")
                .help("polling interval once the game has started"),
        )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = ClientConfig::from_matches(&app().get_matches())?;
    info!(server = %config.server, game = %config.game, player = %config.player, "starting client");
    let api = HttpApi::new(config.server, config.game, config.player.clone(), config.token)
        .context("cannot use the server address")?;
    let (scheduler, mut ticks) = TokioScheduler::new();
    let mut view = GameView::new(api, config.player, config.intervals, scheduler);
    let mut screen = Screen::new();
    let mut rng = rand::thread_rng();

    println!("Type help or ? for commands.");
    view.start();
    view.refresh().await;
    screen.update(&mut view, true);
    prompt().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(Tick) = ticks.recv() => {
                view.refresh().await;
                screen.update(&mut view, false);
            }
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => break,
                };
                match commands::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => println!("{}", HELP),
                    Ok(command) => {
                        run(&mut view, command, &mut rng).await;
                        screen.update(&mut view, true);
                    }
                    Err(message) => println!("{}", message),
                }
                prompt().await?;
            }
        }
    }
    Ok(())
}

async fn prompt() -> io::Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"> ").await?;
    stdout.flush().await
}

/// Carry out one command against the view.
async fn run<A: GameApi, S: Scheduler>(
    view: &mut GameView<A, S>,
    command: Command,
    rng: &mut impl rand::Rng,
) {
    match command {
        Command::Select(plant) => view.select_plant(plant),
        Command::Orient(orientation) => view.set_orientation(orientation),
        Command::Place {
            at,
            plant,
            orientation,
        } => {
            if let Some(plant) = plant {
                view.select_plant(plant);
            }
            if let Some(orientation) = orientation {
                view.set_orientation(orientation);
            }
            view.place(&at);
        }
        Command::Random => view.place_random(rng),
        Command::Reset => view.reset_board(),
        Command::Ready => view.ready().await,
        Command::Strike { target, at } => view.strike(&target, &at).await,
        Command::Refresh => view.refresh().await,
        Command::Help | Command::Quit => {}
    }
}
