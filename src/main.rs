use clap::{Parser, Subcommand};
use colored::Colorize;
use dlwatch::actions::ActionDispatcher;
use dlwatch::notify::{NoticeKind, NotificationQueue};
use dlwatch::poller::{DEFAULT_INTERVAL_MS, Dashboard, Poller};
use dlwatch::series::{DEFAULT_WINDOW, RiskSeries};
use dlwatch::{StatusClient, StatusSource, render, term};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(about = "Terminal client for the deadlockd monitoring service")]
struct Args {
    /// Base URL of the deadlockd service
    #[clap(long, default_value = "http://127.0.0.1:8002/api")]
    url: String,

    /// Poll interval in milliseconds
    #[clap(long, default_value_t = DEFAULT_INTERVAL_MS)]
    interval_ms: u64,

    /// Chart window in points
    #[clap(long, default_value_t = DEFAULT_WINDOW)]
    window: usize,

    /// Disable colorized output
    #[clap(long)]
    no_color: bool,

    /// Fetch and render a single snapshot, then exit
    #[clap(long)]
    once: bool,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Kill a process by PID
    Kill { pid: u32 },
    /// Restart a process by PID
    Restart { pid: u32 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let color = !args.no_color;

    let client = StatusClient::new(&args.url)?;
    let notices = Arc::new(NotificationQueue::default());

    if let Some(command) = &args.command {
        let dispatcher = ActionDispatcher::new(client, Arc::clone(&notices));
        match command {
            Command::Kill { pid } => dispatcher.kill(*pid).await,
            Command::Restart { pid } => dispatcher.restart(*pid).await,
        }
        for notice in notices.active() {
            print_notice(&notice.message, notice.kind, color);
        }
        return Ok(());
    }

    if args.once {
        let snapshot = client.fetch_status().await?;
        let (surface, chart) = term::screen(color, false);
        let mut dashboard = Dashboard::new(
            Box::new(surface),
            RiskSeries::new(args.window, Box::new(chart)),
        );
        render::apply(&snapshot, dashboard.surface.as_mut(), &mut dashboard.series);
        dashboard.surface.refresh();
        return Ok(());
    }

    watch(args, client, notices, color).await
}

/// Watch mode: run the poll chain until Ctrl-C. On Unix, SIGUSR1 pauses and
/// SIGUSR2 resumes; both lean on `start()` being idempotent, so a resume
/// racing startup cannot create a second chain.
async fn watch(
    args: Args,
    client: StatusClient,
    notices: Arc<NotificationQueue>,
    color: bool,
) -> anyhow::Result<()> {
    let (surface, chart) = term::screen(color, true);
    let dashboard = Arc::new(Mutex::new(Dashboard::new(
        Box::new(surface),
        RiskSeries::new(args.window, Box::new(chart)),
    )));
    let mut poller = Poller::new(
        Arc::new(client),
        dashboard,
        notices,
        Duration::from_millis(args.interval_ms),
    );
    poller.start();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut pause = signal(SignalKind::user_defined1())?;
        let mut resume = signal(SignalKind::user_defined2())?;
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                _ = pause.recv() => poller.stop(),
                _ = resume.recv() => poller.start(),
            }
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
    }

    poller.stop();
    Ok(())
}

fn print_notice(message: &str, kind: NoticeKind, color: bool) {
    let line = match kind {
        NoticeKind::Info => format!("* {message}"),
        NoticeKind::Error => format!("! {message}"),
    };
    if !color {
        println!("{line}");
    } else if kind == NoticeKind::Error {
        println!("{}", line.red());
    } else {
        println!("{}", line.cyan());
    }
}
