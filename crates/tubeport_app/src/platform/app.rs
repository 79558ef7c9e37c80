use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use engine_logging::{engine_debug, engine_info};
use tubeport_core::{update, AppState, Msg};
use tubeport_engine::EngineHandle;

use super::commands::{parse_command, resolve_job, Command, HELP};
use super::config::AppConfig;
use super::effects::EffectRunner;
use super::logging;
use super::ui::render;

pub fn run_app(config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    logging::initialize(config.log_destination, config.level_filter());
    engine_info!(
        "tubeport starting; backend={} output={:?}",
        config.backend_url,
        config.output_dir
    );

    let engine = EngineHandle::new(config.engine_config()).context("starting engine")?;
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(engine, msg_tx);
    let mut app = App::new(runner, io::stdout());

    let line_rx = spawn_stdin_reader();
    println!("tubeport - backend {}", config.backend_url);
    println!("{HELP}");
    app.print(&render::render(&app.state.view()))?;

    loop {
        match line_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(line) => {
                if app.handle_line(&line)? == Flow::Quit {
                    break;
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                engine_debug!("stdin closed");
                break;
            }
        }
        while let Ok(msg) = msg_rx.try_recv() {
            app.dispatch_msg(msg)?;
        }
    }

    engine_info!("tubeport exiting");
    Ok(())
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct App<W: Write> {
    state: AppState,
    runner: EffectRunner,
    out: W,
}

impl<W: Write> App<W> {
    fn new(runner: EffectRunner, out: W) -> Self {
        Self {
            state: AppState::new(),
            runner,
            out,
        }
    }

    fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let command = match parse_command(line) {
            None => return Ok(Flow::Continue),
            Some(Ok(command)) => command,
            Some(Err(err)) => {
                self.print(&err.to_string())?;
                return Ok(Flow::Continue);
            }
        };

        match command {
            Command::Dispatch(msg) => self.dispatch_msg(msg)?,
            Command::Delete(reference) => match resolve_job(&reference, &self.state.view()) {
                Ok(id) => self.dispatch_msg(Msg::DeleteClicked(id))?,
                Err(err) => self.print(&err.to_string())?,
            },
            Command::Fetch(reference) => match resolve_job(&reference, &self.state.view()) {
                Ok(id) => self.dispatch_msg(Msg::FetchResultClicked(id))?,
                Err(err) => self.print(&err.to_string())?,
            },
            Command::ShowJobs => self.print(&render::render_jobs(&self.state.view()))?,
            Command::Help => self.print(HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn dispatch_msg(&mut self, msg: Msg) -> Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let notifications = state.take_notifications();
        let view = state.consume_dirty().then(|| state.view());
        self.state = state;

        self.runner.enqueue(effects);
        for notification in &notifications {
            self.print(&render::render_notification(notification))?;
        }
        if let Some(view) = view {
            self.print(&render::render(&view))?;
        }
        Ok(())
    }

    fn print(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()?;
        Ok(())
    }
}
