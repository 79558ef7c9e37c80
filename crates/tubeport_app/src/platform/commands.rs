use thiserror::Error;
use tubeport_core::{AppViewModel, JobId, Msg, OutputFormat, Quality};

pub const HELP: &str = "\
commands:
  analyze <url>        load video or playlist info
  format <mp4|webm|mp3>
  quality <360p|480p|720p|1080p>
  start                start a job for the loaded subject
  refresh              refresh the job list now
  jobs                 show the job list
  delete <row|#id>     delete a job (bare numbers are rows)
  fetch <row|#id>      save a completed job's file
  online | offline     report connectivity
  help
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobRef {
    /// 1-based row in the last rendered job list.
    Row(usize),
    Id(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Msg),
    Delete(JobRef),
    Fetch(JobRef),
    ShowJobs,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}', type 'help'")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("unsupported format '{0}'")]
    BadFormat(String),
    #[error("unsupported quality '{0}'")]
    BadQuality(String),
    #[error("no job at row {0}")]
    NoSuchRow(usize),
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Option<Result<Command, CommandError>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        // Blank URLs go through so the "Please enter a URL" notice shows.
        "analyze" | "a" => Ok(Command::Dispatch(Msg::UrlSubmitted(rest.to_string()))),
        "format" => required(rest, "format").and_then(|value| {
            OutputFormat::parse(value)
                .map(|format| Command::Dispatch(Msg::FormatSelected(format)))
                .ok_or_else(|| CommandError::BadFormat(value.to_string()))
        }),
        "quality" => required(rest, "quality").and_then(|value| {
            Quality::parse(value)
                .map(|quality| Command::Dispatch(Msg::QualitySelected(quality)))
                .ok_or_else(|| CommandError::BadQuality(value.to_string()))
        }),
        "start" => Ok(Command::Dispatch(Msg::StartClicked)),
        "refresh" | "r" => Ok(Command::Dispatch(Msg::RefreshClicked)),
        "jobs" | "ls" => Ok(Command::ShowJobs),
        "delete" | "rm" => job_ref(rest, "delete").map(Command::Delete),
        "fetch" | "save" => job_ref(rest, "fetch").map(Command::Fetch),
        "online" => Ok(Command::Dispatch(Msg::ConnectivityChanged { online: true })),
        "offline" => Ok(Command::Dispatch(Msg::ConnectivityChanged { online: false })),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        _ => Err(CommandError::Unknown(word.to_string())),
    };
    Some(command)
}

/// Resolves a row number or raw id against the rows the user last saw.
pub fn resolve_job(reference: &JobRef, view: &AppViewModel) -> Result<JobId, CommandError> {
    match reference {
        JobRef::Row(row) => view
            .jobs
            .get(row.wrapping_sub(1))
            .map(|job| job.job_id.clone())
            .ok_or(CommandError::NoSuchRow(*row)),
        JobRef::Id(id) => Ok(JobId::new(id.as_str())),
    }
}

fn required<'a>(value: &'a str, command: &'static str) -> Result<&'a str, CommandError> {
    if value.is_empty() {
        Err(CommandError::MissingArgument(command))
    } else {
        Ok(value)
    }
}

/// `#<id>` always names an id, so all-digit ids stay reachable.
fn job_ref(value: &str, command: &'static str) -> Result<JobRef, CommandError> {
    let value = required(value, command)?;
    if let Some(id) = value.strip_prefix('#') {
        return required(id.trim(), command).map(|id| JobRef::Id(id.to_string()));
    }
    Ok(match value.parse::<usize>() {
        Ok(row) => JobRef::Row(row),
        Err(_) => JobRef::Id(value.to_string()),
    })
}
