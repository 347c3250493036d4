//! Interactive terminal interview (`surge-sim play`).
//!
//! Plain lines are questions for the current persona; lines starting with
//! `/` are commands. The session runs on the same engine as the HTTP API.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::dialogue::{DialogueEngine, AUTO};
use crate::error::Result;
use crate::persona::PersonaId;
use crate::session::{Bucket, Notes, SessionId};

const HELP: &str = "\
Commands:
  /persona <finance|clinical|operations|auto>  Choose who answers
  /pin <bucket>                                Pin the last answer
  /notes                                       Show pinned notes
  /time                                        Show time left
  /help                                        Show this help
  /quit                                        End the interview";

/// One terminal interview bound to a single session.
pub struct Repl {
    engine: DialogueEngine,
    session_id: SessionId,
    persona: String,
}

impl Repl {
    /// Open a new session with `seed`, addressing `persona` (or `auto`) first.
    pub fn start(engine: DialogueEngine, seed: i64, persona: &str) -> Result<Self> {
        let persona = resolve_persona_arg(persona)?;
        let session_id = engine.sessions().create(seed);
        Ok(Self {
            engine,
            session_id,
            persona,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Read lines from `input` until EOF or `/quit`.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        let time_left = self.engine.sessions().time_left(&self.session_id)?;
        writeln!(out, "Surge staffing interview. Session {}", self.session_id)?;
        writeln!(
            out,
            "You have {} to interview the stakeholders. Type /help for commands.",
            format_clock(time_left)
        )?;
        writeln!(out, "Talking to: {}", self.persona)?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(command) = line.strip_prefix('/') {
                if !self.command(command, out)? {
                    break;
                }
            } else {
                self.ask(line, out)?;
            }
        }

        writeln!(out, "Interview over.")?;
        let notes = self.engine.sessions().notes(&self.session_id)?;
        write_notes(out, &notes)?;
        Ok(())
    }

    fn ask<W: Write>(&mut self, message: &str, out: &mut W) -> Result<()> {
        match self.engine.chat(&self.session_id, &self.persona, message) {
            Ok(outcome) => {
                writeln!(out, "[{}] {}", outcome.persona.display_name(), outcome.reply)?;
                let cited: Vec<&str> = outcome
                    .citations
                    .iter()
                    .map(String::as_str)
                    .filter(|c| !c.is_empty())
                    .collect();
                if !cited.is_empty() {
                    writeln!(out, "  sources: {}", cited.join(", "))?;
                }
                writeln!(
                    out,
                    "  patience {} | {} left",
                    outcome.patience_left,
                    format_clock(outcome.time_left_s)
                )?;
                if outcome.time_left_s == 0 {
                    writeln!(out, "  Time is up. Pin what you need and /quit.")?;
                }
            }
            Err(e) => writeln!(out, "{}", e.format_for_log())?,
        }
        Ok(())
    }

    /// Handle a slash command. Returns false when the interview should end.
    fn command<W: Write>(&mut self, command: &str, out: &mut W) -> Result<bool> {
        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default().to_lowercase();
        let arg = parts.next();
        debug!(command = %name, "REPL command");

        match (name.as_str(), arg) {
            ("quit" | "exit" | "q", _) => return Ok(false),
            ("help" | "h", _) => writeln!(out, "{}", HELP)?,
            ("persona" | "p", Some(p)) => match resolve_persona_arg(p) {
                Ok(p) => {
                    writeln!(out, "Talking to: {}", p)?;
                    self.persona = p;
                }
                Err(e) => writeln!(out, "{}", e.format_for_log())?,
            },
            ("persona" | "p", None) => writeln!(out, "Talking to: {}", self.persona)?,
            ("pin", Some(bucket)) => {
                match self.engine.sessions().pin_last_reply(&self.session_id, bucket) {
                    Ok(notes) => {
                        let count = bucket
                            .parse::<Bucket>()
                            .ok()
                            .and_then(|b| notes.get(&b))
                            .map_or(0, Vec::len);
                        writeln!(out, "Pinned to {} ({} notes)", bucket.to_lowercase(), count)?;
                    }
                    Err(e) => writeln!(out, "{}", e.format_for_log())?,
                }
            }
            ("pin", None) => writeln!(out, "Usage: /pin <{}>", Bucket::valid_names())?,
            ("notes" | "n", _) => {
                let notes = self.engine.sessions().notes(&self.session_id)?;
                write_notes(out, &notes)?;
            }
            ("time" | "t", _) => {
                let left = self.engine.sessions().time_left(&self.session_id)?;
                writeln!(out, "{} left", format_clock(left))?;
            }
            _ => writeln!(out, "Unknown command '/{}'. Type /help.", name)?,
        }
        Ok(true)
    }
}

/// Normalize a persona argument to `auto` or a canonical slug.
fn resolve_persona_arg(arg: &str) -> Result<String> {
    if arg.trim().eq_ignore_ascii_case(AUTO) {
        return Ok(AUTO.to_string());
    }
    arg.parse::<PersonaId>()
        .map(|id| id.slug().to_string())
        .map_err(|_| crate::error::Error::persona_not_found(arg))
}

fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn write_notes<W: Write>(out: &mut W, notes: &Notes) -> Result<()> {
    if notes.values().all(Vec::is_empty) {
        writeln!(out, "No notes pinned.")?;
        return Ok(());
    }
    for (bucket, pinned) in notes.iter().filter(|(_, n)| !n.is_empty()) {
        writeln!(out, "{}:", bucket)?;
        for note in pinned {
            let cited: Vec<&str> = note
                .citations
                .iter()
                .map(String::as_str)
                .filter(|c| !c.is_empty())
                .collect();
            if cited.is_empty() {
                writeln!(out, "  - {}", note.text)?;
            } else {
                writeln!(out, "  - {} [{}]", note.text, cited.join(", "))?;
            }
        }
    }
    Ok(())
}
