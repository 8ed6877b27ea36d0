use std::path::PathBuf;
use std::str::FromStr;

use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};
use target_lexicon::Triple;

/// Optimize a block of textual IR and allocate its registers.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Arguments {
    /// The host to allocate registers for. Defaults to the current machine.
    #[arg(short, long)]
    pub target: Option<String>,

    /// Use only this many general purpose registers.
    #[arg(long)]
    pub gprs: Option<usize>,

    /// Use only this many vector registers.
    #[arg(long)]
    pub fprs: Option<usize>,

    /// Fail instead of spilling when registers run out.
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_spills: bool,

    /// Enable a pass that is disabled by default.
    #[arg(long, value_name = "PASS")]
    pub enable_pass: Vec<String>,

    /// Disable a pass.
    #[arg(long, value_name = "PASS")]
    pub disable_pass: Vec<String>,

    /// Check the IR before allocating registers.
    #[arg(long, action = ArgAction::SetTrue)]
    pub validate: bool,

    /// Print the IR after every pass.
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_ir: bool,

    /// Log more. Can be repeated.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(required = true)]
    pub path: PathBuf,
}

impl Arguments {
    pub fn target(&self) -> Triple {
        let target = match self.target {
            Some(ref target) => Triple::from_str(target),
            None => Ok(Triple::host()),
        };

        match target {
            Err(error) => {
                let error = error.to_string();
                let mut cmd = Self::command();
                cmd.error(ErrorKind::InvalidValue, error).exit()
            }

            Ok(target) => target,
        }
    }

    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
