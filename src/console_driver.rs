use std::io::{self, Write};

use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use codespan_reporting::term::{self, Config, DisplayStyle};
use console::style;
use log::warn;

use xlat::message::Messages;
use xlat_common::{Driver, IrOutput};

pub struct ConsoleDriver {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: Config,
    dump_ir: bool,
}

impl ConsoleDriver {
    pub fn new(files: SimpleFiles<String, String>, dump_ir: bool) -> Self {
        Self {
            files,
            writer: StandardStream::stderr(ColorChoice::Auto),
            config: Config {
                display_style: DisplayStyle::Rich,
                ..Default::default()
            },
            dump_ir,
        }
    }

    pub fn report(&mut self, messages: Messages) -> anyhow::Result<()> {
        for msg in messages.msgs {
            term::emit(&mut self.writer, &self.config, &self.files, &msg)?;
        }

        Ok(())
    }
}

impl Driver for ConsoleDriver {
    fn output_ir(&mut self, at: IrOutput, data: impl FnOnce() -> String) {
        if !self.dump_ir {
            return;
        }

        let header = match at {
            IrOutput::Pass(name) => format!("after {name}"),
            IrOutput::Allocation => String::from("after register allocation"),
        };

        if let Err(err) = write_ir(&mut io::stdout().lock(), &header, &data()) {
            warn!("could not write the IR {header}: {err}");
        }
    }
}

fn write_ir(out: &mut impl Write, header: &str, ir: &str) -> io::Result<()> {
    writeln!(out, "{}", style(format!("; {header}")).dim())?;
    writeln!(out, "{ir}")?;
    writeln!(out)
}
