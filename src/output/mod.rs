pub mod config;
pub mod presenter;
pub mod types;

use std::io::{self, Write};

use config::{OutputConfig, OutputFormat};
use presenter::{JsonPresenter, Presenter, TextPresenter};
use types::Envelope;

pub struct Emitter {
    presenter: Box<dyn Presenter>,
}

impl Emitter {
    pub fn new(cfg: OutputConfig) -> Self {
        let presenter: Box<dyn Presenter> = match cfg.format {
            OutputFormat::Json => Box::new(JsonPresenter { pretty: cfg.pretty }),
            OutputFormat::Text => Box::new(TextPresenter { pretty: cfg.pretty }),
        };
        Emitter { presenter }
    }

    /// Emitter for the running process: environment plus the `--json` flag.
    pub fn current() -> Self {
        Self::new(OutputConfig::from_env().with_json_flag(crate::telemetry::config::json_mode()))
    }

    pub fn emit(&self, env: &Envelope) -> io::Result<()> {
        let mut out = io::stdout().lock();
        self.presenter.emit(env, &mut out)?;
        out.flush()
    }
}
