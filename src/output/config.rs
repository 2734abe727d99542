use std::env;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl OutputConfig {
    pub fn from_env() -> Self {
        let format = match env::var("LISTING_OUTPUT_FORMAT").ok().as_deref() {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        };
        let pretty = env::var("LISTING_OUTPUT_PRETTY").ok().as_deref().map(is_truthy).unwrap_or(false);
        OutputConfig { format, pretty }
    }

    /// `--json` wins over the environment.
    pub fn with_json_flag(mut self, json: bool) -> Self {
        if json { self.format = OutputFormat::Json; }
        self
    }
}

fn is_truthy(v: &str) -> bool {
    v.eq_ignore_ascii_case("1") || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
}
