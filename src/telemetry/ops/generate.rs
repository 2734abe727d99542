use tracing::{info_span, Span};

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Generate;

#[derive(Copy, Clone, Debug)]
pub enum Phase {
    Source,
    Prompt,
    CallLlm,
    Template,
    Output,
}

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Source => "source",
            Phase::Prompt => "prompt",
            Phase::CallLlm => "call_llm",
            Phase::Template => "template",
            Phase::Output => "output",
        }
    }

    fn span(&self) -> Span {
        match self {
            Phase::Source => info_span!("source"),
            Phase::Prompt => info_span!("prompt"),
            Phase::CallLlm => info_span!("call_llm"),
            Phase::Template => info_span!("template"),
            Phase::Output => info_span!("output"),
        }
    }
}

impl OpMarker for Generate {
    const NAME: &'static str = "generate";
    type Phase = Phase;

    fn root_span() -> Span {
        info_span!("generate")
    }
}
