use tracing::{info_span, Span};

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Image;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Load, Transform, Output }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Load => "load",
        Phase::Transform => "transform",
        Phase::Output => "output",
    }}
    fn span(&self) -> Span { match self {
        Phase::Load => info_span!("load"),
        Phase::Transform => info_span!("transform"),
        Phase::Output => info_span!("output"),
    }}
}

impl OpMarker for Image {
    const NAME: &'static str = "image";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("image") }
}
