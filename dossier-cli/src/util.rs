use owo_colors::{OwoColorize, Stream};
use std::fmt::Display;

#[inline]
pub fn error_kaomoji() -> impl Display {
    "(┬┬﹏┬┬)".if_supports_color(Stream::Stdout, |text| text.red())
}

#[inline]
pub fn success_kaomoji() -> impl Display {
    "(^///^)".if_supports_color(Stream::Stdout, |text| text.green())
}

pub fn header_name(name: &str) -> String {
    name.if_supports_color(Stream::Stdout, |text| text.cyan()).to_string()
}

/// Carry an `eyre` report over into `miette`, keeping the cause chain in the message
pub fn from_eyre(report: eyre::Report) -> miette::Report {
    miette::miette!("{report:#}")
}
