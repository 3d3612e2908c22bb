//! Tests for collect, completions and man.

use super::parse;
use crate::cli::CliCommand;
use clap::Parser;
use clap_complete::Shell;
use std::path::Path;

#[test]
fn cli_parse_collect() {
    match parse(&[
        "tdl",
        "collect",
        "https://www.youtube.com/@20thcenturystudios",
        "https://www.youtube.com/@paramountpictures",
    ]) {
        CliCommand::Collect {
            channels,
            limit,
            out,
        } => {
            assert_eq!(channels.len(), 2);
            assert_eq!(limit, 10000);
            assert_eq!(out, Path::new("movie_trailers.csv"));
        }
        _ => panic!("expected Collect"),
    }
}

#[test]
fn cli_parse_collect_limit_and_out() {
    match parse(&["tdl", "collect", "c", "--limit", "25", "--out", "x.csv"]) {
        CliCommand::Collect { limit, out, .. } => {
            assert_eq!(limit, 25);
            assert_eq!(out, Path::new("x.csv"));
        }
        _ => panic!("expected Collect"),
    }
}

#[test]
fn cli_collect_requires_channel() {
    assert!(crate::cli::Cli::try_parse_from(["tdl", "collect"]).is_err());
}

#[test]
fn cli_parse_completions_and_man() {
    match parse(&["tdl", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, Shell::Bash),
        _ => panic!("expected Completions"),
    }
    assert!(matches!(parse(&["tdl", "man"]), CliCommand::Man));
}

#[test]
fn cli_definition_is_consistent() {
    use clap::CommandFactory;
    crate::cli::Cli::command().debug_assert();
}
