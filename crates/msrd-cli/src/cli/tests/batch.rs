//! Tests for download and convert subcommands.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[test]
fn cli_parse_download_ids() {
    match parse(&["msrd", "download", "514", "880"]) {
        CliCommand::Download { batch } => {
            assert_eq!(batch.ids, ["514", "880"]);
            assert!(!batch.all);
            assert!(!batch.force);
            assert!(batch.threads.is_none());
            assert!(!batch.mp3 && !batch.m4a);
        }
        _ => panic!("expected Download"),
    }
}

#[test]
fn cli_parse_download_short_flags() {
    match parse(&["msrd", "download", "-a", "-f", "-t", "4"]) {
        CliCommand::Download { batch } => {
            assert!(batch.ids.is_empty());
            assert!(batch.all);
            assert!(batch.force);
            assert_eq!(batch.threads, Some(4));
        }
        _ => panic!("expected Download with short flags"),
    }
}

#[test]
fn cli_parse_download_long_flags() {
    match parse(&["msrd", "download", "--all", "--force", "--threads", "2", "--mp3"]) {
        CliCommand::Download { batch } => {
            assert!(batch.all && batch.force && batch.mp3);
            assert!(!batch.m4a);
            assert_eq!(batch.threads, Some(2));
        }
        _ => panic!("expected Download with long flags"),
    }
}

#[test]
fn cli_accepts_both_codec_flags_for_core_to_reject() {
    // The conflict is reported by the codec selector, not by clap.
    match parse(&["msrd", "download", "-a", "--mp3", "--m4a"]) {
        CliCommand::Download { batch } => {
            assert!(batch.mp3 && batch.m4a);
            let (args, _) = batch.into_args(false);
            assert!(msrd_core::codec::select_codec(args.mp3, args.m4a).is_err());
        }
        _ => panic!("expected Download"),
    }
}

#[test]
fn cli_parse_convert_download_fallback() {
    match parse(&["msrd", "convert", "-a", "-d", "--m4a"]) {
        CliCommand::Convert { batch, download } => {
            assert!(batch.all && batch.m4a);
            assert!(download);
            let (args, threads) = batch.into_args(download);
            assert!(args.allow_download_fallback);
            assert!(threads.is_none());
        }
        _ => panic!("expected Convert with --download"),
    }
}

#[test]
fn cli_parse_convert_defaults() {
    match parse(&["msrd", "convert", "880"]) {
        CliCommand::Convert { batch, download } => {
            assert_eq!(batch.ids, ["880"]);
            assert!(!download);
        }
        _ => panic!("expected Convert"),
    }
}

#[test]
fn cli_download_has_no_download_flag() {
    assert!(Cli::try_parse_from(["msrd", "download", "-a", "-d"]).is_err());
}

#[test]
fn cli_bare_batch_command_shows_help() {
    assert!(Cli::try_parse_from(["msrd", "download"]).is_err());
    assert!(Cli::try_parse_from(["msrd", "convert"]).is_err());
}

#[test]
fn cli_rejects_non_numeric_threads() {
    assert!(Cli::try_parse_from(["msrd", "download", "-a", "-t", "many"]).is_err());
}
