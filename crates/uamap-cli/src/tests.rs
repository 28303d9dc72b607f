use std::path::PathBuf;

use super::*;
use crate::shell::{parse_command, ShellCommand};

#[test]
fn no_command_defaults_to_shell() {
    let cli = Cli::try_parse_from(["uamap"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_shell_command() {
    let cli = Cli::try_parse_from(["uamap", "shell"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Shell)));
}

#[test]
fn parses_process_with_outputs() {
    let cli = Cli::try_parse_from([
        "uamap",
        "process",
        "clients.xlsx",
        "--map-out",
        "out/map.html",
        "--missing-out",
        "out/missing.txt",
    ])
    .unwrap();
    match cli.command {
        Some(Commands::Process {
            input,
            map_out,
            missing_out,
        }) => {
            assert_eq!(input, PathBuf::from("clients.xlsx"));
            assert_eq!(map_out, Some(PathBuf::from("out/map.html")));
            assert_eq!(missing_out, Some(PathBuf::from("out/missing.txt")));
        }
        other => panic!("expected Process, got {other:?}"),
    }
}

#[test]
fn missing_out_requires_map_out() {
    let result = Cli::try_parse_from([
        "uamap",
        "process",
        "clients.xlsx",
        "--missing-out",
        "missing.txt",
    ]);
    assert!(result.is_err());
}

#[test]
fn parses_geocode_command() {
    let cli = Cli::try_parse_from(["uamap", "geocode", "Київ", "Київська"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Geocode { ref city, ref region }) if city == "Київ" && region == "Київська"
    ));
}

#[test]
fn shell_upload_keeps_spaces_in_path() {
    assert_eq!(
        parse_command("upload  /tmp/my clients.xlsx ").unwrap(),
        Some(ShellCommand::Upload(PathBuf::from("/tmp/my clients.xlsx")))
    );
}

#[test]
fn shell_upload_requires_path() {
    assert!(parse_command("upload").is_err());
}

#[test]
fn shell_save_with_and_without_missing_destination() {
    assert_eq!(
        parse_command("save map.html").unwrap(),
        Some(ShellCommand::Save {
            map: PathBuf::from("map.html"),
            missing: None
        })
    );
    assert_eq!(
        parse_command("SAVE map.html missing.txt").unwrap(),
        Some(ShellCommand::Save {
            map: PathBuf::from("map.html"),
            missing: Some(PathBuf::from("missing.txt"))
        })
    );
    assert!(parse_command("save a b c").is_err());
    assert!(parse_command("save").is_err());
}

#[test]
fn shell_short_aliases() {
    assert_eq!(parse_command("p").unwrap(), Some(ShellCommand::Process));
    assert_eq!(parse_command("s").unwrap(), Some(ShellCommand::Status));
    assert_eq!(parse_command("q").unwrap(), Some(ShellCommand::Quit));
    assert_eq!(parse_command("?").unwrap(), Some(ShellCommand::Help));
}

#[test]
fn shell_blank_line_is_ignored() {
    assert_eq!(parse_command("   ").unwrap(), None);
}

#[test]
fn shell_unknown_command_is_reported() {
    let err = parse_command("frobnicate now").unwrap_err();
    assert!(err.contains("frobnicate"));
}
