use clap::Parser;
use jobmail::cli::{AuthCommand, Cli, Command};

#[test]
fn parses_auth_login() {
    let cli = Cli::try_parse_from(["jobmail", "auth", "login"]).expect("cli parse should work");
    match cli.command {
        Command::Auth(auth) => assert!(matches!(auth.command, AuthCommand::Login)),
        _ => panic!("expected auth command"),
    }
}

#[test]
fn parses_generate() {
    let cli = Cli::try_parse_from([
        "jobmail",
        "generate",
        "--jd",
        "Rust engineer at Acme",
        "--resume",
        "resume.pdf",
    ])
    .expect("cli parse should work");
    match cli.command {
        Command::Generate(generate) => {
            assert_eq!(generate.jd.as_deref(), Some("Rust engineer at Acme"));
            assert_eq!(
                generate.resume.as_deref().map(|path| path.to_str()),
                Some(Some("resume.pdf"))
            );
            assert!(!generate.stdin);
        }
        _ => panic!("expected generate command"),
    }
}

#[test]
fn parses_send_with_stdin_jd() {
    let cli = Cli::try_parse_from(["jobmail", "send", "--stdin", "--resume", "resume.pdf"])
        .expect("cli parse should work");
    match cli.command {
        Command::Send(send) => {
            assert!(send.stdin);
            assert!(send.jd.is_none());
        }
        _ => panic!("expected send command"),
    }
}

#[test]
fn parses_revise_with_instruction() {
    let cli = Cli::try_parse_from([
        "jobmail",
        "revise",
        "--body",
        "original text",
        "--instruction",
        "make it warmer",
    ])
    .expect("cli parse should work");
    match cli.command {
        Command::Revise(revise) => {
            assert_eq!(revise.body.as_deref(), Some("original text"));
            assert_eq!(revise.instruction.as_deref(), Some("make it warmer"));
        }
        _ => panic!("expected revise command"),
    }
}

#[test]
fn global_flags_apply_to_subcommands() {
    let cli = Cli::try_parse_from([
        "jobmail", "--profile", "work", "--json", "auth", "status",
    ])
    .expect("cli parse should work");
    assert_eq!(cli.profile, "work");
    assert!(cli.json);
}
