use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "jobmail",
    version,
    about = "Generate and send job application emails from a job description"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "default",
        help = "Profile name to use"
    )]
    pub profile: String,
    #[arg(long, global = true, help = "Emit JSON output")]
    pub json: bool,
    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Verbose logging")]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Auth(AuthArgs),
    Generate(GenerateArgs),
    Send(SendArgs),
    Revise(ReviseArgs),
}

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    Login,
    Status,
    Logout,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[arg(long, help = "Inline job description text")]
    pub jd: Option<String>,
    #[arg(long, help = "Read the job description from a file")]
    pub jd_file: Option<PathBuf>,
    #[arg(long, help = "Read the job description from stdin")]
    pub stdin: bool,
    #[arg(long, help = "Resume PDF to mine for text and links")]
    pub resume: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SendArgs {
    #[arg(long, help = "Inline job description text")]
    pub jd: Option<String>,
    #[arg(long, help = "Read the job description from a file")]
    pub jd_file: Option<PathBuf>,
    #[arg(long, help = "Read the job description from stdin")]
    pub stdin: bool,
    #[arg(long, help = "Resume PDF to mine for text and links, attached to the email")]
    pub resume: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ReviseArgs {
    #[arg(long, help = "Inline body text to revise")]
    pub body: Option<String>,
    #[arg(long, help = "Read the body from a file")]
    pub body_file: Option<PathBuf>,
    #[arg(long, help = "Revision instruction")]
    pub instruction: Option<String>,
    #[arg(long, help = "Resume PDF used as context for the revision")]
    pub resume: Option<PathBuf>,
}
