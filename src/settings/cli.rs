use super::Parser;

#[derive(Parser, Debug)]
#[command(about = "Portfolio content API")]
pub struct Cli {
    /// Path to a TOML settings file.
    #[arg(long)]
    pub settings: Option<String>,
}
