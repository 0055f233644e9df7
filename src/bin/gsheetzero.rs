//! gsheetzero CLI
//!
//! 読み込み・追記・クリアをコマンドラインから実行する薄いホスト。
//! 結果は1行ずつ標準出力に、ログは標準エラー出力に出力します。

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use gsheetzero::{SheetsClientBuilder, TokenFile};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gsheetzero", version, about = "Read, append to, or clear Google Sheets ranges")]
struct Cli {
    /// Token file: {"access_token": "...", "expiry": "<RFC 3339>"}
    #[arg(long, env = "GSHEETZERO_TOKEN_FILE")]
    token_file: PathBuf,

    /// Target spreadsheet id
    #[arg(long)]
    spreadsheet_id: String,

    /// API base URL
    #[arg(long, default_value = "https://sheets.googleapis.com/")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read a range such as Sheet1!A1:B10
    Read { range: String },

    /// Write each payload to the next empty row of Sheet!Column, or to Sheet!Cell
    Write {
        range: String,
        #[arg(required = true)]
        payloads: Vec<String>,
    },

    /// Clear Sheet!Range (extends to row 1000 when no ':' is given)
    Clear { range: String },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut client = match SheetsClientBuilder::new()
        .with_credentials(TokenFile::new(&cli.token_file))
        .with_base_url(cli.base_url.clone())
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let lines = match &cli.command {
        Command::Read { range } => client.read_sheet(&cli.spreadsheet_id, range),
        Command::Write { range, payloads } => payloads
            .iter()
            .flat_map(|payload| client.write_sheet(&cli.spreadsheet_id, range, payload))
            .collect(),
        Command::Clear { range } => client.clear_range(&cli.spreadsheet_id, range),
    };

    for line in lines {
        println!("{}", line);
    }
}
