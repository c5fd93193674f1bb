//! Interactive stock bot REPL
//!
//! A stdin/stdout stand-in for the messaging transport: type a message, get
//! the reply the bot would send, or nothing at all when the bot would stay
//! silent.
//!
//! # Usage
//!
//! ```bash
//! # Optional provider keys
//! export FUGLE_API_KEY="..."
//! export GEMINI_API_KEY="..."
//!
//! cargo run --bin stockbot -p stockbot
//! ```

use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use stockbot::providers::{GeminiNarrator, MarketData, TwseClient};
use stockbot::{BotConfig, StockBot};

fn print_banner() {
    println!(
        r#"
╔══════════════════════════════════════════════════════════╗
║                      Stock Bot                           ║
║                                                          ║
║  Commands:                                               ║
║    #代號/#名稱   - 即時報價 (ex: #2330, #台積電, #美股)  ║
║    A代號/A名稱   - 技術分析 (ex: A2330, A大盤)           ║
║    F代號/F大盤   - 三大法人買賣超 (ex: F2330, F大盤)     ║
║    #指令         - 指令列表                              ║
║                                                          ║
║  exit 離開                                               ║
╚══════════════════════════════════════════════════════════╝
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockbot_utils::init_tracing(
        &env::var("RUST_LOG").unwrap_or_else(|_| "warn,stockbot=info".to_string()),
    );

    print_banner();

    let config = BotConfig::from_env()?;
    if config.fugle_api_key.is_none() {
        eprintln!("Warning: FUGLE_API_KEY not set, domestic index quotes disabled");
    }

    let twse = Arc::new(TwseClient::new(&config));
    let bot = StockBot::new(
        Arc::new(MarketData::new(&config, twse.clone())),
        twse.clone(),
        twse,
        Arc::new(GeminiNarrator::new(&config)),
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!(">>> ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                // EOF
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            println!("Goodbye!");
            break;
        }

        // the bot's silence is part of the contract: no reply, no output
        if let Some(reply) = bot.handle_message(input).await {
            println!("{reply}\n");
        }
    }

    Ok(())
}
