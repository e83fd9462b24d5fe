use std::io::{self, BufRead, Write};

use clap::Parser;
use faqrag_answer::AnswerEngine;
use faqrag_core::config::Config;
use faqrag_core::types::{AnswerResult, ChatResponse};

#[derive(Parser)]
#[command(name = "faqrag-ask", version, about = "Answer questions from the FAQ and the handbook")]
struct Cli {
    /// Question to answer; omit to start an interactive session
    message: Option<String>,

    /// Print the answer as a JSON chat response
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn print_answer(res: AnswerResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&ChatResponse::from(res))?);
    } else {
        println!("Bot ({}): {}\n(confidence: {:.2})\n", res.source, res.answer, res.confidence);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    faqrag_cli::init_tracing(cli.verbose);

    let settings = Config::load()?.settings()?;
    let engine = AnswerEngine::open(&settings)?;
    tracing::info!("handbook retrieval: {}", engine.handbook_state());

    if let Some(message) = cli.message {
        return print_answer(engine.ask(&message)?, cli.json);
    }

    println!("FAQ + handbook bot ready (type 'exit' to quit)\n");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("You: ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") {
            break;
        }
        if message.is_empty() {
            continue;
        }
        print_answer(engine.get_answer(message), cli.json)?;
    }
    Ok(())
}
