use std::io::{self, BufRead, Write};

use anyhow::Result;

use claims_agent::{ask_bot, AgentConfig, AgentContext};
use claims_core::Kpis;

use crate::logging;

pub fn run() -> Result<()> {
    let config = AgentConfig::from_env()?;
    let ctx = AgentContext::initialize(&config)?;
    if let Some(client) = &ctx.llm {
        logging::verbose(format!(
            "model backend: {} ({})",
            client.provider().as_str(),
            client.model()
        ));
    }
    print_banner(&ctx);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "you> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }
        logging::verbose(format!("dispatching question ({} chars)", question.len()));
        let answer = ask_bot(&ctx, question);
        println!("bot> {answer}");
    }
    Ok(())
}

fn print_banner(ctx: &AgentContext) {
    let kpis = Kpis::measure(&ctx.table);
    println!("Claims Agent: ask about data analytics (counts, sums) or policy rules.");
    println!(
        "  {} claims | ${:.0} total volume | {:.1}% denial rate",
        kpis.total_claims, kpis.total_amount, kpis.denial_rate_pct
    );
    println!("Type 'exit' to quit.");
}
