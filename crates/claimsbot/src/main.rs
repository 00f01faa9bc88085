mod chat;
mod cli;
mod logging;

use anyhow::Result;
use clap::Parser;
use rand::thread_rng;

use claims_agent::{ask_bot, AgentConfig, AgentContext};
use claims_core::{generate_claims, write_claims_csv, ClaimTable, Kpis};

use crate::cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match cli.command {
        Command::Ask { question } => ask(&question),
        Command::Chat => chat::run(),
        Command::Generate { rows, force } => generate(rows, force),
        Command::Stats => stats(),
    }
}

fn ask(question: &str) -> Result<()> {
    let config = AgentConfig::from_env()?;
    let ctx = AgentContext::initialize(&config)?;
    println!("{}", ask_bot(&ctx, question));
    Ok(())
}

fn generate(rows: usize, force: bool) -> Result<()> {
    let config = AgentConfig::from_env()?;
    if config.data_path.exists() && !force {
        logging::info(format!(
            "{} already exists; pass --force to overwrite",
            config.data_path.display()
        ));
        return Ok(());
    }
    logging::task("generate", format!("writing {} synthetic rows", rows));
    let claims = generate_claims(rows, &mut thread_rng());
    write_claims_csv(&config.data_path, &claims)?;
    logging::task("generate", format!("wrote {}", config.data_path.display()));
    Ok(())
}

fn stats() -> Result<()> {
    let config = AgentConfig::from_env()?;
    if !config.data_path.exists() {
        logging::task("stats", "dataset missing; generating sample rows");
        let claims = generate_claims(config.sample_rows, &mut thread_rng());
        write_claims_csv(&config.data_path, &claims)?;
    }
    let table = ClaimTable::load(&config.data_path)?;
    let kpis = Kpis::measure(&table);
    println!("Total claims:  {}", kpis.total_claims);
    println!("Total volume:  ${:.2}", kpis.total_amount);
    println!("Denied claims: {}", kpis.denied_claims);
    println!("Denial rate:   {:.1}%", kpis.denial_rate_pct);
    Ok(())
}
