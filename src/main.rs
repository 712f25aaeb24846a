use anyhow::Result;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = balancete::args::parse();
    let summary = balancete::batch::run(&args.input_dir, &args.output_dir)?;
    println!(
        "{} file(s) processed, {} skipped, {} failed",
        summary.processed, summary.skipped, summary.failed
    );
    Ok(())
}
