use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cfg = airco2ntrol::config::Config::parse();
    airco2ntrol::block_on(airco2ntrol::run(cfg))
}
