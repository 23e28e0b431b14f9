use super::super::args::*;
use crate::exit_codes::EXIT_SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let global = cli.global;
    match cli.cmd {
        Command::Serve(args) => super::serve::run(args, &global).await,
        Command::Product(args) => super::product::run(args.cmd, &global),
        Command::Restock(args) => super::product::restock(args, &global),
        Command::LowStock => super::reports::low_stock(&global),
        Command::Dashboard => super::reports::dashboard(&global),
        Command::Report => super::reports::report(&global),
        Command::Categories => super::reports::categories(&global),
        Command::Media(args) => super::media::run(args.cmd, &global).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(EXIT_SUCCESS)
        }
    }
}
