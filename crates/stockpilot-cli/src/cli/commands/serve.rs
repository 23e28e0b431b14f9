use stockpilot_media::MediaConfig;
use stockpilot_server::ServerConfig;

use crate::cli::args::{GlobalArgs, ServeArgs};
use crate::exit_codes::EXIT_SUCCESS;

pub async fn run(args: ServeArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let mut config = ServerConfig::from_env()
        .with_bind_addr(args.bind)
        .with_db_path(global.db.clone());
    if let Some(bytes) = args.max_body_bytes {
        config = config.with_max_body_bytes(bytes);
    }
    if args.offload_inline_media {
        config = config.with_offload_inline_media(true);
    }
    config.log_json = global.log_json;

    stockpilot_server::serve(config, MediaConfig::from_env()).await?;
    Ok(EXIT_SUCCESS)
}
