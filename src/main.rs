use taskhub::config;
use taskhub::runtime::modes::server;
use taskhub::system::logging;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    // Load static configuration before anything else; logging depends on it
    config::init_config();
    let app_config = config::get_config();

    // Guard must stay alive so buffered log lines are flushed on exit
    let _log_guard = logging::init_logging(&app_config);

    if let Err(e) = server::run_server().await {
        // Startup/runtime failures land here; give the operator a readable error
        let err = taskhub::errors::TaskhubError::configuration(e.to_string());
        eprintln!("{}", err.format_colored());
        return Err(std::io::Error::other(e.to_string()));
    }

    Ok(())
}
