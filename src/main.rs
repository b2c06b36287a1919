use clap::Parser;
use ivit_tools::utils::error::{ErrorSeverity, IvitError};
use ivit_tools::utils::{logger, validation::Validate};
use ivit_tools::{CliConfig, IvitClient, ToolRegistry};
use std::sync::Arc;

fn fail(e: IvitError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.severity().exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 先讀設定檔，日誌設定可能來自檔案
    let file = cli.load_file();
    let (verbose, json_logs) = match &file {
        Ok(Some(file)) => (cli.verbose || file.verbose(), cli.json_logs || file.json_logs()),
        _ => (cli.verbose, cli.json_logs),
    };
    if json_logs {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    let file = file.unwrap_or_else(|e| fail(e));
    let config = cli
        .service_config(file.as_ref())
        .unwrap_or_else(|e| fail(e));
    if let Err(e) = config.validate() {
        fail(e);
    }
    tracing::debug!("Service config: {:?}", config);

    let client = IvitClient::new(&config).unwrap_or_else(|e| fail(e));
    let registry = ToolRegistry::ivit(Arc::new(client));

    let Some((tool, args)) = cli.tool_call().unwrap_or_else(|e| fail(e)) else {
        println!("{}", serde_json::to_string_pretty(&registry.schemas())?);
        return Ok(());
    };

    tracing::info!("Calling iVIT-T at {}", config.service_root());
    let output = registry.invoke(&tool, args, &cli.tool_context()).await;
    tracing::debug!("'{}' finished in {:?}", tool, output.duration);

    if output.is_error {
        eprintln!("❌ {}", output.as_text());
        let severity = output.severity.unwrap_or(ErrorSeverity::High);
        std::process::exit(severity.exit_code());
    }

    println!("{}", output.as_text());
    Ok(())
}
