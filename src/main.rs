use clap::Parser;

use eisen_todo::cli::Cli;
use eisen_todo::cmd::*;
use eisen_todo::config::Config;
use eisen_todo::db::Database;
use eisen_todo::logging::init_logging;

fn main() {
    let cli = Cli::parse();

    let config = match Config::resolve(cli.db, cli.log_level.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // Completion scripts go to stdout and need neither logs nor the store.
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return;
    }

    if let Err(e) = init_logging(config.log_level, &config.log_dir) {
        eprintln!("Warning: logging disabled: {e}");
    }

    let db_path = config.db_path;
    if let Commands::Remind { watch, interval, quiet } = cli.command {
        cmd_remind(&db_path, watch, interval, quiet);
        return;
    }

    let mut db = match Database::load(&db_path) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Completions { .. } => unreachable!("completions handled above"),
        Commands::Remind { .. } => unreachable!("remind handled above"),

        Commands::Add { title, desc, urgent, important, remind } =>
            cmd_add(&mut db, &db_path, title, desc, urgent, important, remind),

        Commands::Voice { transcript, desc, dry_run } =>
            cmd_voice(&mut db, &db_path, transcript, desc, dry_run),

        Commands::Parse { transcript } => cmd_parse(transcript),

        Commands::List { filter, matrix } => cmd_list(&db, filter, matrix),

        Commands::View { id } => cmd_view(&db, id),

        Commands::Update { id, title, desc, urgent, important, remind, clear_reminder } =>
            cmd_update(&mut db, &db_path, id, title, desc, urgent, important, remind, clear_reminder),

        Commands::Complete { id } => cmd_set_completed(&mut db, &db_path, id, true),

        Commands::Reopen { id } => cmd_set_completed(&mut db, &db_path, id, false),

        Commands::Toggle { id } => cmd_toggle(&mut db, &db_path, id),

        Commands::Delete { id, yes } => cmd_delete(&mut db, &db_path, id, yes),
    }
}
