use std::process::ExitCode;

use clap::Parser;

use intervene::cli::{Cli, Commands, RecurAction};
use intervene::clock::SystemClock;
use intervene::commands::{
    App, CreateOptions, RecurCreateOptions, cmd_assign, cmd_create, cmd_ls, cmd_note,
    cmd_recur_create, cmd_recur_preview, cmd_show, cmd_sla, cmd_sla_overview, cmd_status,
};
use intervene::config::Config;
use intervene::error::Result;
use intervene::events::FileHistorySink;
use intervene::lifecycle::{IdentityResolver, LifecycleController};
use intervene::paths::intervene_root;
use intervene::store::FileTicketStore;

fn build_app() -> Result<(App, Config)> {
    let root = intervene_root();
    let config = Config::load(&root)?;
    let app = LifecycleController::new(
        FileTicketStore::new(&root),
        FileHistorySink::new(&root),
        SystemClock,
        IdentityResolver,
    );
    Ok((app, config))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (app, config) = match build_app() {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result: Result<()> = match cli.command {
        Commands::Create {
            title,
            description,
            category,
            room,
            priority,
            assignee,
            due,
            sla_target,
            actor,
            json,
        } => {
            let due = match due.map(|d| d.parse()).transpose() {
                Ok(due) => due,
                Err(e) => {
                    eprintln!("invalid due date: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            let options = CreateOptions {
                title,
                description,
                category,
                room,
                priority: priority.unwrap_or(config.default_priority),
                assignee,
                due,
                sla_target,
            };
            let actor = actor.unwrap_or_else(|| config.default_actor.clone());
            cmd_create(&app, options, &actor, json).await
        }
        Commands::Ls {
            status,
            at_risk,
            breached,
            json,
        } => cmd_ls(&app, status, at_risk, breached, json).await,
        Commands::Show { id, json } => cmd_show(&app, &id, json).await,
        Commands::Status {
            id,
            status,
            yes,
            notes,
            assignee,
            actor,
            json,
        } => {
            let actor = actor.unwrap_or_else(|| config.default_actor.clone());
            cmd_status(&app, &id, status, yes, notes, assignee, &actor, json).await
        }
        Commands::Assign {
            id,
            technician,
            actor,
            json,
        } => {
            let actor = actor.unwrap_or_else(|| config.default_actor.clone());
            cmd_assign(&app, &id, &technician, &actor, json).await
        }
        Commands::Note {
            id,
            text,
            actor,
            json,
        } => {
            let actor = actor.unwrap_or_else(|| config.default_actor.clone());
            cmd_note(&app, &id, &text, &actor, json).await
        }
        Commands::Sla { id, json } => match id {
            Some(id) => cmd_sla(&app, &id, json).await,
            None => cmd_sla_overview(&app, json).await,
        },
        Commands::Recur(action) => match action {
            RecurAction::Preview { rule, start, json } => {
                cmd_recur_preview(start, &rule.into_rule(), json).await
            }
            RecurAction::Create {
                title,
                description,
                category,
                room,
                priority,
                sla_target,
                rule,
                start,
                actor,
                json,
            } => {
                let options = RecurCreateOptions {
                    title,
                    description,
                    category,
                    room,
                    priority: priority.unwrap_or(config.default_priority),
                    sla_target,
                };
                let actor = actor.unwrap_or_else(|| config.default_actor.clone());
                cmd_recur_create(&app, options, &rule.into_rule(), start, &actor, json).await
            }
        },
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
