use anyhow::{anyhow, bail, Context};
use log::debug;
use todo_client::session::SessionStore;
use todo_client::{
    ApiError, ClientConfig, ListParams, NewTask, PageMeta, Task, TaskId, TodoClient,
};

const USAGE: &str = "\
Usage: todo <command> [args]

Commands:
  login <email>                     Log in and remember the session
  logout                            Forget the stored session
  list [--page N] [--limit N] [--order KEY]
                                    List tasks, newest first by default
  show <id>                         Show one task
  create <title> [description]      Create a task
  toggle <id>                       Toggle a task between pending and done
  delete <id>                       Delete a task";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .write_style(env_logger::WriteStyle::Always)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        println!("{USAGE}");
        return Ok(());
    };

    let config = ClientConfig::from_env();
    let store = match config.session_file.clone() {
        Some(path) => SessionStore::new(path),
        None => SessionStore::default_location(),
    };
    debug!("Using session file {:?}", store.path());
    let client = TodoClient::new(config).map_err(describe)?;

    match command {
        "login" => {
            let email = positional(&args, 1, "email")?;
            let token = client.login(email).await.map_err(describe)?;
            store.save(&token).context("Failed to save session")?;
            println!("Logged in as {email}");
        }
        "logout" => {
            if store.clear().context("Failed to remove session")? {
                println!("Logged out");
            } else {
                println!("No active session");
            }
        }
        "list" => {
            let token = require_token(&store)?;
            let params = ListParams::from_raw(
                flag(&args, "--limit"),
                flag(&args, "--order"),
                flag(&args, "--page"),
            );
            let page = client.list_tasks(&token, &params).await.map_err(describe)?;
            if page.tasks.is_empty() {
                println!("No tasks yet.");
            }
            for task in &page.tasks {
                println!("{}", task_line(task));
            }
            if let Some(meta) = page.meta.as_ref() {
                println!("{}", page_footer(meta, params.page()));
            }
        }
        "show" => {
            let token = require_token(&store)?;
            let id = TaskId::from(positional(&args, 1, "id")?);
            let task = client.get_task(&token, &id).await.map_err(describe)?;
            print_detail(&task);
        }
        "create" => {
            let token = require_token(&store)?;
            let title = positional(&args, 1, "title")?;
            let email = client
                .config()
                .task_owner()
                .map(str::to_string)
                .ok_or_else(|| anyhow!("Set TODO_USER_EMAIL to the owner of new tasks"))?;
            let mut payload = NewTask::new(email, title);
            if let Some(description) = args.get(2) {
                payload = payload.with_description(description.as_str());
            }
            let task = client.create_task(&token, &payload).await.map_err(describe)?;
            println!("Created {}", task_line(&task));
        }
        "toggle" => {
            let token = require_token(&store)?;
            let id = TaskId::from(positional(&args, 1, "id")?);
            let ack = client.update_task(&token, &id).await.map_err(describe)?;
            println!("{}", ack.message);
        }
        "delete" => {
            let token = require_token(&store)?;
            let id = TaskId::from(positional(&args, 1, "id")?);
            let ack = client.delete_task(&token, &id).await.map_err(describe)?;
            println!("{}", ack.message);
        }
        "help" | "--help" | "-h" => println!("{USAGE}"),
        other => bail!("Unknown command '{other}'\n\n{USAGE}"),
    }

    Ok(())
}

fn describe(err: ApiError) -> anyhow::Error {
    match err.status() {
        Some(status) => anyhow!("{} ({} error, status {})", err.message(), err.kind(), status),
        None => anyhow!("{} ({} error)", err.message(), err.kind()),
    }
}

fn require_token(store: &SessionStore) -> anyhow::Result<String> {
    store
        .load()
        .context("Failed to read session")?
        .ok_or_else(|| anyhow!("Not logged in. Run `todo login <email>` first."))
}

fn positional<'a>(args: &'a [String], index: usize, name: &str) -> anyhow::Result<&'a str> {
    args.get(index)
        .filter(|a| !a.starts_with("--"))
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Missing <{name}>\n\n{USAGE}"))
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    let idx = args.iter().position(|a| a == name)?;
    args.get(idx + 1).map(String::as_str)
}

fn task_line(task: &Task) -> String {
    let mark = if task.is_completed { "x" } else { " " };
    format!("[{mark}] #{} {}", task.id, task.title)
}

fn page_footer(meta: &PageMeta, requested: u32) -> String {
    let mut footer = format!(
        "Page {} of {} ({} tasks)",
        meta.page, meta.pages, meta.total
    );
    if let Some(next) = meta.next_page() {
        footer.push_str(&format!(" - next: --page {next}"));
    }
    if !meta.accepts_page(u64::from(requested)) && meta.pages > 0 {
        footer.push_str(&format!(" - page {requested} is out of range"));
    }
    footer
}

fn print_detail(task: &Task) {
    let status = if task.is_completed { "Completed" } else { "Pending" };
    println!("#{} {}", task.id, task.title);
    println!("  Status:      {status}");
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        println!("  Description: {description}");
    }
    if let Some(email) = task.user_email.as_deref() {
        println!("  Owner:       {email}");
    }
    if let Some(created) = task.created_at {
        println!("  Created:     {}", created.format("%Y-%m-%d %H:%M"));
    }
    if let Some(updated) = task.updated_at {
        println!("  Updated:     {}", updated.format("%Y-%m-%d %H:%M"));
    }
}
