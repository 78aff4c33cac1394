//! Task management commands.

use clap::Subcommand;
use focusnest_core::{Priority, StoreClient, TaskColor, TaskUpdate, ValidationError};
use uuid::Uuid;

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Create {
        /// Task title
        title: String,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Priority: low, medium or high
        #[arg(long)]
        priority: Option<String>,
        /// Color: violet, pink, yellow, red, green or black
        #[arg(long)]
        color: Option<String>,
    },
    /// List tasks, newest first
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
    /// Update a task
    Update {
        /// Task ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// Set completed status
        #[arg(long)]
        completed: Option<bool>,
        /// Comma-separated tags (replaces the existing set)
        #[arg(long)]
        tags: Option<String>,
        /// New priority (low, medium, high or none)
        #[arg(long)]
        priority: Option<String>,
        /// New color (or none)
        #[arg(long)]
        color: Option<String>,
    },
    /// Add or remove a single tag
    Tag {
        /// Task ID
        id: String,
        /// Tag to add
        #[arg(long)]
        add: Option<String>,
        /// Tag to remove
        #[arg(long)]
        remove: Option<String>,
    },
    /// Mark a task completed
    Complete {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

fn parse_priority(s: &str) -> Result<Option<Priority>, String> {
    match s {
        "low" => Ok(Some(Priority::Low)),
        "medium" => Ok(Some(Priority::Medium)),
        "high" => Ok(Some(Priority::High)),
        "none" => Ok(None),
        other => Err(format!("unknown priority: {other}")),
    }
}

fn parse_color(s: &str) -> Result<Option<TaskColor>, String> {
    match s {
        "violet" => Ok(Some(TaskColor::Violet)),
        "pink" => Ok(Some(TaskColor::Pink)),
        "yellow" => Ok(Some(TaskColor::Yellow)),
        "red" => Ok(Some(TaskColor::Red)),
        "green" => Ok(Some(TaskColor::Green)),
        "black" => Ok(Some(TaskColor::Black)),
        "none" => Ok(None),
        other => Err(format!("unknown color: {other}")),
    }
}

fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = StoreClient::open()?;

    match action {
        TaskAction::Create {
            title,
            tags,
            priority,
            color,
        } => {
            if title.trim().is_empty() {
                return Err(Box::new(ValidationError::EmptyTitle));
            }
            let tags = tags.as_deref().map(split_tags).unwrap_or_default();
            let priority = priority.as_deref().map(parse_priority).transpose()?.flatten();
            let color = color.as_deref().map(parse_color).transpose()?.flatten();
            let task = store.create_task(title.trim(), tags, priority, color)?;
            println!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { json } => {
            let tasks = store.list_tasks()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else {
                for task in &tasks {
                    let mark = if task.completed { "x" } else { " " };
                    println!("[{mark}] {}  {}", task.id, task.title);
                }
            }
        }
        TaskAction::Get { id } => {
            let id = Uuid::parse_str(&id)?;
            match store.get_task(id)? {
                Some(task) => println!("{}", serde_json::to_string_pretty(&task)?),
                None => return Err("task not found".into()),
            }
        }
        TaskAction::Update {
            id,
            title,
            completed,
            tags,
            priority,
            color,
        } => {
            if let Some(title) = &title {
                if title.trim().is_empty() {
                    return Err(Box::new(ValidationError::EmptyTitle));
                }
            }
            let id = Uuid::parse_str(&id)?;
            let update = TaskUpdate {
                title: title.map(|t| t.trim().to_string()),
                completed,
                tags: tags.as_deref().map(split_tags),
                priority: priority.as_deref().map(parse_priority).transpose()?,
                color: color.as_deref().map(parse_color).transpose()?,
            };
            match store.update_task(id, update)? {
                Some(task) => println!("{}", serde_json::to_string_pretty(&task)?),
                None => return Err("task not found".into()),
            }
        }
        TaskAction::Tag { id, add, remove } => {
            if add.is_none() && remove.is_none() {
                return Err("pass --add and/or --remove".into());
            }
            let id = Uuid::parse_str(&id)?;
            let Some(task) = store.get_task(id)? else {
                return Err("task not found".into());
            };
            let mut tags = task.tags;
            if let Some(tag) = remove {
                tags.retain(|t| t != &tag);
            }
            if let Some(tag) = add {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
            let update = TaskUpdate {
                tags: Some(tags),
                ..TaskUpdate::default()
            };
            match store.update_task(id, update)? {
                Some(task) => println!("{}", serde_json::to_string_pretty(&task)?),
                None => return Err("task not found".into()),
            }
        }
        TaskAction::Complete { id } => {
            let id = Uuid::parse_str(&id)?;
            match store.set_task_completed(id, true)? {
                Some(task) => println!("Completed: {}", task.title),
                None => return Err("task not found".into()),
            }
        }
        TaskAction::Delete { id } => {
            let id = Uuid::parse_str(&id)?;
            if store.delete_task(id)? {
                println!("deleted");
            } else {
                return Err("task not found".into());
            }
        }
    }
    Ok(())
}
