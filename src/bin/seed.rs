//! Database seeder
//!
//! Usage:
//!   cargo run --bin seed -- import
//!   cargo run --bin seed -- destroy

use anyhow::{Context, Result};
use blog_backend::{
    config::load_env,
    models::{Category, NewPost, PostStatus},
    AppConfig, AppState, Database,
};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "seed")]
#[command(about = "Reset the blog database and optionally load sample data")]
struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Wipe every table, then load an admin, a user and sample posts
    Import,
    /// Wipe every table
    Destroy,
}

struct SamplePost {
    title: &'static str,
    content: &'static str,
    category: Category,
    tags: &'static [&'static str],
    status: PostStatus,
}

const SAMPLE_POSTS: &[SamplePost] = &[
    SamplePost {
        title: "The Future of Artificial Intelligence",
        content: "AI is moving quickly from research labs into everyday products. \
                  This post looks at where it is heading, what it means for work, \
                  and the ethical questions that come with it.",
        category: Category::Technology,
        tags: &["AI", "Future", "Innovation"],
        status: PostStatus::Approved,
    },
    SamplePost {
        title: "5 Tips for a Healthy Lifestyle",
        content: "Eat a balanced diet, move every day, sleep enough, manage stress \
                  and drink water. Small habits compound into large gains.",
        category: Category::Health,
        tags: &["Health", "Wellness", "Lifestyle"],
        status: PostStatus::Pending,
    },
    SamplePost {
        title: "The Role of Technology in Education",
        content: "Online platforms, virtual classrooms and learning apps are changing \
                  how students learn and how classes are run.",
        category: Category::Education,
        tags: &["Education", "EdTech"],
        status: PostStatus::Approved,
    },
    SamplePost {
        title: "Minimalism at Home",
        content: "Owning less can mean worrying less. A few practical steps for \
                  decluttering without losing what matters.",
        category: Category::Lifestyle,
        tags: &["Minimalism", "Home"],
        status: PostStatus::Approved,
    },
    SamplePost {
        title: "Starting a Small Business",
        content: "From validating an idea to finding the first customers, a short \
                  checklist for new founders.",
        category: Category::Business,
        tags: &["Startup", "Entrepreneurship"],
        status: PostStatus::Pending,
    },
];

fn main() -> Result<()> {
    load_env();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = cli.config.finalize()?;
    let db = Database::open(&config.db_path)?;

    match cli.command {
        Commands::Import => import(&db, &config),
        Commands::Destroy => {
            db.clear()?;
            println!("✅ Data destroyed!");
            Ok(())
        }
    }
}

fn import(db: &Database, config: &AppConfig) -> Result<()> {
    let admin_password = config
        .default_admin_password()
        .context("ADMIN_PASSWORD must be set when APP_ENV=production")?;

    db.clear()?;
    let state = AppState::new(db, config);

    let admin = state
        .users()
        .create_user("Admin User", &config.admin_email, admin_password, true)
        .context("Failed to create admin user")?;
    state
        .users()
        .create_user("John Doe", "john@example.com", "123456", false)
        .context("Failed to create sample user")?;

    for sample in SAMPLE_POSTS {
        let post = state
            .posts
            .create(
                admin.id,
                NewPost {
                    title: sample.title.to_string(),
                    content: sample.content.to_string(),
                    category: sample.category,
                    tags: sample.tags.iter().map(|t| t.to_string()).collect(),
                },
            )
            .with_context(|| format!("Failed to create post: {}", sample.title))?;

        if sample.status != PostStatus::Pending {
            state.posts.set_status(&post.id, sample.status)?;
        }
    }

    println!(
        "✅ Data imported: 2 users, {} posts (admin: {})",
        SAMPLE_POSTS.len(),
        admin.email
    );
    Ok(())
}
