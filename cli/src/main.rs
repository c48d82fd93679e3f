use clap::{Parser, Subcommand};
use coursegen::generation::CourseRequest;
use coursegen::model::entity::{Category, Course, Plan, UserEntity, UserEntityCreate};
use coursegen::model::{CrudRepository, DbConnection, ModelManager};
use coursegen::video::PgVideoCache;
use coursegen::web::Visitor;
use coursegen::web::dto::courses::CourseSummary;
use coursegen::{Config, build_pipeline};

#[derive(Parser, Debug)]
#[command(about = "CLI tool for managing the course database", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage the video lookup cache
    Cache {
        #[command(subcommand)]
        action: CacheCommands,
    },
}

/// User management
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, value_parser = parse_plan, default_value = "free")]
        plan: Plan,
    },
}

/// Course management
#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    /// List courses stored for a visitor id
    List {
        #[arg(long, default_value = "anonymous")]
        visitor: String,
    },
    /// Generate a course the same way the HTTP endpoint does
    Generate {
        #[arg(long, default_value = "anonymous")]
        visitor: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long, value_parser = parse_category, default_value = "Other")]
        category: Category,
    },
}

/// Cache management
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Delete expired cache rows
    Purge,
}

fn parse_plan(value: &str) -> Result<Plan, String> {
    value.parse().map_err(|e| format!("{e}"))
}

fn parse_category(value: &str) -> Result<Category, String> {
    value.parse().map_err(|e| format!("{e}"))
}

#[tokio::main]
async fn main() -> coursegen::error::AppResult<()> {
    coursegen::setup_trace();
    let args = Cli::parse();

    let config = Config::get_or_init(cfg!(debug_assertions)).await;
    let db_con = DbConnection::connect(config.app().database_uri())?;
    let mm = ModelManager::new(db_con.clone());

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add { email, password, name, plan } => {
                let user = UserEntity::create(
                    &mm,
                    &Visitor::anonymous(),
                    UserEntityCreate {
                        email,
                        name,
                        password_hash: coursegen::auth::hash_password(&password)?,
                        plan,
                    },
                )
                .await?;
                println!("User created: {:?}", user);
            }
        },

        Commands::Course { action } => match action {
            CourseCommands::List { visitor } => {
                let visitor = Visitor::new(visitor);
                let total = Course::count(&mm, &visitor).await?;
                let courses = Course::list(&mm, &visitor, total.max(1), 0).await?;
                for course in &courses {
                    let summary = CourseSummary::from(course);
                    println!(
                        "{}  {:>3}%  [{}] {}",
                        summary.id, summary.progress_percentage, summary.category, summary.title
                    );
                }
                println!("{} course(s)", courses.len());
            }

            CourseCommands::Generate { visitor, title, description, category } => {
                let pipeline = build_pipeline(config, &db_con).await?;
                let request = CourseRequest {
                    title,
                    description,
                    category,
                    thumbnail: String::new(),
                };

                let draft = pipeline.generate(&request).await?;
                let course = Course::create(&mm, &Visitor::new(visitor), draft).await?;
                let modules = course.modules().len();
                let subtopics: usize = course.modules().iter().map(|m| m.subtopics.len()).sum();
                println!(
                    "Course created: {} ({modules} modules, {subtopics} subtopics)",
                    course.id()
                );
            }
        },

        Commands::Cache { action } => match action {
            CacheCommands::Purge => {
                let removed = PgVideoCache::new(db_con).purge_expired().await?;
                tracing::info!("purged {removed} expired cache rows");
                println!("Removed {removed} expired entries");
            }
        },
    }

    Ok(())
}
