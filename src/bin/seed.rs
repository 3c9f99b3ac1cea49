//! Load the default quizzes into MongoDB
//!
//! Clears the quizzes collection first so repeated runs do not duplicate
//! entries. Users, conversations and results are left alone.

use bson::doc;
use clap::Parser;
use tracing::info;

use healthbot::db::schemas::{QuizDoc, QUIZ_COLLECTION};
use healthbot::db::MongoClient;
use healthbot::reference::default_quizzes;

/// Seed the healthbot database with the built-in quizzes
#[derive(Parser, Debug)]
#[command(name = "healthbot-seed")]
struct SeedArgs {
    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "health_chatbot")]
    mongodb_db: String,

    /// Keep existing quizzes instead of replacing them
    #[arg(long, default_value = "false")]
    append: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = SeedArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "healthbot=info,healthbot_seed=info,info".into()),
        )
        .init();

    let client = MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await?;
    let quizzes = client.collection::<QuizDoc>(QUIZ_COLLECTION).await?;

    if !args.append {
        let removed = quizzes.delete_many(doc! {}).await?;
        info!("Removed {} existing quizzes", removed);
    }

    for quiz in default_quizzes() {
        let title = quiz.title.clone();
        let id = quizzes.insert_one(quiz).await?;
        info!(quiz_id = %id, "Inserted quiz '{}'", title);
    }

    client.shutdown().await;
    info!("Seeding complete");
    Ok(())
}
