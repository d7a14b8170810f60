use std::fs;
use std::path::PathBuf;

use clap::Parser;
use feed_client::FeedClient;
use uuid::Uuid;

#[derive(Parser, Debug)]
struct Cli {
    #[clap(short, long, default_value = "http://127.0.0.1:8080")]
    server: String,

    /// File holding the token of the logged in user.
    #[clap(long, default_value = ".feed_token")]
    token_file: PathBuf,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    Register {
        #[clap(long)]
        name: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
        #[clap(long)]
        bio: Option<String>,
    },
    Login {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    /// Forgets the stored token.
    Logout,
    Me,
    Posts,
    Post {
        id: Uuid,
    },
    CreatePost {
        #[clap(long)]
        content: String,
    },
    DeletePost {
        id: Uuid,
    },
    /// Likes a post, or unlikes it if already liked.
    Like {
        id: Uuid,
    },
    Comment {
        post_id: Uuid,
        #[clap(long)]
        text: String,
    },
    DeleteComment {
        post_id: Uuid,
        comment_id: Uuid,
    },
    Profile {
        id: Uuid,
    },
    UpdateProfile {
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        bio: Option<String>,
    },
    UserPosts {
        id: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let mut client = FeedClient::connect(&args.server)?;
    if let Ok(token) = fs::read_to_string(&args.token_file) {
        client.set_token(token);
    }

    match args.command {
        Command::Register {
            name,
            email,
            password,
            bio,
        } => {
            let auth = client
                .register(&name, &email, &password, bio.as_deref())
                .await?;
            fs::write(&args.token_file, &auth.token)?;
            println!("Registered as {}", auth.user);
        }
        Command::Login { email, password } => {
            let auth = client.login(&email, &password).await?;
            fs::write(&args.token_file, &auth.token)?;
            println!("Logged in as {}", auth.user);
        }
        Command::Logout => {
            if args.token_file.exists() {
                fs::remove_file(&args.token_file)?;
            }
            println!("Logged out");
        }
        Command::Me => {
            println!("{}", client.me().await?);
        }
        Command::Posts => {
            let posts = client.list_posts().await?;
            println!("Posts ({})", posts.len());
            for post in posts {
                println!("{post}");
            }
        }
        Command::Post { id } => {
            println!("{}", client.get_post(id).await?);
        }
        Command::CreatePost { content } => {
            let post = client.create_post(&content).await?;
            println!("Post created! ID: {}", post.id);
        }
        Command::DeletePost { id } => {
            client.delete_post(id).await?;
            println!("Post deleted!");
        }
        Command::Like { id } => {
            let likes = client.toggle_like(id).await?;
            println!("Post now has {} likes", likes.len());
        }
        Command::Comment { post_id, text } => {
            let comments = client.add_comment(post_id, &text).await?;
            if let Some(comment) = comments.first() {
                println!("Comment added! ID: {}", comment.id);
            }
        }
        Command::DeleteComment {
            post_id,
            comment_id,
        } => {
            let comments = client.delete_comment(post_id, comment_id).await?;
            println!("Comment deleted! {} remaining", comments.len());
        }
        Command::Profile { id } => {
            println!("{}", client.get_profile(id).await?);
        }
        Command::UpdateProfile { name, bio } => {
            let user = client
                .update_profile(name.as_deref(), bio.as_deref())
                .await?;
            println!("Profile updated: {user}");
        }
        Command::UserPosts { id } => {
            for post in client.user_posts(id).await? {
                println!("{post}");
            }
        }
    }

    Ok(())
}
