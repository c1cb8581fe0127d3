use clap::Parser;
use dotenv::dotenv;
use log::info;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{ AsyncBufReadExt, AsyncWriteExt, BufReader };
use tokio::sync::Mutex;
use tutor_chat::cli::ClientArgs;
use tutor_chat::client::subject::poll_subject;
use tutor_chat::client::{ ChatSession, ChatTransport, ClientError, HttpTransport, SubmitOutcome };
use tutor_chat::models::chat::{ Role, Turn };
use tutor_chat::render::render_turn;

fn print_turn(turn: &Turn, html: bool) {
    let label = match turn.role {
        Role::User => "you",
        Role::Assistant => "tutor",
    };
    if html {
        println!("{}> {}", label, render_turn(turn));
    } else {
        println!("{}> {}", label, turn.content);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = ClientArgs::parse();

    let transport = Arc::new(HttpTransport::new(&args.endpoint)?);
    let session = Arc::new(Mutex::new(ChatSession::new()));
    info!("Chatting with {} as session {}", transport.chat_url(), session.lock().await.session_id());

    if args.subject_poll_secs > 0 {
        tokio::spawn(
            poll_subject(
                Arc::clone(&transport),
                Arc::clone(&session),
                Duration::from_secs(args.subject_poll_secs)
            )
        );
    }

    println!("Type your message and press Enter. /reset clears the chat, /quit exits.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "/quit" => break,
            "/reset" => {
                session.lock().await.reset();
                println!("(transcript cleared)");
                continue;
            }
            _ => {}
        }

        // The lock is released while the request is in flight so the subject
        // poll can still run.
        let request = match session.lock().await.begin_submit(&line) {
            Ok(request) => request,
            Err(ClientError::EmptyMessage) => continue,
            Err(e) => {
                println!("({})", e);
                continue;
            }
        };
        let result = transport.send(&request).await;

        let mut guard = session.lock().await;
        if guard.complete_submit(result) == SubmitOutcome::Discarded {
            println!("(subject changed; reply dropped, please ask again)");
            continue;
        }
        if let Some(turn) = guard.transcript().last() {
            print_turn(turn, args.html);
        }
    }

    Ok(())
}
