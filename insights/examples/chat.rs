use file_insights::{ChatSession, HttpQueryApi, Role, SelectedFile};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let base_url =
        std::env::var("QUERY_API_URL").unwrap_or_else(|_| "http://127.0.0.1:5000".to_string());
    let api = HttpQueryApi::new(base_url.clone());
    let mut session = ChatSession::new();

    println!("File insights chat against {base_url}");
    println!("  /attach <file.pdf>  upload a PDF (clears the chat)");
    println!("  /quit               exit");
    println!("Anything else is sent as a question (max 250 characters).");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }

        if let Some(path) = line.strip_prefix("/attach ") {
            let path = Path::new(path.trim());
            let bytes = match tokio::fs::read(path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    eprintln!("Cannot read {}: {e}", path.display());
                    continue;
                }
            };
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "document.pdf".to_string());

            match session.attach_file(SelectedFile::new(name, bytes)) {
                Ok(()) => println!("Attached {}", path.display()),
                Err(e) => eprintln!("{e}"),
            }
            continue;
        }

        println!("characters: {}/250", ChatSession::char_count(line));
        if let Err(e) = session.submit(line, &api).await {
            eprintln!("{e}");
            continue;
        }

        if let Some(entry) = session.transcript().last() {
            if entry.role == Role::Assistant {
                println!("> {}", entry.content);
            }
        }
    }

    Ok(())
}
