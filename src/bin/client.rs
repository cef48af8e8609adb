//! Minimal terminal client for chatd.
//!
//! Connects to a broker, prints everything the server sends, and forwards
//! stdin lines as commands. EOF on stdin sends `/quit` and shuts the
//! socket down, which also unblocks the reader task.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:8080".to_string());

    let stream = TcpStream::connect(&addr).await?;
    eprintln!("Connected to {addr}. Type /help for commands, Ctrl-D to exit.");

    let (read_half, mut write_half) = stream.into_split();

    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(read_half);
        let mut line = String::new();
        loop {
            line.clear();
            match lines.read_line(&mut line).await {
                Ok(0) | Err(_) => break,
                Ok(_) => print!("{line}"),
            }
        }
        eprintln!("Connection closed by server.");
    });

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = stdin.next_line().await? {
        write_half.write_all(line.as_bytes()).await?;
        write_half.write_all(b"\n").await?;
    }

    // Stdin is done; tell the server and unblock the reader.
    let _ = write_half.write_all(b"/quit\n").await;
    let _ = write_half.shutdown().await;
    let _ = reader.await;
    Ok(())
}
