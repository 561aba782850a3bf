//! Interactive terminal session: the same routing/validation core as the
//! web UI, driven by stdin.

use anyhow::Result;
use std::io::Write;
use tokio::sync::mpsc;
use tracing::info;

use crate::constants::GEMINI_INIT_ERROR_MESSAGE;
use crate::form::{FormState, FormSubmission};
use crate::gemini::{GeminiChat, GeminiEvent};
use crate::intent::Intent;
use crate::session::{Session, Speaker};

/// Run a chat session until EOF or an "exit"/"quit" input.
pub async fn run_chat_session() -> Result<()> {
    let mut session = Session::new();
    let mut relay = match GeminiChat::from_env() {
        Ok(chat) => Some(chat),
        Err(e) => {
            // Reported once; chat stays non-functional for this session.
            info!("Gemini relay unavailable: {:?}", e);
            println!("{}", GEMINI_INIT_ERROR_MESSAGE);
            None
        }
    };

    println!("Chatbot ready. Ask a question, or say \"call me\" to book a call.");
    loop {
        if session.form_state() == FormState::Collecting {
            collect_form(&mut session)?;
            continue;
        }

        let Some(input) = prompt("Input: ")? else {
            break;
        };
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        match Intent::classify(&input) {
            Intent::Form => {
                println!("Fill in your details:");
                session.open_form();
            }
            Intent::Chat => {
                chat_turn(&mut session, relay.as_mut(), &input).await?;
            }
        }
    }

    if !session.transcript().is_empty() {
        println!("\nChat History:");
        for entry in session.transcript() {
            println!("{}: {}", entry.speaker, entry.text);
        }
    }
    Ok(())
}

/// One free-form question: append the user entry, stream the reply, append
/// each fragment as its own bot entry.
async fn chat_turn(
    session: &mut Session,
    relay: Option<&mut GeminiChat>,
    question: &str,
) -> Result<()> {
    session.append(Speaker::You, question);
    print!("Bot: ");
    std::io::stdout().flush()?;

    match relay {
        Some(relay) => {
            let (tx, mut rx) = mpsc::channel(100);
            let (send_result, ()) = tokio::join!(relay.send_message_stream(question, tx), async {
                while let Some(event) = rx.recv().await {
                    match event {
                        GeminiEvent::Fragment { text } => {
                            print!("{}", text);
                            let _ = std::io::stdout().flush();
                            session.append(Speaker::Bot, text);
                        }
                        GeminiEvent::End => break,
                    }
                }
            });
            send_result?;
        }
        None => {
            // Initialization failed earlier; degrade to the fixed error.
            let text = crate::constants::GEMINI_ERROR_MESSAGE;
            print!("{}", text);
            session.append(Speaker::Bot, text);
        }
    }
    println!();
    Ok(())
}

/// Collect the four form fields and run one validation pass. The first
/// failing check is reported and the form stays open for another attempt;
/// "cancel" at the name prompt abandons it.
fn collect_form(session: &mut Session) -> Result<()> {
    let Some(name) = prompt("Name: ")? else {
        session.cancel_form();
        return Ok(());
    };
    if name.eq_ignore_ascii_case("cancel") {
        session.cancel_form();
        return Ok(());
    }
    let Some(phone) = prompt("Phone Number: ")? else {
        session.cancel_form();
        return Ok(());
    };
    let Some(email) = prompt("Email: ")? else {
        session.cancel_form();
        return Ok(());
    };
    let Some(date_phrase) = prompt("Preferred Date (e.g., next Monday, tomorrow): ")? else {
        session.cancel_form();
        return Ok(());
    };

    let submission = FormSubmission {
        name,
        phone,
        email,
        date_phrase,
    };
    match session.submit_form(&submission) {
        Ok(record) => {
            println!("Details submitted successfully!");
            println!("Your Details:");
            println!("{}", serde_json::to_string_pretty(record)?);
        }
        Err(e) => println!("{}", e),
    }
    Ok(())
}

/// Print `label` and read one trimmed line. `None` on EOF.
fn prompt(label: &str) -> Result<Option<String>> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    if std::io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
