//! Session-level flow tests: transcript ordering across chat turns and the
//! form branch staying out of the transcript.

use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use concierge::form::FormSubmission;
use concierge::gemini::{GeminiChat, GeminiEvent};
use concierge::intent::Intent;
use concierge::session::{Session, Speaker};

fn sse_fragment(text: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
        })
    )
}

/// Run one chat turn the way the front ends do: append You, stream, append
/// one Bot entry per fragment.
async fn run_turn(session: &mut Session, relay: &mut GeminiChat, question: &str) {
    session.append(Speaker::You, question);
    let (tx, mut rx) = mpsc::channel(100);
    let (send_result, ()) = tokio::join!(relay.send_message_stream(question, tx), async {
        while let Some(event) = rx.recv().await {
            match event {
                GeminiEvent::Fragment { text } => session.append(Speaker::Bot, text),
                GeminiEvent::End => break,
            }
        }
    });
    send_result.unwrap();
}

#[test_log::test(tokio::test)]
async fn test_transcript_interleaves_turns_in_call_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-pro:streamGenerateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!("{}{}", sse_fragment("part one "), sse_fragment("part two")),
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let mut relay = GeminiChat::new(
        server.uri(),
        "test-key".to_string(),
        "gemini-pro".to_string(),
    );
    let mut session = Session::new();

    run_turn(&mut session, &mut relay, "first").await;
    run_turn(&mut session, &mut relay, "second").await;
    run_turn(&mut session, &mut relay, "third").await;

    let entries = session.transcript();
    // Three turns, each a You entry followed by two Bot fragment entries.
    assert_eq!(entries.len(), 9);
    for (i, question) in ["first", "second", "third"].iter().enumerate() {
        let turn = &entries[i * 3..i * 3 + 3];
        assert_eq!(turn[0].speaker, Speaker::You);
        assert_eq!(turn[0].text, *question);
        assert_eq!(turn[1].speaker, Speaker::Bot);
        assert_eq!(turn[1].text, "part one ");
        assert_eq!(turn[2].speaker, Speaker::Bot);
        assert_eq!(turn[2].text, "part two");
    }
}

#[test]
fn test_form_branch_never_touches_transcript() {
    let mut session = Session::new();
    assert_eq!(Intent::classify("please call me back"), Intent::Form);
    session.open_form();

    let submission = FormSubmission {
        name: "Grace".to_string(),
        phone: "+15551234567".to_string(),
        email: "grace@example.com".to_string(),
        date_phrase: "tomorrow".to_string(),
    };

    // Accepted twice with identical data: same record, no transcript growth.
    let first = session.submit_form(&submission).unwrap().clone();
    session.open_form();
    let second = session.submit_form(&submission).unwrap().clone();
    assert_eq!(first, second);
    assert!(session.transcript().is_empty());
}

#[test]
fn test_rejected_submission_reports_only_first_failure() {
    let mut session = Session::new();
    session.open_form();

    // Every field is bad; only the name failure is reported.
    let submission = FormSubmission {
        name: String::new(),
        phone: "12".to_string(),
        email: "nope".to_string(),
        date_phrase: "someday".to_string(),
    };
    let err = session.submit_form(&submission).unwrap_err();
    assert_eq!(err.to_string(), "Name is required.");
    assert!(session.form_record().is_none());
}
