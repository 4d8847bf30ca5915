// tests/output_multiplexer.rs

use squidrun::output::{Color, Label, attach_stream};
use squidrun_test_utils::buffer::SharedBuffer;
use squidrun_test_utils::with_timeout;

#[test]
fn label_is_colored_bracketed_name() {
    let label = Label::new("api", Color::Green);
    assert_eq!(label.to_string(), "\u{1b}[32m[api]\u{1b}[0m");
    assert_eq!(Label::new("eth", Color::Cyan).to_string(), "\u{1b}[36m[eth]\u{1b}[0m");
}

#[test]
fn palette_cycles_after_five() {
    assert_eq!(Color::for_index(0), Color::Green);
    assert_eq!(Color::for_index(4), Color::Cyan);
    assert_eq!(Color::for_index(5), Color::Green);
    assert_eq!(Color::for_index(7), Color::Blue);
}

#[tokio::test]
async fn each_line_is_prefixed_with_the_label() {
    let buffer = SharedBuffer::new();
    let label = Label::new("api", Color::Green);

    let stream: &'static [u8] = b"listening on 4350\nready\n";
    with_timeout(attach_stream(buffer.sink(), label.clone(), stream))
        .await
        .unwrap();

    assert_eq!(
        buffer.lines(),
        vec![format!("{label} listening on 4350"), format!("{label} ready")]
    );
}

#[tokio::test]
async fn unterminated_last_line_is_flushed_at_eof() {
    let buffer = SharedBuffer::new();
    let label = Label::new("eth", Color::Yellow);

    let stream: &'static [u8] = b"first\nlast without newline";
    with_timeout(attach_stream(buffer.sink(), label.clone(), stream))
        .await
        .unwrap();

    assert_eq!(
        buffer.contents(),
        format!("{label} first\n{label} last without newline\n")
    );
}

#[tokio::test]
async fn crlf_endings_and_invalid_utf8_are_normalized() {
    let buffer = SharedBuffer::new();
    let label = Label::new("win", Color::Blue);

    let stream: &'static [u8] = b"one\r\ntw\xffo\n";
    with_timeout(attach_stream(buffer.sink(), label.clone(), stream))
        .await
        .unwrap();

    assert_eq!(
        buffer.lines(),
        vec![format!("{label} one"), format!("{label} tw\u{fffd}o")]
    );
}

#[tokio::test]
async fn empty_lines_are_kept() {
    let buffer = SharedBuffer::new();
    let label = Label::new("p", Color::Magenta);

    let stream: &'static [u8] = b"\n\nx\n";
    with_timeout(attach_stream(buffer.sink(), label.clone(), stream))
        .await
        .unwrap();

    assert_eq!(
        buffer.lines(),
        vec![format!("{label} "), format!("{label} "), format!("{label} x")]
    );
}

#[tokio::test]
async fn concurrent_streams_never_split_lines() {
    let buffer = SharedBuffer::new();
    let a = Label::new("a", Color::Green);
    let b = Label::new("b", Color::Yellow);

    let a_text: &'static str = Box::leak(
        (0..200)
            .map(|i| format!("a-line-{i}\n"))
            .collect::<String>()
            .into_boxed_str(),
    );
    let b_text: &'static str = Box::leak(
        (0..200)
            .map(|i| format!("b-line-{i}\n"))
            .collect::<String>()
            .into_boxed_str(),
    );

    let ha = attach_stream(buffer.sink(), a.clone(), a_text.as_bytes());
    let hb = attach_stream(buffer.sink(), b.clone(), b_text.as_bytes());
    with_timeout(async {
        ha.await.unwrap();
        hb.await.unwrap();
    })
    .await;

    let lines = buffer.lines();
    assert_eq!(lines.len(), 400);

    let a_prefix = format!("{a} ");
    let b_prefix = format!("{b} ");
    let mut a_seen = Vec::new();
    let mut b_seen = Vec::new();
    for line in &lines {
        if let Some(rest) = line.strip_prefix(&a_prefix) {
            a_seen.push(rest.to_string());
        } else if let Some(rest) = line.strip_prefix(&b_prefix) {
            b_seen.push(rest.to_string());
        } else {
            panic!("mangled line: {line:?}");
        }
    }

    let expected_a: Vec<String> = (0..200).map(|i| format!("a-line-{i}")).collect();
    let expected_b: Vec<String> = (0..200).map(|i| format!("b-line-{i}")).collect();
    assert_eq!(a_seen, expected_a);
    assert_eq!(b_seen, expected_b);
}
