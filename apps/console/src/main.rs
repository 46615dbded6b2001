use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use drive_client::{
    endpoint_url, AxisSide, ChannelEvent, ControlEvent, DriveChannel, InputDispatcher,
};
use protocol::DiscreteCommand;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser, Debug)]
struct Args {
    /// Device host, e.g. the rover's access point address.
    #[arg(long, default_value = "192.168.4.1")]
    host: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let endpoint = endpoint_url(&args.host)?;
    let channel = DriveChannel::new(endpoint);

    let mut events = channel.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ChannelEvent::StateChanged(state) => info!(?state, "link state"),
                ChannelEvent::MessageReceived(text) => info!(%text, "device"),
                ChannelEvent::Error(message) => warn!(%message, "link"),
            }
        }
    });

    channel.connect().await;

    println!("rover console — one command per line:");
    println!("  up | down | left | right | stop | slow-speed | normal-speed | fast-speed");
    println!("  empty line           release (sends stop)");
    println!("  l <raw> / r <raw>    slider move, raw in [-255, 255]");
    println!("  lr / rr              slider release");

    let mut dispatcher = InputDispatcher::new(Arc::clone(&channel));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            dispatcher.dispatch(ControlEvent::Release).await;
            continue;
        }
        match parse_line(line) {
            Ok(event) => dispatcher.dispatch(event).await,
            Err(message) => warn!(%line, %message, "ignoring input"),
        }
    }

    Ok(())
}

fn parse_line(line: &str) -> Result<ControlEvent, String> {
    let mut parts = line.split_whitespace();
    let head = parts.next().ok_or("empty input")?;
    match (head, parts.next()) {
        ("lr", None) => Ok(ControlEvent::AxisReleased(AxisSide::Left)),
        ("rr", None) => Ok(ControlEvent::AxisReleased(AxisSide::Right)),
        ("l" | "r", Some(raw)) => {
            let raw: i16 = raw
                .parse()
                .map_err(|_| format!("bad slider value {raw:?}"))?;
            let side = if head == "l" {
                AxisSide::Left
            } else {
                AxisSide::Right
            };
            Ok(ControlEvent::AxisMoved { side, raw })
        }
        (token, None) => token
            .parse::<DiscreteCommand>()
            .map(ControlEvent::Press)
            .map_err(|err| err.to_string()),
        _ => Err("unrecognized input".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_parse_to_control_events() {
        assert_eq!(
            parse_line("up").unwrap(),
            ControlEvent::Press(DiscreteCommand::Up)
        );
        assert_eq!(
            parse_line("l 150").unwrap(),
            ControlEvent::AxisMoved {
                side: AxisSide::Left,
                raw: 150
            }
        );
        assert_eq!(
            parse_line("rr").unwrap(),
            ControlEvent::AxisReleased(AxisSide::Right)
        );
        assert!(parse_line("warp 9").is_err());
        assert!(parse_line("l fast").is_err());
    }
}
