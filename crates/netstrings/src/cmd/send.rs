use std::fs;
use std::thread;
use std::time::Duration;

use netstrings_stream::{JsonCodec, MessageStream};

use crate::cmd::{parse_duration, SendArgs};
use crate::exit::{stream_error, transport_error, CliResult, SUCCESS, USAGE};
use crate::output::{print_message, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let interval = args.interval.as_deref().map(parse_duration).transpose()?;

    let stream = netstrings_transport::connect(args.addr)
        .map_err(|err| transport_error("connect failed", err))?;

    if let Some(json) = &args.json {
        let value: serde_json::Value = serde_json::from_str(json).map_err(|err| {
            crate::exit::CliError::new(USAGE, format!("--json is not valid JSON: {err}"))
        })?;
        let mut stream = MessageStream::with_codec(stream, JsonCodec::new());

        for i in 1..=args.count {
            let written = stream
                .send(&value)
                .map_err(|err| stream_error("send failed", err))?;
            tracing::debug!(bytes = written, "sent object");

            if args.wait {
                match stream.recv().map_err(|err| stream_error("receive failed", err))? {
                    Some(reply) => print_message(args.addr, &reply.to_string(), format),
                    None => {
                        tracing::warn!("peer closed before replying");
                        break;
                    }
                }
            }
            pause_between_sends(interval, i, args.count);
        }
        return Ok(SUCCESS);
    }

    let payload = resolve_text_payload(&args)?;
    let mut stream = MessageStream::new(stream);

    for i in 1..=args.count {
        let message = payload
            .clone()
            .unwrap_or_else(|| format!("Test! PID:{}, {}/{}", std::process::id(), i, args.count));
        let written = stream
            .send(&message)
            .map_err(|err| stream_error("send failed", err))?;
        tracing::debug!(bytes = written, "sent message");

        if args.wait {
            match stream.recv().map_err(|err| stream_error("receive failed", err))? {
                Some(reply) => {
                    if reply != message {
                        tracing::warn!("reply differs from request");
                    }
                    print_message(args.addr, &reply, format);
                }
                None => {
                    tracing::warn!("peer closed before replying");
                    break;
                }
            }
        }
        pause_between_sends(interval, i, args.count);
    }

    Ok(SUCCESS)
}

fn resolve_text_payload(args: &SendArgs) -> CliResult<Option<String>> {
    if let Some(data) = &args.data {
        return Ok(Some(data.clone()));
    }
    if let Some(path) = &args.file {
        let text = fs::read_to_string(path).map_err(|err| {
            crate::exit::io_error(&format!("failed reading {}", path.display()), err)
        })?;
        return Ok(Some(text));
    }
    Ok(None)
}

fn pause_between_sends(interval: Option<Duration>, sent: u32, count: u32) {
    if let Some(pause) = interval {
        if sent < count {
            thread::sleep(pause);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use super::*;

    fn args_with(data: Option<&str>, file: Option<&str>) -> SendArgs {
        SendArgs {
            addr: "127.0.0.1:9000".parse::<SocketAddr>().unwrap(),
            data: data.map(str::to_string),
            json: None,
            file: file.map(Into::into),
            count: 1,
            wait: false,
            interval: None,
        }
    }

    #[test]
    fn explicit_data_wins() {
        let payload = resolve_text_payload(&args_with(Some("hello"), None)).unwrap();
        assert_eq!(payload.as_deref(), Some("hello"));
    }

    #[test]
    fn missing_payload_falls_back_to_generated_message() {
        let payload = resolve_text_payload(&args_with(None, None)).unwrap();
        assert!(payload.is_none());
    }

    #[test]
    fn unreadable_file_is_an_io_error() {
        let err = resolve_text_payload(&args_with(None, Some("/nonexistent/payload.txt")))
            .unwrap_err();
        assert!(err.message.contains("/nonexistent/payload.txt"));
    }
}
