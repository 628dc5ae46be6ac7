//! SIM800 AT-command adapter against a scripted serial transcript.

use std::collections::VecDeque;

use vapor::adapters::modem::{ModemLink, Sim800Modem};
use vapor::app::commands::AppCommand;
use vapor::app::ports::{MessagingPort, TimeSourcePort};
use vapor::error::SendError;

/// Replays canned modem output one chunk per `read`, records writes.
#[derive(Default)]
struct ScriptedLink {
    written: Vec<u8>,
    chunks: VecDeque<Vec<u8>>,
    broken: bool,
}

impl ScriptedLink {
    fn with(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.as_bytes().to_vec()).collect(),
            ..Self::default()
        }
    }

    fn written(&self) -> String {
        String::from_utf8_lossy(&self.written).into_owned()
    }
}

impl ModemLink for ScriptedLink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SendError> {
        if self.broken {
            return Err(SendError::TransportUnavailable);
        }
        self.written.extend_from_slice(bytes);
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8], _timeout_ms: u32) -> usize {
        let Some(chunk) = self.chunks.pop_front() else {
            return 0;
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.chunks.push_front(chunk[n..].to_vec());
        }
        n
    }
}

#[test]
fn init_runs_the_setup_sequence() {
    let link = ScriptedLink::with(&["OK\r\n", "OK\r\n", "OK\r\n", "OK\r\n", "OK\r\n"]);
    let mut modem = Sim800Modem::new(link);
    assert_eq!(modem.init(), Ok(()));
    assert_eq!(
        modem.link().written(),
        "AT\r\nAT+CSCS=\"GSM\"\r\nAT+CNMI=1,2,0,0,0\r\nAT+CMGF=1\r\nAT+CMGDA=\"DEL ALL\"\r\n"
    );
}

#[test]
fn init_fails_when_modem_is_silent() {
    let mut modem = Sim800Modem::new(ScriptedLink::default());
    assert_eq!(modem.init(), Err(SendError::Timeout));
}

#[test]
fn send_writes_cmgs_body_and_ctrl_z() {
    let link = ScriptedLink::with(&["OK\r\n", "\r\n> ", "\r\n+CMGS: 17\r\n\r\nOK\r\n"]);
    let mut modem = Sim800Modem::new(link);
    assert_eq!(modem.send("+15550001111", "hello\nworld"), Ok(()));
    assert_eq!(
        modem.link().written(),
        "AT+CMGF=1\r\nAT+CMGS=\"+15550001111\"\r\nhello\nworld\u{1a}"
    );
}

#[test]
fn send_without_prompt_times_out() {
    let link = ScriptedLink::with(&["OK\r\n"]);
    let mut modem = Sim800Modem::new(link);
    assert_eq!(modem.send("+1555", "x"), Err(SendError::Timeout));
}

#[test]
fn send_rejected_by_network() {
    let link = ScriptedLink::with(&["OK\r\n", "> ", "\r\n+CMS ERROR: 500\r\n"]);
    let mut modem = Sim800Modem::new(link);
    assert_eq!(modem.send("+1555", "x"), Err(SendError::TransportUnavailable));
}

#[test]
fn broken_link_reports_transport_unavailable() {
    let mut link = ScriptedLink::default();
    link.broken = true;
    let mut modem = Sim800Modem::new(link);
    assert_eq!(modem.send("+1555", "x"), Err(SendError::TransportUnavailable));
}

#[test]
fn incoming_sms_bodies_are_queued() {
    let link = ScriptedLink::with(&[
        "\r\n+CMT: \"+15550001111\",\"\",\"25/10/21,18:52:24+32\"\r\nVAPOR ON\r\n",
        "\r\n+CMT: \"+15550001111\",\"\",\"25/10/21,18:53:",
        "00+32\"\r\nvapor status\r\n",
    ]);
    let mut modem = Sim800Modem::new(link);
    assert_eq!(modem.poll_incoming().as_deref(), Some("VAPOR ON"));
    assert_eq!(modem.poll_incoming().as_deref(), Some("vapor status"));
    assert_eq!(modem.poll_incoming(), None);
}

#[test]
fn sms_arriving_during_command_is_not_lost() {
    let link = ScriptedLink::with(&[
        "+CMT: \"+1555\",\"\",\"x\"\r\nVAPOR OFF\r\n",
        "+CCLK: \"25/10/21,18:52:24+32\"\r\n\r\nOK\r\n",
    ]);
    let mut modem = Sim800Modem::new(link);
    let reply = modem.network_time().unwrap();
    assert!(reply.contains("+CCLK: \"25/10/21,18:52:24+32\""));
    assert!(!reply.contains("VAPOR OFF"));
    assert_eq!(modem.poll_incoming().as_deref(), Some("VAPOR OFF"));
}

#[test]
fn multi_line_sms_keeps_the_command_line() {
    let link = ScriptedLink::with(&[
        "\r\n+CMT: \"+1555\",\"\",\"25/10/21,18:52:24+32\"\r\nHello\nVAPOR ON\r\n",
    ]);
    let mut modem = Sim800Modem::new(link);
    let body = modem.poll_incoming().expect("one SMS queued");
    assert_eq!(body, "Hello\nVAPOR ON");
    assert_eq!(AppCommand::from_sms(&body), Some(AppCommand::SprinklerOn));
    assert_eq!(modem.poll_incoming(), None);
}

#[test]
fn error_inside_an_arriving_sms_does_not_end_the_command() {
    let link = ScriptedLink::with(&[
        "+CMT: \"+1555\",\"\",\"25/10/21,18:52:24+32\"\r\nVAPOR ON, ERROR light",
        " is blinking\r\n",
        "+CCLK: \"25/10/21,18:52:24+32\"\r\n\r\nOK\r\n",
    ]);
    let mut modem = Sim800Modem::new(link);
    let reply = modem.network_time().expect("clock reply survives");
    assert!(reply.contains("+CCLK: \"25/10/21,18:52:24+32\""));
    assert_eq!(
        modem.poll_incoming().as_deref(),
        Some("VAPOR ON, ERROR light is blinking")
    );
}

#[test]
fn network_time_none_on_error() {
    let link = ScriptedLink::with(&["ERROR\r\n"]);
    let mut modem = Sim800Modem::new(link);
    assert_eq!(modem.network_time(), None);
}
